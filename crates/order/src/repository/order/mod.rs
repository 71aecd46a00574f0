mod query;
mod store;

pub use self::query::OrderQueryRepository;
pub use self::store::{OrderStore, PgOrderTransaction};
