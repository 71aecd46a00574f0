#[cfg(test)]
pub mod memory;
mod order;

pub use self::order::{OrderQueryRepository, OrderStore, PgOrderTransaction};
