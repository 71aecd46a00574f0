mod query;
mod store;

pub use self::query::{DynOrderQueryRepository, OrderQueryRepositoryTrait};
pub use self::store::{
    BoxedOrderTransaction, DynOrderStore, OrderStoreTrait, OrderTransactionTrait,
};
