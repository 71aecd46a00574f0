use crate::{
    abstract_trait::{inventory::InventoryLedgerTrait, user::UserDirectoryTrait},
    domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    model::{
        order::{Order as OrderModel, OrderStatus},
        order_item::OrderItem as OrderItemModel,
    },
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderStore = Arc<dyn OrderStoreTrait + Send + Sync>;
pub type BoxedOrderTransaction = Box<dyn OrderTransactionTrait>;

#[async_trait]
pub trait OrderStoreTrait {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError>;
}

/// One atomic unit of work over stock, users and orders.
///
/// Dropping the handle without calling [`OrderTransactionTrait::commit`]
/// discards every change made through it.
#[async_trait]
pub trait OrderTransactionTrait: InventoryLedgerTrait + UserDirectoryTrait + Send {
    async fn create_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;

    async fn create_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItemModel, RepositoryError>;

    /// Reads the order and locks it until the transaction ends.
    async fn find_order_for_update(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderModel>, RepositoryError>;

    async fn find_order_items(
        &mut self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, RepositoryError>;

    async fn update_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderModel, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}
