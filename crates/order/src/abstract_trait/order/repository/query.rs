use crate::{
    domain::requests::order::FindAllOrder,
    model::{order::Order as OrderModel, order_item::OrderItem as OrderItemModel},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    /// Newest first. `user_id` restricts the listing to one customer's orders.
    async fn find_all(
        &self,
        req: &FindAllOrder,
        user_id: Option<Uuid>,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError>;
    async fn find_items_by_orders(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<OrderItemModel>, RepositoryError>;
}
