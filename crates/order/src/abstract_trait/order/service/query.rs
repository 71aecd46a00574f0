use crate::domain::{
    requests::{actor::Actor, order::FindAllOrder},
    response::{order::OrderResponse, variant::StockResponse},
};
use async_trait::async_trait;
use shared::{
    domain::responses::{ApiResponse, ApiResponsePagination},
    errors::ServiceError,
};
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_all(
        &self,
        actor: &Actor,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError>;
    async fn find_by_id(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn get_stock(&self, variant_id: Uuid) -> Result<ApiResponse<StockResponse>, ServiceError>;
}
