use crate::{
    abstract_trait::order::{
        repository::{DynOrderQueryRepository, DynOrderStore},
        service::OrderQueryServiceTrait,
    },
    domain::{
        requests::{actor::Actor, order::FindAllOrder},
        response::{order::OrderResponse, variant::StockResponse},
    },
    model::order_item::OrderItem as OrderItemModel,
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::{ApiResponse, ApiResponsePagination, Pagination},
    errors::{OrderError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils},
};
use std::{collections::HashMap, sync::Arc};
use tokio::{sync::Mutex, time::Instant};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    store: DynOrderStore,
    metrics: Metrics,
}

pub struct OrderQueryServiceDeps {
    pub query: DynOrderQueryRepository,
    pub store: DynOrderStore,
    pub registry: Arc<Mutex<Registry>>,
}

impl OrderQueryService {
    pub async fn new(deps: OrderQueryServiceDeps) -> Self {
        let OrderQueryServiceDeps {
            query,
            store,
            registry,
        } = deps;

        let metrics = Metrics::new();
        metrics.register(
            &mut *registry.lock().await,
            "order_query_service",
            "OrderQueryService",
        );

        Self {
            query,
            store,
            metrics,
        }
    }

    fn complete_operation<T>(&self, start_time: Instant, operation: &str, result: &Result<T, ServiceError>) {
        let status = match result {
            Ok(_) => {
                info!("✅ Operation completed successfully: {operation}");
                StatusUtils::Success
            }
            Err(err) => {
                error!("❌ Operation failed: {operation}: {err}");
                StatusUtils::Error
            }
        };

        self.metrics
            .record(Method::Get, status, start_time.elapsed().as_secs_f64());
    }

    async fn list(
        &self,
        actor: &Actor,
        req: &FindAllOrder,
    ) -> Result<(Vec<OrderResponse>, Pagination), ServiceError> {
        let owner = if actor.is_admin() {
            None
        } else {
            Some(actor.user_id)
        };

        let (orders, total) = self.query.find_all(req, owner).await?;

        let ids: Vec<Uuid> = orders.iter().map(|order| order.id).collect();
        let mut items_by_order: HashMap<Uuid, Vec<OrderItemModel>> = HashMap::new();
        for item in self.query.find_items_by_orders(&ids).await? {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let data = orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                OrderResponse::from_parts(order, items)
            })
            .collect();

        Ok((data, Pagination::new(req.page, req.page_size, total)))
    }

    async fn get(&self, actor: &Actor, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = self
            .query
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !actor.can_access(order.user_id) {
            return Err(OrderError::NotAuthorized.into());
        }

        let items = self.query.find_items_by_orders(&[order_id]).await?;

        Ok(OrderResponse::from_parts(order, items))
    }

    async fn stock(&self, variant_id: Uuid) -> Result<StockResponse, ServiceError> {
        let mut tx = self.store.begin().await?;

        let stock = tx
            .get_current_stock(variant_id)
            .await?
            .ok_or(OrderError::VariantNotFound(variant_id))?;

        tx.commit().await?;

        Ok(StockResponse { variant_id, stock })
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(
        &self,
        actor: &Actor,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        info!(
            "🔍 Listing orders for user_id={} page={} page_size={} status={:?}",
            actor.user_id, req.page, req.page_size, req.status
        );

        let start_time = Instant::now();
        let result = self.list(actor, req).await;
        self.complete_operation(start_time, "find_all_orders", &result);

        let (data, pagination) = result?;

        Ok(ApiResponsePagination {
            status: "success".into(),
            message: "Orders retrieved successfully".into(),
            data,
            pagination,
        })
    }

    async fn find_by_id(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🔍 Fetching order {} for user_id={}", order_id, actor.user_id);

        let start_time = Instant::now();
        let result = self.get(actor, order_id).await;
        self.complete_operation(start_time, "find_order_by_id", &result);

        Ok(ApiResponse::success("Order retrieved successfully", result?))
    }

    async fn get_stock(&self, variant_id: Uuid) -> Result<ApiResponse<StockResponse>, ServiceError> {
        info!("📦 Reading stock of variant {}", variant_id);

        let start_time = Instant::now();
        let result = self.stock(variant_id).await;
        self.complete_operation(start_time, "get_stock", &result);

        Ok(ApiResponse::success("Stock retrieved successfully", result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::order::service::OrderCommandServiceTrait,
        domain::requests::order::{CreateOrderItemRequest, CreateOrderRequest, ShippingRequest},
        model::order::OrderStatus,
        repository::memory::MemoryStore,
        service::order::{OrderCommandService, OrderCommandServiceDeps},
    };
    use rust_decimal::Decimal;
    use shared::model::Role;

    struct Fixture {
        store: MemoryStore,
        command: OrderCommandService,
        query: OrderQueryService,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let registry = Arc::new(Mutex::new(Registry::default()));

        let command = OrderCommandService::new(OrderCommandServiceDeps {
            store: Arc::new(store.clone()),
            registry: registry.clone(),
        })
        .await;
        let query = OrderQueryService::new(OrderQueryServiceDeps {
            query: Arc::new(store.clone()),
            store: Arc::new(store.clone()),
            registry,
        })
        .await;

        Fixture {
            store,
            command,
            query,
        }
    }

    fn order_of(variant_id: Uuid, quantity: i32) -> CreateOrderRequest {
        CreateOrderRequest {
            items: vec![CreateOrderItemRequest {
                variant_id,
                quantity: quantity.into(),
            }],
            shipping: ShippingRequest {
                full_name: "Arun Kumar".into(),
                phone: "9443012345".into(),
                line1: "22 Temple Street".into(),
                line2: None,
                city: "Salem".into(),
                state: "Tamil Nadu".into(),
                postal_code: "636001".into(),
                country: "India".into(),
            },
        }
    }

    #[tokio::test]
    async fn customers_list_only_their_own_orders_newest_first() {
        let f = fixture().await;
        let alice = f.store.add_user(Role::Customer).await;
        let bob = f.store.add_user(Role::Customer).await;
        let admin = f.store.add_user(Role::Admin).await;
        let oil = f
            .store
            .add_variant("Groundnut Oil", "1L", Decimal::new(25000, 2), 20)
            .await;

        let first = f.command.create_order(alice, &order_of(oil, 1)).await.unwrap().data;
        let second = f.command.create_order(alice, &order_of(oil, 2)).await.unwrap().data;
        f.command.create_order(bob, &order_of(oil, 3)).await.unwrap();

        let page = f
            .query
            .find_all(&Actor::new(alice, Role::Customer), &FindAllOrder::default())
            .await
            .unwrap();
        let ids: Vec<Uuid> = page.data.iter().map(|order| order.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(page.pagination.total_items, 2);
        assert_eq!(page.data[0].items.len(), 1);

        let everything = f
            .query
            .find_all(&Actor::new(admin, Role::Admin), &FindAllOrder::default())
            .await
            .unwrap();
        assert_eq!(everything.pagination.total_items, 3);
    }

    #[tokio::test]
    async fn listing_pages_and_filters_by_status() {
        let f = fixture().await;
        let admin = Actor::new(f.store.add_user(Role::Admin).await, Role::Admin);
        let customer = f.store.add_user(Role::Customer).await;
        let oil = f
            .store
            .add_variant("Sesame Oil", "1L", Decimal::new(36000, 2), 20)
            .await;

        for _ in 0..3 {
            f.command.create_order(customer, &order_of(oil, 1)).await.unwrap();
        }
        let cancelled = f.command.create_order(customer, &order_of(oil, 1)).await.unwrap().data;
        f.command.cancel_order(&admin, cancelled.id).await.unwrap();

        let req = FindAllOrder {
            page: 2,
            page_size: 3,
            status: None,
        };
        let page = f.query.find_all(&admin, &req).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.pagination.total_pages, 2);

        let req = FindAllOrder {
            status: Some(OrderStatus::Cancelled),
            ..FindAllOrder::default()
        };
        let page = f.query.find_all(&admin, &req).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, cancelled.id);
    }

    #[tokio::test]
    async fn reading_an_order_requires_ownership_or_admin() {
        let f = fixture().await;
        let owner = f.store.add_user(Role::Customer).await;
        let stranger = f.store.add_user(Role::Customer).await;
        let oil = f
            .store
            .add_variant("Coconut Oil", "1L", Decimal::new(32000, 2), 5)
            .await;
        let order = f.command.create_order(owner, &order_of(oil, 1)).await.unwrap().data;

        let found = f
            .query
            .find_by_id(&Actor::new(owner, Role::Customer), order.id)
            .await
            .unwrap();
        assert_eq!(found.data.total, Decimal::new(32000, 2));

        let err = f
            .query
            .find_by_id(&Actor::new(stranger, Role::Customer), order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Order(OrderError::NotAuthorized)));

        let missing = Uuid::new_v4();
        let err = f
            .query
            .find_by_id(&Actor::new(owner, Role::Customer), missing)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Order(OrderError::OrderNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn stock_follows_placement_and_cancellation() {
        let f = fixture().await;
        let customer = f.store.add_user(Role::Customer).await;
        let oil = f
            .store
            .add_variant("Groundnut Oil", "1L", Decimal::new(25000, 2), 5)
            .await;

        let order = f.command.create_order(customer, &order_of(oil, 3)).await.unwrap().data;
        assert_eq!(f.query.get_stock(oil).await.unwrap().data.stock, 2);

        f.command
            .cancel_order(&Actor::new(customer, Role::Customer), order.id)
            .await
            .unwrap();
        assert_eq!(f.query.get_stock(oil).await.unwrap().data.stock, 5);

        let missing = Uuid::new_v4();
        let err = f.query.get_stock(missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::Order(OrderError::VariantNotFound(id)) if id == missing));
    }
}
