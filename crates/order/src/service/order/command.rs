use crate::{
    abstract_trait::order::{
        repository::{BoxedOrderTransaction, DynOrderStore},
        service::OrderCommandServiceTrait,
    },
    domain::{
        requests::{
            actor::Actor,
            order::{
                CreateOrderItemRecordRequest, CreateOrderRecordRequest, CreateOrderRequest,
                OrderLineRequest, PlaceOrder, UpdateOrderStatusRequest,
            },
        },
        response::order::OrderResponse,
    },
    model::{order::OrderStatus, variant::Variant as VariantModel},
};
use async_trait::async_trait;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    domain::responses::ApiResponse,
    errors::{OrderError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils},
};
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderCommandService {
    store: DynOrderStore,
    metrics: Metrics,
}

pub struct OrderCommandServiceDeps {
    pub store: DynOrderStore,
    pub registry: Arc<Mutex<Registry>>,
}

fn insufficient_stock(variant: &VariantModel, requested: i32, available: i32) -> OrderError {
    OrderError::InsufficientStock {
        variant_id: variant.id,
        product_name: variant.product_name.clone(),
        size: variant.size.clone(),
        requested,
        available,
    }
}

impl OrderCommandService {
    pub async fn new(deps: OrderCommandServiceDeps) -> Self {
        let OrderCommandServiceDeps { store, registry } = deps;

        let metrics = Metrics::new();
        metrics.register(
            &mut *registry.lock().await,
            "order_command_service",
            "OrderCommandService",
        );

        Self { store, metrics }
    }

    fn complete_operation<T>(
        &self,
        start_time: Instant,
        method: Method,
        operation: &str,
        result: &Result<T, ServiceError>,
    ) {
        let elapsed = start_time.elapsed().as_secs_f64();

        let status = match result {
            Ok(_) => {
                info!("✅ Operation completed successfully: {operation}");
                StatusUtils::Success
            }
            Err(ServiceError::Order(err)) => {
                warn!("⚠️ Operation rejected: {operation}: {err}");
                StatusUtils::Error
            }
            Err(err) => {
                error!("❌ Operation failed: {operation}: {err}");
                StatusUtils::Error
            }
        };

        self.metrics.record(method, status, elapsed);
    }

    /// Locks the variant, checks and removes stock, and returns the unit
    /// price in effect right now.
    async fn reserve_line(
        tx: &mut BoxedOrderTransaction,
        line: &OrderLineRequest,
    ) -> Result<Decimal, ServiceError> {
        let variant = tx
            .find_variant_for_update(line.variant_id)
            .await?
            .ok_or(OrderError::VariantNotFound(line.variant_id))?;

        if line.quantity > variant.stock {
            return Err(insufficient_stock(&variant, line.quantity, variant.stock).into());
        }

        if tx.decrement_stock(variant.id, line.quantity).await?.is_none() {
            let available = tx.get_current_stock(variant.id).await?.unwrap_or(0);
            return Err(insufficient_stock(&variant, line.quantity, available).into());
        }

        Ok(variant.price)
    }

    /// The caller with the role the user directory holds for them now.
    async fn current_actor(
        tx: &mut BoxedOrderTransaction,
        actor: &Actor,
    ) -> Result<Actor, ServiceError> {
        let role = tx
            .find_user_role(actor.user_id)
            .await?
            .ok_or(OrderError::NotAuthorized)?;

        Ok(Actor::new(actor.user_id, role))
    }

    async fn place_order(
        &self,
        user_id: Uuid,
        req: &CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let mut tx = self.store.begin().await?;

        if !tx.user_exists(user_id).await? {
            return Err(OrderError::UserNotFound.into());
        }

        let order = PlaceOrder::parse(user_id, req)?;

        let mut total = Decimal::ZERO;
        let mut priced = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let price = Self::reserve_line(&mut tx, line).await?;
            total += price * Decimal::from(line.quantity);
            priced.push((line, price));
        }

        let record = tx
            .create_order(&CreateOrderRecordRequest {
                id: Uuid::new_v4(),
                user_id,
                total,
                shipping: order.shipping.clone(),
            })
            .await?;

        let mut items = Vec::with_capacity(priced.len());
        for (line, price) in priced {
            let item = tx
                .create_order_item(&CreateOrderItemRecordRequest {
                    id: Uuid::new_v4(),
                    order_id: record.id,
                    variant_id: line.variant_id,
                    quantity: line.quantity,
                    price,
                })
                .await?;
            items.push(item);
        }

        tx.commit().await?;

        Ok(OrderResponse::from_parts(record, items))
    }

    async fn cancel(&self, actor: &Actor, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let mut tx = self.store.begin().await?;

        let order = tx
            .find_order_for_update(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        match order.status {
            OrderStatus::Cancelled => return Err(OrderError::AlreadyCancelled.into()),
            OrderStatus::Delivered => return Err(OrderError::CannotCancelDelivered.into()),
            _ => {}
        }

        let actor = Self::current_actor(&mut tx, actor).await?;
        if !actor.can_access(order.user_id) {
            return Err(OrderError::NotAuthorized.into());
        }

        let items = tx.find_order_items(order_id).await?;
        for item in &items {
            let Some(variant_id) = item.variant_id else {
                warn!(
                    "⚠️ Skipping restock of item {} in order {}: variant was deleted",
                    item.id, order_id
                );
                continue;
            };

            if tx.increment_stock(variant_id, item.quantity).await?.is_none() {
                warn!(
                    "⚠️ Skipping restock of item {} in order {}: variant {} no longer exists",
                    item.id, order_id, variant_id
                );
            }
        }

        let order = tx
            .update_order_status(order_id, OrderStatus::Cancelled)
            .await?;

        tx.commit().await?;

        Ok(OrderResponse::from_parts(order, items))
    }

    async fn change_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<OrderResponse, ServiceError> {
        let mut tx = self.store.begin().await?;

        if !Self::current_actor(&mut tx, actor).await?.is_admin() {
            return Err(OrderError::NotAuthorized.into());
        }

        let order = tx
            .find_order_for_update(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        let current = order.status;
        let rejected = move || OrderError::InvalidStatusTransition {
            from: current.to_string(),
            to: target.to_string(),
        };

        if target == OrderStatus::Cancelled {
            return Err(rejected().into());
        }

        let order = if current == target {
            order
        } else if current.is_terminal() {
            return Err(rejected().into());
        } else {
            tx.update_order_status(order_id, target).await?
        };

        let items = tx.find_order_items(order_id).await?;
        tx.commit().await?;

        Ok(OrderResponse::from_parts(order, items))
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(
        &self,
        user_id: Uuid,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!(
            "🏗️ Creating new order for user_id={} with {} item(s)",
            user_id,
            req.items.len()
        );

        let start_time = Instant::now();
        let result = self.place_order(user_id, req).await;
        self.complete_operation(start_time, Method::Post, "create_order", &result);

        let order = result?;
        info!(
            "✅ Order {} created for user_id={} total={}",
            order.id, user_id, order.total
        );

        Ok(ApiResponse::success("Order created successfully", order))
    }

    async fn cancel_order(
        &self,
        actor: &Actor,
        order_id: Uuid,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🛑 Cancelling order {} for user_id={}", order_id, actor.user_id);

        let start_time = Instant::now();
        let result = self.cancel(actor, order_id).await;
        self.complete_operation(start_time, Method::Patch, "cancel_order", &result);

        Ok(ApiResponse::success("Order cancelled successfully", result?))
    }

    async fn update_order_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🔄 Setting order {} to {}", order_id, req.status);

        let start_time = Instant::now();
        let result = self.change_status(actor, order_id, req.status).await;
        self.complete_operation(start_time, Method::Patch, "update_order_status", &result);

        Ok(ApiResponse::success("Order status updated successfully", result?))
    }
}
