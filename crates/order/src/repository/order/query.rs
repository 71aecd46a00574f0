use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    domain::requests::order::FindAllOrder,
    model::{order::Order as OrderModel, order_item::OrderItem as OrderItemModel},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};
use uuid::Uuid;

pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_all(
        &self,
        req: &FindAllOrder,
        user_id: Option<Uuid>,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        info!(
            "🔍 Fetching orders page={} size={} user={:?} status={:?}",
            req.page, req.page_size, user_id, req.status
        );

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let orders = sqlx::query_as::<_, OrderModel>(
            r#"
            SELECT id, user_id, status, total, shipping_full_name, shipping_phone,
                   shipping_line1, shipping_line2, shipping_city, shipping_state,
                   shipping_postal_code, shipping_country, created_at, updated_at
            FROM orders
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::order_status IS NULL OR status = $2)
            ORDER BY created_at DESC, id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(req.status)
        .bind(req.page_size as i64)
        .bind(req.offset())
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch orders: {:?}", err);
            RepositoryError::from(err)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM orders
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::order_status IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(req.status)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to count orders: {:?}", err);
            RepositoryError::from(err)
        })?;

        Ok((orders, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderModel>(
            r#"
            SELECT id, user_id, status, total, shipping_full_name, shipping_phone,
                   shipping_line1, shipping_line2, shipping_city, shipping_state,
                   shipping_postal_code, shipping_country, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch order {}: {:?}", id, err);
            RepositoryError::from(err)
        })
    }

    async fn find_items_by_orders(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, OrderItemModel>(
            r#"
            SELECT id, order_id, variant_id, quantity, price, created_at
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(order_ids.to_vec())
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch order items: {:?}", err);
            RepositoryError::from(err)
        })
    }
}
