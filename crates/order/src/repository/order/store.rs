use crate::{
    abstract_trait::{
        inventory::InventoryLedgerTrait,
        order::repository::{BoxedOrderTransaction, OrderStoreTrait, OrderTransactionTrait},
        user::UserDirectoryTrait,
    },
    domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    model::{
        order::{Order as OrderModel, OrderStatus},
        order_item::OrderItem as OrderItemModel,
        variant::Variant as VariantModel,
    },
};
use async_trait::async_trait;
use shared::{
    config::{ConnectionPool, IsolationLevel},
    errors::RepositoryError,
    model::Role,
};
use sqlx::{Postgres, Transaction};
use tracing::{error, info, warn};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, user_id, status, total, shipping_full_name, shipping_phone, \
     shipping_line1, shipping_line2, shipping_city, shipping_state, shipping_postal_code, \
     shipping_country, created_at, updated_at";

pub struct OrderStore {
    db: ConnectionPool,
    isolation: IsolationLevel,
}

impl OrderStore {
    pub fn new(db: ConnectionPool, isolation: IsolationLevel) -> Self {
        Self { db, isolation }
    }
}

#[async_trait]
impl OrderStoreTrait for OrderStore {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|err| {
            error!("❌ Failed to begin transaction: {:?}", err);
            RepositoryError::from(err)
        })?;

        sqlx::query(self.isolation.as_sql())
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        Ok(Box::new(PgOrderTransaction { tx }))
    }
}

/// A Postgres transaction. Dropping it without commit rolls back.
pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl InventoryLedgerTrait for PgOrderTransaction {
    async fn get_current_stock(&mut self, variant_id: Uuid) -> Result<Option<i32>, RepositoryError> {
        let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM product_variants WHERE id = $1")
            .bind(variant_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to read stock of variant {}: {:?}", variant_id, err);
                RepositoryError::from(err)
            })?;

        Ok(stock)
    }

    async fn find_variant_for_update(
        &mut self,
        variant_id: Uuid,
    ) -> Result<Option<VariantModel>, RepositoryError> {
        let variant = sqlx::query_as::<_, VariantModel>(
            r#"
            SELECT v.id, v.product_id, p.name AS product_name, v.size, v.sku, v.price, v.stock
            FROM product_variants v
            JOIN products p ON p.id = v.product_id
            WHERE v.id = $1
            FOR UPDATE OF v
            "#,
        )
        .bind(variant_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to lock variant {}: {:?}", variant_id, err);
            RepositoryError::from(err)
        })?;

        Ok(variant)
    }

    async fn decrement_stock(
        &mut self,
        variant_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        let stock = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE product_variants
            SET stock = stock - $1,
                updated_at = current_timestamp
            WHERE id = $2 AND stock >= $1
            RETURNING stock
            "#,
        )
        .bind(amount)
        .bind(variant_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to decrement stock of variant {}: {:?}", variant_id, err);
            RepositoryError::from(err)
        })?;

        match stock {
            Some(remaining) => info!("📉 Variant {} stock -{} → {}", variant_id, amount, remaining),
            None => warn!("⚠️ Variant {} has fewer than {} units", variant_id, amount),
        }

        Ok(stock)
    }

    async fn increment_stock(
        &mut self,
        variant_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        let stock = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE product_variants
            SET stock = stock + $1,
                updated_at = current_timestamp
            WHERE id = $2
            RETURNING stock
            "#,
        )
        .bind(amount)
        .bind(variant_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to increment stock of variant {}: {:?}", variant_id, err);
            RepositoryError::from(err)
        })?;

        if let Some(remaining) = stock {
            info!("📈 Variant {} stock +{} → {}", variant_id, amount, remaining);
        }

        Ok(stock)
    }
}

#[async_trait]
impl UserDirectoryTrait for PgOrderTransaction {
    async fn find_user_role(&mut self, user_id: Uuid) -> Result<Option<Role>, RepositoryError> {
        sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to look up user {}: {:?}", user_id, err);
                RepositoryError::from(err)
            })
    }
}

#[async_trait]
impl OrderTransactionTrait for PgOrderTransaction {
    async fn create_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO orders (
                id, user_id, status, total,
                shipping_full_name, shipping_phone, shipping_line1, shipping_line2,
                shipping_city, shipping_state, shipping_postal_code, shipping_country,
                created_at, updated_at
            )
            VALUES ($1, $2, 'PENDING', $3, $4, $5, $6, $7, $8, $9, $10, $11,
                    current_timestamp, current_timestamp)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let shipping = &req.shipping;
        let order = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(req.id)
            .bind(req.user_id)
            .bind(req.total)
            .bind(&shipping.full_name)
            .bind(&shipping.phone)
            .bind(&shipping.line1)
            .bind(&shipping.line2)
            .bind(&shipping.city)
            .bind(&shipping.state)
            .bind(&shipping.postal_code)
            .bind(&shipping.country)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|err| {
                error!(
                    "❌ Failed to create order for user {}: {:?}",
                    req.user_id, err
                );
                RepositoryError::from(err)
            })?;

        info!("✅ Created order ID {} for user {}", order.id, order.user_id);
        Ok(order)
    }

    async fn create_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItemModel, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItemModel>(
            r#"
            INSERT INTO order_items (id, order_id, variant_id, quantity, price, created_at)
            VALUES ($1, $2, $3, $4, $5, clock_timestamp())
            RETURNING id, order_id, variant_id, quantity, price, created_at
            "#,
        )
        .bind(req.id)
        .bind(req.order_id)
        .bind(req.variant_id)
        .bind(req.quantity)
        .bind(req.price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|err| {
            error!(
                "❌ Failed to add variant {} to order {}: {:?}",
                req.variant_id, req.order_id, err
            );
            RepositoryError::from(err)
        })?;

        Ok(item)
    }

    async fn find_order_for_update(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(order_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to lock order {}: {:?}", order_id, err);
                RepositoryError::from(err)
            })
    }

    async fn find_order_items(
        &mut self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        sqlx::query_as::<_, OrderItemModel>(
            r#"
            SELECT id, order_id, variant_id, quantity, price, created_at
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to load items of order {}: {:?}", order_id, err);
            RepositoryError::from(err)
        })
    }

    async fn update_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderModel, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = $2,
                updated_at = current_timestamp
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(order_id)
            .bind(status)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to set order {} to {}: {:?}", order_id, status, err);
                RepositoryError::from(err)
            })?;

        info!("🔄 Order {} is now {}", order.id, order.status);
        Ok(order)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(|err| {
            error!("❌ Failed to commit transaction: {:?}", err);
            RepositoryError::from(err)
        })
    }
}
