//! In-memory order store used by the service and handler tests.
//!
//! A transaction holds the whole store lock and edits a working copy that
//! replaces the shared state on commit, so concurrent transactions are
//! serialized and an uncommitted one leaves no trace.

use crate::{
    abstract_trait::{
        inventory::InventoryLedgerTrait,
        order::repository::{
            BoxedOrderTransaction, OrderQueryRepositoryTrait, OrderStoreTrait,
            OrderTransactionTrait,
        },
        user::UserDirectoryTrait,
    },
    domain::requests::order::{
        CreateOrderItemRecordRequest, CreateOrderRecordRequest, FindAllOrder,
    },
    model::{
        order::{Order as OrderModel, OrderStatus},
        order_item::OrderItem as OrderItemModel,
        variant::Variant as VariantModel,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use shared::{errors::RepositoryError, model::Role};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct MemoryData {
    users: HashMap<Uuid, Role>,
    variants: HashMap<Uuid, VariantModel>,
    orders: HashMap<Uuid, OrderModel>,
    items: Vec<OrderItemModel>,
    last_timestamp: Option<DateTime<Utc>>,
    /// Stock a variant drops to just before the next decrement, standing in
    /// for a writer that slipped past the row lock.
    pending_shrink: Option<(Uuid, i32)>,
}

impl MemoryData {
    /// Strictly increasing timestamps keep "newest first" deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        self.data.lock().await.users.insert(id, role);
        id
    }

    pub async fn add_variant(&self, product_name: &str, size: &str, price: Decimal, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        let variant = VariantModel {
            id,
            product_id: Uuid::new_v4(),
            product_name: product_name.to_string(),
            size: size.to_string(),
            sku: None,
            price,
            stock,
        };
        self.data.lock().await.variants.insert(id, variant);
        id
    }

    pub async fn set_price(&self, variant_id: Uuid, price: Decimal) {
        if let Some(variant) = self.data.lock().await.variants.get_mut(&variant_id) {
            variant.price = price;
        }
    }

    /// Deletes a variant the way the catalog does: order lines keep their
    /// snapshot but lose the reference.
    pub async fn remove_variant(&self, variant_id: Uuid) {
        let mut data = self.data.lock().await;
        data.variants.remove(&variant_id);
        for item in data.items.iter_mut() {
            if item.variant_id == Some(variant_id) {
                item.variant_id = None;
            }
        }
    }

    pub async fn set_stock(&self, variant_id: Uuid, stock: i32) {
        if let Some(variant) = self.data.lock().await.variants.get_mut(&variant_id) {
            variant.stock = stock;
        }
    }

    /// Lowers the variant's stock to `stock` right before the next
    /// decrement runs, after the locked read has been taken.
    pub async fn shrink_stock_before_next_decrement(&self, variant_id: Uuid, stock: i32) {
        self.data.lock().await.pending_shrink = Some((variant_id, stock));
    }

    pub async fn set_role(&self, user_id: Uuid, role: Role) {
        if let Some(current) = self.data.lock().await.users.get_mut(&user_id) {
            *current = role;
        }
    }

    pub async fn stock_of(&self, variant_id: Uuid) -> Option<i32> {
        self.data
            .lock()
            .await
            .variants
            .get(&variant_id)
            .map(|variant| variant.stock)
    }

    pub async fn set_order_status(&self, order_id: Uuid, status: OrderStatus) {
        if let Some(order) = self.data.lock().await.orders.get_mut(&order_id) {
            order.status = status;
        }
    }

    pub async fn order_count(&self) -> usize {
        self.data.lock().await.orders.len()
    }

    pub async fn item_count(&self) -> usize {
        self.data.lock().await.items.len()
    }

    /// Makes the next commit fail with a transient error.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderStoreTrait for MemoryStore {
    async fn begin(&self) -> Result<BoxedOrderTransaction, RepositoryError> {
        let guard = self.data.clone().lock_owned().await;
        let working = guard.clone();

        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            fail_commit: self.fail_next_commit.swap(false, Ordering::SeqCst),
        }))
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for MemoryStore {
    async fn find_all(
        &self,
        req: &FindAllOrder,
        user_id: Option<Uuid>,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        let data = self.data.lock().await;

        let mut orders: Vec<OrderModel> = data
            .orders
            .values()
            .filter(|order| user_id.is_none_or(|id| order.user_id == id))
            .filter(|order| req.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = orders.len() as i64;
        let page = orders
            .into_iter()
            .skip(req.offset() as usize)
            .take(req.page_size as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError> {
        Ok(self.data.lock().await.orders.get(&id).cloned())
    }

    async fn find_items_by_orders(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        Ok(self
            .data
            .lock()
            .await
            .items
            .iter()
            .filter(|item| order_ids.contains(&item.order_id))
            .cloned()
            .collect())
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryData>,
    working: MemoryData,
    fail_commit: bool,
}

#[async_trait]
impl InventoryLedgerTrait for MemoryTransaction {
    async fn get_current_stock(&mut self, variant_id: Uuid) -> Result<Option<i32>, RepositoryError> {
        Ok(self.working.variants.get(&variant_id).map(|v| v.stock))
    }

    async fn find_variant_for_update(
        &mut self,
        variant_id: Uuid,
    ) -> Result<Option<VariantModel>, RepositoryError> {
        Ok(self.working.variants.get(&variant_id).cloned())
    }

    async fn decrement_stock(
        &mut self,
        variant_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        if let Some((shrunk_id, stock)) = self.working.pending_shrink.take() {
            if let Some(variant) = self.working.variants.get_mut(&shrunk_id) {
                variant.stock = stock;
            }
        }

        Ok(self
            .working
            .variants
            .get_mut(&variant_id)
            .filter(|variant| variant.stock >= amount)
            .map(|variant| {
                variant.stock -= amount;
                variant.stock
            }))
    }

    async fn increment_stock(
        &mut self,
        variant_id: Uuid,
        amount: i32,
    ) -> Result<Option<i32>, RepositoryError> {
        let Some(variant) = self.working.variants.get_mut(&variant_id) else {
            return Ok(None);
        };

        variant.stock = variant.stock.checked_add(amount).ok_or_else(|| {
            RepositoryError::Conflict(format!(
                "Stock of variant {variant_id} would exceed {}",
                i32::MAX
            ))
        })?;

        Ok(Some(variant.stock))
    }
}

#[async_trait]
impl UserDirectoryTrait for MemoryTransaction {
    async fn find_user_role(&mut self, user_id: Uuid) -> Result<Option<Role>, RepositoryError> {
        Ok(self.working.users.get(&user_id).copied())
    }
}

#[async_trait]
impl OrderTransactionTrait for MemoryTransaction {
    async fn create_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let now = self.working.now();
        let shipping = req.shipping.clone();
        let order = OrderModel {
            id: req.id,
            user_id: req.user_id,
            status: OrderStatus::Pending,
            total: req.total,
            shipping_full_name: shipping.full_name,
            shipping_phone: shipping.phone,
            shipping_line1: shipping.line1,
            shipping_line2: shipping.line2,
            shipping_city: shipping.city,
            shipping_state: shipping.state,
            shipping_postal_code: shipping.postal_code,
            shipping_country: shipping.country,
            created_at: now,
            updated_at: now,
        };
        self.working.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn create_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItemModel, RepositoryError> {
        if !self.working.orders.contains_key(&req.order_id) {
            return Err(RepositoryError::NotFound);
        }

        let item = OrderItemModel {
            id: req.id,
            order_id: req.order_id,
            variant_id: Some(req.variant_id),
            quantity: req.quantity,
            price: req.price,
            created_at: self.working.now(),
        };
        self.working.items.push(item.clone());
        Ok(item)
    }

    async fn find_order_for_update(
        &mut self,
        order_id: Uuid,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        Ok(self.working.orders.get(&order_id).cloned())
    }

    async fn find_order_items(
        &mut self,
        order_id: Uuid,
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        Ok(self
            .working
            .items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderModel, RepositoryError> {
        let now = self.working.now();
        let order = self
            .working
            .orders
            .get_mut(&order_id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        order.updated_at = now;
        Ok(order.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let MemoryTransaction {
            mut guard,
            working,
            fail_commit,
        } = *self;

        if fail_commit {
            return Err(RepositoryError::Transient(
                "could not serialize access due to concurrent update".into(),
            ));
        }

        *guard = working;
        Ok(())
    }
}
