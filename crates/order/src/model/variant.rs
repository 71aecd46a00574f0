use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub size: String,
    pub sku: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}
