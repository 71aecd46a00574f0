use crate::model::order::OrderStatus;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::errors::OrderError;
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("phone pattern compiles"));

#[derive(Debug, Clone, Serialize, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindAllOrder {
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i32,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_page_size", rename = "page_size")]
    pub page_size: i32,

    pub status: Option<OrderStatus>,
}

fn default_page() -> i32 {
    1
}

fn default_page_size() -> i32 {
    10
}

impl Default for FindAllOrder {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            status: None,
        }
    }
}

impl FindAllOrder {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.page_size as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub variant_id: Uuid,
    /// Kept as raw JSON so a fractional or quoted quantity surfaces as
    /// `InvalidQuantity` after the checks that precede it.
    #[schema(value_type = i32, minimum = 1)]
    #[serde(default)]
    pub quantity: Value,
}

impl CreateOrderItemRequest {
    /// The quantity as a positive `i32`, if it is one.
    fn whole_quantity(&self) -> Option<i32> {
        self.quantity
            .as_i64()
            .and_then(|quantity| i32::try_from(quantity).ok())
            .filter(|quantity| *quantity > 0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingRequest {
    #[validate(length(max = 255))]
    pub full_name: String,
    pub phone: String,
    #[validate(length(max = 255))]
    pub line1: String,
    #[validate(length(max = 255))]
    pub line2: Option<String>,
    #[validate(length(max = 128))]
    pub city: String,
    #[validate(length(max = 128))]
    pub state: String,
    #[validate(length(max = 32))]
    pub postal_code: String,
    #[validate(length(max = 128))]
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<CreateOrderItemRequest>,

    #[validate(nested)]
    #[serde(default)]
    pub shipping: ShippingRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Shipping address copied onto the order, independent of later address-book edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSnapshot {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl TryFrom<&ShippingRequest> for ShippingSnapshot {
    type Error = OrderError;

    fn try_from(req: &ShippingRequest) -> Result<Self, Self::Error> {
        let required = [
            ("fullName", req.full_name.trim()),
            ("phone", req.phone.trim()),
            ("line1", req.line1.trim()),
            ("city", req.city.trim()),
            ("state", req.state.trim()),
            ("postalCode", req.postal_code.trim()),
            ("country", req.country.trim()),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(OrderError::IncompleteShipping(missing));
        }

        let phone = req.phone.trim();
        if !PHONE_PATTERN.is_match(phone) {
            return Err(OrderError::InvalidPhone(phone.to_string()));
        }

        Ok(Self {
            full_name: req.full_name.trim().to_string(),
            phone: phone.to_string(),
            line1: req.line1.trim().to_string(),
            line2: req
                .line2
                .as_deref()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
            city: req.city.trim().to_string(),
            state: req.state.trim().to_string(),
            postal_code: req.postal_code.trim().to_string(),
            country: req.country.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLineRequest {
    pub variant_id: Uuid,
    pub quantity: i32,
}

/// A placement request that passed every input precondition.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: Uuid,
    pub lines: Vec<OrderLineRequest>,
    pub shipping: ShippingSnapshot,
}

impl PlaceOrder {
    /// Checks, in order: non-empty items, complete shipping, phone pattern,
    /// positive quantities.
    pub fn parse(user_id: Uuid, req: &CreateOrderRequest) -> Result<Self, OrderError> {
        if req.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let shipping = ShippingSnapshot::try_from(&req.shipping)?;

        let lines = req
            .items
            .iter()
            .map(|item| match item.whole_quantity() {
                Some(quantity) => Ok(OrderLineRequest {
                    variant_id: item.variant_id,
                    quantity,
                }),
                None => Err(OrderError::InvalidQuantity {
                    variant_id: item.variant_id,
                    quantity: item.quantity.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            user_id,
            lines,
            shipping,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub shipping: ShippingSnapshot,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItemRecordRequest {
    pub id: Uuid,
    pub order_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
}
