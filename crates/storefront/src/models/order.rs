//! Completed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{Email, OrderStatus, PaymentMethod, Price, ShippingMethod};

use super::LineItem;

/// Shipping contact captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
}

/// An order appended to `orders_<email>` at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORD-<epoch millis>-<9 base36 chars>`.
    pub id: String,
    /// Email of the identity that placed the order.
    pub user_id: Email,
    /// Cart contents at checkout time.
    pub items: Vec<LineItem>,
    pub subtotal: Price,
    pub shipping_price: Price,
    /// `subtotal + shipping_price`.
    pub total: Price,
    pub customer_info: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
