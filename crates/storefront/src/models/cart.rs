//! Cart line items and the product view they are created from.

use serde::{Deserialize, Serialize};

use shopfront_core::{LineId, Price, ProductId};

/// Quantity ceiling applied when a product does not report its stock.
pub const DEFAULT_STOCK_CEILING: u32 = 99;

/// The catalog attributes the cart needs when adding a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Units available; `None` when the catalog does not track stock.
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Product {
    /// Highest quantity the cart may hold for this product.
    #[must_use]
    pub fn stock_ceiling(&self) -> u32 {
        self.stock.unwrap_or(DEFAULT_STOCK_CEILING)
    }
}

/// One product entry in a cart.
///
/// Name, price, image, stock and category are snapshots taken when the line
/// was created; later catalog changes do not touch them.
///
/// Invariant: `1 <= quantity <= stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Creation-time-derived ID, unique within the cart.
    pub id: LineId,
    pub product_id: ProductId,
    pub name: String,
    /// Unit price snapshot.
    pub price: Price,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Stock snapshot; bounds later quantity updates.
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
}

impl LineItem {
    /// Snapshot `product` into a new line holding `quantity` units.
    #[must_use]
    pub fn snapshot(id: LineId, product: &Product, quantity: u32) -> Self {
        Self {
            id,
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
            image_url: product.image_url.clone(),
            stock: product.stock_ceiling(),
            category: product.category.clone(),
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}
