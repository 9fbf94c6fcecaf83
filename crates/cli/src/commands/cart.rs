//! Cart commands.

use shopfront_core::LineId;
use shopfront_storefront::Storefront;
use shopfront_storefront::error::{AppError, Result};
use shopfront_storefront::models::Product;

pub fn show(storefront: &Storefront) {
    let cart = storefront.cart();
    if cart.is_empty() {
        tracing::info!(key = cart.key(), "Cart is empty");
        return;
    }

    for item in cart.items() {
        tracing::info!(
            line = %item.id,
            product = %item.product_id,
            name = %item.name,
            quantity = item.quantity,
            stock = item.stock,
            unit_price = %item.price,
            subtotal = %item.subtotal(),
            "Cart line"
        );
    }
    tracing::info!(
        key = cart.key(),
        items = cart.total_item_count(),
        total = %cart.total_price(),
        "Cart total"
    );
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a zero quantity or an out-of-stock
/// product.
pub fn add(storefront: &mut Storefront, product: &Product, quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(AppError::BadRequest("quantity must be at least 1".to_string()));
    }
    if product.stock == Some(0) {
        return Err(AppError::BadRequest(format!("{} is out of stock", product.name)));
    }

    storefront.cart_mut().add_item(product, quantity);
    tracing::info!(
        product = %product.id,
        in_cart = storefront.cart().quantity_of(product.id),
        "Added to cart"
    );
    Ok(())
}

/// Change a line's quantity.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an unknown line or a zero quantity.
pub fn update(storefront: &mut Storefront, line: LineId, quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1; use `cart remove`".to_string(),
        ));
    }
    ensure_line(storefront, line)?;

    storefront.cart_mut().update_quantity(line, quantity);
    if let Some(item) = storefront.cart().items().iter().find(|i| i.id == line) {
        tracing::info!(line = %line, quantity = item.quantity, "Quantity updated");
    }
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an unknown line.
pub fn remove(storefront: &mut Storefront, line: LineId) -> Result<()> {
    ensure_line(storefront, line)?;
    storefront.cart_mut().remove_item(line);
    tracing::info!(line = %line, "Removed from cart");
    Ok(())
}

pub fn clear(storefront: &mut Storefront) {
    storefront.cart_mut().clear();
    tracing::info!("Cart cleared");
}

fn ensure_line(storefront: &Storefront, line: LineId) -> Result<()> {
    if storefront.cart().items().iter().any(|i| i.id == line) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("no cart line {line}")))
    }
}
