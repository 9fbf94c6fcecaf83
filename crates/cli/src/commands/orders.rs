//! Checkout and order history commands.

use secrecy::SecretString;

use shopfront_core::{PaymentMethod, ShippingMethod};
use shopfront_storefront::Storefront;
use shopfront_storefront::error::{AppError, Result};
use shopfront_storefront::services::orders::CheckoutForm;

/// Checkout fields as given on the command line.
pub struct CheckoutInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub card_name: String,
}

/// Place an order for the current cart.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when logged out, or `AppError::Checkout`
/// if the cart is empty, a field is missing, or the history cannot be written.
pub fn checkout(storefront: &mut Storefront, input: impl Into<CheckoutInput>) -> Result<()> {
    let input = input.into();
    let identity = storefront
        .identity()
        .ok_or_else(|| AppError::Unauthorized("log in to check out".to_string()))?;

    let mut form = CheckoutForm::for_identity(identity);
    if let Some(first_name) = input.first_name {
        form.customer.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        form.customer.last_name = last_name;
    }
    if let Some(email) = input.email {
        form.customer.email = email;
    }
    form.customer.phone = input.phone;
    form.customer.address = input.address;
    form.customer.city = input.city;
    form.customer.postal_code = input.postal_code;
    form.customer.province = input.province;
    form.payment_method = input.payment_method;
    form.shipping_method = input.shipping_method;
    form.card_number = SecretString::from(input.card_number);
    form.expiry_date = input.expiry_date;
    form.cvv = SecretString::from(input.cvv);
    form.card_name = input.card_name;

    let order = storefront.checkout(&form)?;
    tracing::info!(
        order = %order.id,
        items = order.item_count(),
        subtotal = %order.subtotal,
        shipping = %order.shipping_price,
        total = %order.total,
        delivery = order.shipping_method.delivery_time(),
        "Order confirmed"
    );
    Ok(())
}

/// List the current identity's orders.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when logged out.
pub fn list(storefront: &Storefront) -> Result<()> {
    if storefront.identity().is_none() {
        return Err(AppError::Unauthorized("log in to see your orders".to_string()));
    }

    let orders = storefront.orders();
    if orders.is_empty() {
        tracing::info!("No orders yet");
    }
    for order in orders {
        tracing::info!(
            order = %order.id,
            placed = %order.created_at.format("%Y-%m-%d %H:%M"),
            status = order.status.label(),
            payment = order.payment_method.label(),
            items = order.item_count(),
            total = %order.total,
            "Order"
        );
    }
    Ok(())
}
