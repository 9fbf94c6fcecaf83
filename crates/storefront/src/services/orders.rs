//! Checkout form validation and per-identity order history.
//!
//! Orders are appended to `orders_<email>` as a JSON array. The history is
//! append-only; nothing in the storefront edits a placed order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use shopfront_core::{Email, PaymentMethod, ShippingMethod};

use crate::models::{CustomerInfo, Identity, Order};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Length of the random suffix in generated order IDs.
const ORDER_SUFFIX_LEN: usize = 9;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requires a logged-in identity.
    #[error("log in to check out")]
    NotAuthenticated,

    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more form fields are missing.
    #[error("invalid checkout form: {0}")]
    Invalid(ValidationErrors),

    /// The existing order history could not be parsed.
    #[error("order history is corrupt: {0}")]
    CorruptHistory(serde_json::Error),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Field name to message, keyed by the form's camelCase field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message for one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Names of every failing field, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    fn require(&mut self, field: &'static str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.0.insert(field, format!("{label} is required"));
        }
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.fields().collect();
        write!(f, "missing {}", fields.join(", "))
    }
}

/// Checkout form.
///
/// Card fields are only inspected when the payment method takes a card.
#[derive(Debug)]
pub struct CheckoutForm {
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    pub card_number: SecretString,
    pub expiry_date: String,
    pub cvv: SecretString,
    pub card_name: String,
}

impl CheckoutForm {
    /// A blank form with name and email pre-filled from `identity`, paying by
    /// credit card with standard shipping.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            customer: CustomerInfo {
                first_name: identity.name.clone(),
                last_name: identity.surname.clone(),
                email: identity.email.to_string(),
                phone: String::new(),
                address: String::new(),
                city: String::new(),
                postal_code: String::new(),
                province: String::new(),
            },
            payment_method: PaymentMethod::CreditCard,
            shipping_method: ShippingMethod::Standard,
            card_number: SecretString::from(String::new()),
            expiry_date: String::new(),
            cvv: SecretString::from(String::new()),
            card_name: String::new(),
        }
    }

    /// Check the shipping contact only.
    ///
    /// # Errors
    ///
    /// Returns the map of blank required fields.
    pub fn validate_customer(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        self.check_customer(&mut errors);
        errors.into_result()
    }

    /// Check every required field.
    ///
    /// # Errors
    ///
    /// Returns the map of blank required fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        self.check_customer(&mut errors);

        if self.payment_method.requires_card_details() {
            errors.require("cardNumber", self.card_number.expose_secret(), "Card number");
            errors.require("expiryDate", &self.expiry_date, "Expiry date");
            errors.require("cvv", self.cvv.expose_secret(), "CVV");
            errors.require("cardName", &self.card_name, "Name on card");
        }

        errors.into_result()
    }

    fn check_customer(&self, errors: &mut ValidationErrors) {
        let c = &self.customer;
        errors.require("firstName", &c.first_name, "First name");
        errors.require("lastName", &c.last_name, "Last name");
        errors.require("email", &c.email, "Email");
        errors.require("phone", &c.phone, "Phone");
        errors.require("address", &c.address, "Address");
        errors.require("city", &c.city, "City");
        errors.require("postalCode", &c.postal_code, "Postal code");
        errors.require("province", &c.province, "Province");
    }
}

/// Generate an order ID of the form `ORD-<epoch millis>-<9 base36 chars>`.
#[must_use]
pub fn new_order_id(now_millis: i64) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("ORD-{now_millis}-{suffix}")
}

/// Per-identity order history.
pub struct OrderHistory {
    store: Arc<dyn KeyValueStore>,
}

impl OrderHistory {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Orders placed by `email`, newest first.
    ///
    /// Unreadable or unparsable history is logged and reported as empty.
    #[must_use]
    pub fn list(&self, email: &Email) -> Vec<Order> {
        let mut orders = match self.read(email) {
            Ok(orders) => orders,
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "Ignoring unreadable order history");
                return Vec::new();
            }
        };

        // Reverse first so orders sharing a timestamp stay newest-appended first.
        orders.reverse();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Append an order to its owner's history.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::CorruptHistory` rather than overwrite history
    /// that cannot be parsed, or `CheckoutError::Storage` if the write fails.
    pub fn append(&self, order: &Order) -> Result<(), CheckoutError> {
        let mut orders = self.read(&order.user_id)?;
        orders.push(order.clone());

        let json = serde_json::to_string(&orders).map_err(CheckoutError::CorruptHistory)?;
        self.store.set(&keys::orders(&order.user_id), &json)?;

        tracing::info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(())
    }

    fn read(&self, email: &Email) -> Result<Vec<Order>, CheckoutError> {
        match self.store.get(&keys::orders(email))? {
            Some(raw) => serde_json::from_str(&raw).map_err(CheckoutError::CorruptHistory),
            None => Ok(Vec::new()),
        }
    }
}
