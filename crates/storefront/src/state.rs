//! The storefront context: session, cart and order history over one store.

use std::sync::Arc;

use shopfront_core::{CredentialError, OrderStatus};

use crate::cart::CartManager;
use crate::clock::Clock;
use crate::config::AccountSettings;
use crate::error::add_breadcrumb;
use crate::models::{Identity, Order};
use crate::services::accounts::AccountService;
use crate::services::orders::{CheckoutError, CheckoutForm, OrderHistory, new_order_id};
use crate::session::{SessionLogin, SessionManager};
use crate::storage::KeyValueStore;

/// Session and cart state for one browser profile.
///
/// Owns the [`SessionManager`] and [`CartManager`] and keeps them in step:
/// every identity change reloads the cart from the new identity's key.
pub struct Storefront {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    session: SessionManager,
    cart: CartManager,
}

impl Storefront {
    /// Open the context: restore the session, then load that identity's cart.
    ///
    /// The cart is never loaded before restore finishes, so a returning user
    /// does not briefly see the guest cart.
    #[must_use]
    pub fn open(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let mut session = SessionManager::new(store.clone(), clock.clone());
        session.restore();

        let mut cart = CartManager::new(store.clone(), clock.clone());
        cart.load_for(session.identity());

        Self {
            store,
            clock,
            session,
            cart,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub const fn cart(&self) -> &CartManager {
        &self.cart
    }

    /// Mutable cart access for add/update/remove/clear.
    pub const fn cart_mut(&mut self) -> &mut CartManager {
        &mut self.cart
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Log in and switch to the identity's cart.
    ///
    /// On a decode failure nothing changes, including the active cart.
    ///
    /// # Errors
    ///
    /// Returns the [`CredentialError`] if the credential cannot be decoded.
    pub fn login(&mut self, login: SessionLogin) -> Result<Identity, CredentialError> {
        let identity = self.session.login(login)?.clone();
        self.cart.load_for(Some(&identity));
        Ok(identity)
    }

    /// Log out and switch to the guest cart.
    pub fn logout(&mut self) {
        self.session.logout();
        self.cart.load_for(None);
    }

    /// Account directory over the same store and clock.
    #[must_use]
    pub fn accounts(&self, settings: AccountSettings) -> AccountService {
        AccountService::new(self.store.clone(), self.clock.clone(), settings)
    }

    /// Order history of the current identity, newest first. Empty when
    /// anonymous.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.identity().map_or_else(Vec::new, |identity| {
            OrderHistory::new(self.store.clone()).list(&identity.email)
        })
    }

    /// Place an order for the current cart and empty it.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotAuthenticated` when logged out,
    /// `CheckoutError::EmptyCart` for an empty cart, `CheckoutError::Invalid`
    /// with the failing fields, or a storage error from the history. The cart
    /// is only cleared once the order is recorded.
    pub fn checkout(&mut self, form: &CheckoutForm) -> Result<Order, CheckoutError> {
        if !self.session.is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }
        let identity = self.session.identity().ok_or(CheckoutError::NotAuthenticated)?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        form.validate().map_err(CheckoutError::Invalid)?;

        let now = self.clock.now();
        let subtotal = self.cart.total_price();
        let shipping_price = form.shipping_method.price();
        let order = Order {
            id: new_order_id(now.timestamp_millis()),
            user_id: identity.email.clone(),
            items: self.cart.items().to_vec(),
            subtotal,
            shipping_price,
            total: subtotal + shipping_price,
            customer_info: form.customer.clone(),
            payment_method: form.payment_method,
            shipping_method: form.shipping_method,
            status: OrderStatus::Confirmed,
            created_at: now,
        };

        OrderHistory::new(self.store.clone()).append(&order)?;
        add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order.id.as_str())]));
        self.cart.clear();

        Ok(order)
    }
}
