//! Cart manager: the active cart, keyed by identity.
//!
//! The cart lives under `cart_<email>` for an identified user and
//! `cart_guest` otherwise. On every identity change the manager reloads the
//! cart wholesale from the new key. It never merges the outgoing cart into
//! the incoming one, so guest items are not carried into a login.
//!
//! Every mutation writes the full list back to the current key; [`clear`]
//! removes the key outright.
//!
//! [`clear`]: CartManager::clear

use std::sync::Arc;

use shopfront_core::{Email, LineId, Price, ProductId};

use crate::clock::Clock;
use crate::error::add_breadcrumb;
use crate::models::{Identity, LineItem, Product};
use crate::storage::{KeyValueStore, keys};

/// Quantity used when the caller has no preference.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Owner of the active shopping cart.
pub struct CartManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    items: Vec<LineItem>,
}

impl CartManager {
    /// Create a manager bound to the guest key with an empty, unloaded cart.
    ///
    /// Call [`load_for`](Self::load_for) once the identity is known.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            key: keys::GUEST_CART.to_owned(),
            items: Vec::new(),
        }
    }

    /// React to an identity change: switch to that identity's key and replace
    /// the in-memory cart with whatever is persisted there.
    ///
    /// A missing entry yields an empty cart. An unparsable entry is discarded
    /// and overwritten with an empty list.
    pub fn load_for(&mut self, identity: Option<&Identity>) {
        self.load_key(keys::cart(identity.map(|i| &i.email)));
    }

    /// Same as [`load_for`](Self::load_for), by email.
    pub fn load_for_email(&mut self, email: Option<&Email>) {
        self.load_key(keys::cart(email));
    }

    fn load_key(&mut self, key: String) {
        let items = match self.store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<LineItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding corrupt cart");
                    if let Err(e) = self.store.set(&key, "[]") {
                        tracing::warn!(key = %key, error = %e, "Failed to overwrite corrupt cart");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cart; starting empty");
                Vec::new()
            }
        };

        tracing::debug!(key = %key, items = items.len(), "Cart loaded");
        self.key = key;
        self.items = items;
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the product grows, clamped to the product's stock;
    /// otherwise a new line snapshots the product. Zero quantities and
    /// out-of-stock products are ignored.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        let ceiling = product.stock_ceiling();
        if quantity == 0 || ceiling == 0 {
            tracing::debug!(product_id = %product.id, quantity, ceiling, "Ignoring add");
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.quantity = item.quantity.saturating_add(quantity).min(ceiling);
            tracing::debug!(product_id = %product.id, quantity = item.quantity, "Cart line increased");
        } else {
            let id = self.next_line_id();
            self.items
                .push(LineItem::snapshot(id, product, quantity.min(ceiling)));
            tracing::debug!(product_id = %product.id, line_id = %id, "Cart line added");
        }

        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[("product_id", product.id.to_string().as_str())]),
        );
        self.persist();
    }

    /// Set a line's quantity, clamped to `[1, stock]` of its snapshot.
    ///
    /// Quantities below 1 and unknown line ids are ignored. A persisted line
    /// whose stock snapshot is 0 keeps a single unit.
    pub fn update_quantity(&mut self, line_id: LineId, quantity: u32) {
        if quantity < 1 {
            return;
        }

        let Some(item) = self.items.iter_mut().find(|i| i.id == line_id) else {
            tracing::debug!(line_id = %line_id, "Ignoring update for unknown line");
            return;
        };
        item.quantity = quantity.clamp(1, item.stock.max(1));
        self.persist();
    }

    /// Delete a line. Unknown ids are ignored.
    pub fn remove_item(&mut self, line_id: LineId) {
        let before = self.items.len();
        self.items.retain(|i| i.id != line_id);
        if self.items.len() == before {
            return;
        }

        add_breadcrumb(
            "cart",
            "Removed item",
            Some(&[("line_id", line_id.to_string().as_str())]),
        );
        self.persist();
    }

    /// Empty the cart and delete its storage entry.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "Failed to remove cart");
        }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Storage key of the active cart.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities. Widened so lines near `u32::MAX` cannot overflow.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `price * quantity` over the snapshotted unit prices.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    #[must_use]
    pub fn is_in_cart(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    /// Units of `product_id` in the cart, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map_or(0, |i| i.quantity)
    }

    /// Line id from the current time, bumped past any id already in the cart.
    fn next_line_id(&self) -> LineId {
        let now = self.clock.now_millis();
        let next = self
            .items
            .iter()
            .map(|i| i.id.as_i64().saturating_add(1))
            .max()
            .map_or(now, |after_last| after_last.max(now));
        LineId::new(next)
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &json) {
            tracing::error!(key = %self.key, error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    const NOW: i64 = 1_718_000_000_000;

    fn product(id: i64, stock: Option<u32>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(Decimal::new(1250, 2)),
            stock,
            image_url: Some(format!("/img/{id}.png")),
            category: Some("bazar".to_owned()),
        }
    }

    fn fixture() -> (Arc<MemoryStore>, CartManager) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at_millis(NOW));
        let mut cart = CartManager::new(store.clone(), clock);
        cart.load_for(None);
        (store, cart)
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_add_twice_merges_into_one_line() {
        let (_, mut cart) = fixture();
        let p = product(1, Some(5));

        cart.add_item(&p, 1);
        cart.add_item(&p, 1);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(p.id), 2);
    }

    #[test]
    fn test_add_never_exceeds_stock() {
        let (_, mut cart) = fixture();
        let p = product(1, Some(3));

        for q in [2, 2, 5, 1] {
            cart.add_item(&p, q);
            assert!(cart.quantity_of(p.id) <= 3);
        }
        assert_eq!(cart.quantity_of(p.id), 3);

        let mut fresh = product(2, Some(4));
        cart.add_item(&fresh, 10);
        assert_eq!(cart.quantity_of(fresh.id), 4);

        fresh.stock = None;
        cart.add_item(&fresh, 500);
        assert_eq!(cart.quantity_of(fresh.id), 99);
    }

    #[test]
    fn test_missing_stock_defaults_to_99() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, None), 150);

        let item = cart.items().first().unwrap();
        assert_eq!(item.quantity, 99);
        assert_eq!(item.stock, 99);
    }

    #[test]
    fn test_zero_quantity_and_out_of_stock_are_ignored() {
        let (store, mut cart) = fixture();
        cart.add_item(&product(1, Some(5)), 0);
        cart.add_item(&product(2, Some(0)), 1);

        assert!(cart.is_empty());
        assert_eq!(store.get("cart_guest").unwrap(), None);
    }

    #[test]
    fn test_snapshot_is_not_updated_by_later_adds() {
        let (_, mut cart) = fixture();
        let mut p = product(1, Some(5));
        cart.add_item(&p, 1);

        p.name = "Renamed".to_owned();
        p.price = Price::from_units(999);
        cart.add_item(&p, 1);

        let item = cart.items().first().unwrap();
        assert_eq!(item.name, "Product 1");
        assert_eq!(item.price, Price::new(Decimal::new(1250, 2)));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_line_ids_are_unique_within_cart() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, None), 1);
        cart.add_item(&product(2, None), 1);
        cart.add_item(&product(3, None), 1);

        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![NOW, NOW + 1, NOW + 2]);
    }

    #[test]
    fn test_update_quantity_rules() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, Some(4)), 2);
        let line = cart.items().first().unwrap().id;

        cart.update_quantity(line, 0);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 2);

        cart.update_quantity(line, 10);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 4);

        cart.update_quantity(line, 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);

        cart.update_quantity(LineId::new(42), 3);
        assert_eq!(cart.total_item_count(), 1);
    }

    #[test]
    fn test_update_keeps_one_unit_of_zero_stock_line() {
        let clock = ManualClock::at_millis(NOW);
        let mut line = LineItem::snapshot(LineId::new(5), &product(5, Some(3)), 1);
        line.stock = 0;
        let json = serde_json::to_string(&[line]).unwrap();
        let store = Arc::new(MemoryStore::with_entries([("cart_guest", json.as_str())]));
        let mut cart = CartManager::new(store, Arc::new(clock));
        cart.load_for(None);

        cart.update_quantity(LineId::new(5), 3);
        assert_eq!(cart.quantity_of(ProductId::new(5)), 1);
    }

    #[test]
    fn test_item_count_does_not_overflow() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, Some(u32::MAX)), u32::MAX);
        cart.add_item(&product(2, Some(u32::MAX)), u32::MAX);

        assert_eq!(cart.total_item_count(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_remove_item() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, None), 1);
        cart.add_item(&product(2, None), 1);
        let line = cart.items().first().unwrap().id;

        cart.remove_item(line);
        assert!(!cart.is_in_cart(ProductId::new(1)));
        assert!(cart.is_in_cart(ProductId::new(2)));

        cart.remove_item(line);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_totals() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, None), 2);
        cart.add_item(&product(2, None), 1);

        assert_eq!(cart.total_item_count(), 3);
        assert_eq!(cart.total_price(), Price::new(Decimal::new(3750, 2)));
        assert_eq!(cart.quantity_of(ProductId::new(9)), 0);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let (store, mut cart) = fixture();
        cart.add_item(&product(1, None), 2);

        let stored: Vec<LineItem> =
            serde_json::from_str(&store.get("cart_guest").unwrap().unwrap()).unwrap();
        assert_eq!(stored, cart.items());

        let line = cart.items().first().unwrap().id;
        cart.update_quantity(line, 5);
        let stored: Vec<LineItem> =
            serde_json::from_str(&store.get("cart_guest").unwrap().unwrap()).unwrap();
        assert_eq!(stored.first().unwrap().quantity, 5);

        cart.remove_item(line);
        assert_eq!(store.get("cart_guest").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_removes_key() {
        let (store, mut cart) = fixture();
        cart.add_item(&product(1, None), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(store.get("cart_guest").unwrap(), None);

        cart.load_for(None);
        assert!(cart.is_empty());
        assert_eq!(store.get("cart_guest").unwrap(), None);
    }

    #[test]
    fn test_identity_switch_does_not_merge() {
        let (_, mut cart) = fixture();
        cart.add_item(&product(1, None), 1);
        cart.add_item(&product(2, None), 1);

        let user = email("user@example.com");
        cart.load_for_email(Some(&user));

        assert_eq!(cart.key(), "cart_user@example.com");
        assert!(cart.is_empty());

        cart.load_for_email(None);
        assert_eq!(cart.items().len(), 2);
    }

    #[test]
    fn test_reload_round_trip() {
        let (store, mut cart) = fixture();
        let user = email("a@b.com");
        cart.load_for_email(Some(&user));
        cart.add_item(&product(1, Some(5)), 3);
        cart.add_item(&product(2, None), 1);
        let before = cart.items().to_vec();

        let clock = Arc::new(ManualClock::at_millis(NOW));
        let mut reloaded = CartManager::new(store, clock);
        reloaded.load_for_email(Some(&user));

        assert_eq!(reloaded.items(), before.as_slice());
    }

    #[test]
    fn test_corrupt_cart_is_discarded() {
        let store = Arc::new(MemoryStore::with_entries([("cart_guest", "{oops")]));
        let clock = Arc::new(ManualClock::at_millis(NOW));
        let mut cart = CartManager::new(store.clone(), clock);

        cart.load_for(None);

        assert!(cart.is_empty());
        assert_eq!(store.get("cart_guest").unwrap().as_deref(), Some("[]"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use proptest::prelude::*;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn cart() -> CartManager {
        let clock = Arc::new(ManualClock::at_millis(1_718_000_000_000));
        let mut cart = CartManager::new(Arc::new(MemoryStore::new()), clock);
        cart.load_for(None);
        cart
    }

    fn product(stock: Option<u32>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Product".to_owned(),
            price: Price::from_units(10),
            stock,
            image_url: None,
            category: None,
        }
    }

    proptest! {
        /// Repeated adds never push a line past the stock ceiling.
        #[test]
        fn test_adds_stay_within_stock(
            stock in proptest::option::of(0u32..200),
            quantities in prop::collection::vec(any::<u32>(), 1..20),
        ) {
            let mut cart = cart();
            let product = product(stock);
            let ceiling = product.stock_ceiling();

            for q in quantities {
                cart.add_item(&product, q);
                prop_assert!(cart.quantity_of(product.id) <= ceiling);
            }
        }

        /// Updates keep every line within `[1, stock]`.
        #[test]
        fn test_updates_stay_within_bounds(
            stock in 1u32..200,
            updates in prop::collection::vec(any::<u32>(), 1..20),
        ) {
            let mut cart = cart();
            cart.add_item(&product(Some(stock)), 1);
            let line = cart.items().first().unwrap().id;

            for q in updates {
                cart.update_quantity(line, q);
                let held = cart.quantity_of(ProductId::new(1));
                prop_assert!((1..=stock).contains(&held));
            }
        }
    }
}
