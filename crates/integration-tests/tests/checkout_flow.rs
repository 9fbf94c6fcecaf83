//! Account registration through checkout and order history.

#![allow(clippy::unwrap_used)]

use chrono::TimeDelta;
use secrecy::SecretString;

use shopfront_core::{OrderStatus, PaymentMethod, Price, ShippingMethod};
use shopfront_storefront::config::AccountSettings;
use shopfront_storefront::services::accounts::{AuthError, RegisterRequest};
use shopfront_storefront::services::orders::{CheckoutError, CheckoutForm};
use shopfront_storefront::storage::KeyValueStore;
use shopfront_storefront::session::SessionLogin;
use shopfront_integration_tests::{DAY_MS, NOW, TestContext, credential, product};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_owned(),
        password: "hunter2hunter2".to_owned(),
        name: "Lucía".to_owned(),
        surname: "Pérez".to_owned(),
        dni: "28999111".to_owned(),
    }
}

fn complete_form(ctx: &TestContext) -> CheckoutForm {
    let mut form = CheckoutForm::for_identity(ctx.storefront.identity().unwrap());
    form.customer.phone = "+54 341 555 0101".to_owned();
    form.customer.address = "Bv. Oroño 900".to_owned();
    form.customer.city = "Rosario".to_owned();
    form.customer.postal_code = "S2000".to_owned();
    form.customer.province = "Santa Fe".to_owned();
    form.card_number = SecretString::from("4509953566233704".to_owned());
    form.expiry_date = "11/29".to_owned();
    form.cvv = SecretString::from("123".to_owned());
    form.card_name = "LUCIA PEREZ".to_owned();
    form
}

#[tokio::test]
async fn test_register_login_checkout_orders() {
    let mut ctx = TestContext::new();
    let accounts = ctx.storefront.accounts(AccountSettings::instant());

    let response = accounts.register(register_request("lucia@example.com")).await.unwrap();
    ctx.storefront.login(response.into()).unwrap();
    ctx.storefront.logout();

    let response = accounts
        .login("lucia@example.com", "hunter2hunter2")
        .await
        .unwrap();
    let identity = ctx.storefront.login(response.into()).unwrap();
    assert_eq!(identity.full_name(), "Lucía Pérez");

    ctx.storefront.cart_mut().add_item(&product(1, 150_000, Some(2)), 1);
    ctx.storefront.cart_mut().add_item(&product(2, 2_550, None), 4);

    let mut form = complete_form(&ctx);
    form.shipping_method = ShippingMethod::SameDay;
    let order = ctx.storefront.checkout(&form).unwrap();

    assert_eq!(order.subtotal, Price::from_units(1602));
    assert_eq!(order.total, Price::from_units(2802));
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.customer_info.email, "lucia@example.com");
    assert!(ctx.storefront.cart().is_empty());

    let orders = ctx.storefront.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, order.id);
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let ctx = TestContext::new();
    let accounts = ctx.storefront.accounts(AccountSettings::instant());

    accounts.register(register_request("dup@example.com")).await.unwrap();
    let err = accounts
        .register(register_request("dup@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UserAlreadyExists));
    assert_eq!(accounts.active_users().unwrap().len(), 1);
}

#[test]
fn test_orders_are_listed_newest_first_per_identity() {
    let mut ctx = TestContext::new();
    let login = |email: &str| {
        SessionLogin::new(credential(1, email, None, NOW + DAY_MS), "Buyer")
            .with_surname("Gómez")
    };

    ctx.storefront.login(login("first@example.com")).unwrap();
    let mut placed = Vec::new();
    for id in 1..=3 {
        ctx.storefront.cart_mut().add_item(&product(id, 1000, None), 1);
        let mut form = complete_form(&ctx);
        form.payment_method = PaymentMethod::Transfer;
        placed.push(ctx.storefront.checkout(&form).unwrap().id);
        ctx.clock.advance(TimeDelta::minutes(5));
    }

    let listed: Vec<_> = ctx.storefront.orders().into_iter().map(|o| o.id).collect();
    placed.reverse();
    assert_eq!(listed, placed);

    ctx.storefront.login(login("second@example.com")).unwrap();
    assert!(ctx.storefront.orders().is_empty());
}

#[test]
fn test_failed_checkout_changes_nothing() {
    let mut ctx = TestContext::new();
    let login = SessionLogin::new(credential(1, "buyer@example.com", None, NOW + DAY_MS), "Buyer")
        .with_surname("Gómez");
    ctx.storefront.login(login).unwrap();
    ctx.storefront.cart_mut().add_item(&product(1, 1000, None), 2);

    let mut form = complete_form(&ctx);
    form.customer.province = String::new();
    form.cvv = SecretString::from(String::new());

    let Err(CheckoutError::Invalid(errors)) = ctx.storefront.checkout(&form) else {
        panic!("expected validation failure");
    };
    let fields: Vec<_> = errors.fields().collect();
    assert_eq!(fields, vec!["cvv", "province"]);

    assert_eq!(ctx.storefront.cart().total_item_count(), 2);
    assert_eq!(ctx.store.get("orders_buyer@example.com").unwrap(), None);
}

#[test]
fn test_checkout_without_surname_asks_for_last_name() {
    let mut ctx = TestContext::new();
    ctx.storefront
        .login(SessionLogin::new(
            credential(1, "buyer@example.com", None, NOW + DAY_MS),
            "Buyer",
        ))
        .unwrap();
    ctx.storefront.cart_mut().add_item(&product(1, 1000, None), 1);

    let mut form = complete_form(&ctx);
    let Err(CheckoutError::Invalid(errors)) = ctx.storefront.checkout(&form) else {
        panic!("expected validation failure");
    };
    assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["lastName"]);

    form.customer.last_name = "Gómez".to_owned();
    let order = ctx.storefront.checkout(&form).unwrap();
    assert_eq!(order.customer_info.last_name, "Gómez");
}
