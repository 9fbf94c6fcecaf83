//! Account commands: register, login, logout, whoami.

use shopfront_core::Role;
use shopfront_storefront::Storefront;
use shopfront_storefront::config::ShopfrontConfig;
use shopfront_storefront::error::Result;
use shopfront_storefront::services::accounts::{AuthResponse, RegisterRequest};

/// Register a new account and log it in.
///
/// # Errors
///
/// Returns `AppError::Auth` if the directory rejects the registration.
pub async fn register(
    storefront: &mut Storefront,
    config: &ShopfrontConfig,
    request: RegisterRequest,
) -> Result<()> {
    let accounts = storefront.accounts(config.accounts.clone());
    let response = accounts.register(request).await?;
    establish(storefront, response)
}

/// Log in with email and password.
///
/// # Errors
///
/// Returns `AppError::Auth` for unknown accounts or a wrong password.
pub async fn login(
    storefront: &mut Storefront,
    config: &ShopfrontConfig,
    email: &str,
    password: &str,
) -> Result<()> {
    let accounts = storefront.accounts(config.accounts.clone());
    let response = accounts.login(email, password).await?;
    establish(storefront, response)
}

fn establish(storefront: &mut Storefront, response: AuthResponse) -> Result<()> {
    let identity = storefront.login(response.into())?;
    tracing::info!(
        id = %identity.id,
        email = %identity.email,
        name = %identity.full_name(),
        cart_items = storefront.cart().total_item_count(),
        "Welcome"
    );
    Ok(())
}

pub fn logout(storefront: &mut Storefront) {
    if storefront.identity().is_none() {
        tracing::info!("Not logged in");
    }
    storefront.logout();
}

pub fn whoami(storefront: &Storefront) {
    match storefront.identity() {
        Some(identity) => {
            let roles: Vec<_> = identity.roles.iter().map(Role::as_str).collect();
            tracing::info!(
                id = %identity.id,
                email = %identity.email,
                name = %identity.full_name(),
                roles = %roles.join(","),
                "Logged in"
            );
        }
        None => tracing::info!("Browsing as guest"),
    }
}
