//! Mock account directory.
//!
//! Stands in for the storefront's authentication backend. Accounts live as a
//! JSON array under `ecommerce_users` in the same key/value store as the
//! session, and every call re-reads that array so the store stays the single
//! source of truth.
//!
//! Successful logins and registrations return an [`AuthResponse`] carrying a
//! freshly issued credential. The caller hands that to
//! [`Storefront::login`](crate::Storefront::login); the directory itself never
//! touches session state.
//!
//! Issued credentials are unsigned: anyone can forge one. This is a demo
//! directory, not an authentication system.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use shopfront_core::{Credential, CredentialClaims, Email, UserId};

use crate::clock::Clock;
use crate::config::AccountSettings;
use crate::models::Account;
use crate::session::SessionLogin;
use crate::storage::{KeyValueStore, keys};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Role assigned to self-registered accounts.
const DEFAULT_ROLE: &str = "user";

/// Registration form.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub dni: String,
}

/// Result of a successful login or registration.
#[derive(Debug)]
pub struct AuthResponse {
    pub credential: Credential,
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: Email,
    pub username: String,
    /// Only echoed back on registration.
    pub dni: Option<String>,
    pub role: String,
}

impl From<AuthResponse> for SessionLogin {
    fn from(response: AuthResponse) -> Self {
        let login = Self::new(response.credential, response.name)
            .with_surname(response.surname)
            .with_email(response.email.into_inner());
        match response.dni {
            Some(dni) if !dni.is_empty() => login.with_national_id(dni),
            _ => login,
        }
    }
}

/// Account directory service.
pub struct AccountService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    settings: AccountSettings,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no active account matches.
    /// Returns `AuthError::Storage` or `AuthError::CorruptDirectory` if the
    /// directory cannot be read.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        tokio::time::sleep(self.settings.login_latency).await;

        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let accounts = self.load()?;
        let account = accounts
            .iter()
            .find(|a| a.email == email && a.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        tracing::info!(user_id = %account.id, "Account logged in");
        self.respond(account, None)
    }

    /// Register a new account and log it in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        tokio::time::sleep(self.settings.register_latency).await;

        // Validate email
        let email = Email::parse(&request.email)?;

        let mut accounts = self.load()?;
        if accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::UserAlreadyExists);
        }

        // Validate password
        validate_password(&request.password)?;

        // Hash password
        let password_hash = hash_password(&request.password)?;

        let next_id = accounts.iter().map(|a| a.id.as_i64()).max().unwrap_or(0) + 1;
        let account = Account {
            id: UserId::new(next_id),
            username: email.local_part().to_owned(),
            email,
            password_hash,
            first_name: request.name,
            last_name: request.surname,
            dni: request.dni,
            role: DEFAULT_ROLE.to_owned(),
            created_at: self.clock.now(),
            is_active: true,
        };

        let dni = Some(account.dni.clone());
        let response = self.respond(&account, dni)?;
        accounts.push(account);
        self.save(&accounts)?;

        tracing::info!(user_id = %response.id, "Account registered");
        Ok(response)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Decode a credential if it is well-formed and not yet past `exp`.
    ///
    /// A credential whose `exp` equals the current instant still verifies
    /// here, while session restore already treats it as expired.
    #[must_use]
    pub fn verify_token(&self, token: &str) -> Option<CredentialClaims> {
        let claims = Credential::new(token).decode().ok()?;
        (claims.exp >= self.clock.now_millis()).then_some(claims)
    }

    /// Find an active account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no active account has this ID.
    pub fn user_by_id(&self, id: UserId) -> Result<Account, AuthError> {
        self.load()?
            .into_iter()
            .find(|a| a.id == id && a.is_active)
            .ok_or(AuthError::UserNotFound)
    }

    /// All active accounts, in registration order.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the directory cannot be read.
    pub fn active_users(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.load()?.into_iter().filter(|a| a.is_active).collect())
    }

    fn respond(&self, account: &Account, dni: Option<String>) -> Result<AuthResponse, AuthError> {
        let exp = (self.clock.now() + self.settings.token_ttl).timestamp_millis();
        let credential = Credential::issue(&CredentialClaims {
            id: account.id,
            email: account.email.clone(),
            role: Some(account.role.clone()),
            exp,
        })?;

        Ok(AuthResponse {
            credential,
            id: account.id,
            name: account.first_name.clone(),
            surname: account.last_name.clone(),
            email: account.email.clone(),
            username: account.username.clone(),
            dni,
            role: account.role.clone(),
        })
    }

    fn load(&self) -> Result<Vec<Account>, AuthError> {
        match self.store.get(keys::ACCOUNTS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(AuthError::CorruptDirectory),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, accounts: &[Account]) -> Result<(), AuthError> {
        let json = serde_json::to_string(accounts).map_err(AuthError::CorruptDirectory)?;
        self.store.set(keys::ACCOUNTS, &json)?;
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    const NOW: i64 = 1_718_000_000_000;

    fn fixture() -> (Arc<MemoryStore>, Arc<ManualClock>, AccountService) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::at_millis(NOW));
        let service = AccountService::new(store.clone(), clock.clone(), AccountSettings::instant());
        (store, clock, service)
    }

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_owned(),
            password: "correct horse".to_owned(),
            name: "Ana".to_owned(),
            surname: "García".to_owned(),
            dni: "30111222".to_owned(),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly8").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_assigns_next_id_and_persists() {
        let (store, _, service) = fixture();

        let first = service.register(request("ana@example.com")).await.unwrap();
        let second = service.register(request("bob@example.com")).await.unwrap();

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
        assert_eq!(second.username, "bob");
        assert_eq!(second.role, "user");
        assert_eq!(second.dni.as_deref(), Some("30111222"));

        let raw = store.get(keys::ACCOUNTS).unwrap().unwrap();
        assert!(!raw.contains("correct horse"));
        let accounts: Vec<Account> = serde_json::from_str(&raw).unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let (_, _, service) = fixture();
        service.register(request("ana@example.com")).await.unwrap();

        let err = service.register(request("ana@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (store, _, service) = fixture();

        let err = service.register(request("not-an-email")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));

        let mut weak = request("ana@example.com");
        weak.password = "1234".to_owned();
        let err = service.register(weak).await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));

        assert_eq!(store.get(keys::ACCOUNTS).unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_issues_credential() {
        let (_, _, service) = fixture();
        service.register(request("ana@example.com")).await.unwrap();

        let response = service.login("ana@example.com", "correct horse").await.unwrap();
        let claims = response.credential.decode().unwrap();

        assert_eq!(claims.id, response.id);
        assert_eq!(claims.email.as_str(), "ana@example.com");
        assert_eq!(claims.role.as_deref(), Some("user"));
        assert_eq!(claims.exp, NOW + TimeDelta::hours(24).num_milliseconds());
        assert_eq!(response.dni, None);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (_, _, service) = fixture();
        service.register(request("ana@example.com")).await.unwrap();

        for (email, password) in [
            ("ana@example.com", "wrong password"),
            ("nobody@example.com", "correct horse"),
            ("garbage", "correct horse"),
        ] {
            let err = service.login(email, password).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials), "{email}");
        }
    }

    #[tokio::test]
    async fn test_inactive_accounts_are_hidden() {
        let (store, _, service) = fixture();
        service.register(request("ana@example.com")).await.unwrap();
        service.register(request("bob@example.com")).await.unwrap();

        let mut accounts = service.active_users().unwrap();
        accounts[0].is_active = false;
        store
            .set(keys::ACCOUNTS, &serde_json::to_string(&accounts).unwrap())
            .unwrap();

        assert_eq!(service.active_users().unwrap().len(), 1);
        assert!(matches!(
            service.user_by_id(UserId::new(1)),
            Err(AuthError::UserNotFound)
        ));
        assert_eq!(service.user_by_id(UserId::new(2)).unwrap().username, "bob");
        assert!(matches!(
            service.login("ana@example.com", "correct horse").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_verify_token() {
        let (_, clock, service) = fixture();
        let response = service.register(request("ana@example.com")).await.unwrap();
        let token = response.credential.expose().to_owned();

        assert!(service.verify_token(&token).is_some());
        assert!(service.verify_token("%%%").is_none());

        clock.advance(TimeDelta::hours(24));
        assert!(service.verify_token(&token).is_some());

        clock.advance(TimeDelta::milliseconds(1));
        assert!(service.verify_token(&token).is_none());
    }

    #[test]
    fn test_corrupt_directory() {
        let store = Arc::new(MemoryStore::with_entries([(keys::ACCOUNTS, "{")]));
        let clock = Arc::new(ManualClock::at_millis(NOW));
        let service = AccountService::new(store, clock, AccountSettings::instant());

        assert!(matches!(
            service.active_users(),
            Err(AuthError::CorruptDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_response_converts_to_session_login() {
        let (_, _, service) = fixture();
        let response = service.register(request("ana@example.com")).await.unwrap();

        let login = SessionLogin::from(response);
        assert_eq!(login.display_name, "Ana");
        assert_eq!(login.surname.as_deref(), Some("García"));
        assert_eq!(login.email.as_deref(), Some("ana@example.com"));
        assert_eq!(login.national_id.as_deref(), Some("30111222"));
    }
}
