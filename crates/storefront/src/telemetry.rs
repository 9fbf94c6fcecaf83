//! Tracing and Sentry initialization for binaries embedding the storefront.

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, ShopfrontConfig};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "shopfront_storefront=info,shopfront_cli=info";

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured; Sentry calls elsewhere are then
/// no-ops. Runs before any subscriber exists, so it does not log; call
/// [`log_sentry_status`] once [`init_tracing`] has run.
#[must_use]
pub fn init_sentry(config: &ShopfrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Report whether Sentry is active. Needs the subscriber from [`init_tracing`].
pub fn log_sentry_status(enabled: bool, config: &ShopfrontConfig) {
    if enabled {
        tracing::info!(
            environment = config.sentry_environment.as_deref().unwrap_or("default"),
            "Sentry initialized"
        );
    } else {
        tracing::debug!("Sentry disabled; no DSN configured");
    }
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber.
///
/// Uses `RUST_LOG` when set, otherwise [`DEFAULT_LOG_FILTER`]. Warnings and
/// errors are forwarded to Sentry as events, info and debug as breadcrumbs.
pub fn init_tracing(config: &ShopfrontConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match config.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
