//! Session middleware configuration.
//!
//! Production sessions are `PostgreSQL`-backed via tower-sessions; tests pass
//! an in-memory store instead. The session cookie is signed with the
//! configured session secret.

use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "souk_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session layer type used by the storefront router.
pub type StorefrontSessionLayer<S> = SessionManagerLayer<S, SignedCookie>;

/// Create the session layer over `store`.
///
/// The cookie is marked `Secure` when the storefront is served over HTTPS.
///
/// # Errors
///
/// Returns an error if the session secret cannot be turned into a signing key.
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> Result<StorefrontSessionLayer<S>, ConfigError> {
    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(config.session_key()?))
}
