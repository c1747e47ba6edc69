//! Content Security Policy for storefront pages.
//!
//! Every request gets a fresh nonce. `base.html` stamps it on the HTMX
//! `<script>` tag, and the policy only runs scripts that carry it or come
//! from the pinned HTMX build.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Pinned HTMX build, the only third-party script the storefront loads.
pub const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4/dist/htmx.min.js";

/// Per-request script nonce (128-bit, base64).
///
/// Handlers take it as an extractor and hand the string to [`crate::components::Layout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// The `Content-Security-Policy` value for a page rendered with this nonce.
    ///
    /// ```text
    /// default-src 'none';
    /// script-src 'self' 'nonce-…' <HTMX_SRC>;
    /// style-src 'self';
    /// img-src 'self' https: data:;
    /// connect-src 'self';
    /// form-action 'self';
    /// base-uri 'self';
    /// frame-ancestors 'none';
    /// object-src 'none'
    /// ```
    #[must_use]
    pub fn policy(&self) -> String {
        format!(
            "default-src 'none'; \
             script-src 'self' 'nonce-{}' {HTMX_SRC}; \
             style-src 'self'; \
             img-src 'self' https: data:; \
             connect-src 'self'; \
             form-action 'self'; \
             base-uri 'self'; \
             frame-ancestors 'none'; \
             object-src 'none'",
            self.0
        )
    }
}

/// Reads the nonce that `security_headers_middleware` put on the request.
///
/// A page rendered without it would have its scripts blocked, so a missing
/// nonce is a server error rather than an empty attribute.
impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            tracing::error!(uri = %parts.uri, "No CSP nonce on request");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}
