//! Authentication route handlers.
//!
//! Email and password login backed by [`crate::services::AuthService`].
//! Failed attempts re-render the form with the visitor's input and a French
//! message; the auth rate limiter sits in front of the POST routes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use souk_core::ShopperAction;
use tracing::instrument;

use crate::components::Layout;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CspNonce, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::routes::safe_return_path;
use crate::services::{AuthError, ShopperSession};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub return_to: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub return_to: Option<String>,
}

/// Where to go after authenticating.
#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    pub return_to: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
    pub return_to: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
    pub return_to: String,
}

/// Status for a failed attempt; store and hashing failures are server errors.
fn failure_status(error: &AuthError) -> StatusCode {
    match error {
        AuthError::Repository(_) | AuthError::PasswordHash => {
            let event_id = sentry::capture_error(error);
            tracing::error!(error = %error, sentry_event_id = %event_id, "Authentication failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => {
            tracing::info!(error = %error, "Authentication rejected");
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

/// Put the user in the session and the Sentry scope, then redirect.
///
/// The session's delivery address is replaced by the user's own saved one,
/// so nothing entered under a previous account carries over.
async fn sign_in(
    state: &AppState,
    shopper: &ShopperSession,
    user: &User,
    return_to: &str,
) -> Result<Response> {
    let current = CurrentUser::from(user);
    set_current_user(shopper.session(), &current).await?;
    set_sentry_user(&current.id);

    let saved = state
        .address_service()
        .saved(user.id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load saved address at login");
            None
        });
    let action = saved.map_or(
        ShopperAction::ClearDeliveryAddress,
        ShopperAction::SetDeliveryAddress,
    );
    shopper.dispatch(action).await?;

    Ok(Redirect::to(return_to).into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(shopper, nonce))]
pub async fn login_page(
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    Query(query): Query<ReturnQuery>,
) -> Result<LoginTemplate> {
    let shopper_state = shopper.state().await?;
    let user = shopper.current_user().await?;
    Ok(LoginTemplate {
        layout: Layout::new(nonce, &shopper_state, user.as_ref()),
        email: String::new(),
        error: None,
        return_to: safe_return_path(query.return_to.as_deref(), "/").to_owned(),
    })
}

/// Handle login form submission.
#[instrument(skip(state, shopper, nonce, form))]
pub async fn login(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let return_to = safe_return_path(form.return_to.as_deref(), "/").to_owned();

    match state
        .auth_service()
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User logged in");
            sign_in(&state, &shopper, &user, &return_to).await
        }
        Err(e) => {
            let status = failure_status(&e);
            let shopper_state = shopper.state().await?;
            Ok((
                status,
                LoginTemplate {
                    layout: Layout::new(nonce, &shopper_state, None),
                    email: form.email,
                    error: Some(e.user_message()),
                    return_to,
                },
            )
                .into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(shopper, nonce))]
pub async fn register_page(
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    Query(query): Query<ReturnQuery>,
) -> Result<RegisterTemplate> {
    let shopper_state = shopper.state().await?;
    let user = shopper.current_user().await?;
    Ok(RegisterTemplate {
        layout: Layout::new(nonce, &shopper_state, user.as_ref()),
        email: String::new(),
        error: None,
        return_to: safe_return_path(query.return_to.as_deref(), "/").to_owned(),
    })
}

/// Handle registration form submission.
///
/// A successful registration logs the new user in straight away.
#[instrument(skip(state, shopper, nonce, form))]
pub async fn register(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let return_to = safe_return_path(form.return_to.as_deref(), "/").to_owned();

    let result = if form.password == form.password_confirm {
        state
            .auth_service()
            .register_with_password(&form.email, &form.password)
            .await
            .map_err(|e| (failure_status(&e), e.user_message()))
    } else {
        Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Les mots de passe ne correspondent pas.".to_owned(),
        ))
    };

    match result {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User registered");
            sign_in(&state, &shopper, &user, &return_to).await
        }
        Err((status, message)) => {
            let shopper_state = shopper.state().await?;
            Ok((
                status,
                RegisterTemplate {
                    layout: Layout::new(nonce, &shopper_state, None),
                    email: form.email,
                    error: Some(message),
                    return_to,
                },
            )
                .into_response())
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// The cart, wishlist and recently viewed list survive. The identity and
/// the delivery address are dropped.
#[instrument(skip(shopper))]
pub async fn logout(shopper: ShopperSession) -> Result<Redirect> {
    clear_current_user(shopper.session()).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
