//! Delivery address route handlers.
//!
//! The form being edited is kept in the session as an
//! [`AddressFormState`] draft so that per-field HTMX edits, submits and
//! clears all see the same input and errors. Anyone may fill the form in;
//! saving requires a logged-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use souk_core::{
    AddressField, AddressForm, AddressFormState, Governorate, ShopperAction, ShopperState,
};

use crate::components::Layout;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::CurrentUser;
use crate::routes::{is_htmx, safe_return_path};
use crate::services::{AddressSubmitError, ShopperSession};
use crate::state::AppState;

/// Where the form returns to when the caller does not say.
const DEFAULT_RETURN: &str = "/account/address";

// =============================================================================
// Form Types
// =============================================================================

/// Where to go once the address is saved or the form is closed.
#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    pub return_to: Option<String>,
}

/// Full form submission.
#[derive(Debug, Deserialize)]
pub struct AddressSubmitForm {
    #[serde(flatten)]
    pub input: AddressForm,
    pub return_to: Option<String>,
}

/// A single field edit (HTMX).
///
/// The edited input posts under its own name next to `field`.
#[derive(Debug, Deserialize)]
pub struct FieldEditForm {
    pub field: AddressField,
    #[serde(flatten)]
    pub input: AddressForm,
    pub return_to: Option<String>,
}

// =============================================================================
// View Types
// =============================================================================

/// One input with its current value and error.
#[derive(Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub error: Option<String>,
}

/// A governorate choice in the region select.
#[derive(Clone)]
pub struct RegionOption {
    pub name: &'static str,
    pub selected: bool,
}

/// Everything the address form renders.
#[derive(Clone)]
pub struct AddressFormView {
    pub street: FieldView,
    pub address2: FieldView,
    pub city: FieldView,
    pub region: FieldView,
    pub postal_code: FieldView,
    pub country: FieldView,
    pub instructions: FieldView,
    pub regions: Vec<RegionOption>,
    /// Form-level message (not logged in, save in progress, save failed).
    pub message: Option<String>,
    pub return_to: String,
    /// The address currently on file, on one line.
    pub saved_summary: Option<String>,
    pub logged_in: bool,
}

impl AddressFormView {
    fn new(
        draft: &AddressFormState,
        shopper: &ShopperState,
        user: Option<&CurrentUser>,
        message: Option<String>,
        return_to: String,
    ) -> Self {
        let field = |field: AddressField| FieldView {
            name: field.as_str(),
            label: field_label(field),
            value: draft.form.value(field).to_owned(),
            error: draft.error(field).map(|e| e.to_string()),
        };

        Self {
            street: field(AddressField::Street),
            address2: field(AddressField::Address2),
            city: field(AddressField::City),
            region: field(AddressField::Region),
            postal_code: field(AddressField::PostalCode),
            country: field(AddressField::Country),
            instructions: field(AddressField::Instructions),
            regions: Governorate::ALL
                .iter()
                .map(|g| RegionOption {
                    name: g.name(),
                    selected: g.name() == draft.form.region,
                })
                .collect(),
            message,
            return_to,
            saved_summary: shopper.delivery_address.as_ref().map(|a| a.single_line()),
            logged_in: user.is_some(),
        }
    }

    /// The free-text inputs rendered with the same markup.
    #[must_use]
    pub const fn text_fields(&self) -> [&FieldView; 3] {
        [&self.street, &self.address2, &self.city]
    }
}

const fn field_label(field: AddressField) -> &'static str {
    match field {
        AddressField::Street => "Adresse",
        AddressField::Address2 => "Appartement, étage, bâtiment",
        AddressField::City => "Ville",
        AddressField::Region => "Gouvernorat",
        AddressField::PostalCode => "Code postal",
        AddressField::Country => "Pays",
        AddressField::Instructions => "Instructions de livraison",
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Address page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/address.html")]
pub struct AddressPageTemplate {
    pub layout: Layout,
    pub form: AddressFormView,
}

/// Address form fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/address_form.html")]
pub struct AddressFormTemplate {
    pub form: AddressFormView,
}

// =============================================================================
// Helpers
// =============================================================================

/// The draft to show: the session's, else the saved address, else blank.
///
/// A store failure while pre-filling falls back to a blank form.
async fn current_draft(
    state: &AppState,
    shopper: &ShopperSession,
    shopper_state: &ShopperState,
    user: Option<&CurrentUser>,
) -> Result<AddressFormState> {
    if let Some(draft) = shopper.address_draft().await? {
        return Ok(draft);
    }
    if let Some(address) = &shopper_state.delivery_address {
        return Ok(AddressFormState::from_saved(address));
    }
    if let Some(user) = user {
        match state.address_service().saved(user.id).await {
            Ok(Some(address)) => return Ok(AddressFormState::from_saved(&address)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Could not load saved address for prefill"),
        }
    }
    Ok(AddressFormState::default())
}

/// Render the fragment for HTMX requests and the full page otherwise.
#[allow(clippy::too_many_arguments)]
fn render(
    headers: &HeaderMap,
    status: StatusCode,
    nonce: String,
    draft: &AddressFormState,
    shopper_state: &ShopperState,
    user: Option<&CurrentUser>,
    message: Option<String>,
    return_to: String,
) -> Response {
    let form = AddressFormView::new(draft, shopper_state, user, message, return_to);
    if is_htmx(headers) {
        (status, AddressFormTemplate { form }).into_response()
    } else {
        let layout = Layout::new(nonce, shopper_state, user);
        (status, AddressPageTemplate { layout, form }).into_response()
    }
}

const fn failure_status(error: &AddressSubmitError) -> StatusCode {
    match error {
        AddressSubmitError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AddressSubmitError::NotLoggedIn => StatusCode::UNAUTHORIZED,
        AddressSubmitError::SaveInProgress => StatusCode::CONFLICT,
        AddressSubmitError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the delivery address form.
#[instrument(skip(state, shopper, nonce, headers))]
pub async fn show(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    headers: HeaderMap,
    Query(query): Query<ReturnQuery>,
) -> Result<Response> {
    let user = shopper.current_user().await?;
    let shopper_state = shopper.state().await?;
    let draft = current_draft(&state, &shopper, &shopper_state, user.as_ref()).await?;
    let return_to = safe_return_path(query.return_to.as_deref(), DEFAULT_RETURN).to_owned();

    Ok(render(
        &headers,
        StatusCode::OK,
        nonce,
        &draft,
        &shopper_state,
        user.as_ref(),
        None,
        return_to,
    ))
}

/// Handle the address form submission.
///
/// On success the address is dispatched into the shopper state, the draft
/// is dropped and the visitor goes back to `return_to`. HTMX callers get
/// `HX-Redirect` and an `address-saved` trigger instead of a 303.
#[instrument(skip(state, shopper, nonce, headers, form))]
pub async fn submit(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    headers: HeaderMap,
    Form(form): Form<AddressSubmitForm>,
) -> Result<Response> {
    let return_to = safe_return_path(form.return_to.as_deref(), DEFAULT_RETURN).to_owned();
    let user = shopper.current_user().await?;

    let mut draft = shopper.address_draft().await?.unwrap_or_default();
    draft.replace_input(&form.input);

    match state.address_service().submit(user.as_ref(), &mut draft).await {
        Ok(address) => {
            add_breadcrumb(
                "address",
                "Saved delivery address",
                &[("region", address.region.to_string())],
            );
            shopper
                .dispatch(ShopperAction::SetDeliveryAddress(address))
                .await?;
            shopper.clear_address_draft().await?;

            if is_htmx(&headers) {
                Ok(AppendHeaders([
                    ("HX-Redirect", return_to),
                    ("HX-Trigger", "address-saved".to_owned()),
                ])
                .into_response())
            } else {
                Ok(Redirect::to(&return_to).into_response())
            }
        }
        Err(e) => {
            shopper.set_address_draft(&draft).await?;
            let shopper_state = shopper.state().await?;
            Ok(render(
                &headers,
                failure_status(&e),
                nonce,
                &draft,
                &shopper_state,
                user.as_ref(),
                e.form_message(),
                return_to,
            ))
        }
    }
}

/// Apply one field edit and return the re-rendered form (HTMX).
///
/// Only the edited field's error is cleared.
#[instrument(skip(state, shopper, nonce, headers, form), fields(field = form.field.as_str()))]
pub async fn edit_field(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    headers: HeaderMap,
    Form(form): Form<FieldEditForm>,
) -> Result<Response> {
    let user = shopper.current_user().await?;
    let shopper_state = shopper.state().await?;
    let mut draft = current_draft(&state, &shopper, &shopper_state, user.as_ref()).await?;

    draft.edit(form.field, form.input.value(form.field));
    shopper.set_address_draft(&draft).await?;

    let return_to = safe_return_path(form.return_to.as_deref(), DEFAULT_RETURN).to_owned();
    Ok(render(
        &headers,
        StatusCode::OK,
        nonce,
        &draft,
        &shopper_state,
        user.as_ref(),
        None,
        return_to,
    ))
}

/// Reset the form to blank defaults. The saved address is kept.
#[instrument(skip(shopper, nonce, headers, query))]
pub async fn clear(
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    headers: HeaderMap,
    Query(query): Query<ReturnQuery>,
) -> Result<Response> {
    let user = shopper.current_user().await?;
    let shopper_state = shopper.state().await?;

    let mut draft = shopper.address_draft().await?.unwrap_or_default();
    draft.clear();
    shopper.set_address_draft(&draft).await?;

    let return_to = safe_return_path(query.return_to.as_deref(), DEFAULT_RETURN).to_owned();
    Ok(render(
        &headers,
        StatusCode::OK,
        nonce,
        &draft,
        &shopper_state,
        user.as_ref(),
        None,
        return_to,
    ))
}
