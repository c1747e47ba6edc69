//! Delivery address form: raw input, validation and per-field error state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::governorate::Governorate;
use super::postal_code::{PostalCode, PostalCodeError, sanitize_postal_code};

/// The only country deliveries are offered in.
pub const COUNTRY: &str = "Tunisie";

/// A field of the delivery address form.
///
/// Serialized names match the HTML form field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Street,
    Address2,
    City,
    Region,
    PostalCode,
    Country,
    Instructions,
}

impl AddressField {
    /// Every field, in form order.
    pub const ALL: [Self; 7] = [
        Self::Street,
        Self::Address2,
        Self::City,
        Self::Region,
        Self::PostalCode,
        Self::Country,
        Self::Instructions,
    ];

    /// The HTML form field name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Address2 => "address2",
            Self::City => "city",
            Self::Region => "region",
            Self::PostalCode => "postal_code",
            Self::Country => "country",
            Self::Instructions => "instructions",
        }
    }
}

/// A validation failure on a single field, carrying its user-facing message.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFieldError {
    #[error("L'adresse principale est requise")]
    StreetRequired,
    #[error("Les détails de l'adresse sont requis")]
    DetailsRequired,
    #[error("La ville est requise")]
    CityRequired,
    #[error("Le gouvernorat est requis")]
    RegionRequired,
    #[error("Le code postal est requis")]
    PostalCodeRequired,
    #[error("Le code postal doit contenir 4 chiffres")]
    PostalCodeFormat,
}

/// Mapping from field to its error. A missing key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<AddressField, AddressFieldError>);

impl FieldErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: AddressField) -> Option<AddressFieldError> {
        self.0.get(&field).copied()
    }

    #[must_use]
    pub fn contains(&self, field: AddressField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn insert(&mut self, field: AddressField, error: AddressFieldError) {
        self.0.insert(field, error);
    }

    /// Drop the error for one field, leaving the others untouched.
    pub fn clear(&mut self, field: AddressField) {
        self.0.remove(&field);
    }

    pub fn fields(&self) -> impl Iterator<Item = AddressField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressField, AddressFieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }
}

/// A validated delivery address, owned by exactly one user.
///
/// Saved addresses are replaced wholesale; there is no partial update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub street: String,
    pub address2: String,
    pub city: String,
    pub region: Governorate,
    pub postal_code: PostalCode,
    pub country: String,
    pub instructions: Option<String>,
}

impl DeliveryAddress {
    /// Format as a single line, e.g. for an account summary.
    #[must_use]
    pub fn single_line(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.street, self.address2, self.postal_code, self.city, self.region
        )
    }
}

/// Raw address form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub instructions: String,
}

fn default_country() -> String {
    COUNTRY.to_owned()
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            street: String::new(),
            address2: String::new(),
            city: String::new(),
            region: String::new(),
            postal_code: String::new(),
            country: default_country(),
            instructions: String::new(),
        }
    }
}

impl From<&DeliveryAddress> for AddressForm {
    fn from(address: &DeliveryAddress) -> Self {
        Self {
            street: address.street.clone(),
            address2: address.address2.clone(),
            city: address.city.clone(),
            region: address.region.name().to_owned(),
            postal_code: address.postal_code.to_string(),
            country: address.country.clone(),
            instructions: address.instructions.clone().unwrap_or_default(),
        }
    }
}

impl AddressForm {
    /// Current raw value of a field.
    #[must_use]
    pub fn value(&self, field: AddressField) -> &str {
        match field {
            AddressField::Street => &self.street,
            AddressField::Address2 => &self.address2,
            AddressField::City => &self.city,
            AddressField::Region => &self.region,
            AddressField::PostalCode => &self.postal_code,
            AddressField::Country => &self.country,
            AddressField::Instructions => &self.instructions,
        }
    }

    /// Store a new value for one field.
    ///
    /// Postal code input is sanitized before it is stored.
    pub fn set(&mut self, field: AddressField, value: &str) {
        let slot = match field {
            AddressField::Street => &mut self.street,
            AddressField::Address2 => &mut self.address2,
            AddressField::City => &mut self.city,
            AddressField::Region => &mut self.region,
            AddressField::PostalCode => {
                self.postal_code = sanitize_postal_code(value);
                return;
            }
            AddressField::Country => &mut self.country,
            AddressField::Instructions => &mut self.instructions,
        };
        value.clone_into(slot);
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the complete error mapping when at least one field fails.
    pub fn validate(&self) -> Result<DeliveryAddress, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.street.trim().is_empty() {
            errors.insert(AddressField::Street, AddressFieldError::StreetRequired);
        }
        if self.address2.trim().is_empty() {
            errors.insert(AddressField::Address2, AddressFieldError::DetailsRequired);
        }
        if self.city.trim().is_empty() {
            errors.insert(AddressField::City, AddressFieldError::CityRequired);
        }

        let region = self.region.parse::<Governorate>().ok();
        if region.is_none() {
            errors.insert(AddressField::Region, AddressFieldError::RegionRequired);
        }

        let postal_code = match PostalCode::parse(&self.postal_code) {
            Ok(code) => Some(code),
            Err(PostalCodeError::Empty) => {
                errors.insert(
                    AddressField::PostalCode,
                    AddressFieldError::PostalCodeRequired,
                );
                None
            }
            Err(PostalCodeError::Format) => {
                errors.insert(AddressField::PostalCode, AddressFieldError::PostalCodeFormat);
                None
            }
        };

        match (region, postal_code) {
            (Some(region), Some(postal_code)) if errors.is_empty() => Ok(DeliveryAddress {
                street: self.street.trim().to_owned(),
                address2: self.address2.trim().to_owned(),
                city: self.city.trim().to_owned(),
                region,
                postal_code,
                country: default_country(),
                instructions: Some(self.instructions.trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned),
            }),
            _ => Err(errors),
        }
    }
}

/// The address form as the shopper sees it: current input plus the errors
/// from the last submit attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFormState {
    pub form: AddressForm,
    pub errors: FieldErrors,
}

impl AddressFormState {
    #[must_use]
    pub const fn new(form: AddressForm) -> Self {
        Self {
            form,
            errors: FieldErrors(BTreeMap::new()),
        }
    }

    /// Pre-fill from a previously saved address.
    #[must_use]
    pub fn from_saved(address: &DeliveryAddress) -> Self {
        Self::new(AddressForm::from(address))
    }

    /// Apply one keystroke-level edit and clear that field's error.
    pub fn edit(&mut self, field: AddressField, value: &str) {
        self.form.set(field, value);
        self.errors.clear(field);
    }

    /// Replace every field with posted input, sanitizing as [`AddressForm::set`] does.
    ///
    /// Errors are left alone; the following [`Self::submit`] recomputes them.
    pub fn replace_input(&mut self, input: &AddressForm) {
        for field in AddressField::ALL {
            self.form.set(field, input.value(field));
        }
    }

    /// Re-run validation over the whole form, replacing the error mapping.
    ///
    /// Returns the validated address when every field passes.
    pub fn submit(&mut self) -> Option<DeliveryAddress> {
        match self.form.validate() {
            Ok(address) => {
                self.errors = FieldErrors::default();
                Some(address)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Reset every field to its default and forget all errors.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn error(&self, field: AddressField) -> Option<AddressFieldError> {
        self.errors.get(field)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> AddressForm {
        AddressForm {
            street: "12 Rue de Marseille".to_owned(),
            address2: "Immeuble B, 3e étage".to_owned(),
            city: "Tunis".to_owned(),
            region: "Tunis".to_owned(),
            postal_code: "1000".to_owned(),
            country: COUNTRY.to_owned(),
            instructions: String::new(),
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        for governorate in Governorate::ALL {
            for code in ["1000", "0000", "9999", "2080"] {
                let mut form = valid_form();
                form.region = governorate.name().to_owned();
                form.postal_code = code.to_owned();
                let address = form.validate().unwrap();
                assert_eq!(address.region, governorate);
                assert_eq!(address.postal_code.as_str(), code);
                assert_eq!(address.country, COUNTRY);
            }
        }
    }

    #[test]
    fn test_blank_city_only_reports_city() {
        let mut form = valid_form();
        form.city = "   ".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(AddressField::City),
            Some(AddressFieldError::CityRequired)
        );
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = AddressForm::default().validate().unwrap_err();
        let fields: Vec<_> = errors.fields().collect();
        assert_eq!(
            fields,
            vec![
                AddressField::Street,
                AddressField::Address2,
                AddressField::City,
                AddressField::Region,
                AddressField::PostalCode,
            ]
        );
        assert_eq!(
            errors.get(AddressField::PostalCode),
            Some(AddressFieldError::PostalCodeRequired)
        );
    }

    #[test]
    fn test_short_postal_code_has_distinct_message() {
        let mut form = valid_form();
        form.postal_code = "100".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(AddressField::PostalCode),
            Some(AddressFieldError::PostalCodeFormat)
        );
        assert_eq!(
            AddressFieldError::PostalCodeFormat.to_string(),
            "Le code postal doit contenir 4 chiffres"
        );
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        let mut form = valid_form();
        form.region = "Lyon".to_owned();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(AddressField::Region),
            Some(AddressFieldError::RegionRequired)
        );
    }

    #[test]
    fn test_instructions_are_optional() {
        let mut form = valid_form();
        assert_eq!(form.validate().unwrap().instructions, None);
        form.instructions = "  Sonnez deux fois ".to_owned();
        assert_eq!(
            form.validate().unwrap().instructions.as_deref(),
            Some("Sonnez deux fois")
        );
    }

    #[test]
    fn test_edit_clears_only_that_field() {
        let mut state = AddressFormState::default();
        assert!(state.submit().is_none());
        assert!(state.error(AddressField::City).is_some());

        state.edit(AddressField::City, "Sfax");
        assert!(state.error(AddressField::City).is_none());
        assert!(state.error(AddressField::Street).is_some());
        assert!(state.error(AddressField::PostalCode).is_some());
    }

    #[test]
    fn test_edit_sanitizes_postal_code() {
        let mut state = AddressFormState::default();
        state.edit(AddressField::PostalCode, "30a00-12");
        assert_eq!(state.form.postal_code, "3000");
    }

    #[test]
    fn test_submit_success_resets_errors() {
        let mut state = AddressFormState::new(valid_form());
        state.errors.insert(AddressField::Street, AddressFieldError::StreetRequired);
        assert!(state.submit().is_some());
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_clear_restores_defaults() {
        let mut state = AddressFormState::new(valid_form());
        state.form.city.clear();
        let _ = state.submit();
        state.clear();
        assert_eq!(state.form, AddressForm::default());
        assert_eq!(state.form.country, COUNTRY);
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_prefill_roundtrips_saved_address() {
        let address = valid_form().validate().unwrap();
        let state = AddressFormState::from_saved(&address);
        assert_eq!(state.form.validate().unwrap(), address);
    }

    #[test]
    fn test_errors_serialize_with_field_names() {
        let mut errors = FieldErrors::default();
        errors.insert(AddressField::PostalCode, AddressFieldError::PostalCodeFormat);
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"postal_code":"postal_code_format"}"#);
        assert_eq!(serde_json::from_str::<FieldErrors>(&json).unwrap(), errors);
    }

    #[test]
    fn test_replace_input_sanitizes_and_keeps_errors() {
        let mut state = AddressFormState::default();
        let _ = state.submit();
        let mut posted = valid_form();
        posted.postal_code = "20-80".to_owned();
        state.replace_input(&posted);
        assert_eq!(state.form.postal_code, "2080");
        assert!(state.error(AddressField::Street).is_some());
        assert!(state.submit().is_some());
    }
}
