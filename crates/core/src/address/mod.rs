//! Delivery address capture.
//!
//! The address form is validated field by field; every failing field gets its
//! own message and the save only proceeds once the error mapping is empty.
//! Postal code input is sanitized on each edit, before validation ever sees it.

mod form;
mod governorate;
mod postal_code;

pub use form::{
    AddressField, AddressFieldError, AddressForm, AddressFormState, COUNTRY, DeliveryAddress,
    FieldErrors,
};
pub use governorate::{Governorate, UnknownGovernorate};
pub use postal_code::{POSTAL_CODE_LENGTH, PostalCode, PostalCodeError, sanitize_postal_code};
