//! Input validation for hospital registration.
//!
//! Pure functions shared by the API handlers and their tests. All failures
//! are reported as [`CoreError::Validation`] so they map to HTTP 400.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Argon2 accepts longer inputs, but the registration form has always
/// capped passwords at 72 bytes and clients rely on that limit.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Maximum length of a hospital name (also its login username).
const MAX_NAME_LEN: usize = 100;

/// Maximum length of an email address.
const MAX_EMAIL_LEN: usize = 100;

/// Maximum length of a postal address.
const MAX_ADDRESS_LEN: usize = 255;

/// Maximum length of a contact number.
const MAX_CONTACT_LEN: usize = 20;

/// Raw registration fields as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationFields<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub address: &'a str,
    pub contact_number: &'a str,
}

/// Validate every registration field.
///
/// Rules:
/// - No field may be empty or whitespace-only.
/// - Text fields are bounded in length.
/// - The email must be syntactically valid.
/// - The password must not exceed [`MAX_PASSWORD_BYTES`] bytes.
pub fn validate_registration(fields: &RegistrationFields<'_>) -> Result<(), CoreError> {
    require_field("username", fields.name, MAX_NAME_LEN)?;
    require_field("email", fields.email, MAX_EMAIL_LEN)?;
    require_field("address", fields.address, MAX_ADDRESS_LEN)?;
    require_field("contact_number", fields.contact_number, MAX_CONTACT_LEN)?;

    if fields.password.is_empty() {
        return Err(CoreError::Validation("password must not be empty".into()));
    }
    if fields.password.len() > MAX_PASSWORD_BYTES {
        return Err(CoreError::Validation(format!(
            "Password too long. Maximum {MAX_PASSWORD_BYTES} characters allowed."
        )));
    }

    if !fields.email.trim().validate_email() {
        return Err(CoreError::Validation(format!(
            "'{}' is not a valid email address",
            fields.email.trim()
        )));
    }

    Ok(())
}

fn require_field(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {max_len} characters"
        )));
    }
    Ok(())
}
