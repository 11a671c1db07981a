//! Pure field validators used at the interaction boundary.
//!
//! Each function either returns the normalised value or a [`ValidationError`]
//! describing why the input was rejected. The retry loop lives in
//! [`console`](crate::console); nothing in here touches I/O.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{CLASS_PREFIX, MEMBER_PREFIX, MembershipType};

/// Reasons an operator supplied value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be exactly {digits} digits")]
    Digits { field: &'static str, digits: usize },

    #[error("'{0}' is not a real date in ddmmyyyy format")]
    Date(String),

    #[error("'{0}' is not a membership type; use Platinum, Diamond, Gold or Standard")]
    MembershipType(String),

    #[error("'{value}' does not match the id format {prefix}0000")]
    IdFormat { prefix: char, value: String },

    #[error("'{0}' is not a non-negative amount")]
    Cost(String),
}

/// Validates a person or class name. Commas are allowed; the table codec
/// quotes them.
pub fn name(field: &'static str, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

pub fn contact_number(input: &str) -> Result<String, ValidationError> {
    fixed_digits("contact number", input, 10)
}

pub fn tax_registration_number(input: &str) -> Result<String, ValidationError> {
    fixed_digits("tax registration number", input, 9)
}

/// Validates a ddmmyyyy date of birth, rejecting impossible calendar dates.
pub fn date_of_birth(input: &str) -> Result<String, ValidationError> {
    let digits = fixed_digits("date of birth", input, 8)?;
    NaiveDate::parse_from_str(&digits, "%d%m%Y")
        .map_err(|_| ValidationError::Date(digits.clone()))?;
    Ok(digits)
}

pub fn membership_type(input: &str) -> Result<MembershipType, ValidationError> {
    input
        .trim()
        .parse()
        .map_err(|_| ValidationError::MembershipType(input.trim().to_string()))
}

pub fn member_id(input: &str) -> Result<String, ValidationError> {
    prefixed_id(MEMBER_PREFIX, input)
}

pub fn session_id(input: &str) -> Result<String, ValidationError> {
    prefixed_id(CLASS_PREFIX, input)
}

/// Validates a class cost, keeping the operator's text so the stored value
/// reads the way it was entered.
pub fn cost(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(trimmed.to_string()),
        _ => Err(ValidationError::Cost(trimmed.to_string())),
    }
}

fn fixed_digits(
    field: &'static str,
    input: &str,
    digits: usize,
) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.len() == digits && trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::Digits { field, digits })
    }
}

fn prefixed_id(prefix: char, input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let valid = trimmed
        .strip_prefix(prefix)
        .is_some_and(|suffix| suffix.len() == 4 && suffix.bytes().all(|b| b.is_ascii_digit()));
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::IdFormat {
            prefix,
            value: trimmed.to_string(),
        })
    }
}
