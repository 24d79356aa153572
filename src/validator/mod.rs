//! Predicates over a field's current value
//!
//! A validator appends a human readable message to the field it checks when the check fails.
//! Validators hold their configuration only and never keep a reference to a field.
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

mod length;
mod pattern;

pub use length::*;
pub use pattern::*;

use crate::errors::ConfigurationError;
use crate::field::FormField;
use crate::path::Dimensions;
use crate::value::to_text;

pub trait Validator: Send + Sync + Debug {
    /// Check the field, adding a validation message on failure
    fn validate(&self, field: &mut FormField) -> bool;
}

/// Fails on empty required fields
///
/// Hidden fields are never reported as missing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Required;

impl Validator for Required {
    fn validate(&self, field: &mut FormField) -> bool {
        if !field.is_required() || field.is_hidden() {
            return true;
        }

        if to_text(&field.value(None)).is_empty() {
            field.add_validation_message("This is a required field.");
            return false;
        }
        true
    }
}

/// Requires the field to hold the same value as another field of the same container
#[derive(Clone, Debug)]
pub struct Matches {
    other: Dimensions,
}

impl Matches {
    pub fn new(other: &str) -> Self {
        Matches {
            other: Dimensions::parse(other),
        }
    }
}

impl Validator for Matches {
    fn validate(&self, field: &mut FormField) -> bool {
        let other = self
            .other
            .resolve(&Value::Object(field.container_value().clone()));
        if field.value(None) != other {
            field.add_validation_message("Input fields do not match.");
            return false;
        }
        true
    }
}

fn length_argument(name: &str, argument: Option<&str>) -> Result<i64, ConfigurationError> {
    let argument = argument.ok_or_else(|| ConfigurationError::InvalidValidatorArgument {
        validator: name.to_string(),
        reason: "a length is required".to_string(),
    })?;

    argument
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidValidatorArgument {
            validator: name.to_string(),
            reason: format!("`{argument}` is not an integer"),
        })
}

/// Build a validator from its name and optional argument
///
/// Names are accepted with or without the `Validate` prefix, so `Numeric` and `ValidateNumeric`
/// name the same validator.
///
/// # Errors
///
/// Fails with [`ConfigurationError::UnknownValidator`] if the name matches no validator, or with
/// [`ConfigurationError::InvalidValidatorArgument`] if the validator needs an argument that is
/// missing or malformed.
pub fn build(name: &str, argument: Option<&str>) -> Result<Arc<dyn Validator>, ConfigurationError> {
    let short = name.trim().trim_start_matches("Validate");
    let validator: Arc<dyn Validator> = match short {
        "Required" => Arc::new(Required),
        "Numeric" => Arc::new(Numeric),
        "Email" => Arc::new(Email),
        "Zipcode" => Arc::new(Zipcode),
        "MinLength" => Arc::new(MinLength::new(length_argument(name, argument)?)),
        "MaxLength" => Arc::new(MaxLength::new(length_argument(name, argument)?)),
        "ExactLength" => Arc::new(ExactLength::new(length_argument(name, argument)?)),
        "Matches" => {
            let other = argument.filter(|a| !a.trim().is_empty()).ok_or_else(|| {
                ConfigurationError::InvalidValidatorArgument {
                    validator: name.to_string(),
                    reason: "the name of the field to match is required".to_string(),
                }
            })?;
            Arc::new(Matches::new(other.trim()))
        }
        _ => return Err(ConfigurationError::UnknownValidator(name.to_string())),
    };
    Ok(validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FormField;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_builds_validators_by_name() {
        assert!(build("ValidateNumeric", None).is_ok());
        assert!(build("Email", None).is_ok());
        assert!(build("MinLength", Some("3")).is_ok());
        assert!(matches!(
            build("MinLength", Some("three")),
            Err(ConfigurationError::InvalidValidatorArgument { .. })
        ));
        assert!(matches!(
            build("ValidateMatches", None),
            Err(ConfigurationError::InvalidValidatorArgument { .. })
        ));
        assert!(matches!(
            build("ValidatePhone", None),
            Err(ConfigurationError::UnknownValidator(_))
        ));
    }

    #[test]
    fn it_requires_a_value_on_required_fields() {
        let mut field = FormField::text("name").with_required(true);
        assert!(!Required.validate(&mut field));
        assert_eq!(field.validation_messages(), ["This is a required field."]);

        let mut field = FormField::hidden("token").with_required(true);
        assert!(Required.validate(&mut field));
    }

    #[test]
    fn it_matches_sibling_values() {
        let mut field = FormField::password("confirm");
        field.container_value = crate::value::to_map(&json!({"password": "s3cret"}));

        field.set_raw_value(json!("s3cret"));
        assert!(Matches::new("password").validate(&mut field));

        field.set_raw_value(json!("other"));
        assert!(!Matches::new("password").validate(&mut field));
        assert_eq!(field.validation_messages(), ["Input fields do not match."]);
    }
}
