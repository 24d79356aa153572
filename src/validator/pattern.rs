use once_cell::sync::Lazy;
use regex::Regex;

use super::Validator;
use crate::field::FormField;
use crate::format::FormatMode;
use crate::value::{is_numeric, to_text};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][_a-zA-Z0-9+.-]*@[a-zA-Z0-9][a-zA-Z0-9.-]*\.[a-zA-Z]{2,6}$")
        .expect("valid email regex")
});

static ZIPCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("valid zipcode regex"));

/// The value must parse as a number
#[derive(Clone, Copy, Debug, Default)]
pub struct Numeric;

impl Validator for Numeric {
    fn validate(&self, field: &mut FormField) -> bool {
        if !is_numeric(&field.value(None)) {
            field.add_validation_message("Input field must be numeric");
            return false;
        }
        true
    }
}

/// The value must look like an email address
#[derive(Clone, Copy, Debug, Default)]
pub struct Email;

impl Validator for Email {
    fn validate(&self, field: &mut FormField) -> bool {
        let value = to_text(&field.value(None));
        if value.contains("..") || !EMAIL.is_match(&value) {
            field.add_validation_message("Email address is invalid.");
            return false;
        }
        true
    }
}

/// The form value must be a 5 or 9 digit zipcode
#[derive(Clone, Copy, Debug, Default)]
pub struct Zipcode;

impl Validator for Zipcode {
    fn validate(&self, field: &mut FormField) -> bool {
        let value = to_text(&field.value(Some(FormatMode::Form)));
        if !ZIPCODE.is_match(&value) {
            field.add_validation_message("Zipcode must be 5 or 9 digits.");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(validator: &dyn Validator, value: &str) -> bool {
        let mut field = FormField::text("input");
        field.set_raw_value(json!(value));
        validator.validate(&mut field)
    }

    #[test]
    fn it_checks_numbers() {
        assert!(check(&Numeric, "12.5"));
        assert!(!check(&Numeric, "twelve"));
    }

    #[test]
    fn it_checks_email_addresses() {
        assert!(check(&Email, "ada.lovelace+test@example.org"));
        assert!(!check(&Email, "ada..lovelace@example.org"));
        assert!(!check(&Email, "ada@localhost"));
        assert!(!check(&Email, ".ada@example.org"));
    }

    #[test]
    fn it_checks_zipcodes() {
        assert!(check(&Zipcode, "90210"));
        assert!(check(&Zipcode, "90210-1234"));
        assert!(!check(&Zipcode, "9021"));
        assert!(!check(&Zipcode, "90210-12"));
    }
}
