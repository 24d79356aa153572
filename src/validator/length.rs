use super::Validator;
use crate::field::FormField;
use crate::value::to_text;

fn len(field: &FormField) -> i64 {
    to_text(&field.value(None)).chars().count() as i64
}

/// The value must be at least `length` characters long
#[derive(Clone, Copy, Debug)]
pub struct MinLength(i64);

impl MinLength {
    pub fn new(length: i64) -> Self {
        MinLength(length)
    }
}

impl Validator for MinLength {
    fn validate(&self, field: &mut FormField) -> bool {
        if len(field) < self.0 {
            field.add_validation_message(format!(
                "The minimum length for this input is {}.",
                self.0
            ));
            return false;
        }
        true
    }
}

/// The value must be at most `length` characters long
#[derive(Clone, Copy, Debug)]
pub struct MaxLength(i64);

impl MaxLength {
    pub fn new(length: i64) -> Self {
        MaxLength(length)
    }
}

impl Validator for MaxLength {
    fn validate(&self, field: &mut FormField) -> bool {
        if len(field) > self.0 {
            field.add_validation_message(format!(
                "The maximum length for this input is {}.",
                self.0
            ));
            return false;
        }
        true
    }
}

/// The value must be exactly `length` characters long
#[derive(Clone, Copy, Debug)]
pub struct ExactLength(i64);

impl ExactLength {
    pub fn new(length: i64) -> Self {
        ExactLength(length)
    }
}

impl Validator for ExactLength {
    fn validate(&self, field: &mut FormField) -> bool {
        if len(field) != self.0 {
            field.add_validation_message(format!(
                "Input length must be exactly {}.",
                self.0
            ));
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_counts_characters() {
        let mut field = FormField::text("code");
        field.set_raw_value(json!("héllo"));

        assert!(MinLength::new(5).validate(&mut field));
        assert!(MaxLength::new(5).validate(&mut field));
        assert!(ExactLength::new(5).validate(&mut field));

        assert!(!MinLength::new(6).validate(&mut field));
        assert!(!MaxLength::new(4).validate(&mut field));
        assert_eq!(
            field.validation_messages(),
            [
                "The minimum length for this input is 6.",
                "The maximum length for this input is 4."
            ]
        );
    }
}
