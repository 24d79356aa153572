use std::collections::HashMap;

use super::FormField;
use crate::errors::{ConfigurationError, LoadError};
use crate::source::{FieldDescriptor, MetadataProvider};
use crate::validator;

/// Constructor of a field kind from a field name
pub type FieldConstructor = fn(&str) -> FormField;

/// Maps field class names found in metadata to field constructors
///
/// A new field kind is made available to metadata by registering a constructor under its class
/// name.
#[derive(Clone, Debug)]
pub struct FieldRegistry(HashMap<String, FieldConstructor>);

impl Default for FieldRegistry {
    fn default() -> Self {
        let builtin: [(&str, FieldConstructor); 19] = [
            ("Text", FormField::text),
            ("Hidden", FormField::hidden),
            ("Password", FormField::password),
            ("Number", FormField::number),
            ("Money", FormField::money),
            ("Percentage", FormField::percentage),
            ("Email", FormField::email),
            ("Date", FormField::date),
            ("Zipcode", FormField::zipcode),
            ("Textarea", FormField::textarea),
            ("Select", FormField::select),
            ("Checkbox", FormField::checkbox),
            ("Radio", |name| FormField::radio(name, 1)),
            ("Button", FormField::button),
            ("Submit", FormField::submit),
            ("Span", FormField::span),
            ("Link", FormField::link),
            ("Tooltip", FormField::tooltip),
            ("YesNo", FormField::yes_no),
        ];

        FieldRegistry(
            builtin
                .into_iter()
                .map(|(class, ctor)| (class.to_string(), ctor))
                .collect(),
        )
    }
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for a field class, returning the one it replaces
    pub fn register(
        &mut self,
        class: impl Into<String>,
        ctor: FieldConstructor,
    ) -> Option<FieldConstructor> {
        self.0.insert(class.into(), ctor)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.contains_key(class)
    }

    /// Build a field from its descriptor
    ///
    /// Validators are added after the implicit required validator, sorted by their ordering.
    ///
    /// # Errors
    ///
    /// Fails if the field class is not registered or a validator cannot be built.
    pub fn build(&self, descriptor: &FieldDescriptor) -> Result<FormField, ConfigurationError> {
        let class = if descriptor.field_class.is_empty() {
            "Text"
        } else {
            descriptor.field_class.as_str()
        };
        let ctor = self
            .0
            .get(class)
            .ok_or_else(|| ConfigurationError::UnknownFieldClass(class.to_string()))?;

        let mut field = ctor(&descriptor.field_name);
        if let Some(label) = descriptor.label.as_ref() {
            field.set_label(label.clone());
        }
        if let Some(tooltip) = descriptor.tooltip.as_ref() {
            field.set_tooltip(tooltip.clone());
        }
        field.set_required(descriptor.required);
        field.set_ordering(descriptor.ordering);
        field.set_visible(descriptor.is_visible);
        field.set_sortable(descriptor.sortable);
        field.set_ordinal_position(descriptor.ordinal_position);

        let mut specs = descriptor.validators.clone();
        specs.sort_by(|a, b| a.ordering.cmp(&b.ordering).then_with(|| a.name.cmp(&b.name)));
        for spec in specs.iter() {
            field.add_validator(validator::build(&spec.name, spec.argument.as_deref())?);
        }

        field.set_metadata(descriptor.clone());
        Ok(field)
    }

    fn build_with(
        &self,
        descriptor: &FieldDescriptor,
        provider: &dyn MetadataProvider,
    ) -> Result<FormField, LoadError> {
        let mut field = self.build(descriptor)?;

        let source = descriptor
            .data_source
            .as_deref()
            .or(descriptor.foreign_table_name.as_deref())
            .filter(|s| !s.is_empty());
        if let (Some(source), true) = (source, field.is_select()) {
            field.set_options(provider.options(source)?);
        }

        Ok(field)
    }

    /// Build a field from the metadata of a fully qualified field name such as
    /// `contacts.first_name`
    ///
    /// A field without metadata is built as a bare, unconstrained text field.
    pub fn build_from(
        &self,
        fqfn: &str,
        provider: &dyn MetadataProvider,
    ) -> Result<FormField, LoadError> {
        match provider.descriptor(fqfn)? {
            Some(descriptor) => self.build_with(&descriptor, provider),
            None => Ok(FormField::text(fqfn)),
        }
    }

    /// Build the visible fields of a table, sorted by their ordering
    pub fn build_all(
        &self,
        fqtn: &str,
        provider: &dyn MetadataProvider,
    ) -> Result<Vec<FormField>, LoadError> {
        let mut descriptors: Vec<FieldDescriptor> = provider
            .table(fqtn)?
            .into_iter()
            .filter(|d| d.is_visible)
            .collect();
        descriptors.sort_by_key(|d| d.ordering);

        descriptors
            .iter()
            .map(|d| self.build_with(d, provider))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::field::{FieldKind, SelectOption};
    use crate::source::ValidatorSpec;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Schema;

    impl MetadataProvider for Schema {
        fn descriptor(&self, fqfn: &str) -> Result<Option<FieldDescriptor>, SourceError> {
            Ok(self.table("contacts")?.into_iter().find(|d| {
                fqfn.split('.').next_back() == Some(d.field_name.as_str())
            }))
        }

        fn table(&self, _: &str) -> Result<Vec<FieldDescriptor>, SourceError> {
            let descriptors = serde_json::from_value(json!([
                {
                    "field_name": "state",
                    "field_class": "Select",
                    "label": "State",
                    "ordering": 2,
                    "data_source": "states"
                },
                {
                    "field_name": "age",
                    "field_class": "Number",
                    "label": "Age",
                    "ordering": 1,
                    "validators": [
                        {"ordering": 2, "name": "ValidateMaxLength", "argument": "3"},
                        {"ordering": 1, "name": "ValidateNumeric"}
                    ]
                },
                {"field_name": "internal", "is_visible": false}
            ]))
            .map_err(SourceError::new)?;
            Ok(descriptors)
        }

        fn options(&self, _: &str) -> Result<Vec<SelectOption>, SourceError> {
            Ok(vec![SelectOption::new("ca", "California")])
        }
    }

    #[test]
    fn it_builds_fields_from_descriptors() {
        let registry = FieldRegistry::default();
        let field = registry.build_from("contacts.age", &Schema).unwrap();

        assert_eq!(field.name().as_deref(), Some("age"));
        assert_eq!(field.label(false), "Age");
        // the implicit required validator plus the two from metadata
        assert_eq!(field.validators().len(), 3);
        assert_eq!(
            format!("{:?}", field.validators()[1]),
            format!("{:?}", crate::validator::Numeric)
        );
    }

    #[test]
    fn it_falls_back_to_a_bare_field() {
        let field = FieldRegistry::default()
            .build_from("contacts.nickname", &Schema)
            .unwrap();
        assert!(matches!(field.kind(), FieldKind::Input { input_type } if input_type == "text"));
        assert_eq!(field.validators().len(), 1);
        assert!(!field.is_required());
    }

    #[test]
    fn it_builds_visible_table_fields_in_order() {
        let fields = FieldRegistry::default().build_all("contacts", &Schema).unwrap();
        let names: Vec<_> = fields.iter().filter_map(|f| f.name()).collect();
        assert_eq!(names, vec!["age", "state"]);

        let FieldKind::Select(select) = fields[1].kind() else {
            panic!("state should be a select");
        };
        assert_eq!(select.options, vec![SelectOption::new("ca", "California")]);
    }

    #[test]
    fn it_rejects_unknown_classes_and_validators() {
        let registry = FieldRegistry::default();
        let descriptor = FieldDescriptor {
            field_name: "x".to_string(),
            field_class: "Hologram".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            registry.build(&descriptor),
            Err(ConfigurationError::UnknownFieldClass(_))
        ));

        let descriptor = FieldDescriptor {
            field_name: "x".to_string(),
            validators: vec![ValidatorSpec {
                ordering: 1,
                name: "ValidateTelepathy".to_string(),
                argument: None,
            }],
            ..Default::default()
        };
        assert!(matches!(
            registry.build(&descriptor),
            Err(ConfigurationError::UnknownValidator(_))
        ));
    }
}
