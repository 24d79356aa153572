//! Boundary contracts of external collaborators
//!
//! Field metadata, row data and pagination are supplied by the application, usually from a
//! database schema and query layer. This module defines only the shape the engine consumes.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::container::Pagination;
use crate::errors::SourceError;
use crate::field::SelectOption;

/// Metadata describing how to build a field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDescriptor {
    pub field_name: String,
    /// Registered field class, e.g. `Text` or `Select`
    pub field_class: String,
    pub label: Option<String>,
    pub required: bool,
    pub tooltip: Option<String>,
    pub ordering: i64,
    pub validators: Vec<ValidatorSpec>,
    pub is_visible: bool,
    /// Table providing select options when no data source is given
    pub foreign_table_name: Option<String>,
    /// Named option source
    pub data_source: Option<String>,
    pub ordinal_position: Option<usize>,
    pub sortable: bool,
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        FieldDescriptor {
            field_name: String::new(),
            field_class: String::new(),
            label: None,
            required: false,
            tooltip: None,
            ordering: 0,
            validators: Vec::new(),
            is_visible: true,
            foreign_table_name: None,
            data_source: None,
            ordinal_position: None,
            sortable: false,
        }
    }
}

/// A validator named by metadata
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSpec {
    pub ordering: i64,
    /// Validator name, with or without the `Validate` prefix
    pub name: String,
    pub argument: Option<String>,
}

/// Supplies field metadata
pub trait MetadataProvider {
    /// Return the descriptor of a fully qualified field name, `None` if the field is unknown
    fn descriptor(&self, fqfn: &str) -> Result<Option<FieldDescriptor>, SourceError>;

    /// Return the descriptors of every field of a fully qualified table name
    fn table(&self, fqtn: &str) -> Result<Vec<FieldDescriptor>, SourceError>;

    /// Return the options of a named option source
    fn options(&self, source: &str) -> Result<Vec<SelectOption>, SourceError>;
}

/// Supplies the columns, rows and pagination of a data set
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Column descriptors, in display order
    async fn columns(&self) -> Result<Vec<FieldDescriptor>, SourceError>;

    /// The rows of the current page
    async fn rows(&self) -> Result<Vec<Map<String, Value>>, SourceError>;

    /// Pagination of the query, `None` if the query is not paginated
    async fn pagination(&self) -> Result<Option<Pagination>, SourceError> {
        Ok(None)
    }
}

/// Builds the urls of pagination and sort links
pub trait LinkBuilder: Send + Sync + std::fmt::Debug {
    fn page(&self, page: u64) -> String;

    fn sort(&self, column: usize) -> String;
}

/// Links as query string parameters of the current page
#[derive(Clone, Debug, Default)]
pub struct QueryLinks;

impl LinkBuilder for QueryLinks {
    fn page(&self, page: u64) -> String {
        format!("?page={page}")
    }

    fn sort(&self, column: usize) -> String {
        format!("?sort={column}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_reads_descriptors_with_defaults() {
        let descriptor: FieldDescriptor = serde_json::from_value(json!({
            "field_name": "email",
            "field_class": "Email",
            "validators": [{"ordering": 1, "name": "Email"}]
        }))
        .unwrap();

        assert!(descriptor.is_visible);
        assert!(!descriptor.required);
        assert_eq!(descriptor.validators[0].argument, None);
    }

    #[test]
    fn it_builds_query_links() {
        assert_eq!(QueryLinks.page(3), "?page=3");
        assert_eq!(QueryLinks.sort(2), "?sort=2");
    }
}
