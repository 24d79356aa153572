use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::io;

use formwork::container::{DataSet, PageLink, Pagination};
use formwork::errors::{LoadError, SourceError};
use formwork::field::{FieldRegistry, FormField};
use formwork::format::FormatMode;
use formwork::session::BindSession;
use formwork::source::{FieldDescriptor, RowSource};

struct People {
    fail: bool,
}

fn column(name: &str, class: &str, label: &str) -> FieldDescriptor {
    FieldDescriptor {
        field_name: name.to_string(),
        field_class: class.to_string(),
        label: Some(label.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl RowSource for People {
    async fn columns(&self) -> Result<Vec<FieldDescriptor>, SourceError> {
        Ok(vec![
            column("name", "Text", "Name"),
            column("balance", "Money", "Balance"),
            FieldDescriptor {
                is_visible: false,
                ..column("secret", "Text", "Secret")
            },
        ])
    }

    async fn rows(&self) -> Result<Vec<Map<String, Value>>, SourceError> {
        if self.fail {
            return Err(SourceError::new(io::Error::other("connection reset")));
        }
        let rows = json!([
            {"name": "Ada", "balance": 1200.5, "secret": "x"},
            {"name": "Alan", "balance": -3, "secret": "y"}
        ]);
        Ok(rows
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|row| row.as_object().cloned())
            .collect())
    }

    async fn pagination(&self) -> Result<Option<Pagination>, SourceError> {
        Ok(Some(Pagination {
            total_records: 52,
            total_pages: 3,
            current_page: 2,
            first_record: 26,
            last_record: 50,
        }))
    }
}

#[tokio::test]
async fn test_loading_rows_from_a_source() {
    let mut dataset = DataSet::new();
    dataset
        .load(&People { fail: false }, &FieldRegistry::default())
        .await
        .unwrap();

    let names: Vec<_> = dataset.columns().filter_map(FormField::name).collect();
    assert_eq!(names, vec!["name", "balance", "secret"]);
    assert_eq!(dataset.len(), 2);
    assert!(dataset.is_paginated());
    assert_eq!(
        dataset.record_summary().as_deref(),
        Some("Records 26 - 50 of 52")
    );
    assert_eq!(
        dataset.page_links(),
        vec![PageLink::Page(1), PageLink::Page(2), PageLink::Page(3)]
    );

    let mut session = BindSession::new();
    let html = dataset.render(&mut session);
    assert!(html.contains("<th>Name</th>"));
    assert!(html.contains("<td>Alan</td>"));
    assert!(html.contains("<span class='money positive'>$1,200.50</span>"));
    assert!(html.contains("<li><a href=\"?page=1\">&laquo; Previous</a></li>"));
    assert!(html.contains("<li><span class=\"selected\">2</span></li>"));
}

#[tokio::test]
async fn test_source_failures_are_propagated() {
    let mut dataset = DataSet::new();
    let err = dataset
        .load(&People { fail: true }, &FieldRegistry::default())
        .await
        .unwrap_err();

    assert!(matches!(err, LoadError::Source(_)));
    assert_eq!(err.to_string(), "connection reset");
}

#[tokio::test]
async fn test_exporting_loaded_rows() {
    let mut dataset = DataSet::new();
    dataset
        .load(&People { fail: false }, &FieldRegistry::default())
        .await
        .unwrap();

    let mut session = BindSession::new();
    assert_eq!(
        dataset.export_csv(&mut session),
        "Name,Balance,Secret\nAda,\"$1,200.50\",x\nAlan,-$3.00,y\n"
    );
    assert_eq!(dataset.format_mode(), FormatMode::Html);
}

#[tokio::test]
async fn test_invisible_columns_are_exported_but_not_rendered() {
    let mut dataset = DataSet::new();
    dataset
        .load(&People { fail: false }, &FieldRegistry::default())
        .await
        .unwrap();

    let mut session = BindSession::new();
    let html = dataset.render(&mut session);
    assert!(!html.contains("Secret"));
    assert!(!html.contains("<td>x</td>"));
    assert!(html.contains("<td colspan='3'>Records 26 - 50 of 52</td>"));

    let records = dataset.export_records(&mut session);
    assert_eq!(records[0], vec!["Name", "Balance", "Secret"]);
    assert_eq!(records[1][2], "x");
    assert_eq!(records[2][2], "y");
}

#[test]
fn test_rows_bind_back_by_index() {
    let mut dataset = DataSet::new().with_child(FormField::text("name"));
    dataset.set_format_mode(FormatMode::Form);
    let mut session = BindSession::new();
    formwork::container::Bindable::set_value(
        &mut dataset,
        &json!([{"name": "Ada"}, {"name": "Alan"}]),
        &mut session,
    );

    let html = dataset.render(&mut session);
    assert!(html.contains("name='0[name]' type='text'"));
    assert!(html.contains("value='Alan'"));
    assert_eq!(
        formwork::container::Bindable::value(&dataset, None),
        json!([{"name": "Ada"}, {"name": "Alan"}])
    );
}
