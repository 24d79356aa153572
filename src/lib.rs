#![cfg_attr(docsrs, feature(doc_cfg))]
//! formwork builds server-side HTML forms as trees of nodes that bind request data, validate it
//! and render it back as markup.
//!
//! A form is a tree. [Fields](`field::FormField`) are its leaves and hold a single value each,
//! [containers](`container::Container`) group fields and other containers and decide how their
//! children are laid out. A container may declare a namespace, which nests the values of its
//! descendants under that key when binding and reading values.
//!
//! # Features
//!
//! - Path based binding. Field names may use bracket dimensions (`people[0][name]`) and values are
//!   distributed to and collected from nested JSON documents.
//! - Validation. Every field carries an ordered chain of [validators](`validator::Validator`) and
//!   containers collect the messages of all their descendants in document order.
//! - Formatting. Values are rendered through [formatters](`format::Format`), one rendition per
//!   [format mode](`format::FormatMode`) (form inputs, HTML, export and raw values).
//! - Repeaters and data sets. A [Repeater](`container::Repeater`) renders a template once per
//!   entry of a list value, a [DataSet](`container::DataSet`) renders them as a paginated table.
//! - Submissions. A [Form](`container::Form`) recognizes its own submissions and hands valid ones
//!   to an asynchronous [SubmitHandler](`container::SubmitHandler`).
//!
//! # Binding values
//!
//! ```rust
//! use formwork::container::{Container, Form};
//! use formwork::field::FormField;
//! use formwork::validator::Numeric;
//! use serde_json::json;
//!
//! let mut address = Container::vgroup().with_namespace("address");
//! address.add_child(FormField::text("city").with_label("City"));
//!
//! let mut form = Form::new("signup")
//!     .with_child(FormField::text("name").with_label("Name").with_required(true))
//!     .with_child(FormField::text("age").with_label("Age").with_validator(Numeric))
//!     .with_child(address);
//!
//! form.set_value(&json!({"name": "Ada", "age": "x", "address": {"city": "London"}}));
//! assert!(!form.validate());
//! assert_eq!(form.validation_messages().len(), 1);
//!
//! assert_eq!(
//!     form.value(None),
//!     json!({"name": "Ada", "age": "x", "address": {"city": "London"}})
//! );
//! ```
//!
//! # Cascading
//!
//! The name prefix, indentation, format mode and owning form of a node are never set on the node
//! itself. They are pushed down by the nearest container whenever the tree is bound, validated or
//! rendered, so a node moved into another container takes the context of its new parent.
//!
//! Radio buttons are grouped by their full name within their form. The groups live in a
//! [BindSession](`session::BindSession`) owned by the form and passed down explicitly.
//!
//! # Logging
//!
//! The library uses the [tracing crate](https://crates.io/crates/tracing). Bound values are
//! logged at `debug` level, the changes a bind makes to a container value at `trace` level, and
//! submissions are handled within a `handle_form` span.

pub mod container;
pub mod element;
pub mod errors;
pub mod field;
pub mod format;
pub mod layout;
pub mod path;
pub mod session;
pub mod source;
pub mod validator;
pub mod value;

/// The types needed to build, bind and render most forms
pub mod prelude {
    pub use crate::container::{
        handler_fn, Bindable, Container, DataSet, Form, HtmlElement, Node, Repeater, Submission,
        SubmitHandler, ValidationMessages,
    };
    pub use crate::errors::*;
    pub use crate::field::{FieldRegistry, FormField};
    pub use crate::format::FormatMode;
    pub use crate::session::BindSession;
    pub use crate::source::{FieldDescriptor, RowSource};
    pub use crate::validator::Validator;
}
