//! Base model shared by every node of a form tree
use std::sync::atomic::{AtomicU64, Ordering};

mod attributes;

pub use attributes::*;

use crate::errors::UsageError;
use crate::format::FormatMode;
use crate::path::Dimensions;
use crate::session::FormId;

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Return a process-wide unique element id
///
/// ```
/// use formwork::element::generate_element_id;
///
/// let a = generate_element_id();
/// let b = generate_element_id();
/// assert!(a.starts_with("element"));
/// assert_ne!(a, b);
/// ```
pub fn generate_element_id() -> String {
    let id = ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("element{id}")
}

/// Attribute and cascade state common to fields and containers
///
/// The name prefix, indentation, format mode and owning form are assigned top-down by the
/// nearest container while cascading, a node never sets them on itself.
#[derive(Debug)]
pub struct Element {
    attributes: Attributes,
    pub(crate) indent: i32,
    pub(crate) child_indent: i32,
    pub(crate) name_prefix: Dimensions,
    pub(crate) format_mode: FormatMode,
    pub(crate) form: Option<FormId>,
}

impl Default for Element {
    fn default() -> Self {
        Element {
            attributes: Attributes::new(),
            indent: 0,
            child_indent: 1,
            name_prefix: Dimensions::new(),
            format_mode: FormatMode::default(),
            form: None,
        }
    }
}

impl Clone for Element {
    /// Clone the element
    ///
    /// An id may only be used once per document, a clone carrying an id gets a fresh one.
    fn clone(&self) -> Self {
        let mut attributes = self.attributes.clone();
        if attributes.contains("id") {
            attributes.insert("id", generate_element_id());
        }

        Element {
            attributes,
            indent: self.indent,
            child_indent: self.child_indent,
            name_prefix: self.name_prefix.clone(),
            format_mode: self.format_mode,
            form: self.form.clone(),
        }
    }
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name)
    }

    /// Set an attribute
    ///
    /// # Errors
    ///
    /// Fails with [`UsageError::ClassAttribute`] if `name` is `class`.
    pub fn set_attribute(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Result<Option<String>, UsageError> {
        self.attributes.set(name, value)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.clear();
    }

    pub fn add_class(&mut self, class: &str) {
        self.attributes.add_class(class);
    }

    pub fn remove_class(&mut self, class: &str) {
        self.attributes.remove_class(class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attributes.has_class(class)
    }

    /// Return the element id if one has been assigned
    pub fn id(&self) -> Option<String> {
        self.attributes.get("id")
    }

    /// Return the element id, generating one the first time it is requested
    pub fn ensure_id(&mut self) -> String {
        if let Some(id) = self.attributes.get("id") {
            return id;
        }
        let id = generate_element_id();
        self.attributes.insert("id", id.clone());
        id
    }

    /// The local (unprefixed) name of the element
    pub fn name(&self) -> Option<String> {
        self.attributes.get("name").filter(|n| !n.is_empty())
    }

    /// Return the full name of the element, including the prefix assigned by its containers
    pub fn full_name(&self) -> Option<String> {
        self.name()
            .map(|name| Dimensions::build_key(&self.name_prefix, name.as_str()))
    }

    pub fn name_prefix(&self) -> &Dimensions {
        &self.name_prefix
    }

    pub fn format_mode(&self) -> FormatMode {
        self.format_mode
    }

    pub fn form(&self) -> Option<&FormId> {
        self.form.as_ref()
    }

    pub fn indent(&self) -> i32 {
        self.indent
    }

    /// Return a newline followed by one tab per indentation level
    pub fn indentation(&self) -> String {
        let mut out = String::from("\n");
        out.push_str(&"\t".repeat(self.indent.max(0) as usize));
        out
    }

    /// Render the attributes for an opening tag
    ///
    /// In form mode the `name` attribute carries the full prefixed name, in every other mode it
    /// is left out. `value`, when given, is rendered as the `value` attribute.
    pub fn output_attributes(&self, value: Option<String>) -> String {
        let mut attrs = self.attributes.clone();
        match (self.format_mode, self.full_name()) {
            (FormatMode::Form, Some(full)) => {
                attrs.insert("name", full);
            }
            (FormatMode::Form, None) => {}
            _ => {
                attrs.remove("name");
            }
        }
        if let Some(value) = value {
            attrs.insert("value", value);
        }
        attrs.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn it_generates_ids_lazily() {
        let mut elem = Element::new();
        assert_eq!(elem.id(), None);

        let id = elem.ensure_id();
        assert!(id.starts_with("element"));
        assert_eq!(elem.ensure_id(), id);
    }

    #[test]
    fn it_regenerates_the_id_of_clones() {
        let mut elem = Element::new();
        let id = elem.ensure_id();
        elem.add_class("row");

        let clone = elem.clone();
        assert_ne!(clone.id(), Some(id));
        assert!(clone.has_class("row"));

        let bare = Element::new().clone();
        assert_eq!(bare.id(), None);
    }

    #[test]
    fn it_renders_the_full_name_only_in_form_mode() {
        let mut elem = Element::new();
        elem.attributes_mut().insert("name", "phones[]");
        elem.attributes_mut().insert("type", "text");
        elem.name_prefix = Dimensions::from(vec!["contacts", "2"]);

        assert_eq!(
            elem.output_attributes(None),
            " name='contacts[2][phones][]' type='text'"
        );

        elem.format_mode = FormatMode::Html;
        assert_eq!(elem.output_attributes(Some("x".into())), " type='text' value='x'");
    }

    #[test]
    fn it_indents_with_tabs() {
        let mut elem = Element::new();
        elem.indent = 2;
        assert_eq!(elem.indentation(), "\n\t\t");
        elem.indent = -1;
        assert_eq!(elem.indentation(), "\n");
    }
}
