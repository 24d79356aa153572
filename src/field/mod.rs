//! Leaf nodes holding a single value
use serde_json::{Map, Value};
use std::sync::Arc;

mod kind;
mod registry;
mod render;

pub use kind::*;
pub use registry::*;

use crate::container::Container;
use crate::element::{generate_element_id, Element};
use crate::format::{
    apply, Format, FormatContext, FormatDateTime, FormatKind, FormatMode, FormatMoney,
    FormatPercentage, FormatYesNo,
};
use crate::layout::RadioCheck;
use crate::session::{BindSession, GroupKey};
use crate::source::FieldDescriptor;
use crate::validator::{Required, Validator, Zipcode};
use crate::value::{escape, is_empty, loose_eq, to_text};

/// A leaf of the form tree
///
/// A field owns its value, an optional formatter, an ordered validator chain and the
/// label/tooltip metadata used by layouts. The chain always starts with [`Required`].
#[derive(Debug)]
pub struct FormField {
    pub(crate) element: Element,
    pub(crate) kind: FieldKind,
    value: Value,
    label: Option<String>,
    tooltip: Option<String>,
    show_tooltip: bool,
    formatter: Option<Arc<dyn Format>>,
    validators: Vec<Arc<dyn Validator>>,
    required: bool,
    messages: Vec<String>,
    pub(crate) container_value: Map<String, Value>,
    ordering: i64,
    visible: bool,
    sortable: bool,
    ordinal_position: Option<usize>,
    meta: Option<FieldDescriptor>,
}

impl Clone for FormField {
    /// Clone the field
    ///
    /// The clone always gets a fresh id and is detached from any radio group, it joins a group
    /// again on the next cascade.
    fn clone(&self) -> Self {
        let mut element = self.element.clone();
        element.attributes_mut().insert("id", generate_element_id());

        let mut kind = self.kind.clone();
        if let FieldKind::Radio(radio) = &mut kind {
            radio.group = None;
        }

        FormField {
            element,
            kind,
            value: self.value.clone(),
            label: self.label.clone(),
            tooltip: self.tooltip.clone(),
            show_tooltip: self.show_tooltip,
            formatter: self.formatter.clone(),
            validators: self.validators.clone(),
            required: self.required,
            messages: self.messages.clone(),
            container_value: self.container_value.clone(),
            ordering: self.ordering,
            visible: self.visible,
            sortable: self.sortable,
            ordinal_position: self.ordinal_position,
            meta: self.meta.clone(),
        }
    }
}

impl FormField {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        let mut element = Element::new();
        if !name.is_empty() {
            element.attributes_mut().insert("name", name);
        }
        if let Some(input_type) = kind.input_type() {
            element.attributes_mut().insert("type", input_type);
        }
        element.ensure_id();

        FormField {
            element,
            kind,
            value: Value::Null,
            label: None,
            tooltip: None,
            show_tooltip: true,
            formatter: None,
            validators: vec![Arc::new(Required)],
            required: false,
            messages: Vec::new(),
            container_value: Map::new(),
            ordering: 0,
            visible: true,
            sortable: false,
            ordinal_position: None,
            meta: None,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldKind::input("text"))
    }

    pub fn hidden(name: &str) -> Self {
        Self::new(name, FieldKind::Hidden)
    }

    pub fn password(name: &str) -> Self {
        Self::new(name, FieldKind::input("password"))
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, FieldKind::input("number"))
    }

    pub fn money(name: &str) -> Self {
        let mut field = Self::number(name).with_formatter(FormatMoney);
        field.element.add_class("money right");
        field.element.attributes_mut().insert("step", "0.01");
        field
    }

    pub fn percentage(name: &str) -> Self {
        let mut field = Self::number(name).with_formatter(FormatPercentage);
        field.element.add_class("percentage right");
        field.element.attributes_mut().insert("step", "0.001");
        field
    }

    pub fn email(name: &str) -> Self {
        Self::new(name, FieldKind::input("email"))
    }

    pub fn date(name: &str) -> Self {
        let mut field = Self::text(name).with_formatter(FormatDateTime::new("%-m/%d/%Y"));
        field.element.add_class("calendar");
        field
    }

    pub fn zipcode(name: &str) -> Self {
        Self::text(name).with_validator(Zipcode)
    }

    pub fn textarea(name: &str) -> Self {
        Self::new(name, FieldKind::Textarea)
    }

    pub fn select(name: &str) -> Self {
        Self::new(name, FieldKind::Select(SelectOptions::default()))
    }

    /// A checkbox sending `1` when checked
    pub fn checkbox(name: &str) -> Self {
        let mut field = Self::new(name, FieldKind::Checkbox(Checkbox::default()));
        field.set_checked_value(Value::from(1));
        field
    }

    /// A radio button sending `checked_value` when selected
    pub fn radio(name: &str, checked_value: impl Into<Value>) -> Self {
        let mut field = Self::new(name, FieldKind::Radio(Radio::default()));
        field.set_checked_value(checked_value.into());
        field
    }

    pub fn button(name: &str) -> Self {
        let mut field = Self::new(name, FieldKind::Button { html_visible: false });
        field.element.attributes_mut().insert("type", "button");
        field
    }

    pub fn submit(name: &str) -> Self {
        let mut field = Self::button(name);
        field.element.attributes_mut().insert("type", "submit");
        field.value = Value::from("Submit");
        field
    }

    pub fn span(name: &str) -> Self {
        Self::new(name, FieldKind::Span)
    }

    pub fn link(name: &str) -> Self {
        Self::new(name, FieldKind::Link { url: None })
    }

    pub fn tooltip(name: &str) -> Self {
        Self::new(name, FieldKind::Tooltip)
    }

    /// A Yes/No radio pair submitting `1` or `0`
    pub fn yes_no(name: &str) -> Self {
        let mut radios = Container::hgroup().with_layout(RadioCheck::default());
        radios.add_child(Self::radio(name, 1).with_label("Yes"));
        radios.add_child(Self::radio(name, 0).with_label("No"));

        Self::new(name, FieldKind::YesNo(Box::new(radios))).with_formatter(FormatYesNo)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_formatter(mut self, formatter: impl Format + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.set_raw_value(value.into());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.element.add_class(class);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        if let FieldKind::Link { url: slot } = &mut self.kind {
            *slot = Some(url.into());
        }
        self
    }

    pub fn with_options<I, K, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<Value>,
        L: Into<String>,
    {
        self.set_options(
            options
                .into_iter()
                .map(|(id, label)| SelectOption::new(id, label))
                .collect(),
        );
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The local name of the field
    pub fn name(&self) -> Option<String> {
        self.element.name()
    }

    pub fn set_name(&mut self, name: &str) {
        self.element.attributes_mut().insert("name", name);
    }

    pub fn full_name(&self) -> Option<String> {
        self.element.full_name()
    }

    pub fn id(&self) -> String {
        self.element.id().unwrap_or_default()
    }

    /// Return the field value
    ///
    /// With a format mode the value goes through the formatter, without one the stored value
    /// is returned as is.
    pub fn value(&self, mode: Option<FormatMode>) -> Value {
        match &self.kind {
            FieldKind::Checkbox(checkbox) => {
                if checkbox.checked {
                    self.value.clone()
                } else {
                    checkbox.unchecked_value.clone()
                }
            }
            FieldKind::Select(options) => {
                if is_empty(&self.value) {
                    return Value::Null;
                }
                if mode == Some(FormatMode::Export) {
                    return options
                        .selected_label(&self.value, self.label.as_deref(), &self.container_value)
                        .map(Value::from)
                        .unwrap_or(Value::Null);
                }
                self.formatted(&self.value, mode)
            }
            _ => self.formatted(&self.value, mode),
        }
    }

    fn formatted(&self, value: &Value, mode: Option<FormatMode>) -> Value {
        match (mode, self.formatter.as_deref()) {
            (Some(mode), Some(formatter)) => apply(
                formatter,
                value,
                mode,
                &FormatContext::new(&self.container_value),
            ),
            _ => value.clone(),
        }
    }

    /// Html display of a value: formatted if the field has a formatter, escaped text otherwise
    pub(crate) fn display(&self, value: &Value) -> String {
        if self.formatter.is_some() {
            to_text(&self.formatted(value, Some(FormatMode::Html)))
        } else {
            escape(&to_text(value))
        }
    }

    /// Store a value without any binding semantics
    ///
    /// Unlike binding through a container, a checkbox does not compare the value against its
    /// checked value and a radio does not notify its group.
    pub fn set_raw_value(&mut self, value: Value) {
        if let FieldKind::Tooltip = self.kind {
            self.tooltip = Some(to_text(&value)).filter(|t| !t.is_empty());
        }
        self.value = value;
    }

    /// Bind a value to the field
    pub(crate) fn bind(&mut self, value: &Value, session: &mut BindSession) {
        match self.kind {
            FieldKind::Checkbox(_) => {
                let checked = loose_eq(value, &self.value);
                self.set_checked(checked);
            }
            FieldKind::Radio(_) => {
                self.cascade(session);
                self.value = value.clone();
                if let Some(key) = self.radio_group().cloned() {
                    session.radios_mut().assign(&key, value.clone());
                }
                self.sync_radio();
            }
            FieldKind::YesNo(_) => {
                self.cascade(session);
                if let FieldKind::YesNo(radios) = &mut self.kind {
                    if let Some(first) = radios.fields_mut().next() {
                        first.bind(value, session);
                    }
                }
                self.value = value.clone();
            }
            _ => self.set_raw_value(value.clone()),
        }
    }

    /// Re-resolve state that depends on the position of the field in the tree
    ///
    /// Radios join the group of their full name within their form and adopt the group value,
    /// a Yes/No pair cascades into its radios.
    pub(crate) fn cascade(&mut self, session: &mut BindSession) {
        let full_name = self.full_name().unwrap_or_default();
        let form = self.element.form.clone();
        let id = self.element.ensure_id();

        match &mut self.kind {
            FieldKind::Radio(radio) => {
                let key = GroupKey::new(form, full_name);
                session
                    .radios_mut()
                    .attach(&key, &id, radio.group.as_ref());
                radio.group = Some(key.clone());
                if let Some(current) = session.radios().current(&key) {
                    self.value = current.clone();
                }
                self.sync_radio();
            }
            FieldKind::YesNo(radios) => {
                radios.element.form = self.element.form.clone();
                radios.element.indent = self.element.indent;
                radios.element.name_prefix = self.element.name_prefix.clone();
                radios.element.format_mode = self.element.format_mode;
                radios.set_container_value(self.container_value.clone());
                radios.cascade(session);
            }
            _ => {}
        }
    }

    fn sync_radio(&mut self) {
        if let FieldKind::Radio(radio) = &mut self.kind {
            let checked = !self.value.is_null() && loose_eq(&self.value, &radio.checked_value);
            radio.checked = checked;
            self.sync_checked_attribute(checked);
        }
    }

    fn sync_checked_attribute(&mut self, checked: bool) {
        if checked {
            self.element.attributes_mut().insert("checked", "checked");
        } else {
            self.element.remove_attribute("checked");
        }
    }

    /// Set the value sent by a checkbox or radio when checked
    pub fn set_checked_value(&mut self, value: Value) {
        self.element
            .attributes_mut()
            .insert("value", to_text(&value));
        match &mut self.kind {
            FieldKind::Checkbox(_) => self.value = value,
            FieldKind::Radio(radio) => {
                radio.checked_value = value;
                self.sync_radio();
            }
            _ => {}
        }
    }

    /// Return the value sent by a checkbox or radio when checked
    pub fn checked_value(&self) -> Option<&Value> {
        match &self.kind {
            FieldKind::Checkbox(_) => Some(&self.value),
            FieldKind::Radio(radio) => Some(&radio.checked_value),
            _ => None,
        }
    }

    pub fn set_unchecked_value(&mut self, value: Value) {
        if let FieldKind::Checkbox(checkbox) = &mut self.kind {
            checkbox.unchecked_value = value;
        }
    }

    /// Check or uncheck a checkbox or radio
    pub fn set_checked(&mut self, checked: bool) {
        match &mut self.kind {
            FieldKind::Checkbox(checkbox) => checkbox.checked = checked,
            FieldKind::Radio(radio) => radio.checked = checked,
            _ => return,
        }
        self.sync_checked_attribute(checked);
    }

    pub fn is_checked(&self) -> bool {
        match &self.kind {
            FieldKind::Checkbox(checkbox) => checkbox.checked,
            FieldKind::Radio(radio) => radio.checked,
            _ => false,
        }
    }

    /// Return the radio group the field joined on its last cascade
    pub fn radio_group(&self) -> Option<&GroupKey> {
        match &self.kind {
            FieldKind::Radio(radio) => radio.group.as_ref(),
            _ => None,
        }
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        if let FieldKind::Select(select) = &mut self.kind {
            select.options = options;
        }
    }

    pub fn set_default_text(&mut self, text: Option<String>) {
        if let FieldKind::Select(select) = &mut self.kind {
            select.default_text = text;
        }
    }

    /// Allow a button to render in html mode
    pub fn set_html_visible(&mut self, visible: bool) {
        if let FieldKind::Button { html_visible } = &mut self.kind {
            *html_visible = visible;
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, FieldKind::Button { .. })
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, FieldKind::Hidden)
    }

    pub fn is_select(&self) -> bool {
        matches!(self.kind, FieldKind::Select(_))
    }

    /// Return the label
    ///
    /// The full label ends with a colon, unless the label already ends with `:` or `?`, and
    /// with `*` if the field is required.
    pub fn label(&self, full: bool) -> String {
        full_label(self.label.as_deref(), self.required, full)
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn tooltip_text(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = Some(tooltip.into());
    }

    pub fn show_tooltip(&mut self, show: bool) {
        self.show_tooltip = show;
    }

    pub fn render_tooltip(&self) -> String {
        match self.tooltip.as_deref() {
            Some(tooltip) if self.show_tooltip && !tooltip.is_empty() => {
                format!("<span class=\"tooltip\" title=\"{}\"></span>", escape(tooltip))
            }
            _ => String::new(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub fn formatter(&self) -> Option<&Arc<dyn Format>> {
        self.formatter.as_ref()
    }

    pub fn set_formatter(&mut self, formatter: Arc<dyn Format>) {
        self.formatter = Some(formatter);
    }

    /// The kind of value the field displays, used to align columns
    pub fn format_kind(&self) -> FormatKind {
        self.formatter
            .as_ref()
            .map(|f| f.kind())
            .unwrap_or_default()
    }

    pub fn add_validator(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    pub fn add_validation_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn validation_messages(&self) -> &[String] {
        &self.messages
    }

    pub fn container_value(&self) -> &Map<String, Value> {
        &self.container_value
    }

    /// Run the validator chain
    ///
    /// Messages and the `error` class are reset first. An optional field with an empty value
    /// (null or the empty string, `false` counts as a value) skips the chain entirely. The chain
    /// stops at the first failing validator.
    pub fn validate(&mut self) -> bool {
        self.messages.clear();
        self.element.remove_class("error");

        let value = self.value(None);
        if !self.required && is_empty(&value) {
            return true;
        }

        let validators = self.validators.clone();
        for validator in validators.iter() {
            if !validator.validate(self) {
                self.element.add_class("error");
                return false;
            }
        }
        true
    }

    pub fn ordering(&self) -> i64 {
        self.ordering
    }

    pub fn set_ordering(&mut self, ordering: i64) {
        self.ordering = ordering;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn set_sortable(&mut self, sortable: bool) {
        self.sortable = sortable;
    }

    pub fn ordinal_position(&self) -> Option<usize> {
        self.ordinal_position
    }

    pub fn set_ordinal_position(&mut self, position: Option<usize>) {
        self.ordinal_position = position;
    }

    /// The descriptor the field was built from, if any
    pub fn metadata(&self) -> Option<&FieldDescriptor> {
        self.meta.as_ref()
    }

    pub(crate) fn set_metadata(&mut self, meta: FieldDescriptor) {
        self.meta = Some(meta);
    }
}

/// Shared label rule of fields and containers
pub(crate) fn full_label(label: Option<&str>, required: bool, full: bool) -> String {
    let Some(label) = label.filter(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    if !full {
        return label.to_string();
    }

    let colon = if label.ends_with(':') || label.ends_with('?') {
        ""
    } else {
        ":"
    };
    let star = if required { "*" } else { "" };
    format!("{label}{colon}{star}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::Numeric;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_builds_full_labels() {
        let field = FormField::text("name").with_label("Name");
        assert_eq!(field.label(false), "Name");
        assert_eq!(field.label(true), "Name:");

        let field = FormField::text("ok").with_label("Ok?").with_required(true);
        assert_eq!(field.label(true), "Ok?*");

        assert_eq!(FormField::text("x").with_label("  ").label(true), "");
    }

    #[test]
    fn it_skips_validators_on_empty_optional_fields() {
        let mut field = FormField::text("age").with_validator(Numeric);
        field.set_raw_value(json!(""));
        assert!(field.validate());
        assert!(field.validation_messages().is_empty());

        field.set_required(true);
        assert!(!field.validate());
        assert!(field.element().has_class("error"));
        assert_eq!(field.validation_messages(), ["This is a required field."]);
    }

    #[test]
    fn it_validates_false_on_optional_fields() {
        let mut field = FormField::text("flag").with_validator(Numeric);
        field.set_raw_value(json!(false));
        assert!(!field.validate());
        assert_eq!(field.validation_messages(), ["Input field must be numeric"]);
    }

    #[test]
    fn it_resets_validation_state() {
        let mut field = FormField::text("age").with_validator(Numeric);
        field.set_raw_value(json!("abc"));
        assert!(!field.validate());

        field.set_raw_value(json!("12"));
        assert!(field.validate());
        assert!(!field.element().has_class("error"));
        assert!(field.validation_messages().is_empty());
    }

    #[test]
    fn it_stops_at_the_first_failing_validator() {
        let mut field = FormField::text("code")
            .with_validator(Numeric)
            .with_validator(crate::validator::MinLength::new(10));
        field.set_raw_value(json!("abc"));
        assert!(!field.validate());
        assert_eq!(field.validation_messages().len(), 1);
    }

    #[test]
    fn it_formats_values_only_when_asked() {
        let field = FormField::money("total").with_value("12.5");
        assert_eq!(field.value(None), json!("12.5"));
        assert_eq!(field.value(Some(FormatMode::Raw)), json!("12.50"));
        assert_eq!(field.value(Some(FormatMode::Export)), json!("$12.50"));
    }

    #[test]
    fn it_returns_the_checkbox_value_by_checked_state() {
        let mut field = FormField::checkbox("agree");
        field.set_unchecked_value(json!(0));
        assert_eq!(field.value(None), json!(0));

        let mut session = BindSession::new();
        field.bind(&json!("1"), &mut session);
        assert!(field.is_checked());
        assert_eq!(field.value(None), json!(1));
    }

    #[test]
    fn it_returns_select_labels_on_export() {
        let mut field = FormField::select("state").with_options([("ca", "California"), ("ny", "New York")]);
        assert_eq!(field.value(Some(FormatMode::Export)), Value::Null);

        field.set_raw_value(json!("ny"));
        assert_eq!(field.value(None), json!("ny"));
        assert_eq!(field.value(Some(FormatMode::Export)), json!("New York"));
    }

    #[test]
    fn it_assigns_fresh_ids_to_clones() {
        let field = FormField::text("name");
        let clone = field.clone();
        assert_ne!(field.id(), clone.id());
        assert!(!clone.id().is_empty());
    }

    #[test]
    fn it_uses_the_value_as_tooltip() {
        let mut field = FormField::tooltip("help");
        field.set_raw_value(json!("Some help"));
        assert_eq!(
            field.render_tooltip(),
            "<span class=\"tooltip\" title=\"Some help\"></span>"
        );
        field.show_tooltip(false);
        assert_eq!(field.render_tooltip(), "");
    }
}
