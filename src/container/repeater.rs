use serde_json::{Map, Value};

use super::{Bindable, Container, Node, ValidationMessages};
use crate::element::Element;
use crate::field::FormField;
use crate::format::FormatMode;
use crate::session::BindSession;
use crate::value::{entries, to_map};

/// A container rendering one copy of a prototype row per element of its value
///
/// Every row is a clone of the prototype (the proxy) whose name prefix is extended by the key
/// of the element it is bound to, so that `items[3][qty]` binds back to the element with key
/// `3`. Keys are used literally, they do not need to be contiguous integers.
#[derive(Clone, Debug)]
pub struct Repeater {
    pub(crate) element: Element,
    namespace: Option<String>,
    proxy: Box<Container>,
    value: Value,
    dynamic_add: bool,
    show_default: usize,
    validate_called: bool,
    messages: ValidationMessages,
    pub(crate) container_value: Map<String, Value>,
}

impl Default for Repeater {
    fn default() -> Self {
        Repeater::new(Container::hgroup())
    }
}

impl Repeater {
    pub fn new(proxy: Container) -> Self {
        let mut element = Element::new();
        // rows render at the indentation of the repeater itself
        element.child_indent = -1;

        Repeater {
            element,
            namespace: None,
            proxy: Box::new(proxy),
            value: Value::Array(Vec::new()),
            dynamic_add: false,
            show_default: 1,
            validate_called: false,
            messages: ValidationMessages::new(),
            container_value: Map::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.set_namespace(Some(namespace.into()));
        self
    }

    pub fn allow_dynamic_additions(mut self, allowed: bool) -> Self {
        self.dynamic_add = allowed;
        self
    }

    /// Set the minimum number of rows to render, padding with empty rows
    pub fn set_default_number(&mut self, number: usize) {
        self.show_default = number;
    }

    pub fn default_number(&self) -> usize {
        self.show_default
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn proxy(&self) -> &Container {
        &self.proxy
    }

    pub fn proxy_mut(&mut self) -> &mut Container {
        &mut self.proxy
    }

    pub(crate) fn into_proxy(self) -> Container {
        *self.proxy
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace.filter(|ns| !ns.is_empty());
    }

    pub fn format_mode(&self) -> FormatMode {
        self.element.format_mode
    }

    pub fn set_format_mode(&mut self, mode: FormatMode) {
        self.element.format_mode = mode;
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic_add
    }

    pub fn label(&self, full: bool) -> String {
        self.proxy.label(full)
    }

    /// Messages gathered from the rows on the last validation
    pub fn validation_messages(&self) -> &ValidationMessages {
        &self.messages
    }

    /// The bound value, as stored
    pub fn raw_value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn cascade(&mut self, session: &mut BindSession) {
        let proxy = &mut self.proxy.element;
        proxy.name_prefix = self.element.name_prefix.clone();
        if let Some(ns) = self.namespace.as_ref() {
            proxy.name_prefix.push(ns.clone());
        }
        proxy.indent = self.element.indent + self.element.child_indent;
        proxy.format_mode = self.element.format_mode;
        proxy.form = self.element.form.clone();
        self.proxy.container_value = self.container_value.clone();
        self.proxy.cascade(session);
    }

    /// The keyed elements of the value, one per row
    pub(crate) fn rows(&self) -> Vec<(String, Value)> {
        match self.proxy.namespace() {
            Some(ns) => entries(to_map(&self.value).get(ns).unwrap_or(&Value::Null)),
            None => entries(&self.value),
        }
    }

    /// Build the unbound prototype of a row
    ///
    /// The namespace of the proxy becomes part of the row prefix, rows are already narrowed to
    /// it.
    fn template(&self) -> Container {
        let mut template = (*self.proxy).clone();
        let mut prefix = self.element.name_prefix.clone();
        if let Some(ns) = self.namespace.as_ref() {
            prefix.push(ns.clone());
        }
        if let Some(ns) = template.take_namespace() {
            prefix.push(ns);
        }

        template.element.name_prefix = prefix;
        template.element.indent = self.element.indent + self.element.child_indent;
        template.element.format_mode = self.element.format_mode;
        template.element.form = self.element.form.clone();
        template
    }

    fn bind_row(
        template: &Container,
        key: &str,
        value: &Value,
        session: &mut BindSession,
    ) -> Container {
        let mut row = template.clone();
        row.element.name_prefix.push(key);
        row.set_value(value, session);
        row
    }

    /// Build one bound row per element of the value
    ///
    /// Once the repeater has been validated, rows are validated as they are built.
    pub fn instances(&self, session: &mut BindSession) -> Vec<Container> {
        let template = self.template();
        self.rows()
            .iter()
            .map(|(key, value)| {
                let mut row = Self::bind_row(&template, key, value, session);
                if self.validate_called {
                    row.validate(session);
                }
                row
            })
            .collect()
    }

    pub fn set_value(&mut self, value: &Value, _: &mut BindSession) {
        let value = match self.namespace.as_ref() {
            Some(ns) => to_map(value).get(ns).cloned().unwrap_or(Value::Null),
            None => value.clone(),
        };
        self.value = match value {
            Value::Null => Value::Array(Vec::new()),
            value => value,
        };
    }

    /// Read the rows back as a list, under the proxy namespace if it has one
    pub fn value(&self, mode: Option<FormatMode>) -> Value {
        let mut session = BindSession::new();
        let rows: Vec<Value> = self
            .instances(&mut session)
            .iter()
            .map(|row| row.value(mode))
            .collect();

        match self.proxy.namespace() {
            Some(ns) => Value::Object(Map::from_iter([(ns.to_string(), Value::from(rows))])),
            None => Value::from(rows),
        }
    }

    /// Validate every row, gathering their messages
    pub fn validate(&mut self, session: &mut BindSession) -> bool {
        self.validate_called = true;
        self.messages.clear();

        let template = self.template();
        let mut ok = true;
        for (key, value) in self.rows().iter() {
            let mut row = Self::bind_row(&template, key, value, session);
            ok = row.validate(session) && ok;
            self.messages.extend(row.validation_messages());
        }
        ok
    }

    /// Render one row per element, padded to the default number of rows
    ///
    /// With dynamic additions in form mode every row gets a remove button and a hidden template
    /// row is rendered for the client to copy. The template carries a placeholder token in its
    /// ids and name prefix that the client replaces with the key of the new row.
    pub fn render(&mut self, session: &mut BindSession) -> String {
        self.cascade(session);
        let dynamic = self.dynamic_add && self.element.format_mode == FormatMode::Form;

        let mut template = self.template();
        if dynamic {
            template.element.ensure_id();
            template.add_child(remove_button());
        }

        let mut rows = self.rows();
        let mut next = rows.len();
        while rows.len() < self.show_default {
            while rows.iter().any(|(key, _)| *key == next.to_string()) {
                next += 1;
            }
            rows.push((next.to_string(), Value::Object(Map::new())));
        }

        let mut out = String::new();
        for (key, value) in rows.iter() {
            let mut row = template.clone();
            row.element.name_prefix.push(key.as_str());
            if dynamic {
                let id = row.element.ensure_id();
                set_last_button_target(&mut row, &id);
            }
            row.set_value(value, session);
            if self.validate_called {
                row.validate(session);
            }
            out.push_str(&row.render(session));
        }

        if dynamic {
            let id = self.element.ensure_id();
            let token = format!("$|${id}$|$");
            let t = self.element.indentation();

            let mut row = template.clone();
            row.visit_elements_mut(&mut |element| {
                if let Some(child_id) = element.id() {
                    element
                        .attributes_mut()
                        .insert("id", format!("{child_id}-{token}"));
                }
            });
            let row_id = format!("{}-replace-{token}", row.element.ensure_id());
            row.element.attributes_mut().insert("id", row_id.as_str());
            set_last_button_target(&mut row, &row_id);
            row.set_value(&Value::Null, session);
            row.element.name_prefix.push(token.as_str());

            out.push_str(&format!(
                "{t}<div id='{id}-add-item' class='hidden move-me'>{}</div>",
                row.render(session)
            ));
            out.push_str(&format!(
                "{t}<div><button class='event' data-click-handler='addRepeatedItem' data-count='{}' data-which='{id}' data-icons='{{\"primary\": \"ui-icon-plus\"}}'>add new</button></div>",
                rows.len()
            ));
        }

        out
    }
}

fn remove_button() -> FormField {
    let mut button = FormField::button("");
    button.element.add_class("event");
    let attrs = button.element.attributes_mut();
    attrs.insert("data-click-handler", "removeRepeatedItem");
    attrs.insert("data-icons", "{\"primary\": \"ui-icon-minus\"}");
    button.set_raw_value(Value::from("remove"));
    button
}

/// Point the remove button, the last child of a row, at the row
fn set_last_button_target(row: &mut Container, id: &str) {
    if let Some(Node::Field(button)) = row.children_mut().last_mut() {
        button.element.attributes_mut().insert("data-which", id);
    }
}

impl Bindable for Repeater {
    fn render(&mut self, session: &mut BindSession) -> String {
        Repeater::render(self, session)
    }

    fn value(&self, mode: Option<FormatMode>) -> Value {
        Repeater::value(self, mode)
    }

    fn set_value(&mut self, value: &Value, session: &mut BindSession) {
        Repeater::set_value(self, value, session)
    }

    fn validate(&mut self, session: &mut BindSession) -> bool {
        Repeater::validate(self, session)
    }
}
