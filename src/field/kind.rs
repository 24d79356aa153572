use serde_json::{Map, Value};

use crate::container::Container;
use crate::session::GroupKey;
use crate::value::{escape, loose_eq, to_text};

/// A selectable option of a [`FieldKind::Select`]
#[derive(Clone, Debug, PartialEq)]
pub struct SelectOption {
    pub id: Value,
    pub label: String,
}

impl SelectOption {
    pub fn new(id: impl Into<Value>, label: impl Into<String>) -> Self {
        SelectOption {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Options of a select field
#[derive(Clone, Debug, PartialEq)]
pub struct SelectOptions {
    pub options: Vec<SelectOption>,
    /// Text of the empty option rendered first
    pub default_text: Option<String>,
}

impl Default for SelectOptions {
    fn default() -> Self {
        SelectOptions {
            options: Vec::new(),
            default_text: Some("-- Select --".to_string()),
        }
    }
}

impl SelectOptions {
    /// Return the label of the option matching `value`
    ///
    /// A `__{label}__` key in the container value takes precedence, row sources use it to supply
    /// the display value of a foreign key directly.
    pub fn selected_label(
        &self,
        value: &Value,
        field_label: Option<&str>,
        container_value: &Map<String, Value>,
    ) -> Option<String> {
        if let Some(label) = field_label {
            if let Some(found) = container_value.get(&format!("__{label}__")) {
                return Some(to_text(found));
            }
        }

        self.options
            .iter()
            .find(|opt| loose_eq(&opt.id, value))
            .map(|opt| opt.label.clone())
    }

    pub(crate) fn render(&self, current: &Value) -> String {
        let mut out = String::new();
        if let Some(default) = self.default_text.as_ref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("<option value=''>{default}</option>"));
        }

        for opt in self.options.iter() {
            let selected = match current {
                Value::Array(list) => list.iter().any(|v| loose_eq(v, &opt.id)),
                v => loose_eq(v, &opt.id),
            };
            out.push_str(&format!(
                "<option value='{}'{}>{}</option>",
                escape(&to_text(&opt.id)),
                if selected { " selected='selected'" } else { "" },
                escape(&opt.label)
            ));
        }
        out
    }
}

/// Checked state of a checkbox, the field value holds the checked value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Checkbox {
    pub(crate) checked: bool,
    pub(crate) unchecked_value: Value,
}

/// State of a radio button
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Radio {
    pub(crate) checked: bool,
    pub(crate) checked_value: Value,
    pub(crate) group: Option<GroupKey>,
}

/// The closed set of field kinds
#[derive(Clone, Debug)]
pub enum FieldKind {
    /// `<input>` of the given type (text, password, number, email...)
    Input { input_type: String },
    Hidden,
    Textarea,
    Select(SelectOptions),
    Checkbox(Checkbox),
    Radio(Radio),
    /// Buttons are never bound and are not rendered in html mode unless `html_visible`
    Button { html_visible: bool },
    Span,
    Link { url: Option<String> },
    /// A field rendering only its tooltip, the value becomes the tooltip text
    Tooltip,
    /// A pair of Yes/No radio buttons
    YesNo(Box<Container>),
}

impl FieldKind {
    pub fn input(input_type: &str) -> Self {
        FieldKind::Input {
            input_type: input_type.to_string(),
        }
    }

    /// Return the `type` attribute for kinds rendered as `<input>`
    pub(crate) fn input_type(&self) -> Option<&str> {
        match self {
            FieldKind::Input { input_type } => Some(input_type),
            FieldKind::Hidden => Some("hidden"),
            FieldKind::Checkbox(_) => Some("checkbox"),
            FieldKind::Radio(_) => Some("radio"),
            _ => None,
        }
    }

    /// Checkboxes and radios render their label after the control
    pub fn is_switched(&self) -> bool {
        matches!(self, FieldKind::Checkbox(_) | FieldKind::Radio(_))
    }
}
