use serde_json::Value;

use super::{FieldKind, FormField};
use crate::container::Bindable;
use crate::format::FormatMode;
use crate::session::BindSession;
use crate::value::{escape, replace_macros, to_text};

impl FormField {
    /// The form mode text of the value, for the `value` attribute of inputs
    fn form_text(&self) -> Option<String> {
        match self.value(Some(FormatMode::Form)) {
            Value::Null => None,
            value => Some(to_text(&value)),
        }
    }

    fn render_input(&self) -> String {
        format!("<input{} />", self.element.output_attributes(self.form_text()))
    }

    /// Render the field markup for its current format mode
    pub fn render(&mut self, session: &mut BindSession) -> String {
        self.cascade(session);
        let html_mode = self.element.format_mode == FormatMode::Html;

        match &self.kind {
            FieldKind::Hidden => self.render_input(),
            FieldKind::Input { .. } => {
                if html_mode {
                    return self.display(&self.value);
                }
                self.render_input()
            }
            FieldKind::Checkbox(_) | FieldKind::Radio(_) => {
                if html_mode {
                    return self.display(&self.value(None));
                }
                // the value attribute already holds the checked value
                format!("<input{} />", self.element.output_attributes(None))
            }
            FieldKind::Textarea => {
                if html_mode {
                    return self.display(&self.value).replace('\n', "<br />\n");
                }
                format!(
                    "<textarea{}>{}</textarea>",
                    self.element.output_attributes(None),
                    escape(&to_text(&self.value))
                )
            }
            FieldKind::Select(options) => {
                if html_mode {
                    let label = options
                        .selected_label(&self.value, self.label.as_deref(), &self.container_value)
                        .map(Value::from)
                        .unwrap_or(Value::Null);
                    return self.display(&label);
                }
                format!(
                    "<select{}>{}</select>",
                    self.element.output_attributes(None),
                    options.render(&self.value)
                )
            }
            FieldKind::Button { html_visible } => {
                if html_mode && !html_visible {
                    return String::new();
                }
                format!(
                    "<button{}>{}</button>",
                    self.element.output_attributes(None),
                    escape(&to_text(&self.value))
                )
            }
            FieldKind::Span => format!(
                "<span{}>{}</span>",
                self.element.output_attributes(None),
                self.display(&self.value)
            ),
            FieldKind::Link { url } => {
                if self.value.is_null() {
                    return String::new();
                }
                match url {
                    None => self.display(&self.value),
                    Some(url) => format!(
                        "<a href='{}'{}>{}</a>",
                        escape(&replace_macros(url, &self.container_value)),
                        self.element.output_attributes(None),
                        self.display(&self.value)
                    ),
                }
            }
            FieldKind::Tooltip => self.render_tooltip(),
            FieldKind::YesNo(_) => {
                if html_mode {
                    return self.display(&self.value);
                }
                let FieldKind::YesNo(radios) = &mut self.kind else {
                    return String::new();
                };
                radios.render(session)
            }
        }
    }
}

impl Bindable for FormField {
    fn render(&mut self, session: &mut BindSession) -> String {
        FormField::render(self, session)
    }

    fn value(&self, mode: Option<FormatMode>) -> Value {
        FormField::value(self, mode)
    }

    fn set_value(&mut self, value: &Value, session: &mut BindSession) {
        self.bind(value, session)
    }

    fn validate(&mut self, _: &mut BindSession) -> bool {
        FormField::validate(self)
    }
}
