//! Rendering strategies for the children of a container
//!
//! A layout turns the ordered children of a [`Container`] into markup. Layouts are stateless
//! beyond their configuration and are shared between clones of a container. They may adjust the
//! indentation of children while rendering but never their values or identity.
use std::fmt::Debug;

mod table;
mod tabset;

pub use table::*;
pub use tabset::*;

use crate::container::{Bindable, Container, Node};
use crate::session::BindSession;

/// Renders the children of a container
pub trait LayoutManager: Send + Sync + Debug {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String;
}

/// Wrap a control with its label
///
/// Switched controls (checkboxes and radios) are followed by their label instead of preceded.
fn labelled(label: &str, switched: bool, control: &str) -> String {
    if label.is_empty() {
        return control.to_string();
    }
    if switched {
        format!("<label>{control} {label}</label>")
    } else {
        format!("<label>{label} {control}</label>")
    }
}

/// Children on a single line, each field preceded by its label
#[derive(Clone, Copy, Debug)]
pub struct Horizontal {
    pub full_labels: bool,
}

impl Default for Horizontal {
    fn default() -> Self {
        Horizontal { full_labels: true }
    }
}

impl Horizontal {
    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }
}

impl LayoutManager for Horizontal {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        let mut out = format!(
            "{}<span{}>",
            container.element.indentation(),
            container.element.output_attributes(None)
        );

        for child in container.children_mut() {
            match child {
                Node::Field(field) => {
                    out.push_str(&field.element.indentation());
                    if field.is_hidden() {
                        out.push_str(&field.render(session));
                        continue;
                    }
                    let label = field.label(self.full_labels);
                    let control = field.render(session);
                    out.push_str(&labelled(&label, field.kind().is_switched(), &control));
                    out.push_str(&field.render_tooltip());
                }
                other => out.push_str(&other.render(session)),
            }
        }

        out.push_str("</span>");
        out
    }
}

/// Children stacked in a column, hidden fields rendered last
#[derive(Clone, Copy, Debug)]
pub struct Vertical {
    pub full_labels: bool,
}

impl Default for Vertical {
    fn default() -> Self {
        Vertical { full_labels: true }
    }
}

impl Vertical {
    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }
}

impl LayoutManager for Vertical {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        container.element.add_class("vgroup");
        let mut out = format!(
            "{}<div{}>",
            container.element.indentation(),
            container.element.output_attributes(None)
        );

        let mut lines = Vec::new();
        let mut hidden = String::new();
        for child in container.children_mut() {
            let t = child.element().indentation();
            match child {
                Node::Field(field) if field.is_hidden() => {
                    hidden.push_str(&t);
                    hidden.push_str(&field.render(session));
                }
                Node::Field(field) => {
                    let label = field.label(self.full_labels);
                    let control = field.render(session);
                    let mut line = if label.is_empty() {
                        format!("<label>{control}</label>")
                    } else {
                        labelled(&label, field.kind().is_switched(), &control)
                    };
                    line.push_str(&field.render_tooltip());
                    lines.push(line);
                }
                other => lines.push(format!("{}{t}", other.render(session))),
            }
        }

        out.push_str(&lines.join("<br>"));
        out.push_str(&hidden);
        out.push_str("</div>");
        out
    }
}

/// Radio buttons or checkboxes in a row, each followed by its label
#[derive(Clone, Copy, Debug, Default)]
pub struct RadioCheck {
    pub full_labels: bool,
}

impl RadioCheck {
    pub fn with_full_labels(mut self, full: bool) -> Self {
        self.full_labels = full;
        self
    }
}

impl LayoutManager for RadioCheck {
    fn render(&self, container: &mut Container, session: &mut BindSession) -> String {
        let mut out = String::from("<span class='radiocheck'>");
        for child in container.children_mut() {
            match child {
                Node::Field(field) => {
                    out.push_str(&field.element.indentation());
                    let label = field.label(self.full_labels);
                    let control = field.render(session);
                    out.push_str(&labelled(&label, true, &control));
                }
                other => out.push_str(&other.render(session)),
            }
        }
        out.push_str("</span>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FormField;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_renders_labels_before_controls() {
        let mut session = BindSession::new();
        let name = FormField::text("name").with_label("Name");
        let id = name.id();
        let mut container = Container::hgroup().with_child(name);

        assert_eq!(
            container.render(&mut session),
            format!("\n<span>\n\t<label>Name: <input name='name' type='text' id='{id}' /></label></span>")
        );
    }

    #[test]
    fn it_switches_labels_of_checkboxes() {
        let mut session = BindSession::new();
        let agree = FormField::checkbox("agree").with_label("Agree");
        let id = agree.id();
        let mut container = Container::hgroup()
            .with_layout(Horizontal::default().with_full_labels(false))
            .with_child(agree);

        assert!(container.render(&mut session).contains(&format!(
            "<label><input name='agree' type='checkbox' id='{id}' value='1' /> Agree</label>"
        )));
    }

    #[test]
    fn it_stacks_children_and_moves_hidden_fields_last() {
        let mut session = BindSession::new();
        let mut container = Container::vgroup();
        container.add_child(FormField::hidden("id").with_value(3));
        container.add_child(FormField::text("a").with_label("A"));
        container.add_child(FormField::text("b").with_label("B"));

        let html = container.render(&mut session);
        assert!(html.starts_with("\n<div class='vgroup'><label>A: <input"));
        assert!(html.contains("</label><br><label>B: <input"));
        assert!(html.ends_with("value='3' /></div>"));
    }

    #[test]
    fn it_renders_yes_no_pairs() {
        let mut session = BindSession::new();
        let mut container = Container::hgroup().with_child(FormField::yes_no("active"));
        container.set_value(&json!({"active": 1}), &mut session);

        let html = container.render(&mut session);
        assert!(html.contains("<span class='radiocheck'>"));
        assert!(html.contains("value='1' checked='checked' /> Yes</label>"));
        assert!(html.contains("value='0' /> No</label>"));
    }
}
