use serde_json::Value;

use super::Bindable;
use crate::element::Element;
use crate::format::FormatMode;
use crate::session::BindSession;

/// A decorative tag with literal content
///
/// Html elements take part in layout but are never bound and always valid.
#[derive(Clone, Debug)]
pub struct HtmlElement {
    pub(crate) element: Element,
    tag: String,
    content: String,
}

impl HtmlElement {
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        HtmlElement {
            element: Element::new(),
            tag: tag.into(),
            content: content.into(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.element.add_class(class);
        self
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

impl Bindable for HtmlElement {
    fn render(&mut self, _: &mut BindSession) -> String {
        format!(
            "{}<{tag}{}>{}</{tag}>",
            self.element.indentation(),
            self.element.attributes().render(),
            self.content,
            tag = self.tag
        )
    }

    fn value(&self, _: Option<FormatMode>) -> Value {
        Value::Null
    }

    fn set_value(&mut self, _: &Value, _: &mut BindSession) {}

    fn validate(&mut self, _: &mut BindSession) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::field::FormField;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn it_renders_literal_content() {
        let mut session = BindSession::new();
        let mut html = HtmlElement::new("p", "<em>Note</em>").with_class("hint");
        assert_eq!(html.render(&mut session), "\n<p class='hint'><em>Note</em></p>");
    }

    #[test]
    fn it_is_ignored_when_binding() {
        let mut session = BindSession::new();
        let mut root = Container::hgroup();
        root.add_child(HtmlElement::new("hr", ""));
        root.add_child(FormField::text("name"));
        root.set_value(&json!({"name": "Ada"}), &mut session);

        assert!(root.validate(&mut session));
        assert_eq!(root.value(None), json!({"name": "Ada"}));
    }
}
