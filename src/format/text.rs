use serde_json::Value;

use super::{Chain, Decorator, Format, FormatContext, FormatKind};
use crate::errors::FormatError;
use crate::value::{escape, is_truthy, replace_macros, to_text};

/// Booleans, rendered as Yes/No in html
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatYesNo;

impl Format for FormatYesNo {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Bool(is_truthy(value)))
    }

    fn html(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        let html = match value {
            Value::Null => "",
            v if is_truthy(v) => "<span class='positive'>Yes</span>",
            _ => "<span class='negative'>No</span>",
        };
        Ok(Value::from(html))
    }

    fn export(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(Value::from(if is_truthy(value) { 1 } else { 0 }))
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Boolean
    }
}

/// Shortens long text in html, keeping the full text as a title
#[derive(Clone, Copy, Debug)]
pub struct FormatTruncate {
    length: usize,
}

impl Default for FormatTruncate {
    fn default() -> Self {
        FormatTruncate { length: 15 }
    }
}

impl FormatTruncate {
    pub fn new(length: usize) -> Self {
        FormatTruncate { length }
    }
}

impl Format for FormatTruncate {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(value.clone())
    }

    fn html(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let text = to_text(value);
        if text.is_empty() {
            return Ok(Value::from("&nbsp;"));
        }
        if text.chars().count() <= self.length {
            return Ok(Value::from(text));
        }

        let short: String = text.chars().take(self.length).collect();
        Ok(Value::from(format!(
            "<span title=\"{}\">{}<span class='null'>...</span></span>",
            escape(&text),
            escape(&short)
        )))
    }
}

/// Renders the value as a link, the url may reference container values as `{macros}`
#[derive(Clone, Debug)]
pub struct FormatLink {
    url: String,
}

impl FormatLink {
    pub fn new(url: impl Into<String>) -> Self {
        FormatLink { url: url.into() }
    }
}

impl Format for FormatLink {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(value.clone())
    }

    fn html(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::from(format!(
            "<a href='{}'>{}</a>",
            replace_macros(&self.url, ctx.container_value),
            escape(&to_text(value))
        )))
    }
}

// Byte range of the innermost text, between the last opening tag and the first closing tag
fn inner_text(html: &str) -> Option<(usize, usize)> {
    if !html.starts_with('<') {
        return None;
    }
    let to = html.find("</")?;
    let from = html[..to].rfind('>')? + 1;
    Some((from, to))
}

/// Wraps the text of the chained html output in a link
#[derive(Clone, Debug)]
pub struct LinkDecorator {
    url: String,
}

impl Decorator for LinkDecorator {
    fn html(&self, chained: Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        let html = to_text(&chained);
        let href = replace_macros(&self.url, ctx.container_value);
        let open = format!("<a href='{href}' class='inherit-color'>");

        let linked = match inner_text(&html) {
            Some((from, to)) => format!(
                "{}{open}{}</a>{}",
                &html[..from],
                &html[from..to],
                &html[to..]
            ),
            None => format!("{open}{html}</a>"),
        };

        Ok(Value::from(linked))
    }
}

/// A formatter whose html output is linked to a url
pub type ChainedLink = Chain<LinkDecorator>;

impl Chain<LinkDecorator> {
    pub fn link(inner: impl Format + 'static, url: impl Into<String>) -> Self {
        Chain::new(inner, LinkDecorator { url: url.into() })
    }
}
