//! Value transforms selected by output mode
//!
//! A [`Format`] implements `raw` as the canonical transform, the `html`, `form` and `export`
//! strategies fall back to it unless overridden. Formatters never abort a render: [`apply`]
//! catches failures at the boundary and degrades the value to null.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

mod datetime;
mod number;
mod text;

pub use datetime::*;
pub use number::*;
pub use text::*;

pub(crate) use number::grouped;

use crate::errors::{FormatError, UnknownFormatMode};

/// Output mode used when rendering or reading back values
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    /// Canonical storage value
    Raw,
    /// Display markup
    Html,
    /// Value suitable to re-populate an input
    #[default]
    Form,
    /// Flat tabular value
    Export,
}

impl Display for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatMode::Raw => "raw",
            FormatMode::Html => "html",
            FormatMode::Form => "form",
            FormatMode::Export => "export",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FormatMode {
    type Err = UnknownFormatMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(FormatMode::Raw),
            "html" => Ok(FormatMode::Html),
            "form" => Ok(FormatMode::Form),
            "export" => Ok(FormatMode::Export),
            other => Err(UnknownFormatMode(other.to_string())),
        }
    }
}

/// The kind of value a formatter produces
///
/// Record rows right-align every column whose formatter is not [`FormatKind::Text`] or
/// [`FormatKind::Boolean`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatKind {
    #[default]
    Text,
    Number,
    Money,
    Percentage,
    Date,
    Interval,
    Boolean,
}

impl FormatKind {
    pub fn is_right_aligned(&self) -> bool {
        matches!(
            self,
            FormatKind::Number
                | FormatKind::Money
                | FormatKind::Percentage
                | FormatKind::Date
                | FormatKind::Interval
        )
    }
}

/// Data available to a formatter besides the value itself
#[derive(Clone, Copy, Debug)]
pub struct FormatContext<'a> {
    /// The last value map pushed to the container holding the formatted field
    pub container_value: &'a Map<String, Value>,
}

impl<'a> FormatContext<'a> {
    pub fn new(container_value: &'a Map<String, Value>) -> Self {
        FormatContext { container_value }
    }
}

/// A value transform with one strategy per output mode
pub trait Format: Send + Sync + Debug {
    fn raw(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError>;

    fn html(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.raw(value, ctx)
    }

    fn form(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.raw(value, ctx)
    }

    fn export(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.raw(value, ctx)
    }

    fn kind(&self) -> FormatKind {
        FormatKind::Text
    }

    /// Run the strategy for the given mode
    fn format(
        &self,
        value: &Value,
        mode: FormatMode,
        ctx: &FormatContext,
    ) -> Result<Value, FormatError> {
        match mode {
            FormatMode::Raw => self.raw(value, ctx),
            FormatMode::Html => self.html(value, ctx),
            FormatMode::Form => self.form(value, ctx),
            FormatMode::Export => self.export(value, ctx),
        }
    }
}

/// Format a value, degrading to null if the formatter fails
pub fn apply(formatter: &dyn Format, value: &Value, mode: FormatMode, ctx: &FormatContext) -> Value {
    match formatter.format(value, mode, ctx) {
        Ok(formatted) => formatted,
        Err(err) => {
            warn!(formatter = ?formatter, %mode, "{err}");
            Value::Null
        }
    }
}

/// Returns the value unchanged in every mode
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Format for Identity {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(value.clone())
    }
}

type Callable = dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync;

/// Formats every mode through a caller supplied function
#[derive(Clone)]
pub struct FormatCallable(Arc<Callable>);

impl FormatCallable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        FormatCallable(Arc::new(f))
    }
}

impl Debug for FormatCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FormatCallable").finish()
    }
}

impl Format for FormatCallable {
    fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok((self.0)(value)?)
    }
}

/// Post-processing applied by a [`Chain`] to the output of its inner formatter
///
/// Every method receives the inner formatter's output for that mode. The defaults return it
/// unchanged, a decorator overrides only the modes it cares about.
pub trait Decorator: Send + Sync + Debug {
    fn raw(&self, chained: Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(chained)
    }

    fn html(&self, chained: Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(chained)
    }

    fn form(&self, chained: Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(chained)
    }

    fn export(&self, chained: Value, _: &FormatContext) -> Result<Value, FormatError> {
        Ok(chained)
    }
}

/// A formatter wrapping another one
#[derive(Debug)]
pub struct Chain<D> {
    inner: Arc<dyn Format>,
    decorator: D,
}

impl<D: Decorator> Chain<D> {
    pub fn new(inner: impl Format + 'static, decorator: D) -> Self {
        Chain {
            inner: Arc::new(inner),
            decorator,
        }
    }
}

impl<D: Decorator> Format for Chain<D> {
    fn raw(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.decorator.raw(self.inner.raw(value, ctx)?, ctx)
    }

    fn html(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.decorator.html(self.inner.html(value, ctx)?, ctx)
    }

    fn form(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.decorator.form(self.inner.form(value, ctx)?, ctx)
    }

    fn export(&self, value: &Value, ctx: &FormatContext) -> Result<Value, FormatError> {
        self.decorator.export(self.inner.export(value, ctx)?, ctx)
    }

    fn kind(&self) -> FormatKind {
        self.inner.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug)]
    struct Upper;

    impl Format for Upper {
        fn raw(&self, value: &Value, _: &FormatContext) -> Result<Value, FormatError> {
            Ok(json!(crate::value::to_text(value).to_uppercase()))
        }
    }

    #[test]
    fn it_defaults_every_mode_to_raw() {
        let map = Map::new();
        let ctx = FormatContext::new(&map);
        let value = json!("abc");
        for mode in [
            FormatMode::Raw,
            FormatMode::Html,
            FormatMode::Form,
            FormatMode::Export,
        ] {
            assert_eq!(apply(&Upper, &value, mode, &ctx), json!("ABC"));
        }
    }

    #[test]
    fn it_parses_and_serializes_format_modes() {
        assert_eq!("export".parse::<FormatMode>(), Ok(FormatMode::Export));
        assert!("pdf".parse::<FormatMode>().is_err());
        assert_eq!(serde_json::to_value(FormatMode::Html).unwrap(), json!("html"));
        assert_eq!(FormatMode::default(), FormatMode::Form);
    }

    #[test]
    fn it_degrades_failures_to_null() {
        let map = Map::new();
        let ctx = FormatContext::new(&map);
        let failing = FormatCallable::new(|_| Err(anyhow!("malformed")));
        assert_eq!(
            apply(&failing, &json!("x"), FormatMode::Html, &ctx),
            Value::Null
        );
    }

    #[derive(Debug)]
    struct Bold;

    impl Decorator for Bold {
        fn html(&self, chained: Value, _: &FormatContext) -> Result<Value, FormatError> {
            Ok(json!(format!("<b>{}</b>", crate::value::to_text(&chained))))
        }
    }

    #[test]
    fn it_chains_formatters() {
        let map = Map::new();
        let ctx = FormatContext::new(&map);
        let chain = Chain::new(Upper, Bold);
        assert_eq!(
            apply(&chain, &json!("a"), FormatMode::Html, &ctx),
            json!("<b>A</b>")
        );
        assert_eq!(apply(&chain, &json!("a"), FormatMode::Form, &ctx), json!("A"));
    }
}
