use std::fmt::{self, Display};

use crate::errors::UsageError;
use crate::value::escape;

const CLASS: &str = "class";

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrValue {
    Text(String),
    Classes(Vec<String>),
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => write!(f, "{s}"),
            AttrValue::Classes(list) => write!(f, "{}", list.join(" ")),
        }
    }
}

/// Ordered map of markup attributes
///
/// The `class` attribute is a synthesized list managed through [`Attributes::add_class`] and
/// [`Attributes::remove_class`], it keeps the position where the first class was added.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Attributes(Vec<(String, AttrValue)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of an attribute
    pub fn get(&self, name: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    }

    /// Return true if the attribute is set
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Set an attribute, returning the previous value
    ///
    /// # Errors
    ///
    /// Fails with [`UsageError::ClassAttribute`] if `name` is `class`.
    pub fn set(
        &mut self,
        name: impl AsRef<str>,
        value: impl Into<String>,
    ) -> Result<Option<String>, UsageError> {
        if name.as_ref() == CLASS {
            return Err(UsageError::ClassAttribute);
        }
        Ok(self.insert(name, value))
    }

    // internal setter, callers guarantee `name` is not `class`
    pub(crate) fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> Option<String> {
        let value = AttrValue::Text(value.into());
        let existing = self.0.iter_mut().find(|(k, _)| k == name.as_ref());
        if let Some((_, v)) = existing {
            let old = v.to_string();
            *v = value;
            return Some(old);
        }
        self.0.push((name.as_ref().to_string(), value));
        None
    }

    /// Remove an attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        let (_, value) = self.0.remove(pos);
        Some(value.to_string())
    }

    /// Remove every attribute
    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn classes_mut(&mut self) -> &mut Vec<String> {
        if !self.contains(CLASS) {
            self.0
                .push((CLASS.to_string(), AttrValue::Classes(Vec::new())));
        }

        let slot = self
            .0
            .iter_mut()
            .find(|(k, _)| k == CLASS)
            .map(|(_, v)| v);

        match slot {
            Some(AttrValue::Classes(list)) => list,
            // the class slot is only ever created as a class list
            _ => unreachable!("class attribute is always a class list"),
        }
    }

    /// Add one or more whitespace separated classes
    pub fn add_class(&mut self, class: &str) {
        let list = self.classes_mut();
        for c in class.split_whitespace() {
            if !list.iter().any(|existing| existing == c) {
                list.push(c.to_string());
            }
        }
    }

    /// Remove one or more whitespace separated classes
    pub fn remove_class(&mut self, class: &str) {
        let removed: Vec<&str> = class.split_whitespace().collect();
        self.classes_mut().retain(|c| !removed.contains(&c.as_str()));
    }

    /// Return true if the class list contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.0.iter().any(|(k, v)| match v {
            AttrValue::Classes(list) if k == CLASS => list.iter().any(|c| c == class),
            _ => false,
        })
    }

    /// Iterate over attribute names and rendered values
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.to_string()))
    }

    /// Render the attributes as ` name='value'` pairs
    ///
    /// Values are escaped, except for `data-*` attributes which may carry JSON. An empty class
    /// list is omitted.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.0.iter() {
            if let AttrValue::Classes(list) = value {
                if list.is_empty() {
                    continue;
                }
            }
            let value = value.to_string();
            let value = if name.starts_with("data-") {
                value
            } else {
                escape(&value)
            };
            out.push_str(&format!(" {name}='{value}'"));
        }
        out
    }
}
