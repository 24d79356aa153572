//! Name paths for submitted form data
//!
//! A field named `contact[phones][]` under a container prefix `["person"]` is sent to the client as
//! `person[contact][phones][]`. The same encoding is used, in reverse, to find the slice of a
//! submitted payload that belongs to a field.
use jsonptr::{PointerBuf, Token};
use serde_json::Value;
use std::fmt::Display;
use std::ops::{Deref, DerefMut};

/// The ordered list of segments in a bracketed array name
///
/// `"a[b][c][]"` has the dimensions `["a", "b", "c", ""]`. An empty dimension means "append" and
/// terminates traversal of submitted data.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct Dimensions(Vec<String>);

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the dimensions of a bracketed name
    ///
    /// The leading segment before the first `[` becomes the first dimension.
    pub fn parse(name: &str) -> Self {
        let (lead, rest) = match name.find('[') {
            Some(pos) => name.split_at(pos),
            None => (name, ""),
        };

        let mut dims = Vec::new();
        if !lead.is_empty() {
            dims.push(lead.to_string());
        }

        // every `[` opens a dimension that runs up to the last `]` before the next `[`
        for piece in rest.split('[').skip(1) {
            if let Some(end) = piece.rfind(']') {
                dims.push(piece[..end].to_string());
            }
        }

        Dimensions(dims)
    }

    /// Build the encoded name for a local name under a prefix
    ///
    /// ```
    /// use formwork::path::Dimensions;
    ///
    /// let prefix = Dimensions::from(vec!["person", "3"]);
    /// assert_eq!(Dimensions::build_key(&prefix, "phones[]"), "person[3][phones][]");
    /// ```
    pub fn build_key(prefix: &Dimensions, name: impl IntoDimensions) -> String {
        let mut parts = prefix.clone();
        parts.extend(name.into_dimensions().0);
        parts.to_string()
    }

    /// Add a dimension at the end
    pub fn push(&mut self, dim: impl Into<String>) {
        self.0.push(dim.into());
    }

    /// Return a copy of the dimensions with `dim` appended
    pub fn with(&self, dim: impl Into<String>) -> Self {
        let mut dims = self.clone();
        dims.push(dim);
        dims
    }

    /// Convert the dimensions into a JSON pointer
    ///
    /// Traversal stops at the first empty dimension, the pointer only covers the keyed prefix.
    pub fn to_pointer(&self) -> PointerBuf {
        PointerBuf::from_tokens(
            self.0
                .iter()
                .take_while(|dim| !dim.is_empty())
                .map(|dim| Token::new(dim.as_str())),
        )
    }

    /// Find the value addressed by these dimensions in a submitted payload
    ///
    /// Returns null if any keyed dimension is missing. Malformed submissions are expected, so
    /// this never fails.
    pub fn resolve(&self, value: &Value) -> Value {
        let pointer = self.to_pointer();
        match pointer.resolve(value) {
            Ok(found) => found.clone(),
            Err(_) => Value::Null,
        }
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = self.0.iter();
        if let Some(first) = parts.next() {
            write!(f, "{first}")?;
        }
        for part in parts {
            write!(f, "[{part}]")?;
        }
        Ok(())
    }
}

impl Deref for Dimensions {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Dimensions {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<S: Into<String>> From<Vec<S>> for Dimensions {
    fn from(dims: Vec<S>) -> Self {
        Dimensions(dims.into_iter().map(Into::into).collect())
    }
}

impl From<Dimensions> for String {
    fn from(dims: Dimensions) -> String {
        dims.to_string()
    }
}

/// A local name given either as a bracketed string or as already parsed dimensions
pub trait IntoDimensions {
    fn into_dimensions(self) -> Dimensions;
}

impl IntoDimensions for &str {
    fn into_dimensions(self) -> Dimensions {
        Dimensions::parse(self)
    }
}

impl IntoDimensions for &String {
    fn into_dimensions(self) -> Dimensions {
        Dimensions::parse(self)
    }
}

impl IntoDimensions for Dimensions {
    fn into_dimensions(self) -> Dimensions {
        self
    }
}

impl IntoDimensions for &Dimensions {
    fn into_dimensions(self) -> Dimensions {
        self.clone()
    }
}
