use serde_json::Value;

/// A table cell as found in the scraped layout
///
/// The source wraps some scalars as `{"value": ...}`; everything else is
/// taken as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Scalar(&'a Value),
    Wrapped(&'a Value),
}

impl<'a> Cell<'a> {
    pub fn new(value: &'a Value) -> Self {
        match value.as_object().and_then(|obj| obj.get("value")) {
            Some(inner) => Cell::Wrapped(inner),
            None => Cell::Scalar(value),
        }
    }

    /// The scalar carried by the cell
    pub fn into_scalar(self) -> &'a Value {
        match self {
            Cell::Scalar(v) | Cell::Wrapped(v) => v,
        }
    }

    /// Textual form of the scalar; numbers are rendered, other shapes yield `None`
    pub fn text(self) -> Option<String> {
        match self.into_scalar() {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
