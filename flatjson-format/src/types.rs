//! Container kind enumeration

use std::fmt;
use std::str::FromStr;

use crate::constants::{EMPTY_ARRAY, EMPTY_OBJECT};
use crate::error::FlatError;

/// Kind of a container line or of the document root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerKind {
    /// JSON object
    #[default]
    Object,
    /// JSON array
    Array,
}

impl ContainerKind {
    /// Name written to the `ROOT` header field.
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Object => "object",
            ContainerKind::Array => "array",
        }
    }

    /// Inline payload used when the container has no children.
    pub fn empty_literal(&self) -> &'static str {
        match self {
            ContainerKind::Object => EMPTY_OBJECT,
            ContainerKind::Array => EMPTY_ARRAY,
        }
    }

    /// `Array` when `is_array`, else `Object`.
    pub fn from_is_array(is_array: bool) -> Self {
        if is_array {
            ContainerKind::Array
        } else {
            ContainerKind::Object
        }
    }

    /// True for arrays.
    pub fn is_array(&self) -> bool {
        matches!(self, ContainerKind::Array)
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContainerKind {
    type Err = FlatError;

    fn from_str(s: &str) -> Result<Self, FlatError> {
        match s {
            "object" => Ok(ContainerKind::Object),
            "array" => Ok(ContainerKind::Array),
            other => Err(FlatError::MalformedHeader(format!(
                "unknown root kind '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_kind_names() {
        for kind in [ContainerKind::Object, ContainerKind::Array] {
            assert_eq!(kind.name().parse::<ContainerKind>().unwrap(), kind);
        }
        assert!("list".parse::<ContainerKind>().is_err());
    }

    #[test]
    fn test_empty_literals() {
        assert_eq!(ContainerKind::Object.empty_literal(), "{}");
        assert_eq!(ContainerKind::from_is_array(true).empty_literal(), "[]");
    }
}
