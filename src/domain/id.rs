//! Identifier newtypes.
//!
//! Ids are opaque strings on the wire. Freshly generated ids are UUID v4.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh unique id.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a [`crate::domain::MindMap`].
    MindMapId
);
impl MindMapId {
    /// True when the id can name a single file: no path separators, no
    /// `..` component and no leading dot.
    pub fn is_file_name_safe(&self) -> bool {
        let id = self.0.as_str();
        !self.is_empty()
            && !id.starts_with('.')
            && !id.contains(['/', '\\', '\0'])
            && !id.contains("..")
    }
}

string_id!(
    /// Identifier of a [`crate::domain::Node`].
    NodeId
);
string_id!(
    /// Identifier of an [`crate::domain::Edge`].
    EdgeId
);
string_id!(
    /// Identifier of a connection point in a node's handle config.
    HandleId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_two_generated_ids_when_compared_then_differ() {
        assert_ne!(NodeId::generate(), NodeId::generate());
    }

    #[test]
    fn given_whitespace_id_when_checked_then_is_empty() {
        assert!(EdgeId::new("  ").is_empty());
        assert!(!EdgeId::new("e1").is_empty());
    }

    #[test]
    fn given_map_ids_when_checked_then_only_plain_names_are_file_safe() {
        assert!(MindMapId::generate().is_file_name_safe());
        assert!(MindMapId::new("plan-2024_v1").is_file_name_safe());
        for bad in ["../../escaped", "a/b", "a\\b", "..", ".hidden", " ", "x..y"] {
            assert!(!MindMapId::new(bad).is_file_name_safe(), "{bad}");
        }
    }

    #[test]
    fn given_id_when_serialized_then_is_plain_string() {
        let json = serde_json::to_string(&NodeId::new("n1")).unwrap();
        assert_eq!(json, "\"n1\"");
    }
}
