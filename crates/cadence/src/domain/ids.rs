//! Strongly typed entity identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "`")]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

entity_id!(
    /// Unique identifier for an issue
    IssueId
);
entity_id!(
    /// Unique identifier for a sprint
    SprintId
);
entity_id!(
    /// Unique identifier for a time log entry
    TimeLogId
);
entity_id!(
    /// Unique identifier for a project
    ProjectId
);
entity_id!(
    /// Unique identifier for a user
    UserId
);
entity_id!(
    /// Identifier of a board column, used as an issue's status
    StatusId
);
entity_id!(
    /// Unique identifier for a board
    BoardId
);
entity_id!(
    /// Unique identifier for a release
    ReleaseId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = IssueId::new("proj-a3f8");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"proj-a3f8\"");

        let parsed: SprintId = serde_json::from_str("\"sprint-00x1\"").unwrap();
        assert_eq!(parsed, SprintId::from("sprint-00x1"));
        assert_eq!(parsed.to_string(), "sprint-00x1");
    }
}
