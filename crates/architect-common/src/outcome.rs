use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an operation was ignored instead of taking effect.
///
/// Precondition violations never raise errors at component boundaries; they
/// come back as `Ignored(reason)` so callers and tests can assert on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    NoSpecification,
    SpecificationLocked,
    UnconfirmedSpecification,
    AlreadyGenerating,
    ChangeNotFound,
    NotPending,
    NotApproved,
    AlreadyApplied,
    NoRootLocation,
}

impl fmt::Display for IgnoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IgnoredReason::NoSpecification => "no specification exists yet",
            IgnoredReason::SpecificationLocked => "specification is already confirmed",
            IgnoredReason::UnconfirmedSpecification => "specification is not confirmed",
            IgnoredReason::AlreadyGenerating => "a generation run is already in progress",
            IgnoredReason::ChangeNotFound => "no change with that id",
            IgnoredReason::NotPending => "change is not pending",
            IgnoredReason::NotApproved => "change is not approved",
            IgnoredReason::AlreadyApplied => "change is already applied",
            IgnoredReason::NoRootLocation => "no root location to write to",
        };
        write!(f, "ignored: {}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_prefixed() {
        assert_eq!(
            IgnoredReason::NoRootLocation.to_string(),
            "ignored: no root location to write to"
        );
    }
}
