use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow phases, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Input,
    Clarification,
    Generating,
    Review,
    Game,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Input => "input",
            Phase::Clarification => "clarification",
            Phase::Generating => "generating",
            Phase::Review => "review",
            Phase::Game => "game",
        };
        f.write_str(s)
    }
}
