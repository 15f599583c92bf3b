//! Shared domain types for the Architect generation pipeline.
//!
//! Everything that crosses a component boundary lives here: the clarification
//! and specification model, generated files, ledger changes, the event surface
//! consumed by presentation layers, and the narrow capability traits the core
//! is handed at construction time (file writing, durable key/value storage).

pub mod cancel;
pub mod capability;
pub mod change;
pub mod events;
pub mod files;
pub mod outcome;
pub mod phase;
pub mod spec;

pub use cancel::CancellationToken;
pub use capability::{FileWriter, KeyValueStore, StoreError};
pub use change::{ChangeId, ChangeStatus, ChangeType, FileChange, NewChange};
pub use events::{EventBus, PipelineEvent};
pub use files::{FileStatus, GeneratedFile, StreamingProgress};
pub use outcome::IgnoredReason;
pub use phase::Phase;
pub use spec::{ClarificationAnswer, ClarificationOption, ClarificationQuestion, ProjectSpecification};
