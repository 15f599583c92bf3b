//! CLI command implementations.
//!
//! | Module    | Commands handled      |
//! |-----------|-----------------------|
//! | `run`     | `New`, `Resume`       |
//! | `project` | `Init`, `Status`      |
//! | `config`  | `Config`              |

pub mod config;
pub mod project;
pub mod run;

pub use config::cmd_config;
pub use project::{cmd_init, cmd_status};
pub use run::{cmd_new, cmd_resume};
