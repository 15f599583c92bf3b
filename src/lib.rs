pub mod architect_config;
pub mod clarify;
pub mod errors;
pub mod gates;
pub mod generate;
pub mod init;
pub mod ledger;
pub mod logging;
pub mod store;
pub mod ui;
pub mod workflow;
