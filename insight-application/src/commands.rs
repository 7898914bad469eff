pub mod alert_commands;
pub mod ingest_commands;

pub use alert_commands::*;
pub use ingest_commands::*;
