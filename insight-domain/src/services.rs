// Pure domain services
pub mod alert_rules;
pub mod classifier;

pub use alert_rules::*;
pub use classifier::*;
