pub mod alert_queries;
pub mod analysis_queries;
pub mod pattern_queries;
pub mod stats_queries;

pub use alert_queries::*;
pub use analysis_queries::*;
pub use pattern_queries::*;
pub use stats_queries::*;
