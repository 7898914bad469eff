pub mod alert_handlers;
pub mod analysis_handlers;
pub mod event_handlers;
pub mod ingest_handlers;
pub mod ops_handlers;
pub mod stats_handlers;

pub use alert_handlers::*;
pub use analysis_handlers::*;
pub use event_handlers::*;
pub use ingest_handlers::*;
pub use ops_handlers::*;
pub use stats_handlers::*;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            cached: None,
            timestamp: None,
        }
    }

    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = Some(cached);
        self
    }

    pub fn stamped(mut self) -> Self {
        self.timestamp = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<usize>,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            generated: None,
        }
    }
}
