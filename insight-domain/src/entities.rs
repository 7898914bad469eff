// Domain entities
pub mod alert;
pub mod analysis;
pub mod config;
pub mod event;
pub mod outcome;
pub mod pattern;

pub use alert::*;
pub use analysis::*;
pub use config::*;
pub use event::*;
pub use outcome::*;
pub use pattern::*;
