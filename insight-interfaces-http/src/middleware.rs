pub mod auth;
pub mod body;
pub mod client;

pub use auth::*;
pub use body::*;
pub use client::*;
