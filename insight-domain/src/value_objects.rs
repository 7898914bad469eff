// Domain value objects
pub mod game_type;
pub mod identifiers;
pub mod risk_level;

pub use game_type::*;
pub use identifiers::*;
pub use risk_level::*;
