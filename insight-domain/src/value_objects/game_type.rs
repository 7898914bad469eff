// Game type value object
// Games with a dedicated classifier get their own variant, everything else is `Other`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GameType {
    Aviator,
    Mines,
    Roulette,
    Other(String),
}

impl GameType {
    pub fn as_str(&self) -> &str {
        match self {
            GameType::Aviator => "aviator",
            GameType::Mines => "mines",
            GameType::Roulette => "roulette",
            GameType::Other(name) => name.as_str(),
        }
    }
}

impl From<&str> for GameType {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "aviator" => GameType::Aviator,
            "mines" => GameType::Mines,
            "roulette" => GameType::Roulette,
            _ => GameType::Other(normalized),
        }
    }
}

impl From<String> for GameType {
    fn from(s: String) -> Self {
        GameType::from(s.as_str())
    }
}

impl From<GameType> for String {
    fn from(value: GameType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
