/// Reasons a game text or game construction is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Unexpected token or malformed literal at a source line.
    Syntax { line: usize, message: String },
    /// Input does not start with a recognised `NFG`/`EFG` header.
    Header(String),
    /// Well-formed text describing an inconsistent game.
    Structure(String),
    /// Input ended before the game was complete.
    Truncated,
}

impl GameError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax { line, message } => write!(f, "syntax error on line {}: {}", line, message),
            Self::Header(found) => write!(f, "unrecognised game header: {}", found),
            Self::Structure(message) => write!(f, "invalid game: {}", message),
            Self::Truncated => write!(f, "unexpected end of game file"),
        }
    }
}

impl std::error::Error for GameError {}
