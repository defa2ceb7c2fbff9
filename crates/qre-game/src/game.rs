use super::Extensive;
use super::GameError;
use super::Oracle;
use super::Shape;
use super::Strategic;

/// A game read from text, in whichever representation the header names.
#[derive(Debug, Clone)]
pub enum Game {
    Strategic(Strategic),
    Extensive(Extensive),
}

impl Game {
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Extensive(_))
    }
    pub fn shape(&self) -> &Shape {
        match self {
            Self::Strategic(game) => game.shape(),
            Self::Extensive(game) => game.shape(),
        }
    }
}

impl From<Strategic> for Game {
    fn from(game: Strategic) -> Self {
        Self::Strategic(game)
    }
}

impl From<Extensive> for Game {
    fn from(game: Extensive) -> Self {
        Self::Extensive(game)
    }
}

impl TryFrom<&str> for Game {
    type Error = GameError;
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        match text.split_whitespace().next() {
            Some("NFG") => super::nfg(text).map(Self::from),
            Some("EFG") => super::efg(text).map(Self::from),
            Some(other) => Err(GameError::Header(other.to_string())),
            None => Err(GameError::Truncated),
        }
    }
}
