//! Finite games as payoff oracles.
//!
//! The path follower only ever asks a game two questions: what is each
//! action worth against a mixed profile, and how do those values move
//! when the profile moves. This crate answers them for both
//! representations a game can come in.
//!
//! # Module Structure
//!
//! - `shape` — Block layout of a profile (one simplex per player or infoset)
//! - `oracle` — The payoff oracle contract
//! - `strategic` — Normal form games, one block per player
//! - `extensive` — Game trees, one block per information set (agent form)
//! - `vertex` — Node payloads of a game tree
//! - `lexer` — Tokens shared by the text readers
//! - `nfg` / `efg` — Readers for the strategic and extensive text formats
//! - `game` — Either representation, detected from the input header
//! - `error` — Rejected input

mod efg;
mod error;
mod extensive;
mod game;
mod lexer;
mod nfg;
mod oracle;
mod shape;
mod strategic;
mod vertex;

pub use efg::*;
pub use error::*;
pub use extensive::*;
pub use game::*;
pub use lexer::*;
pub use nfg::*;
pub use oracle::*;
pub use shape::*;
pub use strategic::*;
pub use vertex::*;
