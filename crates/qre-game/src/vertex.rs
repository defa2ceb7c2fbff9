use qre_core::Probability;
use qre_core::Utility;

/// Payload of a game tree node.
///
/// Every vertex carries the payoff vector of the outcome attached to it
/// (zeros when there is none). Payoffs attached to interior nodes are
/// collected by every play passing through them.
#[derive(Debug, Clone, PartialEq)]
pub enum Vertex {
    /// Nature moves with fixed odds, one per outgoing edge.
    Chance {
        odds: Vec<Probability>,
        payoff: Vec<Utility>,
    },
    /// A player moves at the information set with the given block index.
    Decision { block: usize, payoff: Vec<Utility> },
    /// Play ends.
    Terminal { payoff: Vec<Utility> },
}

impl Vertex {
    pub fn payoff(&self) -> &[Utility] {
        match self {
            Self::Chance { payoff, .. } => payoff,
            Self::Decision { payoff, .. } => payoff,
            Self::Terminal { payoff } => payoff,
        }
    }
    pub fn block(&self) -> Option<usize> {
        match self {
            Self::Decision { block, .. } => Some(*block),
            _ => None,
        }
    }
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

/// A player's information set: the nodes it cannot tell apart share one
/// mixed action, which is one block of the agent profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Infoset {
    pub player: usize,
    pub label: String,
    pub actions: Vec<String>,
}

impl Infoset {
    pub fn new(player: usize, label: impl Into<String>, actions: Vec<String>) -> Self {
        Self {
            player,
            label: label.into(),
            actions,
        }
    }
    pub fn width(&self) -> usize {
        self.actions.len()
    }
}

impl std::fmt::Display for Infoset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}:{} {{{}}}", self.player + 1, self.label, self.actions.join(" "))
    }
}
