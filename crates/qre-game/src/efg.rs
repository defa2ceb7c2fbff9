use super::Cursor;
use super::Extensive;
use super::GameError;
use super::Infoset;
use super::Vertex;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use qre_core::Probability;
use qre_core::Utility;
use std::collections::HashMap;

/// Read a game tree in `.efg` text format.
///
/// Nodes come in prefix order. Information sets are identified by
/// `(player, number)` and the first occurrence of each must list its
/// actions; outcomes are defined on first use. Blocks of the resulting
/// agent profile are sorted by player, then by information set number.
pub fn efg(text: &str) -> Result<Extensive, GameError> {
    let ref mut cursor = Cursor::new(text)?;
    super::nfg::header(cursor, "EFG")?;
    let players = cursor.texts()?;
    cursor.maybe_text();
    let mut reader = Reader::new(players.len());
    let mut graph = DiGraph::<Vertex, usize>::new();
    // parents still waiting for children: (node, children expected, children seen)
    let mut pending = Vec::<(NodeIndex, usize, usize)>::new();
    loop {
        let (vertex, width) = reader.node(cursor)?;
        let node = graph.add_node(vertex);
        if let Some((parent, _, seen)) = pending.last_mut() {
            graph.add_edge(*parent, node, *seen);
            *seen += 1;
        }
        while let Some(&(_, expected, seen)) = pending.last() {
            if seen < expected {
                break;
            }
            pending.pop();
        }
        if width > 0 {
            pending.push((node, width, 0));
        }
        if pending.is_empty() {
            break;
        }
    }
    if !cursor.is_done() {
        return Err(GameError::syntax(cursor.line(), "nodes after the tree is complete"));
    }
    let infosets = reader.sort(&mut graph);
    log::debug!(
        "read game tree {:?} with {} nodes and {} infosets",
        players,
        graph.node_count(),
        infosets.len()
    );
    Extensive::new(players, graph, infosets)
}

/// Bookkeeping while reading nodes: infosets and outcomes seen so far.
struct Reader {
    players: usize,
    keys: Vec<(usize, usize)>,
    infosets: Vec<Infoset>,
    lookup: HashMap<(usize, usize), usize>,
    chance: HashMap<usize, Vec<Probability>>,
    outcomes: HashMap<usize, Vec<Utility>>,
}

impl Reader {
    fn new(players: usize) -> Self {
        Self {
            players,
            keys: Vec::new(),
            infosets: Vec::new(),
            lookup: HashMap::new(),
            chance: HashMap::new(),
            outcomes: HashMap::new(),
        }
    }

    /// One node line and the number of children that follow it.
    fn node(&mut self, cursor: &mut Cursor) -> Result<(Vertex, usize), GameError> {
        let line = cursor.line();
        let kind = cursor.word()?;
        cursor.text()?;
        match kind.as_str() {
            "t" => {
                let payoff = self.outcome(cursor)?;
                Ok((Vertex::Terminal { payoff }, 0))
            }
            "c" => {
                let number = cursor.integer()?;
                cursor.maybe_text();
                let odds = match cursor.at_open() {
                    true => {
                        let odds = self.lottery(cursor)?;
                        self.chance.entry(number).or_insert(odds).clone()
                    }
                    false => self.chance.get(&number).cloned().ok_or_else(|| {
                        GameError::syntax(line, format!("chance infoset {} has no actions", number))
                    })?,
                };
                let payoff = self.outcome(cursor)?;
                let width = odds.len();
                Ok((Vertex::Chance { odds, payoff }, width))
            }
            "p" => {
                let player = cursor.integer()?;
                if player == 0 || player > self.players {
                    return Err(GameError::syntax(line, format!("unknown player {}", player)));
                }
                let number = cursor.integer()?;
                let label = cursor.maybe_text().unwrap_or_default();
                let actions = match cursor.at_open() {
                    true => Some(cursor.texts()?),
                    false => None,
                };
                let key = (player - 1, number);
                let block = match (self.lookup.get(&key).copied(), actions) {
                    (Some(block), Some(actions)) if actions.len() != self.infosets[block].width() => {
                        return Err(GameError::syntax(
                            line,
                            format!("infoset {} redefined with {} actions", number, actions.len()),
                        ));
                    }
                    (Some(block), _) => block,
                    (None, Some(actions)) => {
                        self.lookup.insert(key, self.infosets.len());
                        self.keys.push(key);
                        self.infosets.push(Infoset::new(player - 1, label, actions));
                        self.infosets.len() - 1
                    }
                    (None, None) => {
                        return Err(GameError::syntax(
                            line,
                            format!("infoset {} of player {} has no actions", number, player),
                        ));
                    }
                };
                let payoff = self.outcome(cursor)?;
                let width = self.infosets[block].width();
                Ok((Vertex::Decision { block, payoff }, width))
            }
            other => Err(GameError::syntax(line, format!("unknown node type {}", other))),
        }
    }

    /// `{ "a" p "b" q … }`
    fn lottery(&self, cursor: &mut Cursor) -> Result<Vec<Probability>, GameError> {
        cursor.open()?;
        let mut odds = Vec::new();
        while !cursor.at_close() {
            cursor.text()?;
            odds.push(cursor.number()?);
        }
        cursor.close()?;
        Ok(odds)
    }

    /// Outcome index, followed by its definition on first use.
    fn outcome(&mut self, cursor: &mut Cursor) -> Result<Vec<Utility>, GameError> {
        let line = cursor.line();
        let index = cursor.integer()?;
        cursor.maybe_text();
        if cursor.at_open() {
            let payoff = cursor.numbers()?;
            if payoff.len() != self.players {
                return Err(GameError::syntax(
                    line,
                    format!("outcome {} has {} payoffs for {} players", index, payoff.len(), self.players),
                ));
            }
            if index == 0 {
                return Err(GameError::syntax(line, "outcome 0 is reserved for no payoff"));
            }
            self.outcomes.insert(index, payoff);
        }
        match index {
            0 => Ok(vec![0.0; self.players]),
            i => self
                .outcomes
                .get(&i)
                .cloned()
                .ok_or_else(|| GameError::syntax(line, format!("undefined outcome {}", i))),
        }
    }

    /// Reorder infosets by (player, number) and renumber the decision nodes.
    fn sort(self, graph: &mut DiGraph<Vertex, usize>) -> Vec<Infoset> {
        let mut order = (0..self.infosets.len()).collect::<Vec<_>>();
        order.sort_by_key(|&i| self.keys[i]);
        let mut remap = vec![0; order.len()];
        for (block, &i) in order.iter().enumerate() {
            remap[i] = block;
        }
        for vertex in graph.node_weights_mut() {
            if let Vertex::Decision { block, .. } = vertex {
                *block = remap[*block];
            }
        }
        let mut infosets = self.infosets.into_iter().map(Some).collect::<Vec<_>>();
        order
            .into_iter()
            .filter_map(|i| infosets[i].take())
            .collect()
    }
}
