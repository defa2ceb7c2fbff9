use super::GameError;
use super::Infoset;
use super::Oracle;
use super::Shape;
use super::Strategic;
use super::Vertex;
use nalgebra::DMatrix;
use nalgebra::DVector;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use qre_core::Probability;
use qre_core::Utility;

/// A finite game tree with perfect recall, played in agent form.
///
/// Nodes live in a petgraph `DiGraph` in prefix order, so every parent has a
/// smaller index than its children: ascending indices walk the tree
/// top-down and descending indices walk it bottom-up. Edges are labelled with
/// the action index they represent at their source.
///
/// Blocks of the agent profile are information sets, ordered by player and
/// then by the order the reader assigned them.
#[derive(Debug, Clone)]
pub struct Extensive {
    players: Vec<String>,
    graph: DiGraph<Vertex, usize>,
    infosets: Vec<Infoset>,
    children: Vec<Vec<NodeIndex>>,
    members: Vec<Vec<NodeIndex>>,
    shape: Shape,
}

/// What one pass over the tree yields for every information set:
/// reach-weighted action values and the total reach weight.
struct Tally {
    numerators: DVector<Utility>,
    weights: Vec<Probability>,
}

impl Extensive {
    pub fn new(
        players: Vec<String>,
        graph: DiGraph<Vertex, usize>,
        infosets: Vec<Infoset>,
    ) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::structure("a game needs at least one player"));
        }
        if graph.node_count() == 0 {
            return Err(GameError::structure("a game tree needs a root"));
        }
        let children = Self::adjacency(&graph)?;
        let mut members = vec![Vec::new(); infosets.len()];
        for node in graph.node_indices() {
            let vertex = &graph[node];
            let width = children[node.index()].len();
            if vertex.payoff().len() != players.len() {
                return Err(GameError::structure(format!(
                    "node {} has {} payoffs for {} players",
                    node.index(),
                    vertex.payoff().len(),
                    players.len()
                )));
            }
            match vertex {
                Vertex::Terminal { .. } if width > 0 => {
                    return Err(GameError::structure(format!(
                        "terminal node {} has children",
                        node.index()
                    )));
                }
                Vertex::Terminal { .. } => {}
                Vertex::Chance { odds, .. } => {
                    if odds.len() != width || width == 0 {
                        return Err(GameError::structure(format!(
                            "chance node {} has {} odds for {} children",
                            node.index(),
                            odds.len(),
                            width
                        )));
                    }
                    if odds.iter().any(|p| !p.is_finite() || *p < 0.0)
                        || (odds.iter().sum::<Probability>() - 1.0).abs() > 1e-9
                    {
                        return Err(GameError::structure(format!(
                            "chance odds at node {} are not a distribution",
                            node.index()
                        )));
                    }
                }
                Vertex::Decision { block, .. } => {
                    let infoset = infosets.get(*block).ok_or_else(|| {
                        GameError::structure(format!("node {} has unknown infoset", node.index()))
                    })?;
                    if infoset.player >= players.len() {
                        return Err(GameError::structure(format!(
                            "infoset {} belongs to unknown player {}",
                            infoset.label,
                            infoset.player + 1
                        )));
                    }
                    if infoset.width() != width || width == 0 {
                        return Err(GameError::structure(format!(
                            "node {} has {} children for {} actions",
                            node.index(),
                            width,
                            infoset.width()
                        )));
                    }
                    members[*block].push(node);
                }
            }
        }
        if let Some(b) = members.iter().position(|m| m.is_empty()) {
            return Err(GameError::structure(format!(
                "infoset {} has no nodes",
                infosets[b]
            )));
        }
        if infosets.windows(2).any(|w| w[0].player > w[1].player) {
            return Err(GameError::structure("infosets must be ordered by player"));
        }
        let shape = Shape::from(infosets.iter().map(Infoset::width).collect::<Vec<_>>());
        Ok(Self {
            players,
            graph,
            infosets,
            children,
            members,
            shape,
        })
    }

    /// Children of every node ordered by action, checking prefix order.
    fn adjacency(graph: &DiGraph<Vertex, usize>) -> Result<Vec<Vec<NodeIndex>>, GameError> {
        let mut children = vec![Vec::new(); graph.node_count()];
        let mut parents = vec![0usize; graph.node_count()];
        for edge in graph.raw_edges() {
            let (parent, child) = (edge.source(), edge.target());
            if parent.index() >= child.index() {
                return Err(GameError::structure(format!(
                    "node {} precedes its parent {}",
                    child.index(),
                    parent.index()
                )));
            }
            parents[child.index()] += 1;
            children[parent.index()].push((edge.weight, child));
        }
        if parents[0] > 0 || parents.iter().skip(1).any(|&p| p != 1) {
            return Err(GameError::structure("nodes do not form a rooted tree"));
        }
        children
            .into_iter()
            .enumerate()
            .map(|(i, mut edges)| {
                edges.sort_by_key(|(action, _)| *action);
                match edges.iter().enumerate().all(|(j, (action, _))| j == *action) {
                    true => Ok(edges.into_iter().map(|(_, child)| child).collect()),
                    false => Err(GameError::structure(format!(
                        "actions at node {} are not numbered consecutively",
                        i
                    ))),
                }
            })
            .collect()
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }
    pub fn infosets(&self) -> &[Infoset] {
        &self.infosets
    }
    pub fn infoset(&self, block: usize) -> &Infoset {
        &self.infosets[block]
    }
    /// Number of nodes in the tree.
    pub fn n(&self) -> usize {
        self.graph.node_count()
    }
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }
    pub fn vertex(&self, node: NodeIndex) -> &Vertex {
        &self.graph[node]
    }
    /// Children of a node, ordered by action.
    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.children[node.index()]
    }
    /// Nodes belonging to an information set.
    pub fn members(&self, block: usize) -> &[NodeIndex] {
        &self.members[block]
    }

    /// Probability of taking action j at a node under a behaviour profile.
    fn odds(&self, node: NodeIndex, j: usize, profile: &[Probability]) -> Probability {
        match &self.graph[node] {
            Vertex::Chance { odds, .. } => odds[j],
            Vertex::Decision { block, .. } => profile[self.shape.offset(*block) + j],
            Vertex::Terminal { .. } => unreachable!("terminal nodes have no actions"),
        }
    }

    /// Player moving at a node, if any.
    fn mover(&self, node: NodeIndex) -> Option<usize> {
        self.graph[node].block().map(|b| self.infosets[b].player)
    }

    /// Reach probability of every node contributed by chance and every
    /// player other than `excluded`, indexed by node.
    pub fn reach(&self, profile: &[Probability], excluded: Option<usize>) -> Vec<Probability> {
        let mut reach = vec![0.0; self.n()];
        reach[0] = 1.0;
        for node in self.graph.node_indices() {
            let own = excluded.is_some() && self.mover(node) == excluded;
            for (j, &child) in self.children(node).iter().enumerate() {
                reach[child.index()] = match own {
                    true => reach[node.index()],
                    false => reach[node.index()] * self.odds(node, j, profile),
                };
            }
        }
        reach
    }

    /// Expected payoff vector of the subtree below every node, indexed by node.
    pub fn expectations(&self, profile: &[Probability]) -> Vec<Vec<Utility>> {
        let mut values = vec![Vec::new(); self.n()];
        for node in self.graph.node_indices().rev() {
            let mut value = self.graph[node].payoff().to_vec();
            for (j, &child) in self.children(node).iter().enumerate() {
                let p = self.odds(node, j, profile);
                value
                    .iter_mut()
                    .zip(values[child.index()].iter())
                    .for_each(|(v, c)| *v += p * c);
            }
            values[node.index()] = value;
        }
        values
    }

    /// Expected payoff of every player at the root.
    pub fn payoffs(&self, profile: &[Probability]) -> Vec<Utility> {
        self.expectations(profile).swap_remove(0)
    }

    fn tally(&self, profile: &[Probability]) -> Tally {
        let reach = (0..self.players.len())
            .map(|i| self.reach(profile, Some(i)))
            .collect::<Vec<_>>();
        let values = self.expectations(profile);
        let mut numerators = DVector::zeros(self.shape.dimension());
        let mut weights = vec![0.0; self.shape.blocks()];
        for (b, infoset) in self.infosets.iter().enumerate() {
            let i = infoset.player;
            for &h in self.members(b) {
                let rho = reach[i][h.index()];
                weights[b] += rho;
                for (j, &child) in self.children(h).iter().enumerate() {
                    numerators[self.shape.offset(b) + j] += rho * values[child.index()][i];
                }
            }
        }
        Tally {
            numerators,
            weights,
        }
    }

    /// Profile with one block overwritten, by a unit vector or by zeros.
    fn substitute(&self, profile: &[Probability], block: usize, action: Option<usize>) -> Vec<Probability> {
        let mut altered = profile.to_vec();
        for (j, k) in self.shape.range(block).enumerate() {
            altered[k] = if Some(j) == action { 1.0 } else { 0.0 };
        }
        altered
    }

    /// Strategic form: each player's pure strategies are the Cartesian
    /// product of their information sets' actions, first infoset fastest.
    pub fn strategic(&self) -> Result<Strategic, GameError> {
        let owned = (0..self.players.len())
            .map(|i| {
                (0..self.infosets.len())
                    .filter(|&b| self.infosets[b].player == i)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let counts = owned
            .iter()
            .map(|blocks| {
                blocks.iter().try_fold(1usize, |acc, &b| {
                    acc.checked_mul(self.infosets[b].width())
                })
            })
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| GameError::structure("strategic form is too large"))?;
        let contingencies = Strategic::contingencies_of(&counts)?;
        log::debug!(
            "strategic form with {:?} strategies, {} contingencies",
            counts,
            contingencies
        );
        let mut payoffs = Vec::with_capacity(contingencies * self.players.len());
        let mut profile = vec![0.0; self.shape.dimension()];
        for c in 0..contingencies {
            profile.iter_mut().for_each(|p| *p = 0.0);
            let mut rest = c;
            for (i, blocks) in owned.iter().enumerate() {
                let mut strategy = rest % counts[i];
                rest /= counts[i];
                for &b in blocks {
                    let width = self.infosets[b].width();
                    profile[self.shape.offset(b) + strategy % width] = 1.0;
                    strategy /= width;
                }
            }
            payoffs.extend(self.payoffs(&profile));
        }
        Strategic::new(counts, payoffs)
    }
}

impl Oracle for Extensive {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn values(&self, profile: &[Probability]) -> DVector<Utility> {
        let Tally {
            mut numerators,
            weights,
        } = self.tally(profile);
        for (b, &weight) in weights.iter().enumerate() {
            for k in self.shape.range(b) {
                numerators[k] = if weight > 0.0 { numerators[k] / weight } else { 0.0 };
            }
        }
        numerators
    }

    /// Numerators and weights are affine in any single other block under
    /// perfect recall, so each partial derivative is the difference between
    /// that block set to a unit vector and that block set to zero.
    fn derivatives(&self, profile: &[Probability]) -> DMatrix<Utility> {
        let n = self.shape.dimension();
        let base = self.tally(profile);
        let mut jacobian = DMatrix::zeros(n, n);
        for other in 0..self.shape.blocks() {
            let zero = self.tally(&self.substitute(profile, other, None));
            for (j, column) in self.shape.range(other).enumerate() {
                let unit = self.tally(&self.substitute(profile, other, Some(j)));
                for b in (0..self.shape.blocks()).filter(|&b| b != other) {
                    let d = base.weights[b];
                    if d <= 0.0 {
                        continue;
                    }
                    let dd = unit.weights[b] - zero.weights[b];
                    for k in self.shape.range(b) {
                        let dn = unit.numerators[k] - zero.numerators[k];
                        jacobian[(k, column)] = (dn * d - base.numerators[k] * dd) / (d * d);
                    }
                }
            }
        }
        jacobian
    }
}
