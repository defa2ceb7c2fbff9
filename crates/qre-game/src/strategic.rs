use super::GameError;
use super::Oracle;
use super::Shape;
use nalgebra::DMatrix;
use nalgebra::DVector;
use qre_core::Arbitrary;
use qre_core::Probability;
use qre_core::Utility;
use rand::Rng;

/// Payoff tables with more entries than this are refused.
pub const STRATEGIC_LIMIT: usize = 1 << 22;

/// A finite game in normal form.
///
/// Contingencies are enumerated with the first player's strategy varying
/// fastest, which is also the order of the `.nfg` payoff list. Payoffs are
/// stored contingency-major: `payoffs[c * players + p]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategic {
    shape: Shape,
    payoffs: Vec<Utility>,
}

impl Strategic {
    pub fn new(counts: Vec<usize>, payoffs: Vec<Utility>) -> Result<Self, GameError> {
        if counts.is_empty() {
            return Err(GameError::structure("a game needs at least one player"));
        }
        let contingencies = Self::contingencies_of(&counts)?;
        if payoffs.len() != contingencies * counts.len() {
            return Err(GameError::structure(format!(
                "expected {} payoffs for {} contingencies, found {}",
                contingencies * counts.len(),
                contingencies,
                payoffs.len()
            )));
        }
        if payoffs.iter().any(|u| !u.is_finite()) {
            return Err(GameError::structure("payoffs must be finite"));
        }
        Ok(Self {
            shape: Shape::from(counts),
            payoffs,
        })
    }

    /// Number of contingencies for the given strategy counts, refusing
    /// empty strategy sets and tables beyond [`STRATEGIC_LIMIT`] payoffs.
    pub fn contingencies_of(counts: &[usize]) -> Result<usize, GameError> {
        if counts.iter().any(|&k| k == 0) {
            return Err(GameError::structure("every player needs at least one strategy"));
        }
        counts
            .iter()
            .try_fold(1usize, |acc, &k| acc.checked_mul(k))
            .filter(|&c| c.saturating_mul(counts.len()) <= STRATEGIC_LIMIT)
            .ok_or_else(|| {
                GameError::structure(format!("payoff table for {:?} strategies is too large", counts))
            })
    }

    /// Two-player game from row and column payoff matrices, `a[r][c]` and `b[r][c]`.
    pub fn bimatrix(a: &[&[Utility]], b: &[&[Utility]]) -> Result<Self, GameError> {
        let rows = a.len();
        let cols = a.first().map(|r| r.len()).unwrap_or(0);
        if b.len() != rows || a.iter().chain(b.iter()).any(|r| r.len() != cols) {
            return Err(GameError::structure("bimatrix payoff tables differ in shape"));
        }
        let payoffs = (0..cols)
            .flat_map(|c| (0..rows).map(move |r| (r, c)))
            .flat_map(|(r, c)| [a[r][c], b[r][c]])
            .collect();
        Self::new(vec![rows, cols], payoffs)
    }

    /// Random payoffs in [-1, 1) for the given strategy counts.
    pub fn sample<R: Rng>(rng: &mut R, counts: Vec<usize>) -> Self {
        let n = counts.iter().product::<usize>() * counts.len();
        let payoffs = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
        Self {
            shape: Shape::from(counts),
            payoffs,
        }
    }

    pub fn players(&self) -> usize {
        self.shape.blocks()
    }
    pub fn contingencies(&self) -> usize {
        self.shape.sizes().iter().product()
    }
    pub fn payoff(&self, contingency: usize, player: usize) -> Utility {
        self.payoffs[contingency * self.players() + player]
    }
    /// Pure strategy of every player in a contingency.
    pub fn strategies(&self, contingency: usize) -> Vec<usize> {
        self.shape
            .sizes()
            .iter()
            .scan(contingency, |rest, &k| {
                let s = *rest % k;
                *rest /= k;
                Some(s)
            })
            .collect()
    }

    /// Product of the profile weights of a contingency, skipping some players.
    fn weight(&self, profile: &[Probability], strategies: &[usize], skip: &[usize]) -> Probability {
        strategies
            .iter()
            .enumerate()
            .filter(|(q, _)| !skip.contains(q))
            .map(|(q, &s)| profile[self.shape.offset(q) + s])
            .product()
    }
}

impl Oracle for Strategic {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn values(&self, profile: &[Probability]) -> DVector<Utility> {
        let mut values = DVector::zeros(self.shape.dimension());
        for c in 0..self.contingencies() {
            let strategies = self.strategies(c);
            for (p, &s) in strategies.iter().enumerate() {
                let w = self.weight(profile, &strategies, &[p]);
                values[self.shape.offset(p) + s] += w * self.payoff(c, p);
            }
        }
        values
    }

    fn derivatives(&self, profile: &[Probability]) -> DMatrix<Utility> {
        let n = self.shape.dimension();
        let mut jacobian = DMatrix::zeros(n, n);
        for c in 0..self.contingencies() {
            let strategies = self.strategies(c);
            for (p, &s) in strategies.iter().enumerate() {
                for (q, &t) in strategies.iter().enumerate().filter(|(q, _)| *q != p) {
                    let w = self.weight(profile, &strategies, &[p, q]);
                    let i = self.shape.offset(p) + s;
                    let k = self.shape.offset(q) + t;
                    jacobian[(i, k)] += w * self.payoff(c, p);
                }
            }
        }
        jacobian
    }
}

impl Arbitrary for Strategic {
    fn random() -> Self {
        let ref mut rng = rand::rng();
        let players = rng.random_range(2..=3);
        let counts = (0..players).map(|_| rng.random_range(2..=3)).collect();
        Self::sample(rng, counts)
    }
}
