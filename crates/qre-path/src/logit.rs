use super::Point;
use nalgebra::DMatrix;
use nalgebra::DVector;
use qre_game::Extensive;
use qre_game::Oracle;
use qre_game::Shape;
use qre_game::Strategic;

/// A smooth map F : ℝ^{n+1} → ℝ^n whose zero set contains the branch.
///
/// # Required Methods
///
/// - `shape()` — Block layout of the profile part of a point
/// - `residual()` — F(y), length n
/// - `jacobian()` — DF(y), n × (n+1), last column is ∂F/∂λ
///
/// # Provided Methods
///
/// - `dimension()` — n
/// - `origin()` — Centroid at λ = 0, where every branch starts
pub trait LogitMap {
    fn shape(&self) -> &Shape;
    fn residual(&self, point: &DVector<f64>) -> DVector<f64>;
    fn jacobian(&self, point: &DVector<f64>) -> DMatrix<f64>;

    fn dimension(&self) -> usize {
        self.shape().dimension()
    }
    fn origin(&self) -> Point {
        Point::origin(self.shape())
    }
}

/// The logit equilibrium system of a payoff oracle.
///
/// Each block contributes its simplex row `Σ x − 1` at the block's first
/// position, followed by one log-ratio row per non-pivot action:
/// `log x_j − log x_1 − λ (u_j − u_1)`.
#[derive(Debug, Clone)]
pub struct Logit<O: Oracle> {
    oracle: O,
}

/// Strategic form tracing, one block per player.
pub type StrategicLogit<'game> = Logit<&'game Strategic>;
/// Agent form tracing, one block per information set.
pub type AgentLogit<'game> = Logit<&'game Extensive>;

impl<O: Oracle> From<O> for Logit<O> {
    fn from(oracle: O) -> Self {
        Self { oracle }
    }
}

impl<O: Oracle> Logit<O> {
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
    fn split<'a>(&self, point: &'a DVector<f64>) -> (&'a [f64], f64) {
        let n = self.dimension();
        (&point.as_slice()[..n], point[n])
    }
}

impl<O: Oracle> LogitMap for Logit<O> {
    fn shape(&self) -> &Shape {
        self.oracle.shape()
    }

    fn residual(&self, point: &DVector<f64>) -> DVector<f64> {
        let shape = self.oracle.shape();
        let (x, lambda) = self.split(point);
        let u = self.oracle.values(x);
        let mut f = DVector::zeros(shape.dimension());
        for b in 0..shape.blocks() {
            let o = shape.offset(b);
            f[o] = x[shape.range(b)].iter().sum::<f64>() - 1.0;
            for i in shape.range(b).skip(1) {
                f[i] = x[i].ln() - x[o].ln() - lambda * (u[i] - u[o]);
            }
        }
        f
    }

    fn jacobian(&self, point: &DVector<f64>) -> DMatrix<f64> {
        let shape = self.oracle.shape();
        let n = shape.dimension();
        let (x, lambda) = self.split(point);
        let u = self.oracle.values(x);
        let du = self.oracle.derivatives(x);
        let mut jacobian = DMatrix::zeros(n, n + 1);
        for b in 0..shape.blocks() {
            let o = shape.offset(b);
            for k in shape.range(b) {
                jacobian[(o, k)] = 1.0;
            }
            for i in shape.range(b).skip(1) {
                for k in 0..n {
                    jacobian[(i, k)] = -lambda * (du[(i, k)] - du[(o, k)]);
                }
                jacobian[(i, i)] += 1.0 / x[i];
                jacobian[(i, o)] -= 1.0 / x[o];
                jacobian[(i, n)] = -(u[i] - u[o]);
            }
        }
        jacobian
    }
}
