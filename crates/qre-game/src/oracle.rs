use super::Shape;
use nalgebra::DMatrix;
use nalgebra::DVector;
use qre_core::Probability;
use qre_core::Utility;

/// Expected payoffs of every action against a mixed profile.
///
/// Implementors decide what a block is (a player's strategy set or an
/// information set) and expose that through [`Shape`]. Everything is
/// indexed by the flat profile position, so `values(x)[i]` is the payoff of
/// the action at position `i` when its block plays it for sure and every
/// other block plays according to `x`.
///
/// Both methods must be pure: equal inputs give bit-identical outputs.
pub trait Oracle {
    fn shape(&self) -> &Shape;

    /// Conditional expected payoff of every action, length n.
    fn values(&self, profile: &[Probability]) -> DVector<Utility>;

    /// Derivative of `values` with respect to the profile, n × n.
    /// Entries inside a diagonal block are zero since a block's own
    /// mixture never enters its conditional payoffs.
    fn derivatives(&self, profile: &[Probability]) -> DMatrix<Utility>;

    /// Dimension of the profile space.
    fn dimension(&self) -> usize {
        self.shape().dimension()
    }

    /// Uniform profile, the λ = 0 anchor of the branch.
    fn centroid(&self) -> Vec<Probability> {
        self.shape().centroid()
    }
}

impl<O> Oracle for &O
where
    O: Oracle + ?Sized,
{
    fn shape(&self) -> &Shape {
        (**self).shape()
    }
    fn values(&self, profile: &[Probability]) -> DVector<Utility> {
        (**self).values(profile)
    }
    fn derivatives(&self, profile: &[Probability]) -> DMatrix<Utility> {
        (**self).derivatives(profile)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::Rng;

    /// Random strictly interior profile, every weight bounded away from zero.
    pub fn interior<R: Rng>(rng: &mut R, shape: &Shape) -> Vec<Probability> {
        let mut profile = Vec::with_capacity(shape.dimension());
        for &k in shape.sizes() {
            let raw = (0..k)
                .map(|_| rng.random_range(0.1..1.0))
                .collect::<Vec<Probability>>();
            let sum = raw.iter().sum::<Probability>();
            profile.extend(raw.into_iter().map(|w| w / sum));
        }
        profile
    }

    /// Central finite differences of `values`, for checking analytic derivatives.
    pub fn numeric<O: Oracle>(oracle: &O, profile: &[Probability]) -> DMatrix<Utility> {
        let n = oracle.dimension();
        let h = 1e-6;
        let mut jacobian = DMatrix::zeros(n, n);
        for k in 0..n {
            let mut above = profile.to_vec();
            let mut below = profile.to_vec();
            above[k] += h;
            below[k] -= h;
            let delta = (oracle.values(&above) - oracle.values(&below)) / (2.0 * h);
            jacobian.set_column(k, &delta);
        }
        jacobian
    }

    /// Assert analytic and numeric derivatives agree off the diagonal blocks,
    /// and that diagonal blocks are exactly zero.
    pub fn agrees<O: Oracle>(oracle: &O, profile: &[Probability]) {
        let shape = oracle.shape();
        let exact = oracle.derivatives(profile);
        let approx = numeric(oracle, profile);
        for b in 0..shape.blocks() {
            for i in shape.range(b) {
                for k in 0..shape.dimension() {
                    if shape.range(b).contains(&k) {
                        assert_eq!(exact[(i, k)], 0.0, "diagonal block entry ({i}, {k})");
                    } else {
                        let scale = 1.0 + exact[(i, k)].abs();
                        assert!(
                            (exact[(i, k)] - approx[(i, k)]).abs() < 1e-5 * scale,
                            "entry ({i}, {k}): exact {} vs numeric {}",
                            exact[(i, k)],
                            approx[(i, k)]
                        );
                    }
                }
            }
        }
    }
}
