use super::Bordered;
use super::LogitMap;
use super::Point;
use super::Rejection;
use super::Settings;
use nalgebra::DVector;

/// A point pulled back onto the branch, with the deceleration factor
/// the pull suggests for the next step.
#[derive(Debug, Clone)]
pub struct Corrected {
    pub point: DVector<f64>,
    pub decel: f64,
    pub iterations: usize,
}

/// Newton projection onto {F = 0} inside the hyperplane orthogonal to a
/// tangent.
///
/// Every iteration recomputes the Jacobian and solves
/// `[JF; tᵀ] δ = (−F, 0)`. The Newton step lengths drive the deceleration
/// factor: long steps or weak contraction mean the predictor went too far,
/// and the tracer shrinks the next step accordingly.
pub struct Corrector<'a, M: LogitMap> {
    map: &'a M,
    settings: &'a Settings,
}

impl<'a, M: LogitMap> Corrector<'a, M> {
    pub fn new(map: &'a M, settings: &'a Settings) -> Self {
        Self { map, settings }
    }

    pub fn map(&self) -> &M {
        self.map
    }
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Newton from `start` until both the last step and the residual are
    /// within `tolerance`. The contraction test only applies while the
    /// steps are still longer than `tolerance`.
    pub fn project(&self, start: DVector<f64>, tangent: &DVector<f64>) -> Result<Corrected, Rejection> {
        let s = self.settings;
        let mut y = start;
        let mut decel = 1.0 / s.max_decel;
        let mut previous = None::<f64>;
        for iteration in 1..=s.max_iterations {
            let f = self.residual(&y)?;
            let jacobian = self.map.jacobian(&y);
            if jacobian.iter().any(|v| !v.is_finite()) {
                return Err(self.breakdown(&y));
            }
            let delta = Bordered::new(&jacobian, tangent)
                .and_then(|system| system.solve(&-f, 0.0))
                .ok_or(Rejection::Singular)?;
            let distance = delta.amax();
            if distance >= s.max_distance {
                return Err(Rejection::Distance(distance));
            }
            decel = decel.max((distance / s.max_distance).sqrt() * s.max_decel);
            if let Some(last) = previous.filter(|_| distance > s.tolerance) {
                let contraction = distance / (last + s.tolerance * s.eta);
                if contraction > s.max_contraction {
                    return Err(Rejection::Contraction(contraction));
                }
                decel = decel.max((contraction / s.max_contraction).sqrt() * s.max_decel);
            }
            y += delta;
            if distance <= s.tolerance && self.residual(&y)?.amax() <= s.tolerance {
                return Ok(Corrected {
                    point: y,
                    decel,
                    iterations: iteration,
                });
            }
            previous = Some(distance);
        }
        Err(Rejection::Iterations)
    }

    /// Why the map stopped producing finite numbers at `y`. Probabilities
    /// underflowing past the pure limit count as a loss of positivity.
    pub fn breakdown(&self, y: &DVector<f64>) -> Rejection {
        let n = self.map.dimension();
        match y.iter().take(n).any(|&p| p < self.settings.pure_limit) {
            true => Rejection::Positivity,
            false => Rejection::NonFinite,
        }
    }

    /// Residual at an admissible point.
    fn residual(&self, y: &DVector<f64>) -> Result<DVector<f64>, Rejection> {
        if !Point::admits(y) {
            return Err(Rejection::Positivity);
        }
        let f = self.map.residual(y);
        match f.iter().all(|v| v.is_finite()) {
            true => Ok(f),
            false => Err(self.breakdown(y)),
        }
    }
}
