use super::TraceError;
use qre_core::*;

/// Tuning knobs of the path follower.
///
/// Defaults come from the constants in `qre-core`. Build with struct
/// update syntax and let [`Settings::validate`] catch nonsense before a
/// trace starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Initial predictor step.
    pub step_start: Arclength,
    /// Steps below this abort the trace.
    pub step_min: Arclength,
    /// Steps never grow beyond this.
    pub step_max: Arclength,
    /// Largest factor by which a step may grow or shrink at once.
    pub max_decel: f64,
    /// Tracing stops once λ reaches this.
    pub max_lambda: Lambda,
    /// Emit every accepted point, or only the last one.
    pub full_graph: bool,
    /// Newton convergence threshold.
    pub tolerance: f64,
    pub max_iterations: usize,
    pub max_distance: f64,
    pub max_contraction: f64,
    pub eta: f64,
    /// Tracing stops once any probability falls below this.
    pub pure_limit: Probability,
    pub search_tolerance: Arclength,
    pub search_iterations: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_start: STEP_START,
            step_min: STEP_MIN,
            step_max: STEP_MAX,
            max_decel: MAX_DECEL,
            max_lambda: MAX_LAMBDA,
            full_graph: true,
            tolerance: CORRECTOR_TOLERANCE,
            max_iterations: CORRECTOR_ITERATIONS,
            max_distance: CORRECTOR_DISTANCE,
            max_contraction: CORRECTOR_CONTRACTION,
            eta: CORRECTOR_ETA,
            pure_limit: PURE_LIMIT,
            search_tolerance: SEARCH_TOLERANCE,
            search_iterations: SEARCH_ITERATIONS,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), TraceError> {
        let positive = [
            ("step_start", self.step_start),
            ("step_min", self.step_min),
            ("step_max", self.step_max),
            ("tolerance", self.tolerance),
            ("max_distance", self.max_distance),
            ("max_contraction", self.max_contraction),
            ("eta", self.eta),
            ("pure_limit", self.pure_limit),
            ("search_tolerance", self.search_tolerance),
        ];
        if let Some((name, value)) = positive
            .iter()
            .find(|(_, v)| !v.is_finite() || *v <= 0.0)
        {
            return Err(TraceError::Settings(format!("{} must be positive, got {}", name, value)));
        }
        if !(self.max_lambda.is_finite() && self.max_lambda >= 0.0) {
            return Err(TraceError::Settings(format!(
                "max_lambda must be finite and non-negative, got {}",
                self.max_lambda
            )));
        }
        if !(self.step_min <= self.step_start && self.step_start <= self.step_max) {
            return Err(TraceError::Settings(format!(
                "step bounds out of order: {} <= {} <= {}",
                self.step_min, self.step_start, self.step_max
            )));
        }
        if !(self.max_decel.is_finite() && self.max_decel > 1.0) {
            return Err(TraceError::Settings(format!(
                "max_decel must exceed 1, got {}",
                self.max_decel
            )));
        }
        if self.max_contraction >= 1.0 || self.pure_limit >= 1.0 {
            return Err(TraceError::Settings(
                "max_contraction and pure_limit must be below 1".to_string(),
            ));
        }
        if self.max_iterations == 0 || self.search_iterations == 0 {
            return Err(TraceError::Settings("iteration caps must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let cases = [
            Settings {
                step_start: 0.0,
                ..Default::default()
            },
            Settings {
                step_start: 1.0e5,
                ..Default::default()
            },
            Settings {
                max_decel: 1.0,
                ..Default::default()
            },
            Settings {
                max_lambda: f64::NAN,
                ..Default::default()
            },
            Settings {
                max_iterations: 0,
                ..Default::default()
            },
        ];
        assert!(
            Settings {
                max_lambda: 0.0,
                ..Default::default()
            }
            .validate()
            .is_ok()
        );
        for settings in cases {
            assert!(matches!(settings.validate(), Err(TraceError::Settings(_))));
        }
    }
}
