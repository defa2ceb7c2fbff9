use qre_core::Arclength;
use qre_core::Lambda;

/// Why a single predictor-corrector step was turned down.
///
/// Rejections are recoverable: the tracer shrinks its step and tries again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// A probability left the open simplex, or λ went negative.
    Positivity,
    /// A Newton step at least this long.
    Distance(f64),
    /// Successive Newton steps shrank by less than required.
    Contraction(f64),
    /// Newton did not settle within the iteration cap.
    Iterations,
    /// The bordered system could not be solved reliably.
    Singular,
    /// Payoffs or residuals stopped being finite at an interior point.
    NonFinite,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positivity => write!(f, "positivity loss"),
            Self::Distance(d) => write!(f, "newton step {:.3e} too long", d),
            Self::Contraction(c) => write!(f, "contraction {:.3} too weak", c),
            Self::Iterations => write!(f, "newton did not converge"),
            Self::Singular => write!(f, "singular system"),
            Self::NonFinite => write!(f, "non-finite residual"),
        }
    }
}

/// Conditions that end a trace.
#[derive(Debug)]
pub enum TraceError {
    /// The step shrank below its floor, or the system stayed singular.
    StepUnderflow {
        lambda: Lambda,
        step: Arclength,
        cause: Rejection,
    },
    /// No tangent could be computed where the trace begins.
    Singular,
    /// The payoff oracle produced non-finite values at an interior point.
    Oracle { lambda: Lambda },
    /// The game has no actions to randomize over.
    Empty,
    /// A tuning knob is out of range.
    Settings(String),
    /// An observed frequency vector could not be used.
    Observation(String),
    /// The sink failed to take a point.
    Emission(std::io::Error),
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StepUnderflow {
                lambda,
                step,
                cause,
            } => write!(
                f,
                "step size underflow at lambda {} (step {:.3e}, last rejection: {})",
                lambda, step, cause
            ),
            Self::Singular => write!(f, "singular jacobian at the starting point"),
            Self::Oracle { lambda } => write!(f, "non-finite payoffs at lambda {}", lambda),
            Self::Empty => write!(f, "game has no strategies to trace"),
            Self::Settings(message) => write!(f, "invalid settings: {}", message),
            Self::Observation(message) => write!(f, "invalid observed frequencies: {}", message),
            Self::Emission(e) => write!(f, "failed to write point: {}", e),
        }
    }
}

impl std::error::Error for TraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Emission(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TraceError {
    fn from(e: std::io::Error) -> Self {
        Self::Emission(e)
    }
}
