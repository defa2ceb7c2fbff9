//! Core type aliases, tuning constants, and runtime utilities for logit QRE tracing.
//!
//! This crate provides the foundational types and default parameters shared
//! by the game model, the path follower, and the command-line driver.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Logit precision parameter. Zero is uniform play, infinity is Nash.
pub type Lambda = f64;
/// Step lengths and accumulated distance along the branch.
pub type Arclength = f64;
/// Expected values and payoff derivatives.
pub type Utility = f64;
/// Mixed strategy weights and observed frequencies.
pub type Probability = f64;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and benchmarking.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// PREDICTOR STEP SIZE
// Arclength step h, adapted after every accepted or rejected step.
// ============================================================================
/// Initial step size along the tangent.
pub const STEP_START: Arclength = 0.03;
/// Step sizes below this abort the trace.
pub const STEP_MIN: Arclength = 1.0e-5;
/// Hard ceiling on the step size once the branch straightens out.
pub const STEP_MAX: Arclength = 1.0e4;
/// Maximum ratio by which h may shrink or grow in one step.
pub const MAX_DECEL: f64 = 1.1;
/// Default upper bound on λ.
pub const MAX_LAMBDA: Lambda = 1.0e6;

// ============================================================================
// NEWTON CORRECTOR
// Full Newton in the hyperplane orthogonal to the tangent.
// ============================================================================
/// Convergence threshold on the sup-norm of the Newton step and of the residual.
pub const CORRECTOR_TOLERANCE: f64 = 1.0e-8;
/// Newton iterations before the correction is declared divergent.
pub const CORRECTOR_ITERATIONS: usize = 10;
/// Largest acceptable Newton step. Larger steps mean the predictor left the basin.
pub const CORRECTOR_DISTANCE: f64 = 0.4;
/// Largest acceptable ratio between successive Newton step norms.
pub const CORRECTOR_CONTRACTION: f64 = 0.6;
/// Perturbation keeping the contraction ratio finite near convergence.
pub const CORRECTOR_ETA: f64 = 0.1;
/// Smallest pivot (after row equilibration) before a system counts as singular.
pub const PIVOT_MIN: f64 = 1.0e-13;

// ============================================================================
// TERMINATION
// ============================================================================
/// A block is pure once every other action falls below this probability.
pub const PURE_LIMIT: Probability = 1.0e-10;

// ============================================================================
// LIKELIHOOD SEARCH
// Golden-section search over a bracketed arc of the branch.
// ============================================================================
/// Width of the arclength bracket at which the search stops.
pub const SEARCH_TOLERANCE: Arclength = 1.0e-8;
/// Iteration cap for the golden-section search.
pub const SEARCH_ITERATIONS: usize = 100;

// ============================================================================
// OUTPUT
// ============================================================================
/// Digits after the decimal point in emitted profiles.
pub const DECIMALS: usize = 6;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize terminal logging on stderr.
/// Standard output is reserved for emitted profiles, so nothing is logged there.
#[cfg(feature = "logger")]
pub fn log(level: log::LevelFilter) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    let _ = simplelog::CombinedLogger::init(vec![term]);
}

/// Map a repeat count of `-v` flags onto a level filter.
pub fn verbosity(count: u8) -> log::LevelFilter {
    match count {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
