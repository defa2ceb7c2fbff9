//! Predictor-corrector path following on the logit QRE correspondence.
//!
//! The branch starts at the centroid with λ = 0 and is followed in
//! arclength: predict along the tangent, pull back onto the branch with
//! Newton, adapt the step from how hard the pull was.
//!
//! # Module Structure
//!
//! - `logit` — The logit residual F(x, λ) and its Jacobian over any oracle
//! - `system` — Bordered linear solves (tangents and Newton steps)
//! - `corrector` — Newton projection back onto the branch
//! - `tracer` — The predictor-corrector loop and step adaptation
//! - `settings` — Tuning knobs with validated defaults
//! - `point` — Augmented state (x, λ)
//! - `likelihood` — Maximum likelihood search along the branch
//! - `sink` — Where accepted points go
//! - `error` — Rejections and fatal trace errors

mod corrector;
mod error;
mod likelihood;
mod logit;
mod point;
mod settings;
mod sink;
mod system;
mod tracer;

#[cfg(test)]
mod scenarios;

pub use corrector::*;
pub use error::*;
pub use likelihood::*;
pub use logit::*;
pub use point::*;
pub use settings::*;
pub use sink::*;
pub use system::*;
pub use tracer::*;
