use super::Bordered;
use super::Corrector;
use super::Likelihood;
use super::LogitMap;
use super::Observer;
use super::Point;
use super::Rejection;
use super::Settings;
use super::Sink;
use super::Tag;
use super::TraceError;
use nalgebra::DVector;
use qre_core::Arclength;

/// Why a trace stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// λ reached its upper bound.
    Lambda,
    /// Some action's probability fell below the pure limit.
    Pure,
}

/// What a finished trace reports back.
#[derive(Debug, Clone)]
pub struct Summary {
    pub steps: usize,
    pub rejections: usize,
    pub maxima: usize,
    pub termination: Termination,
    pub last: Point,
}

/// Predictor-corrector follower of one branch of a [`LogitMap`].
///
/// Each step predicts along the unit tangent, corrects with Newton in the
/// hyperplane orthogonal to it, and either accepts (new point, new tangent
/// bordered by the old one, larger step) or rejects (same point, smaller
/// step). Two singular rejections in a row, or a step below `step_min`,
/// end the trace.
pub struct Tracer<'map, M: LogitMap> {
    map: &'map M,
    settings: Settings,
    point: Point,
    tangent: DVector<f64>,
    step: Arclength,
    observer: Option<Observer>,
    steps: usize,
    rejections: usize,
}

impl<'map, M: LogitMap> Tracer<'map, M> {
    /// Start at the centroid with λ = 0.
    pub fn new(map: &'map M, settings: Settings) -> Result<Self, TraceError> {
        Self::resume(map, settings, map.origin())
    }

    /// Start at any point of the branch, heading toward increasing λ.
    pub fn resume(map: &'map M, settings: Settings, point: Point) -> Result<Self, TraceError> {
        settings.validate()?;
        let n = map.dimension();
        if n == 0 {
            return Err(TraceError::Empty);
        }
        if point.vector().len() != n + 1 || !point.is_admissible() {
            return Err(TraceError::Settings(format!(
                "starting point must be an admissible vector of length {}",
                n + 1
            )));
        }
        let jacobian = map.jacobian(point.vector());
        if jacobian.iter().any(|v| !v.is_finite()) {
            return Err(TraceError::Oracle {
                lambda: point.lambda(),
            });
        }
        let ref upward = DVector::from_fn(n + 1, |i, _| if i == n { 1.0 } else { 0.0 });
        let tangent = Bordered::tangent(&jacobian, upward).ok_or(TraceError::Singular)?;
        log::debug!(
            "tracing {} blocks, {} actions from lambda {}",
            map.shape().blocks(),
            n,
            point.lambda()
        );
        Ok(Self {
            step: settings.step_start,
            map,
            settings,
            point,
            tangent,
            observer: None,
            steps: 0,
            rejections: 0,
        })
    }

    /// Search the branch for likelihood maxima of observed frequencies.
    pub fn observe(mut self, likelihood: Likelihood) -> Self {
        self.observer = Some(Observer::from(likelihood));
        self
    }

    pub fn point(&self) -> &Point {
        &self.point
    }
    pub fn tangent(&self) -> &DVector<f64> {
        &self.tangent
    }
    pub fn step(&self) -> Arclength {
        self.step
    }

    /// Follow the branch until λ_max, the pure limit, or failure.
    pub fn trace<S: Sink>(mut self, sink: &mut S) -> Result<Summary, TraceError> {
        let settings = self.settings.clone();
        let corrector = Corrector::new(self.map, &settings);
        let mut singular = 0;
        if settings.full_graph {
            sink.emit(Tag::Branch, &self.point)?;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.sample(&corrector, &self.point, &self.tangent, sink)?;
        }
        let termination = loop {
            if self.point.lambda() >= settings.max_lambda {
                break Termination::Lambda;
            }
            if self.map.shape().touches_boundary(self.point.profile(), settings.pure_limit) {
                break Termination::Pure;
            }
            match self.attempt(&corrector) {
                Ok(decel) => {
                    singular = 0;
                    self.steps += 1;
                    self.step = (self.step / decel.min(settings.max_decel)).min(settings.step_max);
                    log::debug!(
                        "step {:>5} lambda {:<14.6} next step {:.3e}",
                        self.steps,
                        self.point.lambda(),
                        self.step
                    );
                    if settings.full_graph {
                        sink.emit(Tag::Branch, &self.point)?;
                    }
                    if let Some(observer) = self.observer.as_mut() {
                        observer.sample(&corrector, &self.point, &self.tangent, sink)?;
                    }
                }
                Err(Rejection::NonFinite) => {
                    return Err(TraceError::Oracle {
                        lambda: self.point.lambda(),
                    });
                }
                Err(rejection) => {
                    self.rejections += 1;
                    self.step /= settings.max_decel;
                    singular = match rejection {
                        Rejection::Singular => singular + 1,
                        _ => 0,
                    };
                    log::trace!(
                        "rejected at lambda {:.6}: {}, step now {:.3e}",
                        self.point.lambda(),
                        rejection,
                        self.step
                    );
                    if self.step < settings.step_min || singular >= 2 {
                        log::warn!(
                            "step underflow at lambda {} after {} steps",
                            self.point.lambda(),
                            self.steps
                        );
                        if !settings.full_graph {
                            sink.emit(Tag::Branch, &self.point)?;
                        }
                        if let Some(observer) = self.observer.as_ref() {
                            observer.finish(sink)?;
                        }
                        return Err(TraceError::StepUnderflow {
                            lambda: self.point.lambda(),
                            step: self.step,
                            cause: rejection,
                        });
                    }
                }
            }
        };
        log::info!(
            "trace ended ({:?}) at lambda {} after {} steps, {} rejections",
            termination,
            self.point.lambda(),
            self.steps,
            self.rejections
        );
        if !settings.full_graph {
            sink.emit(Tag::Branch, &self.point)?;
        }
        if let Some(observer) = self.observer.as_ref() {
            observer.finish(sink)?;
        }
        Ok(Summary {
            steps: self.steps,
            rejections: self.rejections,
            maxima: self.observer.as_ref().map(Observer::maxima).unwrap_or(0),
            termination,
            last: self.point,
        })
    }

    /// One predictor-corrector step. On success the tracer has moved and
    /// the corrector's deceleration factor is returned.
    fn attempt(&mut self, corrector: &Corrector<'_, M>) -> Result<f64, Rejection> {
        let predicted = self.point.vector() + &self.tangent * self.step;
        if !Point::admits(&predicted) {
            return Err(Rejection::Positivity);
        }
        let corrected = corrector.project(predicted, &self.tangent)?;
        let jacobian = self.map.jacobian(&corrected.point);
        if jacobian.iter().any(|v| !v.is_finite()) {
            return Err(corrector.breakdown(&corrected.point));
        }
        let tangent = Bordered::tangent(&jacobian, &self.tangent).ok_or(Rejection::Singular)?;
        debug_assert!(tangent.dot(&self.tangent) > 0.0);
        self.point = Point::from(corrected.point);
        self.tangent = tangent;
        Ok(corrected.decel)
    }
}
