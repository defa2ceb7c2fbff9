use super::Corrector;
use super::LogitMap;
use super::Point;
use super::Sink;
use super::Tag;
use super::TraceError;
use nalgebra::DVector;
use qre_core::Arclength;
use qre_core::Probability;
use qre_game::Shape;
use std::collections::VecDeque;

/// Log-likelihood of an observed frequency vector under a profile,
/// `L(x) = Σ p*_i log x_i` over the entries with positive frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct Likelihood {
    observed: Vec<Probability>,
}

impl Likelihood {
    pub fn new(observed: Vec<Probability>, shape: &Shape) -> Result<Self, TraceError> {
        if observed.len() != shape.dimension() {
            return Err(TraceError::Observation(format!(
                "expected {} frequencies, found {}",
                shape.dimension(),
                observed.len()
            )));
        }
        if observed.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(TraceError::Observation(
                "frequencies must be finite and non-negative".to_string(),
            ));
        }
        Ok(Self { observed })
    }

    /// Comma-separated frequencies, surrounding whitespace ignored.
    pub fn parse(text: &str, shape: &Shape) -> Result<Self, TraceError> {
        let observed = text
            .trim()
            .split(',')
            .map(str::trim)
            .map(|s| {
                s.parse::<Probability>()
                    .map_err(|_| TraceError::Observation(format!("not a number: {:?}", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(observed, shape)
    }

    pub fn evaluate(&self, profile: &[Probability]) -> f64 {
        self.observed
            .iter()
            .zip(profile)
            .filter(|(p, _)| **p > 0.0)
            .map(|(p, x)| p * x.ln())
            .sum()
    }
}

/// An accepted point, its tangent, and its likelihood.
#[derive(Debug, Clone)]
struct Sample {
    point: DVector<f64>,
    tangent: DVector<f64>,
    value: f64,
}

/// Three consecutive samples whose likelihood rose then fell.
///
/// The arc between the outer samples is parameterized by
/// σ = (y − y₁)·t₁ around the middle sample, and each trial σ is projected
/// back onto the branch from `y₁ + σ t₁` inside the hyperplane orthogonal to
/// t₁.
#[derive(Debug, Clone)]
pub struct Bracket {
    anchor: DVector<f64>,
    tangent: DVector<f64>,
    value: f64,
    lower: Arclength,
    upper: Arclength,
}

impl Bracket {
    fn around(window: &VecDeque<Sample>) -> Self {
        let (before, middle, after) = (&window[0], &window[1], &window[2]);
        Self {
            lower: (&before.point - &middle.point).dot(&middle.tangent),
            upper: (&after.point - &middle.point).dot(&middle.tangent),
            anchor: middle.point.clone(),
            tangent: middle.tangent.clone(),
            value: middle.value,
        }
    }

    /// Golden-section search for the maximum, returning the best point seen.
    pub fn search<M: LogitMap>(
        &self,
        corrector: &Corrector<'_, M>,
        likelihood: &Likelihood,
    ) -> (DVector<f64>, f64) {
        let n = corrector.map().dimension();
        let tolerance = corrector.settings().search_tolerance;
        let iterations = corrector.settings().search_iterations;
        let mut best = (self.anchor.clone(), self.value);
        let mut probe = |sigma: Arclength| -> f64 {
            let start = &self.anchor + &self.tangent * sigma;
            match corrector.project(start, &self.tangent) {
                Ok(corrected) => {
                    let value = likelihood.evaluate(&corrected.point.as_slice()[..n]);
                    if value > best.1 {
                        best = (corrected.point, value);
                    }
                    value
                }
                Err(rejection) => {
                    log::trace!("likelihood probe at σ {:.3e} rejected: {}", sigma, rejection);
                    f64::NEG_INFINITY
                }
            }
        };
        let ratio = (5f64.sqrt() - 1.0) / 2.0;
        let (mut a, mut b) = (self.lower, self.upper);
        let mut c = b - ratio * (b - a);
        let mut d = a + ratio * (b - a);
        let mut fc = probe(c);
        let mut fd = probe(d);
        for _ in 0..iterations {
            if (b - a).abs() <= tolerance {
                break;
            }
            if fc >= fd {
                b = d;
                d = c;
                fd = fc;
                c = b - ratio * (b - a);
                fc = probe(c);
            } else {
                a = c;
                c = d;
                fc = fd;
                d = a + ratio * (b - a);
                fd = probe(d);
            }
        }
        best
    }
}

/// Watches the likelihood along the branch and reports every local maximum.
#[derive(Debug, Clone)]
pub struct Observer {
    likelihood: Likelihood,
    window: VecDeque<Sample>,
    best: Option<(Point, f64)>,
    maxima: usize,
}

impl From<Likelihood> for Observer {
    fn from(likelihood: Likelihood) -> Self {
        Self {
            likelihood,
            window: VecDeque::with_capacity(3),
            best: None,
            maxima: 0,
        }
    }
}

impl Observer {
    pub fn likelihood(&self) -> &Likelihood {
        &self.likelihood
    }
    /// Local maxima emitted so far.
    pub fn maxima(&self) -> usize {
        self.maxima
    }

    /// Take an accepted point. When the last three samples bracket a
    /// maximum, search it out and emit it.
    pub fn sample<M: LogitMap, S: Sink>(
        &mut self,
        corrector: &Corrector<'_, M>,
        point: &Point,
        tangent: &DVector<f64>,
        sink: &mut S,
    ) -> Result<(), TraceError> {
        let value = self.likelihood.evaluate(point.profile());
        self.consider(point.clone(), value);
        if self.window.len() == 3 {
            self.window.pop_front();
        }
        self.window.push_back(Sample {
            point: point.vector().clone(),
            tangent: tangent.clone(),
            value,
        });
        if let Some(bracket) = self.bracket() {
            let (vector, value) = bracket.search(corrector, &self.likelihood);
            let maximum = Point::from(vector);
            log::info!(
                "likelihood maximum {:.6} at lambda {:.6}",
                value,
                maximum.lambda()
            );
            self.consider(maximum.clone(), value);
            self.maxima += 1;
            sink.emit(Tag::Likelihood, &maximum)?;
        }
        Ok(())
    }

    /// Emit the best point seen if no maximum was ever bracketed.
    pub fn finish<S: Sink>(&self, sink: &mut S) -> Result<(), TraceError> {
        match (&self.best, self.maxima) {
            (Some((point, value)), 0) => {
                log::info!(
                    "no likelihood maximum bracketed, best {:.6} at lambda {:.6}",
                    value,
                    point.lambda()
                );
                sink.emit(Tag::Best, point)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn bracket(&self) -> Option<Bracket> {
        match self.window.len() {
            3 if self.window[1].value > self.window[0].value
                && self.window[1].value >= self.window[2].value =>
            {
                Some(Bracket::around(&self.window))
            }
            _ => None,
        }
    }

    fn consider(&mut self, point: Point, value: f64) {
        if self.best.as_ref().map(|(_, v)| value > *v).unwrap_or(true) {
            self.best = Some((point, value));
        }
    }
}
