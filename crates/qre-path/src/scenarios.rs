//! End-to-end traces on games whose branches are known.

use super::*;
use nalgebra::DMatrix;
use nalgebra::DVector;
use qre_game::Oracle;
use qre_game::Shape;
use qre_game::Strategic;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn pennies() -> Strategic {
    Strategic::bimatrix(&[&[1.0, -1.0], &[-1.0, 1.0]], &[&[-1.0, 1.0], &[1.0, -1.0]]).unwrap()
}

fn rps() -> Strategic {
    Strategic::bimatrix(
        &[&[0.0, -1.0, 1.0], &[1.0, 0.0, -1.0], &[-1.0, 1.0, 0.0]],
        &[&[0.0, 1.0, -1.0], &[-1.0, 0.0, 1.0], &[1.0, -1.0, 0.0]],
    )
    .unwrap()
}

/// Stag hunt with ((3,3),(0,2))/((2,0),(1,1)). Both actions earn 1.5 at
/// the centroid, so the centroid solves the logit system at every λ and the
/// principal branch never leaves it; a pitchfork splits off at λ = 2.
fn symmetric_stag_hunt() -> Strategic {
    Strategic::bimatrix(&[&[3.0, 0.0], &[2.0, 1.0]], &[&[3.0, 2.0], &[0.0, 1.0]]).unwrap()
}

/// Stag pays 4 against stag and 0 against hare; hare pays 2 and 1.
/// The stag advantage 3y − 1 is positive at the centroid and only grows.
fn stag() -> Strategic {
    Strategic::bimatrix(&[&[4.0, 0.0], &[2.0, 1.0]], &[&[4.0, 2.0], &[0.0, 1.0]]).unwrap()
}

/// Row player's payoff does not depend on the column player; nobody else cares.
fn lottery() -> Strategic {
    Strategic::bimatrix(&[&[1.0, 1.0], &[0.0, 0.0]], &[&[0.0, 0.0], &[0.0, 0.0]]).unwrap()
}

/// Matching pennies plus a row strategy that loses a billion.
fn dominated() -> Strategic {
    Strategic::bimatrix(
        &[&[1.0, -1.0], &[-1.0, 1.0], &[-1.0e9, -1.0e9]],
        &[&[-1.0, 1.0], &[1.0, -1.0], &[0.0, 0.0]],
    )
    .unwrap()
}

const CENTIPEDE: &str = r#"EFG 2 R "Centipede" { "P1" "P2" }
""
p "" 1 1 "a" { "Take" "Pass" } 0
t "" 1 "o1" { 4, 1 }
p "" 2 1 "b" { "Take" "Pass" } 0
t "" 2 "o2" { 2, 8 }
p "" 1 2 "c" { "Take" "Pass" } 0
t "" 3 "o3" { 16, 4 }
p "" 2 2 "d" { "Take" "Pass" } 0
t "" 4 "o4" { 8, 32 }
t "" 5 "o5" { 64, 16 }
"#;

/// One decision worth 1 or 0 to its owner.
const LOTTERY: &str = r#"EFG 2 R "Lottery" { "P1" "P2" }
""
p "" 1 1 "a" { "Win" "Lose" } 0
t "" 1 "win" { 1, 0 }
t "" 2 "lose" { 0, 0 }
"#;

fn record<M: LogitMap>(map: &M, settings: Settings) -> (Result<Summary, TraceError>, Record) {
    let mut record = Record::default();
    let result = Tracer::new(map, settings).and_then(|tracer| tracer.trace(&mut record));
    (result, record)
}

/// Simplex, positivity, and residual checks on every branch point.
fn invariants<M: LogitMap>(map: &M, record: &Record) {
    let shape = map.shape();
    let tolerance = qre_core::CORRECTOR_TOLERANCE;
    for point in record.tagged(Tag::Branch) {
        assert!(point.is_admissible(), "inadmissible {:?}", point);
        for block in shape.split(point.profile()) {
            assert!((block.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        let residual = map.residual(point.vector()).amax();
        assert!(residual <= tolerance, "residual {} at lambda {}", residual, point.lambda());
    }
}

/// Consecutive secants never point against each other.
fn forward(record: &Record) {
    let points = record.tagged(Tag::Branch).map(Point::vector).collect::<Vec<_>>();
    for w in points.windows(3) {
        let a = w[1] - w[0];
        let b = w[2] - w[1];
        assert!(a.dot(&b) > 0.0, "secants double back at lambda {}", w[1][w[1].len() - 1]);
    }
}

macro_rules! centroid {
    ($name:ident, $game:expr) => {
        paste::paste! {
            #[test]
            fn [<$name _stays_at_centroid>]() {
                let game = $game;
                let map = Logit::from(&game);
                let centroid = game.centroid();
                let (result, record) = record(&map, Settings::default());
                let summary = result.unwrap();
                assert_eq!(summary.termination, Termination::Lambda);
                assert!(summary.last.lambda() >= qre_core::MAX_LAMBDA);
                assert_eq!(record.points()[0].1.lambda(), 0.0);
                assert_eq!(record.points()[0].1.profile(), centroid.as_slice());
                for point in record.tagged(Tag::Branch) {
                    for (x, c) in point.profile().iter().zip(centroid.iter()) {
                        assert!((x - c).abs() < 1e-12, "{} drifted from {}", x, c);
                    }
                }
                invariants(&map, &record);
            }
        }
    };
}

centroid!(pennies, pennies());
centroid!(rps, rps());
centroid!(symmetric_stag_hunt, symmetric_stag_hunt());

#[test]
fn stag_hunt_goes_to_stag() {
    let game = stag();
    let map = Logit::from(&game);
    let (result, record) = record(&map, Settings::default());
    let summary = result.unwrap();
    assert_eq!(summary.termination, Termination::Pure);
    assert!(summary.last.profile()[0] >= 0.999);
    assert!(summary.last.profile()[2] >= 0.999);
    let lambdas = record.tagged(Tag::Branch).map(Point::lambda).collect::<Vec<_>>();
    assert!(lambdas.windows(2).all(|w| w[1] > w[0]));
    invariants(&map, &record);
    forward(&record);
}

#[test]
fn terminal_mode_emits_once() {
    let game = stag();
    let map = Logit::from(&game);
    let settings = Settings {
        full_graph: false,
        max_lambda: 3.0,
        ..Default::default()
    };
    let (result, record) = record(&map, settings);
    let summary = result.unwrap();
    assert_eq!(summary.termination, Termination::Lambda);
    assert_eq!(record.len(), 1);
    assert_eq!(record.last(), Some(&summary.last));
    assert!(summary.last.lambda() >= 3.0);
}

#[test]
fn likelihood_maximum_is_recovered() {
    let game = lottery();
    let map = Logit::from(&game);
    let settings = Settings {
        max_lambda: 10.0,
        ..Default::default()
    };
    let likelihood = Likelihood::new(vec![0.6, 0.4, 0.5, 0.5], game.shape()).unwrap();
    let mut record = Record::default();
    let summary = Tracer::new(&map, settings)
        .unwrap()
        .observe(likelihood)
        .trace(&mut record)
        .unwrap();
    assert_eq!(summary.maxima, 1);
    let maxima = record.tagged(Tag::Likelihood).collect::<Vec<_>>();
    assert_eq!(maxima.len(), 1);
    assert!((maxima[0].profile()[0] - 0.6).abs() < 1e-6);
    assert!((maxima[0].lambda() - 1.5f64.ln()).abs() < 1e-5);
    assert_eq!(record.tagged(Tag::Best).count(), 0);
}

#[test]
fn unbracketed_likelihood_reports_best_seen() {
    let game = lottery();
    let map = Logit::from(&game);
    let settings = Settings {
        max_lambda: 10.0,
        ..Default::default()
    };
    // the observed row frequency sits beyond the end of the branch
    let likelihood = Likelihood::new(vec![1.0, 0.0, 0.5, 0.5], game.shape()).unwrap();
    let mut record = Record::default();
    let summary = Tracer::new(&map, settings)
        .unwrap()
        .observe(likelihood)
        .trace(&mut record)
        .unwrap();
    assert_eq!(summary.maxima, 0);
    let best = record.tagged(Tag::Best).collect::<Vec<_>>();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0], &summary.last);
}

#[test]
fn pennies_likelihood_is_flat() {
    let game = pennies();
    let map = Logit::from(&game);
    let settings = Settings {
        max_lambda: 100.0,
        ..Default::default()
    };
    let likelihood = Likelihood::new(vec![0.6, 0.4, 0.5, 0.5], game.shape()).unwrap();
    let mut record = Record::default();
    let summary = Tracer::new(&map, settings)
        .unwrap()
        .observe(likelihood)
        .trace(&mut record)
        .unwrap();
    assert_eq!(summary.maxima, 0);
    let best = record.tagged(Tag::Best).collect::<Vec<_>>();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0], &Point::origin(game.shape()));
}

#[test]
fn agent_likelihood_maximum_is_recovered() {
    let tree = qre_game::efg(LOTTERY).unwrap();
    let map = Logit::from(&tree);
    let likelihood = Likelihood::new(vec![0.6, 0.4], map.shape()).unwrap();
    let mut record = Record::default();
    let summary = Tracer::new(&map, Settings::default())
        .unwrap()
        .observe(likelihood)
        .trace(&mut record)
        .unwrap();
    assert_eq!(summary.termination, Termination::Pure);
    assert_eq!(summary.maxima, 1);
    let maxima = record.tagged(Tag::Likelihood).collect::<Vec<_>>();
    assert!((maxima[0].profile()[0] - 0.6).abs() < 1e-6);
    assert!((maxima[0].lambda() - 1.5f64.ln()).abs() < 1e-5);
}

#[test]
fn dominant_action_stops_at_pure_limit() {
    let game = lottery();
    let map = Logit::from(&game);
    let (result, record) = record(&map, Settings::default());
    let summary = result.unwrap();
    assert_eq!(summary.termination, Termination::Pure);
    assert!(summary.last.profile()[1] < qre_core::PURE_LIMIT);
    assert!(summary.last.profile()[2..].iter().all(|p| (p - 0.5).abs() < 1e-12));
    assert!(summary.last.lambda() < 100.0);
    invariants(&map, &record);
}

#[test]
fn centipede_unravels() {
    let tree = qre_game::efg(CENTIPEDE).unwrap();
    let map = Logit::from(&tree);
    let (result, record) = record(&map, Settings::default());
    let summary = result.unwrap();
    assert_eq!(summary.termination, Termination::Pure);
    let last = summary.last.profile();
    // take beats pass at every node
    for block in map.shape().split(last) {
        assert!(block[0] > block[1], "{:?}", last);
    }
    assert!(last.iter().any(|&p| p < qre_core::PURE_LIMIT));
    invariants(&map, &record);
}

#[test]
fn centipede_strategic_form_traces() {
    let tree = qre_game::efg(CENTIPEDE).unwrap();
    let game = tree.strategic().unwrap();
    let map = Logit::from(&game);
    let settings = Settings {
        max_lambda: 2.0,
        ..Default::default()
    };
    let (result, record) = record(&map, settings);
    assert!(result.is_ok());
    invariants(&map, &record);
}

#[test]
fn dominated_strategy_underflows_cleanly() {
    let game = dominated();
    let map = Logit::from(&game);
    let settings = Settings {
        full_graph: false,
        ..Default::default()
    };
    let (result, record) = record(&map, settings);
    assert!(matches!(result, Err(TraceError::StepUnderflow { .. })));
    assert_eq!(record.len(), 1);
    invariants(&map, &record);
}

#[test]
fn resumed_trace_follows_the_same_branch() {
    let game = stag();
    let map = Logit::from(&game);
    let settings = Settings {
        max_lambda: 5.0,
        ..Default::default()
    };
    let (_, original) = record(&map, settings.clone());
    let original = original.tagged(Tag::Branch).cloned().collect::<Vec<_>>();
    let start = original[original.len() / 2].clone();
    let mut resumed = Record::default();
    Tracer::resume(&map, settings, start.clone())
        .unwrap()
        .trace(&mut resumed)
        .unwrap();
    assert_eq!(resumed.points()[0].1, start);
    for point in resumed.tagged(Tag::Branch) {
        let lambda = point.lambda();
        let x = point.profile()[0];
        if let Some(w) = original
            .windows(2)
            .find(|w| w[0].lambda() <= lambda && lambda <= w[1].lambda())
        {
            let lo = w[0].profile()[0].min(w[1].profile()[0]);
            let hi = w[0].profile()[0].max(w[1].profile()[0]);
            assert!(lo - 1e-9 <= x && x <= hi + 1e-9, "{} outside [{}, {}]", x, lo, hi);
        }
    }
    invariants(&map, &resumed);
}

#[test]
fn invalid_settings_are_refused() {
    let game = stag();
    let map = Logit::from(&game);
    let settings = Settings {
        step_min: 1.0,
        ..Default::default()
    };
    assert!(matches!(Tracer::new(&map, settings), Err(TraceError::Settings(_))));
}

/// F(x, λ) = (x₁ + x₂ − 1, λ − φ(x₁ − ½)) with a cubic φ that rises,
/// dips, and rises again, so λ must turn back briefly along the branch.
struct Fold {
    shape: Shape,
}

impl Fold {
    fn phi(s: f64) -> f64 {
        10.0 * s - 90.0 * s * s + 250.0 * s * s * s
    }
    fn slope(s: f64) -> f64 {
        10.0 - 180.0 * s + 750.0 * s * s
    }
}

impl LogitMap for Fold {
    fn shape(&self) -> &Shape {
        &self.shape
    }
    fn residual(&self, y: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![y[0] + y[1] - 1.0, y[2] - Self::phi(y[0] - 0.5)])
    }
    fn jacobian(&self, y: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 0.0, -Self::slope(y[0] - 0.5), 0.0, 1.0])
    }
}

#[test]
fn turning_points_are_passed_without_reversal() {
    let map = Fold {
        shape: Shape::from(vec![2]),
    };
    let settings = Settings {
        step_start: 0.005,
        step_max: 0.01,
        max_lambda: 5.0,
        ..Default::default()
    };
    let (result, record) = record(&map, settings);
    assert_eq!(result.unwrap().termination, Termination::Lambda);
    let points = record.tagged(Tag::Branch).collect::<Vec<_>>();
    assert!(points.windows(2).all(|w| w[1].profile()[0] > w[0].profile()[0]));
    assert!(points.windows(2).any(|w| w[1].lambda() < w[0].lambda()));
    invariants(&map, &record);
    forward(&record);
}

/// A vertical branch x = (½, ½) whose Jacobian loses a row for λ ≥ 1.
struct Stall {
    shape: Shape,
}

impl LogitMap for Stall {
    fn shape(&self) -> &Shape {
        &self.shape
    }
    fn residual(&self, y: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![y[0] + y[1] - 1.0, y[0] - 0.5])
    }
    fn jacobian(&self, y: &DVector<f64>) -> DMatrix<f64> {
        let slope = if y[2] < 1.0 { 1.0 } else { 0.0 };
        DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 0.0, slope, 0.0, 0.0])
    }
}

#[test]
fn repeated_singular_systems_underflow() {
    let map = Stall {
        shape: Shape::from(vec![2]),
    };
    let (result, record) = record(&map, Settings::default());
    match result {
        Err(TraceError::StepUnderflow { lambda, cause, .. }) => {
            assert_eq!(cause, Rejection::Singular);
            assert!(lambda < 1.0);
        }
        other => panic!("expected underflow, got {:?}", other),
    }
    assert!(record.len() > 1);
    invariants(&map, &record);
}

macro_rules! random {
    ($name:ident, $seed:expr, $counts:expr) => {
        paste::paste! {
            #[test]
            fn [<random_ $name _keeps_invariants>]() {
                let ref mut rng = SmallRng::seed_from_u64($seed);
                let game = Strategic::sample(rng, $counts);
                let map = Logit::from(&game);
                let (result, record) = record(&map, Settings::default());
                assert!(result.is_ok(), "{:?}", result.err());
                assert_eq!(record.points()[0].1, Point::origin(game.shape()));
                invariants(&map, &record);
            }
        }
    };
}

random!(two_by_two, 1, vec![2, 2]);
random!(three_by_two, 2, vec![3, 2]);
random!(three_by_three, 3, vec![3, 3]);
random!(three_players, 4, vec![2, 2, 2]);

#[test]
fn csv_lines_carry_tag_lambda_and_profile() {
    let game = pennies();
    let map = Logit::from(&game);
    let settings = Settings {
        max_lambda: 1.0,
        ..Default::default()
    };
    let mut csv = Csv::new(Vec::new(), qre_core::DECIMALS);
    Tracer::new(&map, settings).unwrap().trace(&mut csv).unwrap();
    let text = String::from_utf8(csv.into_inner()).unwrap();
    let lines = text.lines().collect::<Vec<_>>();
    assert!(lines.len() > 1);
    assert_eq!(lines[0], "1,0.000000,0.500000,0.500000,0.500000,0.500000");
    for line in lines {
        let fields = line.split(',').collect::<Vec<_>>();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[2], "0.500000");
    }
}
