use nalgebra::DMatrix;
use nalgebra::DVector;
use nalgebra::Dyn;
use nalgebra::linalg::LU;
use qre_core::PIVOT_MIN;

/// The square system `[J; cᵀ]` obtained by appending a border row to an
/// n × (n+1) Jacobian, factored once and solved for any right-hand side.
///
/// Rows are equilibrated by their largest magnitude before factoring, so
/// the pivot test is scale free. A system counts as singular when a row
/// vanishes, when the smallest pivot falls below `PIVOT_MIN`, or when a
/// solution is not finite.
pub struct Bordered {
    lu: LU<f64, Dyn, Dyn>,
    scale: DVector<f64>,
}

impl Bordered {
    pub fn new(jacobian: &DMatrix<f64>, border: &DVector<f64>) -> Option<Self> {
        let n = jacobian.nrows();
        debug_assert!(jacobian.ncols() == n + 1);
        debug_assert!(border.len() == n + 1);
        let mut matrix = jacobian.clone().insert_row(n, 0.0);
        matrix.row_mut(n).tr_copy_from(border);
        let mut scale = DVector::zeros(n + 1);
        for (i, mut row) in matrix.row_iter_mut().enumerate() {
            let largest = row.amax();
            if !largest.is_finite() || largest == 0.0 {
                return None;
            }
            row /= largest;
            scale[i] = largest;
        }
        let lu = matrix.lu();
        let pivot = lu.u().diagonal().amin();
        if !(pivot >= PIVOT_MIN) {
            return None;
        }
        Some(Self { lu, scale })
    }

    /// Solve `[J; cᵀ] z = (top, bottom)`.
    pub fn solve(&self, top: &DVector<f64>, bottom: f64) -> Option<DVector<f64>> {
        let n = top.len();
        let rhs = DVector::from_fn(n + 1, |i, _| match i < n {
            true => top[i] / self.scale[i],
            false => bottom / self.scale[i],
        });
        self.lu
            .solve(&rhs)
            .filter(|z| z.iter().all(|v| v.is_finite()))
    }

    /// Unit vector spanning ker J, oriented to agree with the border.
    pub fn tangent(jacobian: &DMatrix<f64>, border: &DVector<f64>) -> Option<DVector<f64>> {
        let system = Self::new(jacobian, border)?;
        let z = system.solve(&DVector::zeros(jacobian.nrows()), 1.0)?;
        let norm = z.norm();
        if !(norm > 0.0 && norm.is_finite()) {
            return None;
        }
        let t = z / norm;
        match t.dot(border) < 0.0 {
            true => Some(-t),
            false => Some(t),
        }
    }
}
