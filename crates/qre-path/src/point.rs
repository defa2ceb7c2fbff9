use nalgebra::DVector;
use qre_core::Lambda;
use qre_core::Probability;
use qre_game::Shape;

/// Augmented state y = (x, λ): the flat profile followed by the precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Point(DVector<f64>);

impl From<DVector<f64>> for Point {
    fn from(vector: DVector<f64>) -> Self {
        debug_assert!(vector.len() > 0);
        Self(vector)
    }
}

impl From<Point> for DVector<f64> {
    fn from(point: Point) -> Self {
        point.0
    }
}

impl Point {
    /// Centroid at λ = 0.
    pub fn origin(shape: &Shape) -> Self {
        Self::new(&shape.centroid(), 0.0)
    }
    pub fn new(profile: &[Probability], lambda: Lambda) -> Self {
        Self(DVector::from_iterator(
            profile.len() + 1,
            profile.iter().copied().chain(std::iter::once(lambda)),
        ))
    }
    pub fn lambda(&self) -> Lambda {
        self.0[self.0.len() - 1]
    }
    pub fn profile(&self) -> &[Probability] {
        &self.0.as_slice()[..self.0.len() - 1]
    }
    pub fn vector(&self) -> &DVector<f64> {
        &self.0
    }
    /// Strictly positive probabilities and non-negative λ.
    pub fn is_admissible(&self) -> bool {
        Self::admits(&self.0)
    }
    /// Admissibility of a raw augmented vector.
    pub fn admits(vector: &DVector<f64>) -> bool {
        match vector.as_slice().split_last() {
            Some((lambda, profile)) => {
                profile.iter().all(|p| p.is_finite() && *p > 0.0)
                    && lambda.is_finite()
                    && *lambda >= 0.0
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_layout() {
        let point = Point::origin(&Shape::from(vec![2, 3]));
        assert_eq!(point.vector().len(), 6);
        assert_eq!(point.lambda(), 0.0);
        assert_eq!(point.profile()[0], 0.5);
        assert_eq!(point.profile()[4], 1.0 / 3.0);
        assert!(point.is_admissible());
    }

    #[test]
    fn admissibility() {
        assert!(!Point::new(&[0.5, 0.0], 1.0).is_admissible());
        assert!(!Point::new(&[0.5, 0.5], -1e-12).is_admissible());
        assert!(!Point::new(&[0.5, f64::NAN], 1.0).is_admissible());
    }
}
