use qre_core::Probability;
use std::ops::Range;

/// Block layout of a mixed profile.
///
/// A profile is a flat vector made of consecutive simplexes: one per player
/// in the strategic form, one per information set in the agent form. The
/// shape records how long each block is and where it starts, so the flat
/// vector can be split back into its simplexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    sizes: Vec<usize>,
    offsets: Vec<usize>,
}

impl From<Vec<usize>> for Shape {
    fn from(sizes: Vec<usize>) -> Self {
        debug_assert!(sizes.iter().all(|&k| k > 0));
        let offsets = sizes
            .iter()
            .scan(0, |acc, &k| {
                let start = *acc;
                *acc += k;
                Some(start)
            })
            .collect();
        Self { sizes, offsets }
    }
}

impl Shape {
    /// Number of simplexes.
    pub fn blocks(&self) -> usize {
        self.sizes.len()
    }
    /// Ambient dimension n, the sum of all block sizes.
    pub fn dimension(&self) -> usize {
        self.sizes.iter().sum()
    }
    /// Number of actions in block b.
    pub fn size(&self, b: usize) -> usize {
        self.sizes[b]
    }
    /// Flat index of the first action of block b.
    pub fn offset(&self, b: usize) -> usize {
        self.offsets[b]
    }
    /// Flat index range of block b.
    pub fn range(&self, b: usize) -> Range<usize> {
        self.offsets[b]..self.offsets[b] + self.sizes[b]
    }
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }
    /// Uniform randomization within every block.
    pub fn centroid(&self) -> Vec<Probability> {
        self.sizes
            .iter()
            .flat_map(|&k| std::iter::repeat_n(1.0 / k as Probability, k))
            .collect()
    }
    /// Split a flat profile into its blocks.
    pub fn split<'a>(&'a self, profile: &'a [Probability]) -> impl Iterator<Item = &'a [Probability]> + 'a {
        (0..self.blocks()).map(move |b| &profile[self.range(b)])
    }
    /// Every component strictly positive and finite.
    pub fn is_interior(&self, profile: &[Probability]) -> bool {
        profile[..self.dimension()]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
    /// Some action has all but dropped out of play.
    pub fn touches_boundary(&self, profile: &[Probability], limit: Probability) -> bool {
        profile[..self.dimension()].iter().any(|&p| p < limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accumulate() {
        let shape = Shape::from(vec![2, 3, 1]);
        assert_eq!(shape.blocks(), 3);
        assert_eq!(shape.dimension(), 6);
        assert_eq!(shape.range(0), 0..2);
        assert_eq!(shape.range(1), 2..5);
        assert_eq!(shape.range(2), 5..6);
    }

    #[test]
    fn centroid_is_exactly_uniform() {
        let shape = Shape::from(vec![2, 3]);
        let centroid = shape.centroid();
        assert_eq!(centroid[0], 0.5);
        assert_eq!(centroid[1], 0.5);
        assert!(centroid[2..].iter().all(|&p| p == 1.0 / 3.0));
        assert!(shape.is_interior(&centroid));
        assert!(!shape.touches_boundary(&centroid, 1e-10));
    }

    #[test]
    fn one_vanishing_action_is_enough() {
        let shape = Shape::from(vec![2, 2]);
        assert!(shape.touches_boundary(&[1.0, 1e-12, 1e-11, 1.0], 1e-10));
        assert!(shape.touches_boundary(&[1.0, 1e-12, 0.5, 0.5], 1e-10));
        assert!(!shape.touches_boundary(&[0.9, 0.1, 0.5, 0.5], 1e-10));
        assert!(!shape.is_interior(&[1.0, 0.0, 0.5, 0.5]));
    }
}
