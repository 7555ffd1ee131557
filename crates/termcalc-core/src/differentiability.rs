//! Differentiability classification.

use std::fmt;

/// How the derivative of a subtree with respect to some variable can be obtained.
///
/// Ordered worst to best, so combining subtrees is [`Ord::min`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DifferentiabilityType {
    /// Not differentiable at all.
    None,
    /// Only by numeric approximation.
    Numerical,
    /// By the analytic rules of each node.
    Analytical,
    /// The subtree does not depend on the variable; the derivative is zero.
    Independent,
}

impl DifferentiabilityType {
    /// Combines the ranks of two sibling subtrees.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.min(other)
    }

    /// Combines the ranks of any number of subtrees; an empty set is independent.
    #[must_use]
    pub fn combine_all(ranks: impl IntoIterator<Item = Self>) -> Self {
        ranks.into_iter().fold(Self::Independent, Self::combine)
    }

    /// Returns true unless the rank is [`DifferentiabilityType::None`].
    #[must_use]
    pub fn is_differentiable(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for DifferentiabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Numerical => "numerical",
            Self::Analytical => "analytical",
            Self::Independent => "independent",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::DifferentiabilityType as D;

    #[test]
    fn test_combine_takes_worse() {
        assert_eq!(D::Analytical.combine(D::Independent), D::Analytical);
        assert_eq!(D::Numerical.combine(D::Analytical), D::Numerical);
        assert_eq!(D::None.combine(D::Independent), D::None);
        assert_eq!(D::combine_all(std::iter::empty()), D::Independent);
        assert_eq!(D::combine_all([D::Analytical, D::Numerical, D::Independent]), D::Numerical);
    }
}
