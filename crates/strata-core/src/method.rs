//! Pooling method enumeration.

use std::fmt;

/// Reduction applied over each pooling window.
///
/// Closed set: the kernels specialise per variant, so there is no
/// extension point for custom reductions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolMethod {
    /// Maximum of the valid cells. Ties go to the first cell in
    /// row-major scan order.
    Max,
    /// Mean of the valid cells. Padding is excluded from the divisor.
    Avg,
}

impl PoolMethod {
    /// All methods, in declaration order.
    pub const ALL: [PoolMethod; 2] = [PoolMethod::Max, PoolMethod::Avg];
}

impl fmt::Display for PoolMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Avg => write!(f, "avg"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_name() {
        assert_eq!(PoolMethod::Max.to_string(), "max");
        assert_eq!(PoolMethod::Avg.to_string(), "avg");
    }
}
