//! Validation limits

use crate::constants::MAX_VALUE_SIZE;

/// Hard ceiling for [`Limits::max_depth`].
pub const HARD_MAX_DEPTH: usize = 1_024;

/// Bounds applied while validating untrusted buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum container nesting depth (default: 64, hard: 1,024)
    pub max_depth: usize,
    /// Maximum encoded size of the top-level value (hard: 2 GiB - 1)
    pub max_value_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_value_size: MAX_VALUE_SIZE,
        }
    }
}

impl Limits {
    /// The most permissive limits the format allows.
    pub fn hard() -> Self {
        Self {
            max_depth: HARD_MAX_DEPTH,
            max_value_size: MAX_VALUE_SIZE,
        }
    }

    /// Clamp every field to its hard ceiling.
    pub fn clamped(self) -> Self {
        Self {
            max_depth: self.max_depth.min(HARD_MAX_DEPTH),
            max_value_size: self.max_value_size.min(MAX_VALUE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_caps_fields() {
        let limits = Limits {
            max_depth: usize::MAX,
            max_value_size: usize::MAX,
        }
        .clamped();
        assert_eq!(limits, Limits::hard());
    }

    #[test]
    fn test_default_within_hard() {
        let limits = Limits::default();
        assert!(limits.max_depth <= HARD_MAX_DEPTH);
        assert_eq!(limits.clamped(), limits);
    }
}
