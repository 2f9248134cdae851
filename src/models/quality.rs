//! Measurement quality levels.
//!
//! The four levels form a fixed order (poor < questionable < good <
//! excellent) that threshold filtering and the derived `Ord` rely on. The
//! order lives in the explicit discriminants, never in string comparison.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QualityLevel {
    Poor = 0,
    Questionable = 1,
    Good = 2,
    Excellent = 3,
}

impl QualityLevel {
    /// All levels in ascending order of reliability.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Poor, Self::Questionable, Self::Good, Self::Excellent]
    }

    /// Position of this level in the fixed order.
    #[must_use]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Weight applied to observations of this quality when computing the
    /// quality-weighted average.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Poor => 0.3,
            Self::Questionable => 0.5,
            Self::Good => 0.8,
            Self::Excellent => 1.0,
        }
    }

    /// This level and every more reliable one; threshold filtering is
    /// inclusive.
    #[must_use]
    pub fn at_or_above(self) -> &'static [Self] {
        &Self::all()[self.ordinal()..]
    }

    /// The stored/wire form of this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Questionable => "questionable",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_by_reliability() {
        assert!(QualityLevel::Poor < QualityLevel::Questionable);
        assert!(QualityLevel::Questionable < QualityLevel::Good);
        assert!(QualityLevel::Good < QualityLevel::Excellent);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(
            QualityLevel::Good.at_or_above(),
            &[QualityLevel::Good, QualityLevel::Excellent]
        );
        assert_eq!(QualityLevel::Poor.at_or_above(), QualityLevel::all());
        assert_eq!(QualityLevel::Excellent.at_or_above(), &[QualityLevel::Excellent]);
    }

    #[test]
    fn parses_exact_lowercase_names_only() {
        assert_eq!("excellent".parse::<QualityLevel>(), Ok(QualityLevel::Excellent));
        assert_eq!("poor".parse::<QualityLevel>(), Ok(QualityLevel::Poor));
        assert!("Good".parse::<QualityLevel>().is_err());
        assert!("pristine".parse::<QualityLevel>().is_err());
        assert!("".parse::<QualityLevel>().is_err());
    }

    #[test]
    fn weights_increase_with_reliability() {
        let weights: Vec<f64> = QualityLevel::all().iter().map(|q| q.weight()).collect();
        assert!(weights.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(QualityLevel::Excellent.weight(), 1.0);
    }

    #[test]
    fn display_matches_stored_form() {
        for level in QualityLevel::all() {
            assert_eq!(level.to_string(), level.as_str());
        }
    }
}
