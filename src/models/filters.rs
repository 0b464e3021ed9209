use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;
pub const DEFAULT_FIRST_YEAR: i32 = 1921;
pub const DEFAULT_LAST_YEAR: i32 = 2025;

/// Inclusive release-year bounds, serialized as `[lo, hi]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct YearRange {
    pub lo: i32,
    pub hi: i32,
}

impl YearRange {
    pub fn new(lo: i32, hi: i32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.lo <= year && year <= self.hi
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR)
    }
}

impl From<[i32; 2]> for YearRange {
    fn from([lo, hi]: [i32; 2]) -> Self {
        Self::new(lo, hi)
    }
}

impl From<YearRange> for [i32; 2] {
    fn from(range: YearRange) -> Self {
        [range.lo, range.hi]
    }
}

/// Inclusive rating bounds on the 0-10 scale, serialized as `[lo, hi]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct RatingRange {
    pub lo: f64,
    pub hi: f64,
}

impl RatingRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, rating: f64) -> bool {
        self.lo <= rating && rating <= self.hi
    }
}

impl Default for RatingRange {
    fn default() -> Self {
        Self::new(MIN_RATING, MAX_RATING)
    }
}

impl From<[f64; 2]> for RatingRange {
    fn from([lo, hi]: [f64; 2]) -> Self {
        Self::new(lo, hi)
    }
}

impl From<RatingRange> for [f64; 2] {
    fn from(range: RatingRange) -> Self {
        [range.lo, range.hi]
    }
}

/// Per-request restrictions applied to a similarity query
///
/// An empty `genres` list means no genre restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    #[serde(default)]
    pub year_range: YearRange,
    #[serde(default)]
    pub rating_range: RatingRange,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl SearchFilters {
    pub fn validate(&self) -> AppResult<()> {
        let years = self.year_range;
        if years.lo > years.hi {
            return Err(AppError::InvalidInput(format!(
                "Year range is inverted: {} > {}",
                years.lo, years.hi
            )));
        }

        let ratings = self.rating_range;
        if !ratings.lo.is_finite() || !ratings.hi.is_finite() {
            return Err(AppError::InvalidInput(
                "Rating bounds must be finite numbers".to_string(),
            ));
        }
        if ratings.lo > ratings.hi {
            return Err(AppError::InvalidInput(format!(
                "Rating range is inverted: {} > {}",
                ratings.lo, ratings.hi
            )));
        }
        if ratings.lo < MIN_RATING || ratings.hi > MAX_RATING {
            return Err(AppError::InvalidInput(format!(
                "Rating range must stay within {}-{}",
                MIN_RATING, MAX_RATING
            )));
        }

        Ok(())
    }
}
