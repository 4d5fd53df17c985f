//! Star rating conversion
//!
//! Ratings arrive as 0 to 10 decimals (sometimes as text). They are shown as a
//! row of ten stars, of which `round(rating)` are filled.

use std::fmt;

/// Number of stars in a full rating row
pub const MAX_STARS: u8 = 10;

/// A rating converted to filled stars out of [`MAX_STARS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarRating {
    filled: u8,
}

impl StarRating {
    /// Converts a 0 to 10 rating, rounding half up.
    ///
    /// Absent or non-finite ratings yield zero stars; values outside the
    /// scale are clamped.
    pub fn from_rating(rating: Option<f64>) -> Self {
        let filled = match rating {
            Some(r) if r.is_finite() => {
                // round() goes half away from zero, which is half up on this range
                r.clamp(0.0, f64::from(MAX_STARS)).round() as u8
            }
            _ => 0,
        };
        Self { filled }
    }

    /// Number of filled stars
    pub fn filled(&self) -> u8 {
        self.filled
    }

    /// Number of empty stars
    pub fn empty(&self) -> u8 {
        MAX_STARS - self.filled
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.filled {
            f.write_str("★")?;
        }
        for _ in 0..self.empty() {
            f.write_str("☆")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_nearest_star() {
        assert_eq!(StarRating::from_rating(Some(7.8)).filled(), 8);
        assert_eq!(StarRating::from_rating(Some(7.4)).filled(), 7);
        assert_eq!(StarRating::from_rating(Some(7.5)).filled(), 8);
        assert_eq!(StarRating::from_rating(Some(0.4)).filled(), 0);
        assert_eq!(StarRating::from_rating(Some(10.0)).filled(), 10);
    }

    #[test]
    fn test_missing_or_invalid_rating_is_zero() {
        assert_eq!(StarRating::from_rating(None).filled(), 0);
        assert_eq!(StarRating::from_rating(Some(f64::NAN)).filled(), 0);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(StarRating::from_rating(Some(12.3)).filled(), 10);
        assert_eq!(StarRating::from_rating(Some(-1.0)).filled(), 0);
        assert_eq!(StarRating::from_rating(Some(f64::INFINITY)).filled(), 0);
    }

    #[test]
    fn test_display_renders_ten_stars() {
        let rating = StarRating::from_rating(Some(7.8));
        assert_eq!(rating.to_string(), "★★★★★★★★☆☆");
        assert_eq!(rating.empty(), 2);
        assert_eq!(StarRating::default().to_string(), "☆".repeat(10));
    }
}
