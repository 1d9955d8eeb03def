//! Core types for the scan pipeline

use std::time::Duration;

/// Timestamp representation for frames and scan events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Microseconds since the clock base
    pub micros: i64,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { micros: 0 };

    /// Create a new timestamp from microseconds
    pub fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Create a timestamp from whole seconds
    pub fn from_secs(secs: i64) -> Self {
        Self {
            micros: secs * 1_000_000,
        }
    }

    /// Create a timestamp from a duration since the clock base
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            micros: duration.as_micros() as i64,
        }
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later
    pub fn since(&self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.micros.saturating_sub(earlier.micros).max(0) as u64)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.micros as f64 / 1_000_000.0)
    }
}

/// Where a code sits in the frame
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Rect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Polygon(Vec<(i32, i32)>),
}

impl Geometry {
    /// Axis-aligned bounding box as `(x, y, width, height)`
    pub fn bounds(&self) -> (i32, i32, u32, u32) {
        match self {
            Geometry::Rect {
                x,
                y,
                width,
                height,
            } => (*x, *y, *width, *height),
            Geometry::Polygon(points) => {
                if points.is_empty() {
                    return (0, 0, 0, 0);
                }
                let min_x = points.iter().map(|p| p.0).min().unwrap_or(0);
                let max_x = points.iter().map(|p| p.0).max().unwrap_or(0);
                let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
                let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);
                (min_x, min_y, max_x.abs_diff(min_x), max_y.abs_diff(min_y))
            }
        }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (x, y, w, h) = self.bounds();
        write!(f, "{}x{}@({},{})", w, h, x, y)
    }
}

/// One decoded code read from a single frame
#[derive(Debug, Clone, PartialEq)]
pub struct ScanObservation {
    pub text: String,
    pub geometry: Geometry,
    pub observed_at: Timestamp,
}

impl ScanObservation {
    pub fn new(text: impl Into<String>, geometry: Geometry, observed_at: Timestamp) -> Self {
        Self {
            text: text.into(),
            geometry,
            observed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_since_saturates() {
        let early = Timestamp::from_secs(5);
        let late = Timestamp::from_secs(12);

        assert_eq!(late.since(early), Duration::from_secs(7));
        assert_eq!(early.since(late), Duration::ZERO);
    }

    #[test]
    fn test_polygon_bounds() {
        let polygon = Geometry::Polygon(vec![(10, 20), (50, 18), (52, 60), (9, 61)]);
        assert_eq!(polygon.bounds(), (9, 18, 43, 43));
        assert_eq!(Geometry::Polygon(Vec::new()).bounds(), (0, 0, 0, 0));
    }

    #[test]
    fn test_polygon_spanning_full_range() {
        let polygon = Geometry::Polygon(vec![(i32::MIN, 0), (i32::MAX, 10)]);

        assert_eq!(polygon.bounds(), (i32::MIN, 0, u32::MAX, 10));
        assert_eq!(polygon.to_string(), "4294967295x10@(-2147483648,0)");
    }
}
