//! Closed integer day ranges and their intersection.

/// A closed day range: both endpoints are covered days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: i64,
    pub end: i64,
}

impl DayRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of days in the range, inclusive of both endpoints.
    pub fn duration(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Intersection of two closed day ranges.
///
/// Returns `None` when the ranges are disjoint. Ranges touching at a
/// single shared day intersect with a 1-day overlap; a zero-length result
/// is never produced.
pub fn overlap(a: DayRange, b: DayRange) -> Option<DayRange> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if start > end {
        return None;
    }
    Some(DayRange { start, end })
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
