use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

/// An interval over the integer sharding domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    pub lower: Bound<i64>,
    pub upper: Bound<i64>,
}

impl ValueRange {
    pub fn new(lower: Bound<i64>, upper: Bound<i64>) -> Self {
        Self { lower, upper }
    }

    /// `(-inf, upper)`
    pub fn less_than(upper: i64) -> Self {
        Self::new(Bound::Unbounded, Bound::Excluded(upper))
    }

    /// `[lower, upper)`
    pub fn closed_open(lower: i64, upper: i64) -> Self {
        Self::new(Bound::Included(lower), Bound::Excluded(upper))
    }

    /// `[lower, upper]`
    pub fn closed(lower: i64, upper: i64) -> Self {
        Self::new(Bound::Included(lower), Bound::Included(upper))
    }

    /// `[lower, +inf)`
    pub fn at_least(lower: i64) -> Self {
        Self::new(Bound::Included(lower), Bound::Unbounded)
    }

    pub fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    pub fn contains(&self, value: i64) -> bool {
        self.above_lower(value) && self.below_upper(value)
    }

    fn above_lower(&self, value: i64) -> bool {
        match self.lower {
            Bound::Unbounded => true,
            Bound::Included(lower) => value >= lower,
            Bound::Excluded(lower) => value > lower,
        }
    }

    fn below_upper(&self, value: i64) -> bool {
        match self.upper {
            Bound::Unbounded => true,
            Bound::Included(upper) => value <= upper,
            Bound::Excluded(upper) => value < upper,
        }
    }

    /// Smallest and largest integers inside the range, `None` when it is empty.
    pub fn integer_endpoints(&self) -> Option<(i64, i64)> {
        let first = match self.lower {
            Bound::Unbounded => i64::MIN,
            Bound::Included(lower) => lower,
            Bound::Excluded(lower) => lower.checked_add(1)?,
        };
        let last = match self.upper {
            Bound::Unbounded => i64::MAX,
            Bound::Included(upper) => upper,
            Bound::Excluded(upper) => upper.checked_sub(1)?,
        };
        (first <= last).then_some((first, last))
    }

    pub fn intersects(&self, other: &ValueRange) -> bool {
        match (self.integer_endpoints(), other.integer_endpoints()) {
            (Some((a_first, a_last)), Some((b_first, b_last))) => {
                a_first <= b_last && b_first <= a_last
            }
            _ => false,
        }
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Bound::Unbounded => write!(f, "(-inf")?,
            Bound::Included(lower) => write!(f, "[{}", lower)?,
            Bound::Excluded(lower) => write!(f, "({}", lower)?,
        }
        match self.upper {
            Bound::Unbounded => write!(f, ", +inf)"),
            Bound::Included(upper) => write!(f, ", {}]", upper),
            Bound::Excluded(upper) => write!(f, ", {})", upper),
        }
    }
}

/// Dense partition index -> interval mapping covering the whole domain.
///
/// Index 0 is `(-inf, first boundary)`, the last index is
/// `[last boundary, +inf)` and every index in between is a closed-open window
/// between two consecutive boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRange {
    ranges: Vec<ValueRange>,
}

impl PartitionRange {
    /// Boundaries must be strictly ascending and non-empty.
    pub(crate) fn from_boundaries(boundaries: &[i64]) -> Self {
        debug_assert!(!boundaries.is_empty());
        debug_assert!(boundaries.windows(2).all(|pair| pair[0] < pair[1]));

        let mut ranges = Vec::with_capacity(boundaries.len() + 1);
        ranges.push(ValueRange::less_than(boundaries[0]));
        for pair in boundaries.windows(2) {
            ranges.push(ValueRange::closed_open(pair[0], pair[1]));
        }
        ranges.push(ValueRange::at_least(boundaries[boundaries.len() - 1]));
        Self { ranges }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ValueRange> {
        self.ranges.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ValueRange)> {
        self.ranges.iter().enumerate()
    }

    /// Index of the unique range containing `value`.
    pub fn partition_of(&self, value: i64) -> usize {
        self.ranges
            .partition_point(|range| !range.below_upper(value))
            .min(self.ranges.len().saturating_sub(1))
    }

    /// Indexes of every range overlapping `range`, ascending.
    pub fn intersecting(&self, range: &ValueRange) -> Vec<usize> {
        let Some((first, last)) = range.integer_endpoints() else {
            return Vec::new();
        };
        (self.partition_of(first)..=self.partition_of(last)).collect()
    }

    pub fn to_map(&self) -> BTreeMap<usize, ValueRange> {
        self.iter().map(|(index, range)| (index, *range)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_boundaries() {
        let partitions = PartitionRange::from_boundaries(&[1, 5, 10]);
        assert_eq!(partitions.len(), 4);
        assert_eq!(partitions.get(0), Some(&ValueRange::less_than(1)));
        assert_eq!(partitions.get(2), Some(&ValueRange::closed_open(5, 10)));
        assert_eq!(partitions.get(3), Some(&ValueRange::at_least(10)));
    }

    #[test]
    fn test_partition_of_edges() {
        let partitions = PartitionRange::from_boundaries(&[1, 5, 10]);
        assert_eq!(partitions.partition_of(i64::MIN), 0);
        assert_eq!(partitions.partition_of(0), 0);
        assert_eq!(partitions.partition_of(1), 1);
        assert_eq!(partitions.partition_of(4), 1);
        assert_eq!(partitions.partition_of(5), 2);
        assert_eq!(partitions.partition_of(10), 3);
        assert_eq!(partitions.partition_of(i64::MAX), 3);
    }

    #[test]
    fn test_intersecting() {
        let partitions = PartitionRange::from_boundaries(&[1, 5, 10]);
        assert_eq!(partitions.intersecting(&ValueRange::closed(3, 7)), vec![1, 2]);
        assert_eq!(partitions.intersecting(&ValueRange::at_least(9)), vec![2, 3]);
        assert_eq!(partitions.intersecting(&ValueRange::all()), vec![0, 1, 2, 3]);
        assert!(partitions.intersecting(&ValueRange::closed_open(4, 4)).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueRange::less_than(0).to_string(), "(-inf, 0)");
        assert_eq!(ValueRange::closed_open(0, 4).to_string(), "[0, 4)");
        assert_eq!(ValueRange::at_least(10).to_string(), "[10, +inf)");
    }
}
