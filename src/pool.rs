//! Item pool and constraint record types
//!
//! The pool and the constraint record are supplied by external collaborators
//! (market-data ETL) and are read-only for the duration of a run. The
//! [`Layout`] derived from a constraint record fixes which contiguous slot
//! range of an individual belongs to which partition; it never changes while
//! a run is in flight.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A candidate item with its market price and quality score
///
/// Identity for uniqueness purposes is the `(price, quality)` pair, compared
/// bit-exactly. Items originate from a single pool, so equal items carry
/// identical bit patterns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display name, carried through to reports
    pub name: String,
    /// Market price, non-negative
    pub price: f64,
    /// Quality score in `[0, 1]` (lower is better)
    pub quality: f64,
}

impl Item {
    /// Create a new item
    pub fn new(name: impl Into<String>, price: f64, quality: f64) -> Self {
        Self {
            name: name.into(),
            price,
            quality,
        }
    }
}

/// Partitioned collection of candidate items
///
/// Maps a partition key to its ordered candidate list. Built once per run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pool {
    partitions: BTreeMap<String, Vec<Item>>,
}

impl Pool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or extend) a partition's candidate list
    pub fn insert(&mut self, partition: impl Into<String>, items: Vec<Item>) {
        self.partitions
            .entry(partition.into())
            .or_default()
            .extend(items);
    }

    /// Get a partition's candidates, if the partition exists
    pub fn partition(&self, key: &str) -> Option<&[Item]> {
        self.partitions.get(key).map(Vec::as_slice)
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Check if the pool has no partitions
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Iterate over `(partition, candidates)` entries
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.partitions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl FromIterator<(String, Vec<Item>)> for Pool {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Item>)>>(iter: I) -> Self {
        Self {
            partitions: iter.into_iter().collect(),
        }
    }
}

/// Required item count for one partition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionCount {
    /// Partition key into the pool
    pub partition: String,
    /// Number of individual slots drawn from this partition
    pub count: usize,
}

/// One optimization record: per-partition slot counts plus targets
///
/// The order of `partition_counts` defines the segment order of every
/// individual in the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    /// Ordered per-partition slot requirements
    pub partition_counts: Vec<PartitionCount>,
    /// Target mean price (budget ceiling)
    pub target_price: f64,
    /// Target mean quality score (quality ceiling)
    pub target_quality: f64,
}

impl ConstraintRecord {
    /// Total number of slots N across all partitions
    pub fn total_slots(&self) -> usize {
        self.partition_counts.iter().map(|pc| pc.count).sum()
    }
}

/// A partition's contiguous slot range within an individual
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Partition key into the pool
    pub partition: String,
    /// Slot range in the parallel arrays
    pub range: Range<usize>,
}

impl Segment {
    /// Number of slots in this segment
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Check if the segment holds no slots
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Fixed partition-to-slot-range mapping for one run
///
/// Derived once from a [`ConstraintRecord`]; all operators consult it and
/// none of them may move a slot across a segment boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    segments: Vec<Segment>,
    len: usize,
}

impl Layout {
    /// Build the layout from a constraint record, in record order
    pub fn from_record(record: &ConstraintRecord) -> Self {
        let mut segments = Vec::with_capacity(record.partition_counts.len());
        let mut offset = 0;
        for pc in &record.partition_counts {
            segments.push(Segment {
                partition: pc.partition.clone(),
                range: offset..offset + pc.count,
            });
            offset += pc.count;
        }
        Self {
            segments,
            len: offset,
        }
    }

    /// The segments in fixed order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total number of slots N
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the layout has no slots
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The partition a slot belongs to
    pub fn partition_of(&self, slot: usize) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| s.range.contains(&slot))
            .map(|s| s.partition.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_partition_record() -> ConstraintRecord {
        ConstraintRecord {
            partition_counts: vec![
                PartitionCount {
                    partition: "base".to_string(),
                    count: 7,
                },
                PartitionCount {
                    partition: "modifier".to_string(),
                    count: 3,
                },
            ],
            target_price: 20.0,
            target_quality: 0.5,
        }
    }

    #[test]
    fn test_pool_insert_and_lookup() {
        let mut pool = Pool::new();
        pool.insert("base", vec![Item::new("a", 1.0, 0.1)]);
        pool.insert("base", vec![Item::new("b", 2.0, 0.2)]);

        let items = pool.partition("base").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "a");
        assert!(pool.partition("missing").is_none());
    }

    #[test]
    fn test_pool_from_iterator() {
        let pool: Pool = [
            ("base".to_string(), vec![Item::new("a", 1.0, 0.1)]),
            ("modifier".to_string(), vec![Item::new("b", 2.0, 0.2)]),
        ]
        .into_iter()
        .collect();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.iter().count(), 2);
    }

    #[test]
    fn test_record_total_slots() {
        assert_eq!(two_partition_record().total_slots(), 10);
    }

    #[test]
    fn test_layout_segment_ranges_follow_record_order() {
        let layout = Layout::from_record(&two_partition_record());

        assert_eq!(layout.len(), 10);
        assert_eq!(layout.segments().len(), 2);
        assert_eq!(layout.segments()[0].partition, "base");
        assert_eq!(layout.segments()[0].range, 0..7);
        assert_eq!(layout.segments()[1].partition, "modifier");
        assert_eq!(layout.segments()[1].range, 7..10);
    }

    #[test]
    fn test_layout_partition_of_slot() {
        let layout = Layout::from_record(&two_partition_record());

        assert_eq!(layout.partition_of(0), Some("base"));
        assert_eq!(layout.partition_of(6), Some("base"));
        assert_eq!(layout.partition_of(7), Some("modifier"));
        assert_eq!(layout.partition_of(9), Some("modifier"));
        assert_eq!(layout.partition_of(10), None);
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = two_partition_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: ConstraintRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_pool_json_shape_is_flat_map() {
        let json = r#"{"base": [{"name": "a", "price": 1.5, "quality": 0.25}]}"#;
        let pool: Pool = serde_json::from_str(json).unwrap();
        let items = pool.partition("base").unwrap();
        assert_eq!(items[0].price, 1.5);
        assert_eq!(items[0].quality, 0.25);
    }
}
