use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::target::TargetPair;
use crate::core::record::HybRecord;
use crate::error::Result;

/// Running miRNA -> target -> count table.
///
/// Keys keep first-seen order, so iteration follows the order records were
/// aggregated in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetTally(IndexMap<String, IndexMap<String, u64>>);

impl TargetTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the `mirna -> target` cell
    pub fn add(&mut self, mirna: &str, target: &str, count: u64) {
        *self
            .0
            .entry(mirna.to_string())
            .or_default()
            .entry(target.to_string())
            .or_insert(0) += count;
    }

    pub fn get(&self, mirna: &str, target: &str) -> u64 {
        self.0
            .get(mirna)
            .and_then(|targets| targets.get(target))
            .copied()
            .unwrap_or(0)
    }

    pub fn targets(&self, mirna: &str) -> Option<&IndexMap<String, u64>> {
        self.0.get(mirna)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexMap<String, u64>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct miRNAs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every cell
    pub fn total(&self) -> u64 {
        self.0.values().flat_map(IndexMap::values).sum()
    }
}

impl<'a> FromIterator<(&'a str, &'a str, u64)> for TargetTally {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str, u64)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (mirna, target, count) in iter {
            tally.add(mirna, target, count);
        }
        tally
    }
}

/// Counters describing one aggregation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Records passed to [`TargetAggregator::record_hybrid`]
    pub records: u64,
    /// Pairs folded into the tally
    pub pairs: u64,
    pub duplexes: u64,
    /// Records without a miRNA-like segment
    pub not_applicable: u64,
}

/// Folds target pairs into a [`TargetTally`] in input order
#[derive(Debug, Clone, Default)]
pub struct TargetAggregator {
    tally: TargetTally,
    stats: AggregationStats,
}

impl TargetAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one pair into the tally.
    ///
    /// A duplex is credited in both directions when `double_count_duplexes`
    /// is set, and only as seg1 -> seg2 otherwise. `None` only counts toward
    /// `not_applicable`.
    pub fn record(&mut self, pair: Option<&TargetPair>, double_count_duplexes: bool) {
        let Some(pair) = pair else {
            self.stats.not_applicable += 1;
            return;
        };

        self.stats.pairs += 1;
        self.tally.add(&pair.mirna, &pair.target, 1);

        if pair.is_duplex {
            self.stats.duplexes += 1;
            if double_count_duplexes {
                self.tally.add(&pair.target, &pair.mirna, 1);
            }
        }
    }

    /// Extract the pair from an analysed record and fold it in
    ///
    /// # Errors
    ///
    /// Returns `Error::PrecursorState` if `mirna_analysis` has not run on
    /// the record.
    pub fn record_hybrid(&mut self, record: &HybRecord, double_count_duplexes: bool) -> Result<()> {
        let pair = record.target_pair()?;
        self.stats.records += 1;
        self.record(pair.as_ref(), double_count_duplexes);
        Ok(())
    }

    pub fn tally(&self) -> &TargetTally {
        &self.tally
    }

    pub fn stats(&self) -> AggregationStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pairs_count_once() {
        let mut agg = TargetAggregator::new();
        let pairs = [
            TargetPair::new("mir-1", "geneA"),
            TargetPair::new("mir-1", "geneB"),
            TargetPair::new("mir-2", "geneA"),
            TargetPair::new("mir-1", "geneA"),
        ];
        for pair in &pairs {
            agg.record(Some(pair), false);
        }

        assert_eq!(agg.tally().get("mir-1", "geneA"), 2);
        assert_eq!(agg.tally().get("mir-1", "geneB"), 1);
        assert_eq!(agg.tally().get("mir-2", "geneA"), 1);
        assert_eq!(agg.tally().total(), pairs.len() as u64);
        assert_eq!(agg.stats().pairs, 4);
    }

    #[test]
    fn test_duplex_double_counting() {
        let duplex = TargetPair::duplex("mir-X", "mir-Y");

        let mut single = TargetAggregator::new();
        single.record(Some(&duplex), false);
        assert_eq!(single.tally().total(), 1);
        assert_eq!(single.tally().get("mir-X", "mir-Y"), 1);
        assert_eq!(single.tally().get("mir-Y", "mir-X"), 0);

        let mut double = TargetAggregator::new();
        double.record(Some(&duplex), true);
        assert_eq!(double.tally().total(), 2);
        assert_eq!(double.tally().get("mir-X", "mir-Y"), 1);
        assert_eq!(double.tally().get("mir-Y", "mir-X"), 1);
        assert_eq!(double.stats().duplexes, 1);
    }

    #[test]
    fn test_flag_has_no_effect_on_normal_pairs() {
        let mut agg = TargetAggregator::new();
        agg.record(Some(&TargetPair::new("mir-1", "geneA")), true);
        assert_eq!(agg.tally().total(), 1);
        assert_eq!(agg.tally().get("geneA", "mir-1"), 0);
    }

    #[test]
    fn test_no_pair_is_noop() {
        let mut agg = TargetAggregator::new();
        agg.record(None, true);
        assert!(agg.tally().is_empty());
        assert_eq!(agg.stats().not_applicable, 1);
    }

    #[test]
    fn test_tally_preserves_first_seen_order() {
        let tally: TargetTally = [("mir-b", "t2", 1), ("mir-a", "t1", 1), ("mir-b", "t1", 1)]
            .into_iter()
            .collect();
        let mirnas: Vec<&str> = tally.iter().map(|(m, _)| m).collect();
        assert_eq!(mirnas, vec!["mir-b", "mir-a"]);
        let targets: Vec<&str> = tally
            .targets("mir-b")
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(targets, vec!["t2", "t1"]);
    }
}
