//! Ranking and serialization of an aggregated [`TargetTally`].
//!
//! Ordering is fully deterministic:
//!
//! - miRNAs by descending total count, ties by ascending identifier
//! - targets within a miRNA by descending count, ties by ascending identifier

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::analysis::aggregate::TargetTally;
use crate::error::{Error, Result};

pub const SUMMARY_HEADER: [&str; 3] = ["miRNA", "target", "count"];
pub const COUNTS_HEADER: [&str; 2] = ["miRNA", "count"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCount {
    pub target: String,
    pub count: u64,
}

/// All targets of one miRNA, best first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirnaTargets {
    pub mirna: String,
    pub total: u64,
    pub targets: Vec<TargetCount>,
}

/// Sorted view of a tally with per-miRNA and overall totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessedTargets {
    pub sorted: Vec<MirnaTargets>,
    /// miRNA -> summed target count, in report order
    pub counts: IndexMap<String, u64>,
    pub total_count: u64,
}

impl ProcessedTargets {
    /// (miRNA, target, count) rows in report order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.sorted.iter().flat_map(|m| {
            m.targets
                .iter()
                .map(move |t| (m.mirna.as_str(), t.target.as_str(), t.count))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

/// One parsed summary row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub mirna: String,
    pub target: String,
    pub count: u64,
}

/// Sort a tally into report order and compute totals
pub fn process_tally(tally: &TargetTally) -> ProcessedTargets {
    let mut sorted: Vec<MirnaTargets> = tally
        .iter()
        .map(|(mirna, targets)| {
            let mut targets: Vec<TargetCount> = targets
                .iter()
                .map(|(target, count)| TargetCount {
                    target: target.clone(),
                    count: *count,
                })
                .collect();
            targets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.target.cmp(&b.target)));

            MirnaTargets {
                mirna: mirna.to_string(),
                total: targets.iter().map(|t| t.count).sum(),
                targets,
            }
        })
        .collect();

    sorted.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.mirna.cmp(&b.mirna)));

    let counts: IndexMap<String, u64> = sorted.iter().map(|m| (m.mirna.clone(), m.total)).collect();
    let total_count = counts.values().sum();

    ProcessedTargets {
        sorted,
        counts,
        total_count,
    }
}

/// Write the ranked target report: a header then one row per (miRNA, target, count)
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be created or written.
pub fn write_summary(path: &Path, processed: &ProcessedTargets, separator: char) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(e, path))?;
    let mut writer = BufWriter::new(file);
    write_summary_to(&mut writer, processed, separator)
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io(e, path))?;
    tracing::debug!(
        "Wrote {} target rows to {}",
        processed.rows().count(),
        path.display()
    );
    Ok(())
}

/// Write the ranked target report to any writer
///
/// # Errors
///
/// Propagates write failures from `writer`.
pub fn write_summary_to<W: Write>(
    writer: &mut W,
    processed: &ProcessedTargets,
    separator: char,
) -> std::io::Result<()> {
    writeln!(writer, "{}", SUMMARY_HEADER.join(&separator.to_string()))?;
    for (mirna, target, count) in processed.rows() {
        writeln!(writer, "{mirna}{separator}{target}{separator}{count}")?;
    }
    Ok(())
}

/// Write per-miRNA totals in report order
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be created or written.
pub fn write_mirna_counts(path: &Path, processed: &ProcessedTargets, separator: char) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", COUNTS_HEADER.join(&separator.to_string()))?;
        for (mirna, count) in &processed.counts {
            writeln!(writer, "{mirna}{separator}{count}")?;
        }
        writer.flush()
    };
    write().map_err(|e| Error::io(e, path))
}

/// Read a report written by [`write_summary`]
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read, or
/// `Error::InvalidFormat` for malformed rows.
pub fn read_summary(path: &Path, separator: char) -> Result<Vec<SummaryRow>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
    parse_summary_text(&content, separator)
}

/// Parse report text; the header row is optional
///
/// # Errors
///
/// Returns `Error::InvalidFormat` for rows without exactly three fields or
/// with a non-integer count.
pub fn parse_summary_text(text: &str, separator: char) -> Result<Vec<SummaryRow>> {
    let mut rows = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(separator).collect();
        if i == 0 && fields == SUMMARY_HEADER {
            continue;
        }

        let line_num = i + 1;
        let [mirna, target, count] = fields.as_slice() else {
            return Err(Error::format(
                line_num,
                format!("expected 3 fields, found {}", fields.len()),
            ));
        };
        let count = count
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::format(line_num, format!("invalid count '{count}'")))?;

        rows.push(SummaryRow {
            mirna: (*mirna).to_string(),
            target: (*target).to_string(),
            count,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn tally() -> TargetTally {
        [
            ("mir2", "geneC", 1),
            ("mir1", "geneB", 3),
            ("mir1", "geneA", 3),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_process_orders_by_count_then_name() {
        let processed = process_tally(&tally());

        let mirnas: Vec<&str> = processed.sorted.iter().map(|m| m.mirna.as_str()).collect();
        assert_eq!(mirnas, vec!["mir1", "mir2"]);

        let mir1_targets: Vec<&str> = processed.sorted[0]
            .targets
            .iter()
            .map(|t| t.target.as_str())
            .collect();
        assert_eq!(mir1_targets, vec!["geneA", "geneB"]);

        assert_eq!(processed.counts.get("mir1"), Some(&6));
        assert_eq!(processed.counts.get("mir2"), Some(&1));
        assert_eq!(processed.total_count, 7);
    }

    #[test]
    fn test_mirna_ties_broken_by_name() {
        let tally: TargetTally = [("mir-b", "t", 2), ("mir-a", "t", 1), ("mir-a", "u", 1)]
            .into_iter()
            .collect();
        let processed = process_tally(&tally);
        let keys: Vec<&String> = processed.counts.keys().collect();
        assert_eq!(keys, vec!["mir-a", "mir-b"]);
    }

    #[test]
    fn test_process_empty_tally() {
        let processed = process_tally(&TargetTally::new());
        assert!(processed.is_empty());
        assert_eq!(processed.total_count, 0);
    }

    #[test]
    fn test_write_to_buffer() {
        let processed = process_tally(&tally());
        let mut buf = Vec::new();
        write_summary_to(&mut buf, &processed, ',').unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "miRNA,target,count\nmir1,geneA,3\nmir1,geneB,3\nmir2,geneC,1\n"
        );
    }

    #[test]
    fn test_summary_round_trip() {
        let processed = process_tally(&tally());
        let file = NamedTempFile::with_suffix(".tsv").unwrap();
        write_summary(file.path(), &processed, '\t').unwrap();

        let rows = read_summary(file.path(), '\t').unwrap();
        let triples: Vec<(&str, &str, u64)> = rows
            .iter()
            .map(|r| (r.mirna.as_str(), r.target.as_str(), r.count))
            .collect();
        let expected: Vec<(&str, &str, u64)> = processed.rows().collect();
        assert_eq!(triples, expected);
    }

    #[test]
    fn test_write_mirna_counts() {
        let processed = process_tally(&tally());
        let file = NamedTempFile::with_suffix(".csv").unwrap();
        write_mirna_counts(file.path(), &processed, ',').unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "miRNA,count\nmir1,6\nmir2,1\n");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let processed = process_tally(&tally());
        let err = write_summary(
            Path::new("/nonexistent-dir/for/sure/out.csv"),
            &processed,
            ',',
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_rows() {
        assert!(matches!(
            parse_summary_text("miRNA,target,count\nmir1,geneA\n", ','),
            Err(Error::InvalidFormat { line: 2, .. })
        ));
        assert!(matches!(
            parse_summary_text("mir1,geneA,many\n", ','),
            Err(Error::InvalidFormat { line: 1, .. })
        ));
    }
}
