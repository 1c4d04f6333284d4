//! Reader and writer for `.hyb` hybrid-read files.
//!
//! Each record is one tab-separated line:
//!
//! | Column | Field |
//! |--------|-------|
//! | 1      | read id |
//! | 2      | read sequence |
//! | 3      | folding energy (`.` if absent) |
//! | 4-9    | seg1 identifier, read start, read end, ref start, ref end, score |
//! | 10-15  | seg2 identifier, read start, read end, ref start, ref end, score |
//! | 16     | optional flags, `name=value;` pairs |

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::core::record::{is_derived_flag, HybRecord, DERIVED_FLAGS};
use crate::core::segment::Segment;
use crate::error::{Error, Result};

/// Number of mandatory columns in a hyb line
pub const HYB_COLUMNS: usize = 15;

const EMPTY_FIELD: &str = ".";

/// Forward-only source of [`HybRecord`]s.
///
/// Blank lines and `#` comments are skipped. Once the input is exhausted
/// the reader keeps returning `None`.
pub struct HybReader {
    lines: Lines<Box<dyn BufRead>>,
    path: PathBuf,
    line_num: usize,
    records: u64,
    exhausted: bool,
}

impl HybReader {
    /// Open a `.hyb` file, decompressing it if the name ends in `.gz`
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(e, path))?;

        let is_gzipped = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

        let reader: Box<dyn BufRead> = if is_gzipped {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        tracing::debug!("Opened {} for reading", path.display());
        Ok(Self::with_path(reader, path))
    }

    pub fn new<R: BufRead + 'static>(reader: R) -> Self {
        Self::with_path(Box::new(reader), Path::new("<stream>"))
    }

    fn with_path(reader: Box<dyn BufRead>, path: &Path) -> Self {
        Self {
            lines: reader.lines(),
            path: path.to_path_buf(),
            line_num: 0,
            records: 0,
            exhausted: false,
        }
    }

    /// Records successfully parsed so far
    pub fn records_read(&self) -> u64 {
        self.records
    }
}

impl Iterator for HybReader {
    type Item = Result<HybRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let line = match self.lines.next() {
                None => {
                    self.exhausted = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Some(Err(Error::io(e, &self.path)));
                }
                Some(Ok(line)) => line,
            };
            self.line_num += 1;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let record = parse_hyb_line(line, self.line_num);
            if record.is_ok() {
                self.records += 1;
            }
            return Some(record);
        }
        None
    }
}

impl FusedIterator for HybReader {}

/// Parse one hyb line. `line_num` is used for error messages only.
///
/// # Errors
///
/// Returns `Error::InvalidFormat` for a wrong column count, non-integer
/// coordinates, a segment whose start lies after its end, or a malformed
/// flag.
pub fn parse_hyb_line(line: &str, line_num: usize) -> Result<HybRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < HYB_COLUMNS || fields.len() > HYB_COLUMNS + 1 {
        return Err(Error::format(
            line_num,
            format!(
                "expected {HYB_COLUMNS} or {} tab-separated fields, found {}",
                HYB_COLUMNS + 1,
                fields.len()
            ),
        ));
    }

    let seg1 = parse_segment(&fields[3..9], line_num)?;
    let seg2 = parse_segment(&fields[9..15], line_num)?;

    let energy = match fields[2] {
        "" | EMPTY_FIELD => None,
        value => Some(value.to_string()),
    };

    let mut record = HybRecord::new(fields[0], fields[1], seg1, seg2).with_energy(energy);

    if let Some(flag_field) = fields.get(HYB_COLUMNS) {
        for flag in flag_field.split(';').filter(|f| !f.is_empty()) {
            let (name, value) = flag
                .split_once('=')
                .ok_or_else(|| Error::format(line_num, format!("malformed flag '{flag}'")))?;
            record = record.with_flag(name, value);
        }
    }

    Ok(record)
}

fn parse_segment(fields: &[&str], line_num: usize) -> Result<Segment> {
    let coord = |value: &str, name: &str| -> Result<u64> {
        value.parse::<u64>().map_err(|_| {
            Error::format(line_num, format!("invalid {name} '{value}' for '{}'", fields[0]))
        })
    };

    let read_start = coord(fields[1], "read start")?;
    let read_end = coord(fields[2], "read end")?;
    if read_start > read_end {
        return Err(Error::format(
            line_num,
            format!(
                "segment '{}' starts after it ends ({read_start} > {read_end})",
                fields[0]
            ),
        ));
    }

    let ref_start = coord(fields[3], "ref start")?;
    let ref_end = coord(fields[4], "ref end")?;

    Ok(Segment::new(fields[0], read_start, read_end).with_reference(ref_start, ref_end, fields[5]))
}

/// Serialize a record as a hyb line (without the trailing newline).
///
/// Derived flags come first in a fixed order, then passthrough flags in
/// insertion order.
pub fn format_hyb_line(record: &HybRecord) -> String {
    let mut fields: Vec<String> = vec![
        record.id().to_string(),
        record.seq().to_string(),
        record.energy().unwrap_or(EMPTY_FIELD).to_string(),
    ];

    for seg in [record.seg1(), record.seg2()] {
        fields.extend([
            seg.identifier.clone(),
            seg.read_start.to_string(),
            seg.read_end.to_string(),
            seg.ref_start.to_string(),
            seg.ref_end.to_string(),
            seg.score.clone(),
        ]);
    }

    let mut ordered: Vec<(&str, &str)> = DERIVED_FLAGS
        .iter()
        .filter_map(|name| record.flag(name).map(|value| (*name, value)))
        .collect();
    ordered.extend(record.flags().filter(|(name, _)| !is_derived_flag(name)));

    let flags: String = ordered
        .iter()
        .map(|(name, value)| format!("{name}={value};"))
        .collect();
    if !flags.is_empty() {
        fields.push(flags);
    }

    fields.join("\t")
}

/// Sink appending records to a `.hyb` file in call order
pub struct HybWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    records: u64,
}

impl HybWriter {
    /// Create (or truncate) the output file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| Error::io(e, path))?;
        tracing::debug!("Opened {} for writing", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            records: 0,
        })
    }

    /// # Errors
    ///
    /// Returns `Error::Io` if the write fails.
    pub fn write_record(&mut self, record: &HybRecord) -> Result<()> {
        writeln!(self.writer, "{}", format_hyb_line(record)).map_err(|e| Error::io(e, &self.path))?;
        self.records += 1;
        Ok(())
    }

    /// Flush buffered output and return the number of records written
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the final flush fails.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.flush().map_err(|e| Error::io(e, &self.path))?;
        Ok(self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MirnaTypes;
    use crate::matching::engine::{MatchStrategy, SegmentMatcher};
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    const LINE: &str = "695_89\tTGAGGTAGTAGGTTGTATAGTTTTAGGGTCACACCCACCACTGGGAGATAA\t-11.3\t\
MIMAT0000062_MirBase_let-7a_microRNA\t1\t22\t1\t22\t4.7e-06\t\
ENSG00000132881_ENST00000445866_RSG1_mRNA\t22\t50\t1281\t1309\t1.1e-05\t\
count_total=2;dataset=WT_BR1;";

    #[test]
    fn test_parse_hyb_line() {
        let rec = parse_hyb_line(LINE, 1).unwrap();
        assert_eq!(rec.id(), "695_89");
        assert_eq!(rec.energy(), Some("-11.3"));
        assert_eq!(rec.seg1().identifier, "MIMAT0000062_MirBase_let-7a_microRNA");
        assert_eq!(rec.seg1().read_end, 22);
        assert_eq!(rec.seg2().ref_start, 1281);
        assert_eq!(rec.seg2().score, "1.1e-05");
        assert_eq!(rec.flag("count_total"), Some("2"));
        assert_eq!(rec.flag("dataset"), Some("WT_BR1"));
        assert!(!rec.is_classified());
    }

    #[test]
    fn test_parse_without_flags_or_energy() {
        let line = "r1\tACGT\t.\ta\t1\t2\t1\t2\t.\tb\t3\t4\t5\t6\t.";
        let rec = parse_hyb_line(line, 1).unwrap();
        assert_eq!(rec.energy(), None);
        assert_eq!(rec.flags().count(), 0);
        assert_eq!(format_hyb_line(&rec), line);
    }

    #[test]
    fn test_parse_errors() {
        let too_short = "r1\tACGT\t.\ta\t1\t2";
        assert!(matches!(
            parse_hyb_line(too_short, 7),
            Err(Error::InvalidFormat { line: 7, .. })
        ));

        let bad_coord = "r1\tACGT\t.\ta\tx\t2\t1\t2\t.\tb\t3\t4\t5\t6\t.";
        assert!(parse_hyb_line(bad_coord, 1).is_err());

        let reversed = "r1\tACGT\t.\ta\t9\t2\t1\t2\t.\tb\t3\t4\t5\t6\t.";
        assert!(parse_hyb_line(reversed, 1).is_err());

        let bad_flag = "r1\tACGT\t.\ta\t1\t2\t1\t2\t.\tb\t3\t4\t5\t6\t.\tnoequals;";
        assert!(parse_hyb_line(bad_flag, 1).is_err());
    }

    #[test]
    fn test_derived_flags_written_first_and_dropped_on_read() {
        let mut rec = parse_hyb_line(LINE, 1).unwrap();
        rec.find_seg_types(&SegmentMatcher::new(MatchStrategy::Hyb));
        rec.mirna_analysis(&MirnaTypes::default()).unwrap();

        let line = format_hyb_line(&rec);
        assert!(line.ends_with(
            "seg1_type=microRNA;seg2_type=mRNA;mirna_seg=seg1;target_seg=seg2;count_total=2;dataset=WT_BR1;"
        ));

        let reread = parse_hyb_line(&line, 1).unwrap();
        assert!(!reread.is_classified());
        assert_eq!(reread.flag("seg1_type"), None);
        assert_eq!(reread.flag("count_total"), Some("2"));
    }

    #[test]
    fn test_reader_skips_comments_and_is_fused() {
        let text = format!("# header comment\n\n{LINE}\n{LINE}\n");
        let mut reader = HybReader::new(Cursor::new(text));
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_reader_reports_line_numbers() {
        let text = format!("{LINE}\n# comment\nbroken line\n");
        let results: Vec<_> = HybReader::new(Cursor::new(text)).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[1],
            Err(Error::InvalidFormat { line: 3, .. })
        ));
    }

    #[test]
    fn test_writer_then_reader() {
        let file = NamedTempFile::with_suffix(".hyb").unwrap();
        let rec = parse_hyb_line(LINE, 1).unwrap();

        let mut writer = HybWriter::create(file.path()).unwrap();
        writer.write_record(&rec).unwrap();
        writer.write_record(&rec).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let records: Vec<HybRecord> = HybReader::open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records, vec![rec.clone(), rec]);
    }

    #[test]
    fn test_open_gzipped() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let file = NamedTempFile::with_suffix(".hyb.gz").unwrap();
        let mut encoder = GzEncoder::new(File::create(file.path()).unwrap(), Compression::default());
        writeln!(encoder, "{LINE}").unwrap();
        encoder.finish().unwrap();

        let records: Vec<HybRecord> = HybReader::open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), "695_89");
    }

    #[test]
    fn test_open_missing_file() {
        let err = HybReader::open(Path::new("/no/such/file.hyb")).err().unwrap();
        assert!(matches!(err, Error::Io { ref path, .. } if path == Path::new("/no/such/file.hyb")));
        assert!(err.to_string().contains("/no/such/file.hyb"));
    }
}
