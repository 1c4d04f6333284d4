use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// How a legend pattern is compared against a segment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Contains,
    StartsWith,
    EndsWith,
    /// Whole-identifier equality
    Matches,
}

impl FromStr for SearchKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" => Ok(Self::Contains),
            "startswith" => Ok(Self::StartsWith),
            "endswith" => Ok(Self::EndsWith),
            "matches" => Ok(Self::Matches),
            other => Err(format!("unknown search type '{other}'")),
        }
    }
}

/// A single legend row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub kind: SearchKind,
    pub pattern: String,
    pub biotype: String,
}

impl LegendEntry {
    pub fn new(kind: SearchKind, pattern: impl Into<String>, biotype: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            biotype: biotype.into(),
        }
    }

    pub fn matches(&self, identifier: &str) -> bool {
        match self.kind {
            SearchKind::Contains => identifier.contains(self.pattern.as_str()),
            SearchKind::StartsWith => identifier.starts_with(self.pattern.as_str()),
            SearchKind::EndsWith => identifier.ends_with(self.pattern.as_str()),
            SearchKind::Matches => identifier == self.pattern,
        }
    }
}

/// Ordered table mapping identifier patterns to biotype labels.
///
/// Row order is match precedence: the first entry that matches wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationLegend {
    entries: Vec<LegendEntry>,
}

impl ClassificationLegend {
    pub fn new(entries: Vec<LegendEntry>) -> Self {
        Self { entries }
    }

    /// Load a legend file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read,
    /// `Error::InvalidFormat` for a malformed row, or `Error::Configuration`
    /// if the file holds no entries.
    pub fn load(path: &Path, delimiter: char) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path))?;
        let legend = parse_legend_text(&content, delimiter).map_err(|e| match e {
            Error::Configuration(message) => {
                Error::Configuration(format!("{message}: {}", path.display()))
            }
            other => other,
        })?;
        tracing::debug!(
            "Loaded {} legend entries from {}",
            legend.len(),
            path.display()
        );
        Ok(legend)
    }

    pub fn entries(&self) -> &[LegendEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Biotype of the first entry matching `identifier`
    pub fn first_match(&self, identifier: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.matches(identifier))
            .map(|entry| entry.biotype.as_str())
    }
}

/// Parse legend text.
///
/// Rows are either `pattern,biotype` (substring containment) or
/// `search_type,pattern,biotype`.
///
/// # Errors
///
/// Returns `Error::InvalidFormat` for rows with the wrong number of fields,
/// unknown search types or empty fields, and `Error::Configuration` when no
/// entries are found.
pub fn parse_legend_text(text: &str, delimiter: char) -> Result<ClassificationLegend> {
    let mut entries = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if matches!(
                first.as_str(),
                "pattern" | "search_type" | "identifier" | "id"
            ) {
                continue;
            }
        }

        let line_num = i + 1;

        let entry = match fields.as_slice() {
            [pattern, biotype] => LegendEntry::new(SearchKind::Contains, *pattern, *biotype),
            [kind, pattern, biotype] => {
                let kind = kind
                    .parse::<SearchKind>()
                    .map_err(|e| Error::format(line_num, e))?;
                LegendEntry::new(kind, *pattern, *biotype)
            }
            _ => {
                return Err(Error::format(
                    line_num,
                    format!("expected 2 or 3 fields, found {}", fields.len()),
                ))
            }
        };

        if entry.pattern.is_empty() || entry.biotype.is_empty() {
            return Err(Error::format(line_num, "empty pattern or biotype"));
        }

        entries.push(entry);
    }

    if entries.is_empty() {
        return Err(Error::Configuration(
            "classification legend has no entries".to_string(),
        ));
    }

    Ok(ClassificationLegend::new(entries))
}
