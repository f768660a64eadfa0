use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

/// In-memory tabular dataset: ordered headers, string cells, O(1) header
/// lookup. Input tables arrive as CSV from the collection layer; the wide
/// score artifact goes back out the same way.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, h) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers.
            index.entry(h.clone()).or_insert(i);
        }
        Self {
            headers,
            index,
            rows: Vec::new(),
        }
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read csv {}", path.display()))?;
        Self::from_csv_str(&raw).with_context(|| format!("parse csv {}", path.display()))
    }

    pub fn from_csv_str(raw: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(raw.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .context("read csv header row")?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            return Err(anyhow!("csv has no header row"));
        }
        let width = headers.len();
        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record.context("read csv record")?;
            // Tolerate ragged tails: short rows pad with empty cells, long
            // rows are truncated to the header width. Fully blank lines are
            // skipped entirely, even mid-file, matching the upstream
            // exporters; a line of bare commas still counts as a row.
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() < width {
                row.resize(width, String::new());
            } else {
                row.truncate(width);
            }
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        fs::write(path, self.to_csv_string()?)
            .with_context(|| format!("write csv {}", path.display()))
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .context("encode csv header")?;
        for row in &self.rows {
            writer.write_record(row).context("encode csv row")?;
        }
        let bytes = writer.into_inner().context("flush csv buffer")?;
        String::from_utf8(bytes).context("decode csv buffer as utf-8")
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn row(&self, idx: usize) -> Option<&[String]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Trimmed cell text; `None` when the column is absent or the cell blank.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        let raw = self.rows.get(row)?.get(col)?.trim();
        if raw.is_empty() { None } else { Some(raw) }
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(anyhow!(
                "row width {} does not match header width {}",
                row.len(),
                self.headers.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Pad or truncate to the header width and push. Mirrors the reader's
    /// ragged-row tolerance for callers that build rows positionally.
    pub fn push_row_lossy(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn truncate(&mut self, rows: usize) {
        self.rows.truncate(rows);
    }
}

/// Parse a float cell. Blank, "-", "NA" and "NaN" style placeholders read as
/// absent; thousands separators are dropped.
pub fn parse_f64(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    if s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("nan") {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

/// Parse a win-rate style cell into a 0..1 ratio. Percentage text like
/// "43%" or "P/Kill 43%" divides by 100; plain numbers are taken as-is.
pub fn parse_ratio(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('%') {
        let digits: String = s
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        return digits.parse::<f64>().ok().map(|n| n / 100.0);
    }
    parse_f64(s)
}

/// Parse a KDA cell. The upstream site reports a deathless stretch as the
/// sentinel "Perfect"; that resolves to kills+assists when both are known
/// for the slot, else the fixed stand-in 6.0.
pub fn parse_kda(raw: &str, kills: Option<f64>, assists: Option<f64>) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if s.eq_ignore_ascii_case("perfect") {
        return match (kills, assists) {
            (Some(k), Some(a)) => Some(k + a),
            _ => Some(6.0),
        };
    }
    parse_f64(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trip_preserves_quoting() {
        let raw = "name,notes\n\"Nunu & Willump\",\"likes \"\"snow\"\", a lot\"\nTeemo,plain\n";
        let table = Table::from_csv_str(raw).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "name"), Some("Nunu & Willump"));
        assert_eq!(table.cell(0, "notes"), Some("likes \"snow\", a lot"));
        let rewritten = table.to_csv_string().unwrap();
        let again = Table::from_csv_str(&rewritten).unwrap();
        assert_eq!(again.cell(0, "notes"), Some("likes \"snow\", a lot"));
    }

    #[test]
    fn short_rows_pad_with_blanks() {
        let table = Table::from_csv_str("a,b,c\n1,2\n").unwrap();
        assert_eq!(table.cell(0, "a"), Some("1"));
        assert_eq!(table.cell(0, "c"), None);
    }

    #[test]
    fn blank_lines_are_skipped_entirely() {
        // A fully blank line mid-file is not a row; bare commas are.
        let table = Table::from_csv_str("a,b\n1,2\n\n3,4\n,\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(1, "a"), Some("3"));
        assert_eq!(table.cell(2, "a"), None);
    }

    #[test]
    fn lossy_push_pads_and_truncates() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_row_lossy(vec!["1".to_string()]);
        table.push_row_lossy(vec!["2".to_string(), "3".to_string(), "4".to_string()]);
        assert_eq!(table.cell(0, "a"), Some("1"));
        assert_eq!(table.cell(0, "b"), None);
        assert_eq!(
            table.row(1),
            Some(["2".to_string(), "3".to_string()].as_slice())
        );
    }

    #[test]
    fn parse_f64_handles_placeholders() {
        assert_eq!(parse_f64("1.72"), Some(1.72));
        assert_eq!(parse_f64("1,234"), Some(1234.0));
        assert_eq!(parse_f64("-"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64(""), None);
    }

    #[test]
    fn parse_ratio_handles_percent_text() {
        assert_eq!(parse_ratio("43%"), Some(0.43));
        assert_eq!(parse_ratio("P/Kill 43%"), Some(0.43));
        assert_eq!(parse_ratio("0.55"), Some(0.55));
        assert_eq!(parse_ratio(""), None);
    }

    #[test]
    fn parse_kda_resolves_perfect_sentinel() {
        assert_eq!(parse_kda("3.5", None, None), Some(3.5));
        assert_eq!(parse_kda("Perfect", Some(4.0), Some(8.0)), Some(12.0));
        assert_eq!(parse_kda("Perfect", None, Some(8.0)), Some(6.0));
        assert_eq!(parse_kda("", None, None), None);
    }
}
