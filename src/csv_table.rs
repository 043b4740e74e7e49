// csv_table.rs
use calamine::{open_workbook_auto, Reader};
use std::collections::HashSet;
use std::error::Error;
use std::io::Read;
use std::path::Path;

const PREVIEW_CELL_WIDTH: usize = 25;

/// An in-memory delimited table: one header row plus string-valued data rows.
/// Every row is kept exactly as wide as the header row; `push_row` pads or
/// truncates, so downstream code can index cells without bounds anxiety.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new() -> Self {
        CsvTable {
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_headers(headers: Vec<String>) -> Self {
        CsvTable {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Append a row, padded or truncated to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Bag union: append the other table's rows underneath this one. Columns
    /// are unified by name (first-seen order); cells a side does not have come
    /// through empty. No deduplication happens here.
    pub fn append_table(&mut self, other: &CsvTable) {
        if self.headers.is_empty() {
            *self = other.clone();
            return;
        }

        let mut mapping = Vec::with_capacity(other.headers.len());
        for header in &other.headers {
            let idx = match self.headers.iter().position(|h| h == header) {
                Some(i) => i,
                None => {
                    self.headers.push(header.clone());
                    for row in &mut self.rows {
                        row.push(String::new());
                    }
                    self.headers.len() - 1
                }
            };
            mapping.push(idx);
        }

        let width = self.headers.len();
        for row in &other.rows {
            let mut unified = vec![String::new(); width];
            for (j, cell) in row.iter().enumerate() {
                unified[mapping[j]] = cell.clone();
            }
            self.rows.push(unified);
        }
    }

    /// Collapse exact whole-row duplicates, keeping the first occurrence.
    pub fn drop_duplicates(&mut self) {
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        self.rows.retain(|row| seen.insert(row.clone()));
    }

    pub fn from_csv(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = read_file_as_utf8(path)?;
        let delimiter = sniff_delimiter(&content);
        Self::from_delimited_str(&content, delimiter)
    }

    pub fn from_delimited_str(content: &str, delimiter: u8) -> Result<Self, Box<dyn Error>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut table = CsvTable::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let cells: Vec<String> = record.iter().map(String::from).collect();
            if i == 0 {
                table.headers = cells;
            } else {
                table.push_row(cells);
            }
        }

        if table.headers.is_empty() {
            return Err("no header row found".into());
        }
        Ok(table)
    }

    /// Read one sheet of an XLS/XLSX workbook. The first row is the header.
    pub fn from_spreadsheet(path: &Path, sheet_index: usize) -> Result<Self, Box<dyn Error>> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names().to_owned();
        let sheet_name = sheet_names
            .get(sheet_index)
            .ok_or("sheet index out of range")?
            .clone();
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut table = CsvTable::new();
        for (i, row) in range.rows().enumerate() {
            let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            if i == 0 {
                table.headers = cells;
            } else {
                table.push_row(cells);
            }
        }

        if table.headers.is_empty() {
            return Err("spreadsheet has no header row".into());
        }
        Ok(table)
    }

    /// Serialize as comma-delimited UTF-8 with a header row.
    pub fn save_as(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Dump the table in the usual preview style: header, dashed rule, up to
    /// `limit` rows split between head and tail with a `<<+N rows>>` marker,
    /// then the total row count.
    pub fn print_table_with_limit(&self, limit: usize) {
        if self.headers.is_empty() {
            println!("Total rows: 0");
            return;
        }

        let mut widths: Vec<usize> = self.headers.iter().map(|h| clip(h).len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = clip(cell).len();
                if len > widths[i] {
                    widths[i] = len;
                }
            }
        }

        let render = |cells: &[String]| {
            let mut line = String::new();
            for (i, cell) in cells.iter().enumerate() {
                line.push('|');
                line.push_str(&format!("{:width$} ", clip(cell), width = widths[i]));
            }
            line.push('|');
            line
        };

        let header_line = render(&self.headers);
        println!("{}", header_line);
        println!("{}", "-".repeat(header_line.len()));

        if self.rows.len() <= limit || limit < 2 {
            for row in &self.rows {
                println!("{}", render(row));
            }
        } else {
            let head = limit / 2;
            let tail = limit - head;
            for row in &self.rows[..head] {
                println!("{}", render(row));
            }
            println!("<<+{} rows>>", self.rows.len() - head - tail);
            for row in &self.rows[self.rows.len() - tail..] {
                println!("{}", render(row));
            }
        }
        println!("Total rows: {}", self.rows.len());
    }
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= PREVIEW_CELL_WIDTH {
        cell.to_string()
    } else {
        let clipped: String = cell.chars().take(PREVIEW_CELL_WIDTH - 2).collect();
        format!("{}..", clipped)
    }
}

/// Read a file and hand back UTF-8 text. Shopify exports arrive as UTF-8 with
/// a BOM, but files that took a round trip through Excel are often
/// Windows-1252; decode those rather than bailing.
pub fn read_file_as_utf8(path: &Path) -> Result<String, Box<dyn Error>> {
    let mut file = std::fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(..3);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Pick the most plausible field delimiter by checking field-count consistency
/// across the first few lines. Candidates: tab, semicolon, comma, pipe.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn table(headers: &[&str], rows: &[&[&str]]) -> CsvTable {
        let mut t = CsvTable::with_headers(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        t
    }

    #[test]
    fn parse_basic_csv() {
        let t = CsvTable::from_delimited_str("Handle,Title\nh1,Blue Mug\nh2,Red Mug\n", b',')
            .unwrap();
        assert_eq!(t.headers(), &["Handle".to_string(), "Title".to_string()]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.rows()[0], vec!["h1".to_string(), "Blue Mug".to_string()]);
    }

    #[test]
    fn ragged_rows_are_padded_to_header_width() {
        let t = CsvTable::from_delimited_str("A,B,C\n1,2\n1,2,3,4\n", b',').unwrap();
        assert_eq!(t.rows()[0], vec!["1", "2", ""]);
        assert_eq!(t.rows()[1], vec!["1", "2", "3"]);
    }

    #[test]
    fn empty_content_is_a_parse_error() {
        assert!(CsvTable::from_delimited_str("", b',').is_err());
    }

    #[test]
    fn append_table_unifies_headers_by_union() {
        let mut a = table(&["Handle", "Title"], &[&["h1", "Mug"]]);
        let b = table(&["Title", "Vendor"], &[&["Bowl", "Acme"]]);
        a.append_table(&b);

        assert_eq!(
            a.headers(),
            &["Handle".to_string(), "Title".to_string(), "Vendor".to_string()]
        );
        assert_eq!(a.rows()[0], vec!["h1", "Mug", ""]);
        assert_eq!(a.rows()[1], vec!["", "Bowl", "Acme"]);
    }

    #[test]
    fn append_into_empty_table_adopts_other_wholesale() {
        let mut a = CsvTable::new();
        let b = table(&["Title"], &[&["Mug"], &["Bowl"]]);
        a.append_table(&b);
        assert_eq!(a, b);
    }

    #[test]
    fn drop_duplicates_keeps_first_occurrence() {
        let mut t = table(
            &["Handle", "Title"],
            &[&["h1", "Mug"], &["h2", "Bowl"], &["h1", "Mug"]],
        );
        t.drop_duplicates();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.rows()[0], vec!["h1", "Mug"]);
        assert_eq!(t.rows()[1], vec!["h2", "Bowl"]);
    }

    #[test]
    fn sniff_semicolon_delimiter() {
        let content = "Handle;Title\nh1;Blue Mug\nh2;Red Mug\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniff_comma_with_semicolons_inside_quotes() {
        let content = "Handle,Title\nh1,\"Mug; large\"\nh2,\"Bowl; small\"\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn bom_is_stripped_before_parsing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Title\nMug\n");
        fs::write(&path, bytes).unwrap();

        let t = CsvTable::from_csv(&path).unwrap();
        assert_eq!(t.headers(), &["Title".to_string()]);
        assert_eq!(t.rows()[0], vec!["Mug"]);
    }

    #[test]
    fn windows_1252_bytes_fall_back_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        // 0xE9 is 'e' acute in Windows-1252 and invalid on its own in UTF-8
        fs::write(&path, b"Title\nCaf\xE9 Mug\n").unwrap();

        let t = CsvTable::from_csv(&path).unwrap();
        assert_eq!(t.rows()[0], vec!["Caf\u{e9} Mug"]);
    }

    #[test]
    fn save_as_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let t = table(
            &["Handle", "Title"],
            &[&["h1", "Blue Mug"], &["h2", "Mug, with commas"]],
        );
        t.save_as(&path).unwrap();

        let back = CsvTable::from_csv(&path).unwrap();
        assert_eq!(back, t);
    }
}
