use std::path::{Path, PathBuf};

use crate::data::datetime::is_date_like;
use crate::data::parser::COLUMN_ALIASES;
use crate::data::units::parse_quantity;
use crate::error::LoadError;

/// One untyped record from the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file, for diagnostics.
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    /// The trimmed cell at `index`, or `None` when it is absent or blank.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// A fully loaded CSV file: the header (if the file has one) and every data
/// row in file order.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub header: Option<Vec<String>>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read a CSV export from disk in one go.
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    let content = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    // Fall back to latin1 (each byte maps to the same code point).
    let text = String::from_utf8(content)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| b as char).collect());

    let table = parse_text(path, &text)?;
    tracing::info!(
        "Loaded {:?}: {} rows, header: {}",
        path,
        table.row_count(),
        table.header.is_some()
    );
    Ok(table)
}

/// Split CSV text into a `RawTable`. `path` is only used for diagnostics.
pub fn parse_text(path: &Path, text: &str) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records: Vec<RawRow> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let fields: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        records.push(RawRow { line, fields });
    }

    let Some(first) = records.first() else {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    };

    let header = if is_header_row(&first.fields) {
        let names = first.fields.iter().map(|s| s.trim().to_string()).collect();
        records.remove(0);
        Some(names)
    } else {
        None
    };

    Ok(RawTable {
        path: path.to_path_buf(),
        header,
        rows: records,
    })
}

/// A header row has no cell that reads as a number, a quantity like
/// `"12 KB"`, or a date. Blank header cells (the unnamed index column of
/// dataframe exports) are accepted once another cell is a known column name,
/// so a sparse first data row is not mistaken for a header.
fn is_header_row(cells: &[String]) -> bool {
    let named: Vec<&str> = cells.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).collect();
    if named.is_empty() || named.iter().any(|cell| parse_quantity(cell).is_some() || is_date_like(cell)) {
        return false;
    }
    named.len() == cells.len()
        || named
            .iter()
            .any(|cell| COLUMN_ALIASES.iter().any(|(alias, _)| alias.eq_ignore_ascii_case(cell)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let text = "Benchmark,Reclamation Scheme,Operation,Memory Change (KB)\n\
                    lockfree_queue,seize,enqueue,12 KB\n\
                    \n\
                    lockfree_queue,seize,dequeue,-4 KB\n";
        let table = parse_text(Path::new("q.csv"), text).unwrap();
        let header = table.header.as_ref().unwrap();
        assert_eq!(header[1], "Reclamation Scheme");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].cell(3), Some("-4 KB"));
    }

    #[test]
    fn blank_header_cell_is_still_a_header() {
        let text = ",Reclamation Scheme,Operation,Memory Change (KB)\n\
                    0,seize,enqueue,1 KB\n";
        let table = parse_text(Path::new("indexed.csv"), text).unwrap();
        let header = table.header.as_ref().unwrap();
        assert_eq!(header[0], "");
        assert_eq!(header[2], "Operation");
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].cell(0), Some("0"));
    }

    #[test]
    fn sparse_first_run_row_is_data() {
        let table = parse_text(Path::new("runs.csv"), "run-1,,\nrun-1,1.0,15870.0\n").unwrap();
        assert!(table.header.is_none());
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn headerless_file_keeps_first_row() {
        let text = "run-1,0.0,15872.5\nrun-1,1.0,15870.0\n";
        let table = parse_text(Path::new("runs.csv"), text).unwrap();
        assert!(table.header.is_none());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].cell(0), Some("run-1"));
    }

    #[test]
    fn blank_cells_read_as_absent() {
        let row = RawRow {
            line: 3,
            fields: vec!["a".into(), "   ".into()],
        };
        assert_eq!(row.cell(0), Some("a"));
        assert_eq!(row.cell(1), None);
        assert_eq!(row.cell(7), None);
    }

    #[test]
    fn empty_text_is_an_error() {
        let err = parse_text(Path::new("e.csv"), "\n\n").unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let path = std::env::temp_dir().join("memplot-definitely-missing.csv");
        let err = load_file(&path).unwrap_err();
        match err {
            LoadError::FileNotFound { path: p } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
