use std::collections::HashMap;

use crate::data::datetime::{detect_format, parse_timestamp, TimestampFormat};
use crate::data::loader::{RawRow, RawTable};
use crate::data::sample::{Sample, SeriesKey};
use crate::data::units::{parse_quantity, MemUnit, Quantity};
use crate::error::{LoadError, RowError};

/// Canonical fields a raw column can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Benchmark,
    Scheme,
    Operation,
    MemoryDelta,
    MemoryBefore,
    MemoryAfter,
    FreeMemoryDelta,
    Timestamp,
    RunId,
    Elapsed,
    FreeMemory,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Benchmark => "benchmark",
            Field::Scheme => "scheme",
            Field::Operation => "operation",
            Field::MemoryDelta => "memory_delta_kb",
            Field::MemoryBefore => "memory_before_kb",
            Field::MemoryAfter => "memory_after_kb",
            Field::FreeMemoryDelta => "free_memory_kb",
            Field::Timestamp => "timestamp",
            Field::RunId => "run_id",
            Field::Elapsed => "elapsed_secs",
            Field::FreeMemory => "free_memory_mb",
        }
    }
}

/// Header names the benchmark harness writes, and what they mean.
pub const COLUMN_ALIASES: &[(&str, Field)] = &[
    ("Benchmark", Field::Benchmark),
    ("Reclamation Scheme", Field::Scheme),
    ("Operation", Field::Operation),
    ("Memory Change (KB)", Field::MemoryDelta),
    ("Memory Before (KB)", Field::MemoryBefore),
    ("Memory After (KB)", Field::MemoryAfter),
    ("Memory Free Change (KB)", Field::FreeMemoryDelta),
    ("Timestamp", Field::Timestamp),
];

/// Column order of the headerless run-overlay export.
const RUN_COLUMNS: [Field; 3] = [Field::RunId, Field::Elapsed, Field::FreeMemory];

/// Which of the known export shapes a file has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    /// One row per measured batch, labelled by scheme and operation.
    SchemeOperation,
    /// Before/after readings of a single run against wall-clock time.
    Timeline,
    /// Headerless `run id, elapsed seconds, available MB` rows.
    RunOverlay,
}

impl TableLayout {
    pub fn label(&self) -> &'static str {
        match self {
            TableLayout::SchemeOperation => "scheme/operation",
            TableLayout::Timeline => "timeline",
            TableLayout::RunOverlay => "run overlay",
        }
    }
}

/// Canonical field -> column index, built once per file.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Map header names through `COLUMN_ALIASES`. Unknown columns are ignored.
    pub fn from_header(header: &[String]) -> Self {
        let mut indices = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            let name = name.trim();
            if let Some(&(_, field)) = COLUMN_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            {
                indices.entry(field).or_insert(idx);
            }
        }
        Self { indices }
    }

    pub fn positional_runs() -> Self {
        Self {
            indices: RUN_COLUMNS.iter().enumerate().map(|(i, &f)| (f, i)).collect(),
        }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }
}

/// Result of parsing one file: the samples that survived and why the
/// others were dropped.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub layout: TableLayout,
    pub rows_read: usize,
    pub samples: Vec<Sample>,
    pub dropped: Vec<RowError>,
}

/// Everything row parsing needs that is fixed for the whole file.
struct Schema {
    layout: TableLayout,
    columns: ColumnMap,
    required: Vec<Field>,
    clock: Option<Clock>,
}

/// Elapsed-time reference for a file: the detected timestamp format and
/// the first row's timestamp.
#[derive(Debug, Clone, Copy)]
struct Clock {
    format: TimestampFormat,
    origin: f64,
}

impl Clock {
    fn for_column(rows: &[RawRow], column: usize) -> Option<Self> {
        let format = detect_format(rows.iter().filter_map(|r| r.cell(column)))?;
        let origin = rows
            .iter()
            .filter_map(|r| r.cell(column))
            .find_map(|v| parse_timestamp(v, format))?;
        Some(Self { format, origin })
    }

    fn elapsed(&self, raw: &str) -> Option<f64> {
        parse_timestamp(raw, self.format).map(|ts| ts - self.origin)
    }
}

/// Turn every row of `table` into a `Sample`. Row-level failures are
/// collected in the report; only an unrecognizable layout is fatal.
pub fn parse_table(table: &RawTable) -> Result<ParseReport, LoadError> {
    let schema = resolve_schema(table)?;

    let mut samples = Vec::with_capacity(table.row_count());
    let mut dropped = Vec::new();

    for (index, row) in table.rows.iter().enumerate() {
        match parse_row(row, index, &schema) {
            Ok(sample) => samples.push(sample),
            Err(e) => {
                tracing::debug!("Dropping row: {e}");
                dropped.push(e);
            }
        }
    }

    if samples.is_empty() {
        tracing::warn!("{:?} produced no usable samples", table.path);
    }

    Ok(ParseReport {
        layout: schema.layout,
        rows_read: table.row_count(),
        samples,
        dropped,
    })
}

fn resolve_schema(table: &RawTable) -> Result<Schema, LoadError> {
    let mismatch = |expected: &str, found: String| LoadError::SchemaMismatch {
        path: table.path.clone(),
        expected: expected.to_string(),
        found,
    };

    let Some(header) = &table.header else {
        let width = table.rows.first().map(|r| r.fields.len()).unwrap_or(0);
        if width < RUN_COLUMNS.len() {
            return Err(mismatch(
                "3 positional columns (run id, elapsed seconds, available memory MB)",
                format!("{width} unnamed columns"),
            ));
        }
        return Ok(Schema {
            layout: TableLayout::RunOverlay,
            columns: ColumnMap::positional_runs(),
            required: RUN_COLUMNS.to_vec(),
            clock: None,
        });
    };

    let columns = ColumnMap::from_header(header);
    let found = || header.join(", ");

    let (layout, required) = if columns.has(Field::Scheme) && columns.has(Field::Operation) {
        let mut required = vec![Field::Scheme, Field::Operation];
        if columns.has(Field::MemoryDelta) {
            required.push(Field::MemoryDelta);
        } else if columns.has(Field::MemoryBefore) && columns.has(Field::MemoryAfter) {
            required.extend([Field::MemoryBefore, Field::MemoryAfter]);
        } else if columns.has(Field::FreeMemoryDelta) {
            required.push(Field::FreeMemoryDelta);
        } else {
            return Err(mismatch(
                "a `Memory Change (KB)`, `Memory Before (KB)`/`Memory After (KB)` or `Memory Free Change (KB)` column",
                found(),
            ));
        }
        (TableLayout::SchemeOperation, required)
    } else if columns.has(Field::Timestamp) {
        if !(columns.has(Field::MemoryBefore) && columns.has(Field::MemoryAfter)) {
            return Err(mismatch(
                "`Memory Before (KB)` and `Memory After (KB)` next to `Timestamp`",
                found(),
            ));
        }
        (
            TableLayout::Timeline,
            vec![Field::Timestamp, Field::MemoryBefore, Field::MemoryAfter],
        )
    } else {
        return Err(mismatch(
            "`Reclamation Scheme` and `Operation` columns, or a `Timestamp` column",
            found(),
        ));
    };

    let clock = columns
        .get(Field::Timestamp)
        .and_then(|col| Clock::for_column(&table.rows, col));

    Ok(Schema {
        layout,
        columns,
        required,
        clock,
    })
}

impl Schema {
    fn cell<'r>(&self, row: &'r RawRow, field: Field) -> Option<&'r str> {
        self.columns.get(field).and_then(|idx| row.cell(idx))
    }

    fn text(&self, row: &RawRow, field: Field) -> Result<String, RowError> {
        self.cell(row, field)
            .map(str::to_string)
            .ok_or(RowError::MissingField {
                line: row.line,
                field: field.name(),
            })
    }

    fn quantity(
        &self,
        row: &RawRow,
        field: Field,
        convert: impl Fn(&Quantity) -> f64,
    ) -> Result<Option<f64>, RowError> {
        let Some(raw) = self.cell(row, field) else {
            return Ok(None);
        };
        match parse_quantity(raw) {
            Some(q) => Ok(Some(convert(&q))),
            None if self.required.contains(&field) => Err(malformed(row, field, raw)),
            None => {
                // Optional columns never cost the row its required readings.
                tracing::debug!("line {}: ignoring unreadable {} {raw:?}", row.line, field.name());
                Ok(None)
            }
        }
    }

    fn kib(&self, row: &RawRow, field: Field) -> Result<Option<f64>, RowError> {
        self.quantity(row, field, |q| q.in_kib(MemUnit::Kib))
    }

    fn elapsed(&self, row: &RawRow) -> Result<Option<f64>, RowError> {
        match self.layout {
            TableLayout::RunOverlay => {
                let Some(raw) = self.cell(row, Field::Elapsed) else {
                    return Ok(None);
                };
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| malformed(row, Field::Elapsed, raw))
            }
            _ => {
                let Some(raw) = self.cell(row, Field::Timestamp) else {
                    return Ok(None);
                };
                self.clock
                    .and_then(|clock| clock.elapsed(raw))
                    .map(Some)
                    .ok_or_else(|| malformed(row, Field::Timestamp, raw))
            }
        }
    }
}

fn malformed(row: &RawRow, field: Field, raw: &str) -> RowError {
    RowError::MalformedValue {
        line: row.line,
        field: field.name(),
        value: raw.to_string(),
    }
}

fn parse_row(row: &RawRow, index: usize, schema: &Schema) -> Result<Sample, RowError> {
    if let Some(&field) = schema
        .required
        .iter()
        .find(|&&f| schema.cell(row, f).is_none())
    {
        return Err(RowError::MissingField {
            line: row.line,
            field: field.name(),
        });
    }

    let key = match schema.layout {
        TableLayout::SchemeOperation => SeriesKey::SchemeOperation {
            scheme: schema.text(row, Field::Scheme)?,
            operation: schema.text(row, Field::Operation)?,
        },
        TableLayout::RunOverlay => SeriesKey::Run(schema.text(row, Field::RunId)?),
        TableLayout::Timeline => SeriesKey::Unlabelled,
    };

    let mut sample = Sample::new(key, index);
    sample.benchmark = schema.cell(row, Field::Benchmark).map(str::to_string);
    sample.elapsed_secs = schema.elapsed(row)?;
    sample.memory_before_kb = schema.kib(row, Field::MemoryBefore)?;
    sample.memory_after_kb = schema.kib(row, Field::MemoryAfter)?;
    sample.free_memory_delta_kb = schema.kib(row, Field::FreeMemoryDelta)?;
    sample.free_memory_mb = schema.quantity(row, Field::FreeMemory, |q| q.in_mib(MemUnit::Mib))?;

    let reported_delta = schema.kib(row, Field::MemoryDelta)?;
    sample.memory_delta_kb = match (sample.memory_before_kb, sample.memory_after_kb) {
        (Some(before), Some(after)) => {
            let derived = after - before;
            if let Some(reported) = reported_delta {
                if reported != derived {
                    tracing::debug!(
                        "line {}: reported change {reported} KB disagrees with after - before = {derived} KB",
                        row.line
                    );
                }
            }
            Some(derived)
        }
        _ => reported_delta,
    };

    Ok(sample)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::data::loader::parse_text;
    use proptest::prelude::*;
    use std::path::Path;

    proptest! {
        /// Property: delta equals after - before whenever both are present
        #[test]
        fn delta_matches_operands(
            rows in prop::collection::vec((0u32..10_000_000, 0u32..10_000_000), 1..40)
        ) {
            let mut text = String::from("Reclamation Scheme,Operation,Memory Before (KB),Memory After (KB)\n");
            for (before, after) in &rows {
                text.push_str(&format!("seize,insert,{before} KB,{after} KB\n"));
            }
            let table = parse_text(Path::new("p.csv"), &text).unwrap();
            let report = parse_table(&table).unwrap();
            prop_assert_eq!(report.samples.len(), rows.len());
            for s in &report.samples {
                let (Some(b), Some(a)) = (s.memory_before_kb, s.memory_after_kb) else {
                    return Err(TestCaseError::fail("operands missing"));
                };
                prop_assert_eq!(s.memory_delta_kb, Some(a - b));
            }
        }

        /// Property: elapsed time never decreases across an ordered file
        #[test]
        fn elapsed_is_monotonic(steps in prop::collection::vec(0u32..5_000, 1..50)) {
            let mut text = String::from("Timestamp,Memory Before (KB),Memory After (KB)\n");
            let mut millis: i64 = 1_700_000_000_000;
            for step in &steps {
                millis += i64::from(*step);
                let ts = chrono::DateTime::from_timestamp_millis(millis)
                    .unwrap()
                    .format("%Y-%m-%dT%H:%M:%S%.3f");
                text.push_str(&format!("{ts},10 KB,12 KB\n"));
            }
            let table = parse_text(Path::new("t.csv"), &text).unwrap();
            let report = parse_table(&table).unwrap();
            prop_assert_eq!(report.samples.len(), steps.len());
            let elapsed: Vec<f64> = report.samples.iter().filter_map(|s| s.elapsed_secs).collect();
            prop_assert_eq!(elapsed[0], 0.0);
            prop_assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
