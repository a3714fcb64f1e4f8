use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one plotted line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesKey {
    /// A reclamation scheme measured under one operation.
    SchemeOperation { scheme: String, operation: String },
    /// One benchmark run in a run-overlay file.
    Run(String),
    /// A file that carries no scheme, operation or run labels.
    Unlabelled,
}

impl SeriesKey {
    pub fn pair(scheme: impl Into<String>, operation: impl Into<String>) -> Self {
        SeriesKey::SchemeOperation {
            scheme: scheme.into(),
            operation: operation.into(),
        }
    }

    pub fn scheme(&self) -> Option<&str> {
        match self {
            SeriesKey::SchemeOperation { scheme, .. } => Some(scheme),
            _ => None,
        }
    }

    pub fn operation(&self) -> Option<&str> {
        match self {
            SeriesKey::SchemeOperation { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

/// Legend text: `"{scheme} ({operation})"` or `"Run {id}"`.
impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::SchemeOperation { scheme, operation } => write!(f, "{scheme} ({operation})"),
            SeriesKey::Run(id) => write!(f, "Run {id}"),
            SeriesKey::Unlabelled => f.write_str("all samples"),
        }
    }
}

/// Canonical, unit-normalized record built from one raw row.
///
/// Memory fields stay in KiB (the run-overlay free-memory reading in MiB).
/// A field the row did not carry is `None`, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub key: SeriesKey,
    /// Benchmark name from the optional `Benchmark` column.
    pub benchmark: Option<String>,
    /// Position of the source row among the file's data rows.
    pub sequence_index: usize,
    /// Seconds since the file's first timestamp, or the positional elapsed
    /// column of a run-overlay file.
    pub elapsed_secs: Option<f64>,
    pub memory_before_kb: Option<f64>,
    pub memory_after_kb: Option<f64>,
    pub memory_delta_kb: Option<f64>,
    pub free_memory_delta_kb: Option<f64>,
    pub free_memory_mb: Option<f64>,
}

impl Sample {
    /// A sample carrying only a key and position. Parsers fill in the rest.
    pub fn new(key: SeriesKey, sequence_index: usize) -> Self {
        Self {
            key,
            benchmark: None,
            sequence_index,
            elapsed_secs: None,
            memory_before_kb: None,
            memory_after_kb: None,
            memory_delta_kb: None,
            free_memory_delta_kb: None,
            free_memory_mb: None,
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::MemoryDelta => self.memory_delta_kb,
            Metric::MemoryBefore => self.memory_before_kb,
            Metric::MemoryAfter => self.memory_after_kb,
            Metric::FreeMemoryDelta => self.free_memory_delta_kb,
            Metric::FreeMemory => self.free_memory_mb,
        }
    }
}

/// Which numeric field of a `Sample` a series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    MemoryDelta,
    MemoryBefore,
    MemoryAfter,
    FreeMemoryDelta,
    FreeMemory,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::MemoryDelta
    }
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::MemoryDelta,
        Metric::MemoryBefore,
        Metric::MemoryAfter,
        Metric::FreeMemoryDelta,
        Metric::FreeMemory,
    ];

    /// Axis title for this metric in its stored unit.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::MemoryDelta => "Memory Change (KB)",
            Metric::MemoryBefore => "Memory Before (KB)",
            Metric::MemoryAfter => "Memory After (KB)",
            Metric::FreeMemoryDelta => "Memory Free Change (KB)",
            Metric::FreeMemory => "Available Memory (MB)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_text() {
        assert_eq!(
            SeriesKey::pair("ref_counting", "enqueue").to_string(),
            "ref_counting (enqueue)"
        );
        assert_eq!(SeriesKey::Run("7".into()).to_string(), "Run 7");
    }

    #[test]
    fn absent_metric_is_none() {
        let mut s = Sample::new(SeriesKey::pair("seize", "insert"), 0);
        s.memory_before_kb = Some(10.0);
        assert_eq!(s.metric(Metric::MemoryBefore), Some(10.0));
        assert_eq!(s.metric(Metric::MemoryDelta), None);
    }
}
