//! Column statistics cached alongside tables and partitions.

use serde::{Deserialize, Serialize};

/// Per-type statistics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStatsData {
    Boolean {
        num_trues: u64,
        num_falses: u64,
        num_nulls: u64,
    },
    Long {
        low: Option<i64>,
        high: Option<i64>,
        num_nulls: u64,
        num_distinct: u64,
    },
    Double {
        low: Option<f64>,
        high: Option<f64>,
        num_nulls: u64,
        num_distinct: u64,
    },
    String {
        max_len: u64,
        avg_len: f64,
        num_nulls: u64,
        num_distinct: u64,
    },
    Binary {
        max_len: u64,
        avg_len: f64,
        num_nulls: u64,
    },
    Date {
        low_days: Option<i64>,
        high_days: Option<i64>,
        num_nulls: u64,
        num_distinct: u64,
    },
    Decimal {
        low: Option<String>,
        high: Option<String>,
        num_nulls: u64,
        num_distinct: u64,
    },
}

impl ColumnStatsData {
    pub fn num_nulls(&self) -> u64 {
        match self {
            ColumnStatsData::Boolean { num_nulls, .. }
            | ColumnStatsData::Long { num_nulls, .. }
            | ColumnStatsData::Double { num_nulls, .. }
            | ColumnStatsData::String { num_nulls, .. }
            | ColumnStatsData::Binary { num_nulls, .. }
            | ColumnStatsData::Date { num_nulls, .. }
            | ColumnStatsData::Decimal { num_nulls, .. } => *num_nulls,
        }
    }
}

/// Statistics for one column of a table or partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column_name: String,
    pub column_type: String,
    pub data: ColumnStatsData,
    /// Engine that produced the statistics.
    #[serde(default = "ColumnStatistics::default_engine")]
    pub engine: String,
}

impl ColumnStatistics {
    pub const DEFAULT_ENGINE: &'static str = "hive";

    pub fn new(
        column_name: impl Into<String>,
        column_type: impl Into<String>,
        data: ColumnStatsData,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            column_type: column_type.into(),
            data,
            engine: Self::default_engine(),
        }
    }

    fn default_engine() -> String {
        Self::DEFAULT_ENGINE.to_string()
    }
}
