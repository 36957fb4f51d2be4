//! Write batches
//!
//! A [`Batch`] is the unit the store accepts or rejects as a whole. It is
//! assembled once from a list of points and never modified afterwards; the
//! retry path builds a fresh combined batch with [`Batch::combine`] instead of
//! mutating buffered ones.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::point::Point;

/// Timestamp precision the store should apply to a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl Precision {
    /// Short unit code used by line-oriented time-series stores.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }
}

/// Destination metadata shared by every point in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub database: String,
    #[serde(default)]
    pub precision: Precision,
}

impl BatchConfig {
    /// Config for `database` with second-level precision.
    pub fn new(database: impl Into<String>) -> Self {
        Self { database: database.into(), precision: Precision::Seconds }
    }
}

/// Ordered, immutable collection of points written in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    id: Uuid,
    config: BatchConfig,
    points: Vec<Point>,
}

impl Batch {
    pub fn new(config: BatchConfig, points: Vec<Point>) -> Self {
        Self { id: Uuid::now_v7(), config, points }
    }

    /// Build one batch holding the points of every batch in `batches`, in
    /// order.
    pub fn combine<'a, I>(config: BatchConfig, batches: I) -> Self
    where
        I: IntoIterator<Item = &'a Batch>,
    {
        let points = batches.into_iter().flat_map(|batch| batch.points.iter().cloned()).collect();
        Self::new(config, points)
    }

    /// Identifier used to correlate log lines for the same batch.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn precision(&self) -> Precision {
        self.config.precision
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
