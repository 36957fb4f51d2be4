//! Domain types: metric samples, points and batches

pub mod batch;
pub mod point;
pub mod snapshot;

pub use batch::{Batch, BatchConfig, Precision};
pub use point::{FieldValue, Point, PointBuilder};
pub use snapshot::{CounterSample, GaugeSample, HistogramSample, Labels, Quantile, Snapshot};
