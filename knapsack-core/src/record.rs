//! Types and traits for recording training metrics.
//!
//! * [`Record`] - A flexible container for storing key-value pairs of various data types
//! * [`RecordValue`] - An enum representing different types of values that can be stored
//! * [`Recorder`] - A trait for writing records to an output destination
//! * [`AggregateRecorder`] - A recorder that stores records and writes their aggregation
//! * [`RecordStorage`] - A storage system with aggregation capabilities
//! * [`BufferedRecorder`] - A recorder that keeps records in memory
//! * [`NullRecorder`] - A recorder that discards all records
//!
//! # Basic Usage
//!
//! ```rust
//! use knapsack_core::record::{Record, RecordValue};
//!
//! let iteration = 1;
//! let step_counts = vec![12f32, 40.0, 7.0];
//!
//! let mut record = Record::empty();
//! record.insert("iteration", RecordValue::Scalar(iteration as f32));
//! record.insert("step_counts", RecordValue::Array1(step_counts));
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
