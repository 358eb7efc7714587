//! Recorder writing training metrics of the knapsack experiment to TFRecord.
use knapsack_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::trace;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Records passed to [`Recorder::write`] are written at the step found under
/// the step key, `"iteration"` by default. Records passed to
/// [`AggregateRecorder::store`] are kept until [`AggregateRecorder::flush`],
/// which writes their aggregation at the given step.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    storage: RecordStorage,
    step_key: String,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            storage: RecordStorage::new(),
            step_key: "iteration".to_string(),
        }
    }

    /// Sets the key of the step in written records.
    pub fn step_key(mut self, step_key: impl Into<String>) -> Self {
        self.step_key = step_key.into();
        self
    }

    /// Scalars of `record` to be written, sorted by key. The step is left out.
    fn scalars(&self, record: &Record) -> Vec<(String, f32)> {
        let mut scalars = record
            .iter()
            .filter(|(k, _)| **k != self.step_key)
            .filter_map(|(k, v)| match v {
                RecordValue::Scalar(v) => Some((k.clone(), *v)),
                _ => {
                    trace!("Skip {} as it is not a scalar", k);
                    None
                }
            })
            .collect::<Vec<_>>();
        scalars.sort_by(|a, b| a.0.cmp(&b.0));
        scalars
    }

    fn write_at(&mut self, record: &Record, step: usize) {
        for (k, v) in self.scalars(record) {
            self.writer.add_scalar(&k, v, step);
        }
        self.writer.flush();
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [`Record`] into a TFRecord.
    ///
    /// Only [`RecordValue::Scalar`] values are written. A record without a
    /// scalar under the step key is written at step 0.
    fn write(&mut self, record: Record) {
        let step = match record.get(&self.step_key) {
            Some(RecordValue::Scalar(v)) => *v as usize,
            _ => 0,
        };
        self.write_at(&record, step);
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        self.write_at(&record, step.max(0) as usize);
    }
}
