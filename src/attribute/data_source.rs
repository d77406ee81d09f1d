//! Attributes as sampled data sources.

use std::sync::Arc;

use super::{Attribute, AttributeQuery};
use crate::core::{DataSource, SampledDataSource};
use crate::util::{Time, Value};

/// Sampled data source reading an [`Attribute`].
///
/// Shutter offsets are relative to `time`. Absent or blocked values read
/// as [`Value::Empty`].
#[derive(Clone, Debug)]
pub struct AttributeDataSource {
    attribute: Arc<Attribute>,
    time: Time,
}

impl AttributeDataSource {
    pub fn new(attribute: Arc<Attribute>, time: Time) -> Self {
        Self { attribute, time }
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    /// Wrap as a shared data source node.
    pub fn into_data_source(self) -> DataSource {
        DataSource::Sampled(Arc::new(self))
    }
}

impl SampledDataSource for AttributeDataSource {
    fn value(&self, shutter_offset: Time) -> Value {
        self.attribute
            .value(self.time + shutter_offset)
            .unwrap_or_default()
    }

    fn contributing_sample_times(&self, start: Time, end: Time) -> Option<Vec<Time>> {
        if self.attribute.num_time_samples() < 2 {
            return None;
        }
        let (lo, _) = self.attribute.bracketing_time_samples(self.time + start)?;
        let (_, hi) = self.attribute.bracketing_time_samples(self.time + end)?;
        let times: Vec<Time> = self
            .attribute
            .time_samples_in_interval(lo, hi)
            .into_iter()
            .map(|t| t - self.time)
            .collect();
        if times.len() < 2 {
            return None;
        }
        Some(times)
    }
}
