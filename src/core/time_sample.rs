//! Time-sample gathering and resampling.
//!
//! Misuse (mismatched value types, empty inputs) is reported through the
//! coding-error channel and the functions fall back to a safe value.

use smallvec::SmallVec;

use super::SampledDataSource;
use crate::coding_error;
use crate::util::{lerp_slices, Lerp, Time, Value, ValueType};

/// Interpolate between two neighbouring samples.
///
/// Floating point scalars, vectors, matrices and equally sized float
/// arrays interpolate linearly, extrapolating when `alpha` is outside
/// `[0, 1]`. Other types hold the first value. Empty or mismatched inputs
/// are coding errors and return `a`.
pub fn resample_neighbors(alpha: f64, a: &Value, b: &Value) -> Value {
    if a.is_empty() || b.is_empty() {
        coding_error!("Can't resample empty values");
        return a.clone();
    }
    if a.type_name() != b.type_name() {
        coding_error!(
            "Can't interpolate between values of type {} and {}",
            a.type_name(),
            b.type_name()
        );
        return a.clone();
    }

    let mismatched = || {
        coding_error!("Can't interpolate between arrays of different lengths");
        a.clone()
    };

    match (a, b) {
        (Value::Float(x), Value::Float(y)) => Value::Float(x.lerp_to(y, alpha)),
        (Value::Double(x), Value::Double(y)) => Value::Double(x.lerp_to(y, alpha)),
        (Value::Vec3f(x), Value::Vec3f(y)) => Value::Vec3f(x.lerp_to(y, alpha)),
        (Value::Matrix4d(x), Value::Matrix4d(y)) => Value::Matrix4d(x.lerp_to(y, alpha)),
        (Value::FloatArray(x), Value::FloatArray(y)) => {
            lerp_slices(x, y, alpha).map(Value::FloatArray).unwrap_or_else(mismatched)
        }
        (Value::DoubleArray(x), Value::DoubleArray(y)) => {
            lerp_slices(x, y, alpha).map(Value::DoubleArray).unwrap_or_else(mismatched)
        }
        (Value::Vec3fArray(x), Value::Vec3fArray(y)) => {
            lerp_slices(x, y, alpha).map(Value::Vec3fArray).unwrap_or_else(mismatched)
        }
        // held
        _ => a.clone(),
    }
}

/// Resample raw `(times, values)` at `u`.
///
/// Values are held constant outside the sample range. An empty sample
/// list is a coding error and returns `Value::Empty`.
pub fn resample_raw_time_samples(u: Time, times: &[Time], values: &[Value]) -> Value {
    let count = times.len().min(values.len());
    if count == 0 {
        coding_error!("Can't resample empty sample list");
        return Value::Empty;
    }

    let times = &times[..count];
    if u <= times[0] {
        return values[0].clone();
    }
    if u >= times[count - 1] {
        return values[count - 1].clone();
    }

    // times[i - 1] < u < times[i]
    let i = times.partition_point(|t| *t <= u);
    let (t0, t1) = (times[i - 1], times[i]);
    if t1 == t0 {
        return values[i - 1].clone();
    }
    let alpha = (u - t0) / (t1 - t0);
    resample_neighbors(alpha, &values[i - 1], &values[i])
}

/// Typed time samples gathered from a sampled data source.
#[derive(Clone, Debug, Default)]
pub struct TimeSampleArray<T> {
    pub times: SmallVec<[Time; 4]>,
    pub values: SmallVec<[T; 4]>,
}

impl<T: ValueType> TimeSampleArray<T> {
    pub fn new() -> Self {
        Self {
            times: SmallVec::new(),
            values: SmallVec::new(),
        }
    }

    /// Gather samples contributing to `[start, end]`.
    ///
    /// A non-varying source yields a single sample at time zero. Samples
    /// whose value is not a `T` are skipped. Returns false when nothing
    /// usable was found.
    pub fn unbox_from(&mut self, ds: &dyn SampledDataSource, start: Time, end: Time) -> bool {
        self.times.clear();
        self.values.clear();

        let times = ds
            .contributing_sample_times(start, end)
            .unwrap_or_else(|| vec![0.0]);
        for t in times {
            if let Some(v) = T::from_value(&ds.value(t)) {
                self.times.push(t);
                self.values.push(v);
            }
        }
        !self.values.is_empty()
    }

    /// Number of samples.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Resample at `u`; `None` when empty or when the resampled value is
    /// not a `T`.
    pub fn resample(&self, u: Time) -> Option<T> {
        if self.values.is_empty() {
            return None;
        }
        let values: Vec<Value> = self.values.iter().cloned().map(T::into_value).collect();
        T::from_value(&resample_raw_time_samples(u, &self.times, &values))
    }
}
