//! Attribute values and time samples.

use crate::util::{Time, Token, Value, ValueType};

/// One authored opinion.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Value(Value),
    /// Authored absence.
    Blocked,
}

impl AttributeValue {
    fn value(&self) -> Option<&Value> {
        match self {
            AttributeValue::Value(v) => Some(v),
            AttributeValue::Blocked => None,
        }
    }
}

/// Read access to an attribute.
pub trait AttributeQuery {
    /// Resolved value at `time`; `None` when unauthored or blocked.
    fn value(&self, time: Time) -> Option<Value>;

    /// True when the opinion in effect at `time` is a block.
    fn is_blocked(&self, time: Time) -> bool;

    /// Authored sample times around `time`, blocked samples included.
    ///
    /// Returns `(t, t)` on an exact hit or outside the sampled range (the
    /// nearest end), and `None` without samples.
    fn bracketing_time_samples(&self, time: Time) -> Option<(Time, Time)>;

    fn num_time_samples(&self) -> usize;

    /// Value at `time` as a concrete type.
    fn typed_value<T: ValueType>(&self, time: Time) -> Option<T>
    where
        Self: Sized,
    {
        self.value(time)?.get::<T>()
    }

    fn has_value(&self, time: Time) -> bool {
        self.value(time).is_some()
    }
}

/// An attribute with a default value and time samples.
///
/// With time samples, the value at `t` is held from the last sample at or
/// before `t` (the first sample before the sampled range); the default is
/// then ignored. Without samples, the default applies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribute {
    name: Token,
    default: Option<AttributeValue>,
    /// Sorted by time, unique times.
    samples: Vec<(Time, AttributeValue)>,
}

impl Attribute {
    pub fn new(name: impl Into<Token>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.set_default(value);
        self
    }

    pub fn name(&self) -> &Token {
        &self.name
    }

    pub fn set_default(&mut self, value: impl Into<Value>) {
        self.default = Some(AttributeValue::Value(value.into()));
    }

    /// Author a block as the default opinion.
    pub fn block_default(&mut self) {
        self.default = Some(AttributeValue::Blocked);
    }

    pub fn clear_default(&mut self) {
        self.default = None;
    }

    /// Author (or replace) the sample at `time`.
    pub fn set(&mut self, time: Time, value: impl Into<Value>) {
        self.insert_sample(time, AttributeValue::Value(value.into()));
    }

    /// Author a blocked sample at `time`.
    pub fn set_blocked(&mut self, time: Time) {
        self.insert_sample(time, AttributeValue::Blocked);
    }

    /// Remove the sample at `time`; returns whether one existed.
    pub fn clear_at(&mut self, time: Time) -> bool {
        match self.search(time) {
            Ok(i) => {
                self.samples.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Block the attribute entirely: samples are discarded and the default
    /// becomes a block.
    pub fn block(&mut self) {
        self.samples.clear();
        self.default = Some(AttributeValue::Blocked);
    }

    pub fn time_samples(&self) -> Vec<Time> {
        self.samples.iter().map(|(t, _)| *t).collect()
    }

    /// Sample times in `[start, end]`.
    pub fn time_samples_in_interval(&self, start: Time, end: Time) -> Vec<Time> {
        self.samples
            .iter()
            .map(|(t, _)| *t)
            .filter(|t| (start..=end).contains(t))
            .collect()
    }

    pub fn has_authored_value(&self) -> bool {
        self.default.is_some() || !self.samples.is_empty()
    }

    fn search(&self, time: Time) -> Result<usize, usize> {
        self.samples.binary_search_by(|(t, _)| t.total_cmp(&time))
    }

    fn insert_sample(&mut self, time: Time, value: AttributeValue) {
        if !time.is_finite() {
            tracing::warn!(attribute = %self.name, time, "ignoring non-finite sample time");
            return;
        }
        match self.search(time) {
            Ok(i) => self.samples[i].1 = value,
            Err(i) => self.samples.insert(i, (time, value)),
        }
    }

    /// The opinion in effect at `time`.
    fn opinion(&self, time: Time) -> Option<&AttributeValue> {
        if self.samples.is_empty() {
            return self.default.as_ref();
        }
        let index = match self.search(time) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        };
        self.samples.get(index).map(|(_, v)| v)
    }
}

impl AttributeQuery for Attribute {
    fn value(&self, time: Time) -> Option<Value> {
        self.opinion(time)?.value().cloned()
    }

    fn is_blocked(&self, time: Time) -> bool {
        matches!(self.opinion(time), Some(AttributeValue::Blocked))
    }

    fn bracketing_time_samples(&self, time: Time) -> Option<(Time, Time)> {
        let first = self.samples.first()?.0;
        let last = self.samples.last()?.0;
        if time <= first {
            return Some((first, first));
        }
        if time >= last {
            return Some((last, last));
        }
        match self.search(time) {
            Ok(i) => Some((self.samples[i].0, self.samples[i].0)),
            Err(i) => Some((self.samples[i - 1].0, self.samples[i].0)),
        }
    }

    fn num_time_samples(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_only() {
        let attr = Attribute::new("size").with_default(2.0f64);
        assert_eq!(attr.value(0.0), Some(Value::Double(2.0)));
        assert_eq!(attr.typed_value::<f64>(100.0), Some(2.0));
        assert_eq!(attr.typed_value::<i32>(0.0), None);
        assert_eq!(attr.bracketing_time_samples(1.0), None);
        assert!(!Attribute::new("unset").has_value(0.0));
    }

    #[test]
    fn test_held_samples() {
        let mut attr = Attribute::new("x").with_default(-1);
        attr.set(2.0, 20);
        attr.set(1.0, 10);
        assert_eq!(attr.time_samples(), vec![1.0, 2.0]);
        assert_eq!(attr.typed_value::<i32>(0.0), Some(10));
        assert_eq!(attr.typed_value::<i32>(1.5), Some(10));
        assert_eq!(attr.typed_value::<i32>(2.0), Some(20));
        assert_eq!(attr.typed_value::<i32>(9.0), Some(20));

        attr.set(1.0, 11);
        assert_eq!(attr.num_time_samples(), 2);
        assert!(attr.clear_at(1.0));
        assert!(!attr.clear_at(1.0));
        assert_eq!(attr.typed_value::<i32>(0.0), Some(20));
    }

    #[test]
    fn test_bracketing() {
        let mut attr = Attribute::new("x");
        attr.set(1.0, 1);
        attr.set(3.0, 3);
        assert_eq!(attr.bracketing_time_samples(0.0), Some((1.0, 1.0)));
        assert_eq!(attr.bracketing_time_samples(2.0), Some((1.0, 3.0)));
        assert_eq!(attr.bracketing_time_samples(3.0), Some((3.0, 3.0)));
        assert_eq!(attr.bracketing_time_samples(5.0), Some((3.0, 3.0)));
        assert_eq!(attr.time_samples_in_interval(0.5, 2.0), vec![1.0]);
    }

    #[test]
    fn test_blocked_default() {
        let mut attr = Attribute::new("x").with_default(1);
        attr.block_default();
        assert!(attr.is_blocked(0.0));
        assert_eq!(attr.value(0.0), None);
        assert_eq!(attr.typed_value::<i32>(0.0), None);
        assert!(attr.has_authored_value());
    }

    #[test]
    fn test_nan_time_ignored() {
        let mut attr = Attribute::new("x");
        attr.set(f64::NAN, 1);
        assert_eq!(attr.num_time_samples(), 0);
    }
}
