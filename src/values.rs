//! The ordered result vector handed from one step to the next
use std::fmt;

use crate::{Data, TypeDesc, Value};

/// The positional values currently available to the next step
///
/// Values keep the declaration order of the outputs that produced them.
/// ```
/// use pledge::*;
/// let values: Values = vec![1i64.into_value(), "two".into_value()].into();
/// assert_eq!(values.value::<i64>(0), Some(1));
/// assert_eq!(values.value::<&str>(1), Some("two"));
/// assert_eq!(values.value::<&str>(0), None);
/// ```
#[derive(Clone, Default)]
pub struct Values(Vec<Value>);

impl Values {
    pub fn new() -> Self {
        Values(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    /// An owned copy of the value at `index`, if it is a `T`
    pub fn value<T: Data>(&self, index: usize) -> Option<T> {
        self.0.get(index).and_then(|value| value.get::<T>())
    }

    /// Every value as a `T`, or `None` if any of them is not one
    /// ```
    /// use pledge::*;
    /// let values: Values = vec![1u8.into_value(), 2u8.into_value()].into();
    /// assert_eq!(values.extract::<u8>(), Some(vec![1, 2]));
    /// assert_eq!(values.extract::<u16>(), None);
    /// ```
    pub fn extract<T: Data>(&self) -> Option<Vec<T>> {
        self.0.iter().map(|value| value.get::<T>()).collect()
    }

    pub fn types(&self) -> Vec<TypeDesc> {
        self.0.iter().map(Value::type_desc).collect()
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl From<Vec<Value>> for Values {
    fn from(values: Vec<Value>) -> Self {
        Values(values)
    }
}

impl FromIterator<Value> for Values {
    fn from_iter<It: IntoIterator<Item = Value>>(iter: It) -> Self {
        Values(iter.into_iter().collect())
    }
}

impl Extend<Value> for Values {
    fn extend<It: IntoIterator<Item = Value>>(&mut self, iter: It) {
        self.0.extend(iter)
    }
}

impl IntoIterator for Values {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Data for Values {
    fn into_value(self) -> Value {
        Value::sequence(self.0)
    }
}
