//! Type-erased values that travel between the steps of a chain
//!
//! Every output of a step is boxed into a [Value], which remembers
//! the runtime type it was built from. That descriptor is what the
//! invoker compares against a step's declared parameters.
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::ChainError;

/// A runtime descriptor of a concrete type
///
/// Two descriptors are equal when they describe the same type.
/// Display prints the name without module paths, so
/// `alloc::vec::Vec<alloc::string::String>` shows as `Vec<String>`
/// ```
/// use pledge::*;
/// let ty = TypeDesc::of::<Vec<String>>();
/// assert_eq!(ty.to_string(), "Vec<String>");
/// ```
#[derive(Clone, Copy)]
pub struct TypeDesc {
    id: TypeId,
    name: &'static str,
}

impl TypeDesc {
    pub fn of<T: Any>() -> Self {
        TypeDesc {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified name, as reported by the compiler
    pub fn qualified_name(&self) -> &'static str {
        self.name
    }

    /// True for the error type carried by rejected chains
    pub fn is_error(&self) -> bool {
        self.id == TypeId::of::<ChainError>()
    }

    /// True for [Value] itself, which parameters use to accept anything
    pub fn is_dynamic(&self) -> bool {
        self.id == TypeId::of::<Value>()
    }

    /// Whether a parameter declared with this type takes a value of `actual`
    pub fn accepts(&self, actual: &TypeDesc) -> bool {
        self == actual || self.is_dynamic()
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDesc {}

impl Hash for TypeDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDesc").field(&self.name).finish()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_name(self.name))
    }
}

/// Strips module paths from every path segment in a type name
fn short_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}

/// Anything that can be carried from one step to the next
///
/// Implemented for the primitive types, `String`, `Vec<T>` and the crate's own
/// carriers. Register your own types with the [data!](crate::data) macro.
pub trait Data: Any + Clone + Send + Sync + fmt::Debug {
    /// Boxes the value, keeping its runtime type
    fn into_value(self) -> Value {
        Value::scalar(self)
    }
}

type Erased = dyn Any + Send + Sync;

#[derive(Clone, Copy)]
struct Sequence {
    element: TypeDesc,
    items: fn(&Erased) -> Vec<Value>,
}

/// A single, type-erased value of the result vector
///
/// Cloning is cheap, the payload is shared and never mutated.
/// Extraction with [get](Value::get) hands out an owned copy.
#[derive(Clone)]
pub struct Value {
    ty: TypeDesc,
    inner: Arc<Erased>,
    debug: fn(&Erased, &mut fmt::Formatter<'_>) -> fmt::Result,
    sequence: Option<Sequence>,
}

fn debug_erased<T: Any + fmt::Debug>(inner: &Erased, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match inner.downcast_ref::<T>() {
        Some(value) => fmt::Debug::fmt(value, f),
        None => f.write_str("<unknown>"),
    }
}

fn sequence_items<T: Data>(inner: &Erased) -> Vec<Value> {
    inner
        .downcast_ref::<Vec<T>>()
        .map(|items| items.iter().cloned().map(Data::into_value).collect())
        .unwrap_or_default()
}

impl Value {
    /// Boxes a single value
    pub fn scalar<T: Data>(value: T) -> Self {
        Value {
            ty: TypeDesc::of::<T>(),
            inner: Arc::new(value),
            debug: debug_erased::<T>,
            sequence: None,
        }
    }

    /// Boxes a collection, remembering its element type
    /// ```
    /// use pledge::*;
    /// let fruits = Value::sequence(vec!["apples", "pears"]);
    /// assert_eq!(fruits.element_type(), Some(TypeDesc::of::<&str>()));
    /// assert_eq!(fruits.items().map(|items| items.len()), Some(2));
    /// ```
    pub fn sequence<T: Data>(items: Vec<T>) -> Self {
        Value {
            ty: TypeDesc::of::<Vec<T>>(),
            inner: Arc::new(items),
            debug: debug_erased::<Vec<T>>,
            sequence: Some(Sequence {
                element: TypeDesc::of::<T>(),
                items: sequence_items::<T>,
            }),
        }
    }

    pub fn type_desc(&self) -> TypeDesc {
        self.ty
    }

    pub fn is<T: Any>(&self) -> bool {
        self.ty.id == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_ref().downcast_ref::<T>()
    }

    /// An owned copy of the payload, if it is a `T`
    ///
    /// Asking for a [Value] always succeeds and returns the value itself.
    pub fn get<T: Data>(&self) -> Option<T> {
        if TypeId::of::<T>() == TypeId::of::<Value>() {
            let mut slot = Some(self.clone());
            return (&mut slot as &mut dyn Any)
                .downcast_mut::<Option<T>>()
                .and_then(Option::take);
        }
        self.downcast_ref::<T>().cloned()
    }

    pub fn is_error(&self) -> bool {
        self.ty.is_error()
    }

    pub fn as_error(&self) -> Option<&ChainError> {
        self.downcast_ref::<ChainError>()
    }

    pub fn is_sequence(&self) -> bool {
        self.sequence.is_some()
    }

    /// The element type, if this value is a collection
    pub fn element_type(&self) -> Option<TypeDesc> {
        self.sequence.map(|sequence| sequence.element)
    }

    /// Every element boxed on its own, if this value is a collection
    pub fn items(&self) -> Option<Vec<Value>> {
        self.sequence
            .map(|sequence| (sequence.items)(self.inner.as_ref()))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.debug)(self.inner.as_ref(), f)
    }
}

impl Data for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: Data> Data for Vec<T> {
    fn into_value(self) -> Value {
        Value::sequence(self)
    }
}

impl Data for ChainError {}

/// Registers types that can flow through a chain
///
/// Each listed type becomes [Data](crate::Data), and can be returned
/// from a step as a single output.
/// ```
/// use pledge::*;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Fruit(&'static str);
/// data!(Fruit);
///
/// let fruit = promise(|| Fruit("apple")).then(|f: Fruit| f.0.len());
/// assert_eq!(fruit.value::<usize>(0), Some(5));
/// ```
#[macro_export]
macro_rules! data {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Data for $ty {}

            impl $crate::IntoOutcome for $ty {
                fn into_outcome(self) -> $crate::Outcome {
                    $crate::Outcome::single($crate::Data::into_value(self))
                }
            }
        )*
    };
}

crate::data!(
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    bool,
    char,
    String,
    &'static str,
    crate::Callable,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_are_stripped_of_paths() {
        assert_eq!(TypeDesc::of::<i64>().to_string(), "i64");
        assert_eq!(TypeDesc::of::<String>().to_string(), "String");
        assert_eq!(
            TypeDesc::of::<Vec<Vec<String>>>().to_string(),
            "Vec<Vec<String>>"
        );
        assert_eq!(TypeDesc::of::<&str>().to_string(), "&str");
    }

    #[test]
    fn get_checks_the_type() {
        let value = 3i64.into_value();
        assert_eq!(value.get::<i64>(), Some(3));
        assert_eq!(value.get::<f64>(), None);
        assert!(value.is::<i64>());
    }

    #[test]
    fn dynamic_parameter_accepts_anything() {
        let value = String::from("x").into_value();
        let same = value.get::<Value>().expect("a value is always a value");
        assert_eq!(same.get::<String>(), Some("x".to_string()));
        assert!(TypeDesc::of::<Value>().accepts(&TypeDesc::of::<u8>()));
        assert!(!TypeDesc::of::<u16>().accepts(&TypeDesc::of::<u8>()));
    }

    #[test]
    fn scalars_are_not_sequences() {
        let value = 3i64.into_value();
        assert!(!value.is_sequence());
        assert!(value.items().is_none());
    }

    #[test]
    fn nested_sequences_keep_their_shape() {
        let value = vec![vec![1u8, 2], vec![3]].into_value();
        assert_eq!(value.element_type(), Some(TypeDesc::of::<Vec<u8>>()));
        let items = value.items().unwrap_or_default();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_sequence());
        assert_eq!(items[1].get::<Vec<u8>>(), Some(vec![3]));
    }

    #[test]
    fn errors_are_recognised() {
        let value = ChainError::msg("boom").into_value();
        assert!(value.is_error());
        assert_eq!(value.as_error().map(ToString::to_string), Some("boom".into()));
    }

    #[test]
    fn debug_shows_the_payload() {
        assert_eq!(format!("{:?}", "pear".into_value()), "\"pear\"");
        assert_eq!(format!("{:?}", vec![1i32, 2].into_value()), "[1, 2]");
    }
}
