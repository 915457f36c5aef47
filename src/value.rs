use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use crate::error::{BoxError, Result};


/// Callback handed to a lambda: compiles its argument as a template and
/// renders it against the current context chain.
pub type RenderFn<'r> = &'r dyn Fn(&str) -> Result<String>;


/// Host data as seen by the renderer.
///
/// Cloning is cheap, compound variants are reference counted.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// No value: a missing name, `None`, unit.
    #[default]
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Arc<str>),
    Seq(Arc<Vec<Value>>),
    /// Keyed mapping.
    Map(Arc<BTreeMap<String, Value>>),
    /// Structural record with ordered, named fields.
    Record(Arc<Record>),
    Object(Arc<dyn Object>),
    Lambda(Lambda),
}


/// How the resolver treats an [Object].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRepr {
    /// Struct-like: members are looked up with [Object::get].
    Record,
    /// Keyed mapping: keys are looked up with [Object::get].
    Map,
    /// Iterated by sections through [Object::items].
    Seq,
    /// One level of indirection, unwrapped with [Object::inner].
    Wrapper,
    /// Neither members nor items.
    Opaque,
}


/// Capability interface for host objects.
///
/// Zero-argument methods exposed by [call_method](Object::call_method) take
/// precedence over members, at every level of indirection: a wrapper can
/// shadow the members of the value it wraps.
pub trait Object: fmt::Debug + Send + Sync {
    fn repr(&self) -> ObjectRepr {
        ObjectRepr::Record
    }

    /// Calls the zero-argument method `name`, `Ok(None)` when there is none.
    ///
    /// A failing method is treated as absent by the resolver.
    fn call_method(&self, name: &str) -> Result<Option<Value>, BoxError> {
        let _ = name;
        Ok(None)
    }

    fn get(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Member names, used when serializing records and maps.
    fn keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn items(&self) -> Vec<Value> {
        Vec::new()
    }

    /// The wrapped value of a [ObjectRepr::Wrapper], `None` for a null one.
    fn inner(&self) -> Option<Value> {
        None
    }

    /// Whether this object is the zero value of its kind.
    fn is_zero(&self) -> bool {
        false
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            ObjectRepr::Wrapper => match self.inner() {
                Some(value) => fmt::Display::fmt(&value, f),
                None => Ok(())
            },
            ObjectRepr::Seq => fmt::Display::fmt(&Value::seq(self.items()), f),
            ObjectRepr::Record | ObjectRepr::Map => match serde_json::to_string(&Members(self)) {
                Ok(json) => f.write_str(&json),
                Err(_) => Ok(())
            },
            ObjectRepr::Opaque => fmt::Debug::fmt(self, f)
        }
    }
}


/// Serializes the members of a record or map object, in [Object::keys] order.
struct Members<'o, O: ?Sized>(&'o O);

impl<O: Object + ?Sized> Serialize for Members<'_, O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for key in self.0.keys() {
            if let Some(value) = self.0.get(&key) {
                map.serialize_entry(&key, &value)?;
            }
        }
        map.end()
    }
}


#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    name: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Record {
            name: name.into(),
            fields: Vec::new()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A record is zero when all its fields are.
    pub fn is_zero(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_zero())
    }
}


type LambdaFn = dyn Fn(&str, RenderFn<'_>) -> Result<String, BoxError> + Send + Sync;

/// A callable section.
///
/// Receives the unrendered source of the section and a [RenderFn]; its
/// return value is written verbatim.
#[derive(Clone)]
pub struct Lambda(Arc<LambdaFn>);

impl Lambda {
    pub fn new<F>(fun: F) -> Self
    where F: Fn(&str, RenderFn<'_>) -> Result<String, BoxError> + Send + Sync + 'static {
        Lambda(Arc::new(fun))
    }

    pub fn call(&self, text: &str, render: RenderFn<'_>) -> Result<String, BoxError> {
        (self.0)(text, render)
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lambda {...}")
    }
}


impl Value {
    pub fn object<T: Object + 'static>(object: T) -> Value {
        Value::Object(Arc::new(object))
    }

    pub fn lambda<F>(fun: F) -> Value
    where F: Fn(&str, RenderFn<'_>) -> Result<String, BoxError> + Send + Sync + 'static {
        Value::Lambda(Lambda::new(fun))
    }

    pub fn seq<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Value {
        Value::Seq(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Value
    where K: Into<String>, V: Into<Value> {
        Value::Map(Arc::new(
            entries.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        ))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None
        }
    }

    /// Whether this is the zero value of its kind.
    ///
    /// Unlike section emptiness, strings are not trimmed. Floats compare by
    /// bit pattern, so `-0.0` is not zero. A present sequence or mapping is
    /// never zero, even with no entries; only `Null` stands for an absent one.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::I64(n) => *n == 0,
            Value::U64(n) => *n == 0,
            Value::F64(n) => n.to_bits() == 0,
            Value::String(s) => s.is_empty(),
            Value::Seq(_) | Value::Map(_) | Value::Lambda(_) => false,
            Value::Record(record) => record.is_zero(),
            Value::Object(object) => object.is_zero()
        }
    }
}


impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Value::Lambda(a), Value::Lambda(b)) => std::ptr::addr_eq(Arc::as_ptr(&a.0), Arc::as_ptr(&b.0)),
            _ => false
        }
    }
}


impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::Lambda(_) => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(n) => write!(f, "{n}"),
            Value::U64(n) => write!(f, "{n}"),
            Value::F64(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Seq(_) | Value::Map(_) | Value::Record(_) => {
                // compound values nesting a lambda have no textual form
                match serde_json::to_string(self) {
                    Ok(json) => f.write_str(&json),
                    Err(_) => Ok(())
                }
            },
            Value::Object(object) => object.render(f)
        }
    }
}


impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::I64(n) => serializer.serialize_i64(*n),
            Value::U64(n) => serializer.serialize_u64(*n),
            Value::F64(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Seq(items) => serializer.collect_seq(items.iter()),
            Value::Map(map) => serializer.collect_map(map.iter()),
            Value::Record(record) => serializer.collect_map(record.fields()),
            Value::Object(object) => match object.repr() {
                ObjectRepr::Record | ObjectRepr::Map => Members(object.as_ref()).serialize(serializer),
                ObjectRepr::Seq => serializer.collect_seq(object.items()),
                ObjectRepr::Wrapper => match object.inner() {
                    Some(value) => value.serialize(serializer),
                    None => serializer.serialize_unit()
                },
                ObjectRepr::Opaque => serializer.collect_str(self)
            },
            Value::Lambda(_) => Err(S::Error::custom("a lambda cannot be serialized"))
        }
    }
}


macro_rules! value_from {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from!(Bool: bool);
value_from!(I64: i8, i16, i32, i64);
value_from!(U64: u8, u16, u32, u64);
value_from!(F64: f32, f64);
value_from!(String: &str, String, Arc<str>);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::U64(value as u64)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::I64(value as i64)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(Arc::new(record))
    }
}

impl From<Lambda> for Value {
    fn from(lambda: Lambda) -> Self {
        Value::Lambda(lambda)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::seq(items)
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::map(map)
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Value::map(map)
    }
}
