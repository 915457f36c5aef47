use std::slice;
use crate::error::{Error, Result};
use crate::value::{ObjectRepr, Value};


/// Ordered scopes consulted by name resolution, innermost first.
///
/// Entering a section links a new frame in front of the chain it was
/// entered from; chains are never modified in place.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Chain<'c> {
    Root(&'c [Value]),
    Frame(&'c Value, &'c Chain<'c>),
}

impl<'c> Chain<'c> {
    pub(crate) fn new(contexts: &'c [Value]) -> Self {
        Chain::Root(contexts)
    }

    pub(crate) fn push<'n>(&'n self, value: &'n Value) -> Chain<'n> {
        Chain::Frame(value, self)
    }

    /// The innermost scope.
    pub(crate) fn front(&self) -> Option<&'c Value> {
        match *self {
            Chain::Root(contexts) => contexts.first(),
            Chain::Frame(value, _) => Some(value)
        }
    }

    pub(crate) fn iter(&self) -> ChainIter<'c> {
        ChainIter {
            frame: Some(*self),
            root: <&[Value]>::default().iter()
        }
    }
}

pub(crate) struct ChainIter<'c> {
    frame: Option<Chain<'c>>,
    root: slice::Iter<'c, Value>,
}

impl<'c> Iterator for ChainIter<'c> {
    type Item = &'c Value;

    fn next(&mut self) -> Option<&'c Value> {
        match self.frame.take() {
            Some(Chain::Frame(value, outer)) => {
                self.frame = Some(*outer);
                Some(value)
            },
            Some(Chain::Root(contexts)) => {
                self.root = contexts.iter();
                self.root.next()
            },
            None => self.root.next()
        }
    }
}


/// Resolves `name` against `chain`.
///
/// Dotted names resolve their first segment against the whole chain and
/// every following segment against the previous result only. `Ok(None)`
/// means unresolved, which is an error only when `error_on_missing` is set.
pub(crate) fn lookup(chain: &Chain, name: &str, error_on_missing: bool) -> Result<Option<Value>> {
    if name != "." {
        if let Some((head, rest)) = name.split_once('.') {
            return match lookup(chain, head, error_on_missing)? {
                Some(value) => lookup(&Chain::new(slice::from_ref(&value)), rest, error_on_missing),
                None => Ok(None)
            };
        }
    }

    for context in chain.iter() {
        if let Some(value) = lookup_in(context, name) {
            return Ok(Some(value));
        }
    }

    if error_on_missing {
        Err(Error::MissingVariable(name.to_owned()))
    } else {
        Ok(None)
    }
}

// Capabilities are checked before anything else at every level of
// indirection; a record or mapping without `name` ends the search in
// this context.
fn lookup_in(context: &Value, name: &str) -> Option<Value> {
    let mut current = context.clone();
    loop {
        if let Value::Object(object) = &current {
            match object.call_method(name) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {},
                Err(err) => {
                    log::warn!("calling {name:?} on {object:?} failed: {err}");
                    return None;
                }
            }
        }
        if name == "." {
            return Some(current);
        }
        current = match &current {
            Value::Map(map) => return map.get(name).cloned(),
            Value::Record(record) => return record.get(name).cloned(),
            Value::Object(object) => match object.repr() {
                ObjectRepr::Wrapper => object.inner()?,
                ObjectRepr::Record | ObjectRepr::Map => return object.get(name),
                ObjectRepr::Seq | ObjectRepr::Opaque => return None
            },
            _ => return None
        };
    }
}


/// Unwraps every level of indirection; a null wrapper yields `Null`.
pub(crate) fn indirect(value: &Value) -> Value {
    let mut current = value.clone();
    while let Value::Object(object) = &current {
        if object.repr() != ObjectRepr::Wrapper {
            break;
        }
        current = object.inner().unwrap_or(Value::Null);
    }
    current
}

/// Section emptiness.
///
/// A string is empty when it is blank, a mapping never is, anything else
/// is empty when it is the zero value of its kind.
pub(crate) fn is_empty(value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return true;
    };
    match indirect(value) {
        Value::String(s) => s.trim().is_empty(),
        Value::Seq(items) => items.is_empty(),
        Value::Map(_) | Value::Lambda(_) => false,
        Value::Object(object) if object.repr() == ObjectRepr::Seq => object.items().is_empty(),
        other => other.is_zero()
    }
}
