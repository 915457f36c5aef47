use std::sync::Arc;
use crate::value::Value;
pub use serde_json::Value as JsonValue;


impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            },
            JsonValue::String(s) => Value::from(s),
            JsonValue::Array(seq) => Value::Seq(Arc::new(
                seq.into_iter().map(Value::from).collect()
            )),
            JsonValue::Object(obj) => Value::map(obj)
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        Value::from(json.clone())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_keep_their_kind() {
        assert_eq!(Value::from(json!(-1)), Value::I64(-1));
        assert_eq!(Value::from(json!(u64::MAX)), Value::U64(u64::MAX));
        assert_eq!(Value::from(json!(2.5)), Value::F64(2.5));
    }

    #[test]
    fn nested() {
        let value = Value::from(&json!({
            "team": [{"name": "john"}, null, true]
        }));
        assert_eq!(
            value,
            Value::map([(
                "team",
                Value::seq([Value::map([("name", "john")]), Value::Null, Value::Bool(true)])
            )])
        );
    }
}
