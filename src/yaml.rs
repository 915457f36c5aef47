use std::sync::Arc;
use crate::value::Value;
pub use serde_yaml::Value as YamlValue;


impl From<YamlValue> for Value {
    fn from(yaml: YamlValue) -> Self {
        match yaml {
            YamlValue::Null => Value::Null,
            YamlValue::Bool(b) => Value::Bool(b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            },
            YamlValue::String(s) => Value::from(s),
            YamlValue::Sequence(seq) => Value::Seq(Arc::new(
                seq.into_iter().map(Value::from).collect()
            )),
            YamlValue::Mapping(mapping) => Value::map(
                mapping.into_iter().filter_map(
                    |(key, value)| yaml_key(key).map(|key| (key, Value::from(value)))
                )
            ),
            YamlValue::Tagged(tagged) => Value::from(tagged.value)
        }
    }
}

impl From<&YamlValue> for Value {
    fn from(yaml: &YamlValue) -> Self {
        Value::from(yaml.clone())
    }
}

// compound keys have no name a template could refer to
fn yaml_key(key: YamlValue) -> Option<String> {
    match key {
        YamlValue::String(s) => Some(s),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        _ => None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team() {
        let yaml = serde_yaml::from_str::<YamlValue>(
            "team:\n  - name: john\n    age: 42\n  - !tag {name: jane}\n1: one\n"
        ).unwrap();
        assert_eq!(
            Value::from(yaml),
            Value::map([
                ("team", Value::seq([
                    Value::map([("name", Value::from("john")), ("age", Value::I64(42))]),
                    Value::map([("name", "jane")])
                ])),
                ("1", Value::from("one"))
            ])
        );
    }
}
