//! Lenient string fields. Values of flattened fields reach serde buffered, which
//! keeps YAML numbers and booleans typed, so they are converted here.

use serde::de::{Deserializer, Error, Unexpected};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

const EXPECTED: &str = "a string, number or boolean";

fn to_string<E: Error>(value: Value) -> Result<String, E> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Number(value) => Ok(value.to_string()),
        Value::String(value) => Ok(value),
        Value::Sequence(_) => Err(E::invalid_type(Unexpected::Seq, &EXPECTED)),
        Value::Mapping(_) => Err(E::invalid_type(Unexpected::Map, &EXPECTED)),
        Value::Tagged(_) => Err(E::invalid_type(
            Unexpected::Other("tagged value"),
            &EXPECTED,
        )),
    }
}

pub(super) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    to_string(Value::deserialize(deserializer)?)
}

pub(super) fn scalar_string_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(mapping) = Option::<Mapping>::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    let mut map = HashMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        if key.is_null() {
            return Err(D::Error::invalid_type(Unexpected::Unit, &EXPECTED));
        }
        map.insert(to_string(key)?, to_string(value)?);
    }
    Ok(map)
}
