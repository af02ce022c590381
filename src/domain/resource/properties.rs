// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::shared::{CloudError, Result};
use serde_json::{Map, Value};

/// Build a properties object from `--name` and repeated `-p key=value` flags.
///
/// Dotted keys nest (`maintenanceWindow.time=10:00` becomes
/// `{"maintenanceWindow": {"time": "10:00"}}`). `true`/`false` become booleans
/// and integers become numbers; everything else stays a string.
pub fn build_properties(name: Option<&str>, properties: &[String]) -> Result<Map<String, Value>> {
    let mut map = parse_properties(properties)?;
    if let Some(name) = name {
        map.insert("name".to_string(), Value::String(name.to_string()));
    }
    Ok(map)
}

pub fn parse_properties(properties: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();

    for property in properties {
        let (key, value) = property.split_once('=').ok_or_else(|| {
            CloudError::validation(format!(
                "Invalid property format: '{}'. Expected 'key=value'",
                property
            ))
        })?;

        let key = key.trim();
        if key.is_empty() || key.split('.').any(str::is_empty) {
            return Err(CloudError::validation(format!(
                "Empty key in property: '{}'",
                property
            )));
        }

        insert_nested(&mut map, key, typed_value(value.trim()))?;
    }

    Ok(map)
}

fn typed_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

fn insert_nested(map: &mut Map<String, Value>, key: &str, value: Value) -> Result<()> {
    match key.split_once('.') {
        None => {
            if map.get(key).is_some_and(Value::is_object) {
                return Err(conflict(key));
            }
            map.insert(key.to_string(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(inner) => insert_nested(inner, rest, value),
                _ => Err(conflict(head)),
            }
        }
    }
}

fn conflict(key: &str) -> CloudError {
    CloudError::validation(format!(
        "Property '{}' is set both as a value and as an object",
        key
    ))
}
