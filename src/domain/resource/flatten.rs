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

use super::kinds::{CellFormat, Column, ResourceKind};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// One printable row: a cell per column of the resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<(Column, String)>,
}

impl Row {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(column, _)| column.header == header)
            .map(|(_, value)| value.as_str())
    }
}

pub fn flatten(kind: ResourceKind, object: &Value) -> Row {
    let cells = kind
        .columns()
        .iter()
        .map(|column| {
            let value = object
                .pointer(column.pointer)
                .map(|v| render_value(v, column.format))
                .unwrap_or_default();
            (*column, value)
        })
        .collect();
    Row { cells }
}

/// Objects of a collection response, or the object itself for a single resource.
pub fn items(response: &Value) -> Vec<&Value> {
    match response.get("items") {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => vec![response],
    }
}

pub fn flatten_all(kind: ResourceKind, response: &Value) -> Vec<Row> {
    items(response)
        .into_iter()
        .map(|item| flatten(kind, item))
        .collect()
}

pub fn render_value(value: &Value, format: CellFormat) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) if format == CellFormat::Timestamp => format_timestamp(s),
        Value::String(s) => s.clone(),
        Value::Array(values) => values
            .iter()
            .map(|v| render_value(v, format))
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_datacenter() {
        let dc = json!({
            "id": "dc-1",
            "metadata": { "state": "AVAILABLE" },
            "properties": { "name": "prod", "location": "de/fra", "version": 7 }
        });

        let row = flatten(ResourceKind::Datacenter, &dc);
        assert_eq!(row.get("DatacenterId"), Some("dc-1"));
        assert_eq!(row.get("Name"), Some("prod"));
        assert_eq!(row.get("Version"), Some("7"));
        assert_eq!(row.get("Description"), Some(""));
        assert_eq!(row.get("State"), Some("AVAILABLE"));
        assert_eq!(row.get("Missing"), None);
    }

    #[test]
    fn test_flatten_request_timestamp_and_nested_status() {
        let request = json!({
            "id": "req-1",
            "metadata": {
                "createdDate": "2024-03-01T10:15:30+02:00",
                "requestStatus": { "metadata": { "status": "RUNNING" } }
            },
            "properties": { "method": "POST", "url": "/datacenters" }
        });

        let row = flatten(ResourceKind::Request, &request);
        assert_eq!(row.get("CreatedDate"), Some("2024-03-01 08:15:30"));
        assert_eq!(row.get("Status"), Some("RUNNING"));
    }

    #[test]
    fn test_unparseable_timestamp_kept() {
        assert_eq!(
            render_value(&json!("yesterday"), CellFormat::Timestamp),
            "yesterday"
        );
    }

    #[test]
    fn test_arrays_and_booleans() {
        assert_eq!(
            render_value(&json!(["SSD", "cloud-init"]), CellFormat::Plain),
            "SSD,cloud-init"
        );
        assert_eq!(render_value(&json!(true), CellFormat::Plain), "true");
        assert_eq!(render_value(&Value::Null, CellFormat::Plain), "");
    }

    #[test]
    fn test_items_of_collection() {
        let list = json!({ "items": [ { "id": "a" }, { "id": "b" } ] });
        let rows = flatten_all(ResourceKind::Pcc, &list);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("PccId"), Some("b"));

        let single = json!({ "id": "a" });
        assert_eq!(items(&single).len(), 1);
    }
}
