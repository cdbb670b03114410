// src/json.rs
use serde_json::{Map, Value};

use crate::data::{LinkColumn, Record, column_layout};

/// Array of objects; keys follow the column layout (URL fields sit right
/// after their link column).
pub fn to_value(records: &[Record], links: &[LinkColumn]) -> Value {
    let columns = column_layout(records, links, true);
    Value::Array(
        records
            .iter()
            .map(|r| {
                let obj: Map<String, Value> = columns
                    .iter()
                    .map(|c| (s!(c.header()), Value::String(s!(c.render(r)))))
                    .collect();
                Value::Object(obj)
            })
            .collect(),
    )
}

pub fn to_bytes(records: &[Record], links: &[LinkColumn]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = serde_json::to_vec_pretty(&to_value(records, links))?;
    buf.push(b'\n');
    Ok(buf)
}
