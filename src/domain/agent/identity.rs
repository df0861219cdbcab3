use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const ID_SUFFIX_LEN: usize = 8;

/// Mint a new agent id of the form `{agent_type}_{8 hex chars}`
pub fn mint_agent_id(agent_type: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}_{}", agent_type, &hex[..ID_SUFFIX_LEN])
}

/// SHA-256 (lowercase hex) over the canonical JSON text of a configuration.
///
/// Object keys are sorted recursively, so two configurations that differ only in
/// key order hash equally.
pub fn configuration_hash(configuration: &Value) -> String {
    let mut canonical = String::new();
    write_canonical(configuration, &mut canonical);
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
