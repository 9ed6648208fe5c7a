use serde_json::{Map, Value};

/// Drops properties whose value carries no information: empty strings and empty arrays.
pub fn prune_empty(mut props: Map<String, Value>) -> Map<String, Value> {
    props.retain(|_, value| match value {
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    });
    props
}

/// Parses `systemctl show` output (`Key=Value` per line) into a property map.
///
/// Values stay strings; only the first `=` separates key and value.
pub fn parse_show_output(text: &str) -> Map<String, Value> {
    let mut props = Map::new();
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        props.insert(key.to_string(), Value::String(value.to_string()));
    }
    props
}
