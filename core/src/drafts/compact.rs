// vitrine/src/drafts/compact.rs

//! Size reduction for customization drafts before they hit storage.
//!
//! Compaction does three things:
//!  - drops string values that carry embedded binary (data URLs, long base64 runs),
//!  - renames `<name>_position` objects to `p:<name>` and their fields
//!    `{x, y, width, height, ratio, angle}` to `{x, y, w, h, r, a}`, with the
//!    numbers stored as their shortest exact decimal string and string values
//!    tagged with `s:` so they never read back as numbers,
//!  - renames `<name>_visible` booleans to `v:<name>`.
//!
//! Every other key passes through untouched. Keys starting with `p:` or `v:`
//! are reserved for the compact form. Unknown position fields keep their name,
//! escaped with a leading `\` when it would clash with a short name.

use serde_json::{Map, Number, Value};

pub const POSITION_SUFFIX: &str = "_position";
pub const VISIBILITY_SUFFIX: &str = "_visible";
pub const POSITION_PREFIX: &str = "p:";
pub const VISIBILITY_PREFIX: &str = "v:";

/// (long, short) field names of a position record.
const POSITION_FIELDS: [(&str, &str); 6] = [
  ("x", "x"),
  ("y", "y"),
  ("width", "w"),
  ("height", "h"),
  ("ratio", "r"),
  ("angle", "a"),
];

/// Marks a position value that was a string in the original draft.
const STRING_TAG: &str = "s:";
const FIELD_ESCAPE: char = '\\';

const MIN_RAW_BASE64_LEN: usize = 512;

/// True for data URLs carrying base64 and for long runs of pure base64 text.
pub fn looks_like_binary_payload(value: &str) -> bool {
  if value.starts_with("data:") && value.contains(";base64,") {
    return true;
  }
  value.len() >= MIN_RAW_BASE64_LEN
    && value
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
}

pub fn compactify_customization(data: &Map<String, Value>) -> Map<String, Value> {
  let mut out = Map::with_capacity(data.len());
  for (key, value) in data {
    if let Value::String(s) = value {
      if looks_like_binary_payload(s) {
        tracing::trace!(%key, bytes = s.len(), "Dropping binary payload from draft.");
        continue;
      }
    }

    match (key.strip_suffix(POSITION_SUFFIX), key.strip_suffix(VISIBILITY_SUFFIX), value) {
      (Some(stem), _, Value::Object(position)) => {
        out.insert(format!("{POSITION_PREFIX}{stem}"), Value::Object(compact_position(position)));
      }
      (_, Some(stem), Value::Bool(_)) => {
        out.insert(format!("{VISIBILITY_PREFIX}{stem}"), value.clone());
      }
      _ => {
        if let Some(stripped) = strip_binary(value) {
          out.insert(key.clone(), stripped);
        }
      }
    }
  }
  out
}

pub fn expand_customization(compacted: &Map<String, Value>) -> Map<String, Value> {
  let mut out = Map::with_capacity(compacted.len());
  for (key, value) in compacted {
    match (key.strip_prefix(POSITION_PREFIX), key.strip_prefix(VISIBILITY_PREFIX), value) {
      (Some(stem), _, Value::Object(position)) => {
        out.insert(format!("{stem}{POSITION_SUFFIX}"), Value::Object(expand_position(position)));
      }
      (_, Some(stem), Value::Bool(_)) => {
        out.insert(format!("{stem}{VISIBILITY_SUFFIX}"), value.clone());
      }
      _ => {
        out.insert(key.clone(), value.clone());
      }
    }
  }
  out
}

fn compact_position(position: &Map<String, Value>) -> Map<String, Value> {
  position
    .iter()
    .map(|(field, value)| {
      let short = POSITION_FIELDS
        .iter()
        .find(|(long, _)| long == field)
        .map(|(_, short)| *short);
      match (short, value) {
        (Some(short), Value::Number(n)) => (short.to_string(), Value::String(number_to_compact(n))),
        (Some(short), Value::String(s)) => (short.to_string(), Value::String(format!("{STRING_TAG}{s}"))),
        (Some(short), other) => (short.to_string(), other.clone()),
        (None, other) => (escape_field(field), other.clone()),
      }
    })
    .collect()
}

fn expand_position(position: &Map<String, Value>) -> Map<String, Value> {
  position
    .iter()
    .map(|(field, value)| {
      if let Some(verbatim) = field.strip_prefix(FIELD_ESCAPE) {
        return (verbatim.to_string(), value.clone());
      }
      let long = POSITION_FIELDS
        .iter()
        .find(|(_, short)| short == field)
        .map(|(long, _)| *long);
      match (long, value) {
        (Some(long), Value::String(s)) => {
          let widened = match s.strip_prefix(STRING_TAG) {
            Some(original) => Value::String(original.to_string()),
            None => compact_to_number(s).map(Value::Number).unwrap_or_else(|| value.clone()),
          };
          (long.to_string(), widened)
        }
        (Some(long), other) => (long.to_string(), other.clone()),
        (None, other) => (field.clone(), other.clone()),
      }
    })
    .collect()
}

fn escape_field(field: &str) -> String {
  let clashes = field.starts_with(FIELD_ESCAPE) || POSITION_FIELDS.iter().any(|(_, short)| *short == field);
  if clashes {
    format!("{FIELD_ESCAPE}{field}")
  } else {
    field.to_string()
  }
}

/// Integers print as-is; floats use the shortest representation that
/// round-trips and always keep a `.` or exponent so they widen back to floats.
fn number_to_compact(n: &Number) -> String {
  if n.is_i64() || n.is_u64() {
    return n.to_string();
  }
  match n.as_f64() {
    Some(f) => format!("{:?}", f),
    None => n.to_string(),
  }
}

fn compact_to_number(s: &str) -> Option<Number> {
  let looks_float = s.contains(['.', 'e', 'E']);
  if !looks_float {
    if let Ok(i) = s.parse::<i64>() {
      return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
      return Some(Number::from(u));
    }
  }
  s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Removes binary strings nested anywhere inside `value`. Returns `None` when
/// `value` itself is one.
fn strip_binary(value: &Value) -> Option<Value> {
  match value {
    Value::String(s) if looks_like_binary_payload(s) => None,
    Value::Array(items) => Some(Value::Array(items.iter().filter_map(strip_binary).collect())),
    Value::Object(map) => Some(Value::Object(
      map
        .iter()
        .filter_map(|(k, v)| strip_binary(v).map(|v| (k.clone(), v)))
        .collect(),
    )),
    other => Some(other.clone()),
  }
}
