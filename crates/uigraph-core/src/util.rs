//! Small helpers shared by the model and its drivers.

use chrono::{Local, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::action::{ActionType, ScrollType};

const RANDOM_CHARS_MIN: usize = 11;
const RANDOM_CHARS_MAX: usize = 1000;

/// Presence-aware equality: two absent values are *not* equal.
#[must_use]
pub fn equals<T: PartialEq + ?Sized>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[must_use]
pub fn string_to_action_type(name: &str) -> ActionType {
    ActionType::from_name(name)
}

#[must_use]
pub fn string_to_scroll_type(name: &str) -> ScrollType {
    ScrollType::from_name(name)
}

/// Read `key` from a JSON object, falling back to `default` when the key is
/// missing, null, or of the wrong type.
pub fn get_json_value<T: DeserializeOwned>(doc: &Value, key: &str, default: T) -> T {
    doc.get(key)
        .filter(|value| !value.is_null())
        .and_then(|value| T::deserialize(value).ok())
        .unwrap_or(default)
}

/// Strip leading and trailing whitespace in place.
pub fn trim_string(text: &mut String) {
    let end = text.trim_end().len();
    text.truncate(end);
    let start = text.len() - text.trim_start().len();
    text.drain(..start);
}

/// Split on `delim`, keeping empty fields. Blank input yields no fields.
#[must_use]
pub fn split_string(text: &str, delim: char) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(delim).map(str::to_string).collect()
}

/// Replace every non-overlapping occurrence of `from` in place.
pub fn string_replace_all(text: &mut String, from: &str, to: &str) {
    if from.is_empty() || !text.contains(from) {
        return;
    }
    *text = text.replace(from, to);
}

/// Wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn current_stamp() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// Local time as `YYYY-MM-DD HH:MM:SS.mmm`.
#[must_use]
pub fn time_format_str() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Uniform integer in `[lo, hi)`; `lo` when the range is empty.
#[must_use]
pub fn random_int(lo: i32, hi: i32) -> i32 {
    if lo >= hi {
        return lo;
    }
    rand::thread_rng().gen_range(lo..hi)
}

/// Random alphanumeric string, used as fuzzing input.
#[must_use]
pub fn random_chars() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(RANDOM_CHARS_MIN..=RANDOM_CHARS_MAX);
    (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
