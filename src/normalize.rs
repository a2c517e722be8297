//! Normalization of response bodies into uniform shapes.
//!
//! Datasets answer with JSON arrays, wrapped arrays, single objects or NDJSON
//! depending on the platform and snapshot size. SERP zones answer with parsed
//! JSON whose field names differ per engine. Everything here is pure so it can
//! be tested against canned bodies.

use crate::domain::serp::SerpEntry;
use crate::error::SdkError;
use serde_json::Value;

/// Keys under which some datasets wrap their rows.
const WRAPPER_KEYS: [&str; 3] = ["data", "results", "items"];

/// Parse a snapshot body into rows.
pub fn snapshot_rows(body: &str) -> Result<Vec<Value>, SdkError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(rows_from_value(value)),
        Err(json_err) => {
            // NDJSON: one JSON document per line.
            let rows = trimmed
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| SdkError::Serde(json_err))?;
            Ok(rows)
        }
    }
}

/// Flatten a decoded body into rows.
pub fn rows_from_value(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        Value::Object(mut map) => {
            for key in WRAPPER_KEYS {
                if matches!(map.get(key), Some(Value::Array(_))) {
                    if let Some(Value::Array(rows)) = map.remove(key) {
                        return rows;
                    }
                }
            }
            vec![Value::Object(map)]
        }
        other => vec![other],
    }
}

/// The error message if a row is a vendor error record.
///
/// With `include_errors=true` failed inputs come back as rows holding
/// `error` (and usually `error_code`) instead of data.
pub fn error_record(row: &Value) -> Option<String> {
    let obj = row.as_object()?;
    let error = obj.get("error")?;
    let message = match error {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Null => return None,
        Value::String(_) => return None,
        other => other.to_string(),
    };
    Some(match obj.get("error_code").and_then(Value::as_str) {
        Some(code) => format!("{code}: {message}"),
        None => message,
    })
}

/// The input URL a row was produced for, if the dataset echoes it.
pub fn row_input_url(row: &Value) -> Option<&str> {
    row.get("input")
        .and_then(|input| input.get("url"))
        .and_then(Value::as_str)
        .or_else(|| row.get("url").and_then(Value::as_str))
}

/// Group rows under the input URLs they belong to.
///
/// Rows echoing their input URL are matched to it, preferring an input
/// that has no row yet when the same URL was given more than once. The rest
/// are handed out in order to inputs that have not received a row yet.
pub fn group_rows_by_url(urls: &[String], rows: Vec<Value>) -> Vec<Vec<Value>> {
    let mut groups: Vec<Vec<Value>> = vec![Vec::new(); urls.len()];
    let mut unmatched = Vec::new();

    for row in rows {
        let target = row_input_url(&row).and_then(|u| {
            let key = url_key(u);
            let matching: Vec<usize> = urls
                .iter()
                .enumerate()
                .filter(|(_, candidate)| url_key(candidate.as_str()) == key)
                .map(|(idx, _)| idx)
                .collect();
            matching
                .iter()
                .copied()
                .find(|&idx| groups[idx].is_empty())
                .or_else(|| matching.first().copied())
        });
        match target {
            Some(idx) => groups[idx].push(row),
            None => unmatched.push(row),
        }
    }

    let mut unmatched = unmatched.into_iter();
    for group in groups.iter_mut().filter(|g| g.is_empty()) {
        match unmatched.next() {
            Some(row) => group.push(row),
            None => break,
        }
    }
    // Leftovers without an obvious owner stay with the last input.
    if let Some(last) = groups.last_mut() {
        last.extend(unmatched);
    }
    groups
}

fn url_key(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

// ─── SERP ────────────────────────────────────────────────────────────────────

/// Extract organic results from a parsed SERP payload.
pub fn serp_entries(payload: &Value) -> Vec<SerpEntry> {
    let organic = payload
        .get("organic")
        .or_else(|| payload.get("organic_results"))
        .or_else(|| payload.get("results"))
        .and_then(Value::as_array);

    let Some(organic) = organic else {
        return Vec::new();
    };

    organic
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let url = str_field(item, &["link", "url", "href"])?;
            let position = ["rank", "global_rank", "position"]
                .iter()
                .find_map(|k| item.get(*k).and_then(Value::as_u64))
                .map(|p| p as u32)
                .unwrap_or(idx as u32 + 1);
            Some(SerpEntry {
                position,
                title: str_field(item, &["title"]).unwrap_or_default(),
                url,
                description: str_field(item, &["description", "snippet"]),
                displayed_link: str_field(item, &["display_link", "displayed_link"]),
            })
        })
        .collect()
}

fn str_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| item.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

// ─── Web Unlocker ────────────────────────────────────────────────────────────

/// Decode an unlocker body: JSON envelopes stay JSON, pages stay text.
pub fn unlocker_body(body: String, expect_json: bool) -> Value {
    if expect_json {
        if let Ok(value) = serde_json::from_str::<Value>(&body) {
            return value;
        }
    }
    Value::String(body)
}
