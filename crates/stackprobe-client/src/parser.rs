use crate::error::ParseError;
use serde::Deserialize;
use serde_json::{Map, Value};
use stackprobe_core::{TechCategory, TechnologyRecord};

/// One entry of the payload's `results` list.
#[derive(Debug, Deserialize)]
struct RawTechnology {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
}

pub struct ResponseParser;

impl ResponseParser {
    /// Decode a response body and parse it. Never fails; problems become a
    /// `"Parse error: ..."` status note.
    pub fn parse_str(url: &str, body: &str) -> TechnologyRecord {
        match serde_json::from_str::<Value>(body) {
            Ok(payload) => Self::parse(url, &payload),
            Err(e) => TechnologyRecord::failed(url, parse_error_note(&ParseError::from(e))),
        }
    }

    /// Map a decoded payload onto a record for `url`.
    ///
    /// Technologies collected before a malformed entry is hit are kept.
    pub fn parse(url: &str, payload: &Value) -> TechnologyRecord {
        let mut record = TechnologyRecord::new(url);
        if let Err(e) = Self::populate(&mut record, payload) {
            tracing::debug!(%url, error = %e, "malformed fingerprint payload");
            record.status_note = parse_error_note(&e);
        }
        record
    }

    /// `"<name>"`, or `"<name> <version>"` when a non-empty version is given.
    #[must_use]
    pub fn technology_label(name: &str, version: Option<&str>) -> String {
        match version {
            Some(version) if !version.is_empty() => format!("{name} {version}"),
            _ => name.to_string(),
        }
    }

    fn populate(record: &mut TechnologyRecord, payload: &Value) -> Result<(), ParseError> {
        let Value::Object(fields) = payload else {
            return Err(ParseError::NotAnObject {
                found: json_kind(payload),
            });
        };

        record.lookup_link = fields.get("request").and_then(lookup_link);

        // An absent `result` reads as an empty mapping.
        let empty = Map::new();
        let result = match fields.get("result") {
            None => &empty,
            Some(Value::Object(result)) => result,
            Some(other) => {
                record.status_note = render(Some(other));
                return Ok(());
            }
        };

        record.status_note = format!(
            "{} - {}",
            render(result.get("code")),
            render(result.get("msg"))
        );

        Self::extract_technologies(record, fields.get("results"))
    }

    fn extract_technologies(
        record: &mut TechnologyRecord,
        results: Option<&Value>,
    ) -> Result<(), ParseError> {
        let items = match results {
            None | Some(Value::Null) => return Ok(()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ParseError::ResultsNotAList {
                    found: json_kind(other),
                })
            }
        };

        for (index, item) in items.iter().enumerate() {
            if !item.is_object() {
                return Err(ParseError::InvalidEntry {
                    index,
                    reason: format!("expected an object, found {}", json_kind(item)),
                });
            }

            let entry = RawTechnology::deserialize(item).map_err(|e| ParseError::InvalidEntry {
                index,
                reason: e.to_string(),
            })?;

            let Some(category) = TechCategory::from_labels(&entry.categories) else {
                tracing::trace!(
                    name = %entry.name,
                    key = %TechCategory::normalize(&entry.categories),
                    "skipping untracked category"
                );
                continue;
            };

            record.push(
                category,
                Self::technology_label(&entry.name, entry.version.as_deref()),
            );
        }

        Ok(())
    }
}

fn parse_error_note(error: &ParseError) -> String {
    format!("Parse error: {error}")
}

fn lookup_link(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(link) if link.is_empty() => None,
        Value::String(link) => Some(link.clone()),
        other => Some(other.to_string()),
    }
}

/// Strings verbatim, anything else as JSON text, missing as `null`.
fn render(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "null".to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
