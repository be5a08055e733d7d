//! Cosmetic LLM formatting with numeric containment
//!
//! The model writes prose over `{{n.field}}` placeholders; every numeric
//! the user sees is substituted from the fetched records by [`render`].
//! Prose containing free-form numerics that do not appear in the records
//! is discarded wholesale in favour of the structured fallback.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use wayfinder_core::Record;

/// System prompt for the optional formatting pass
pub const FORMAT_SYSTEM_PROMPT: &str = "You summarize travel marketplace listings in one short, \
friendly paragraph. Refer to values from the records exclusively through placeholders of the \
form {{n.field}} where n is the 1-based record number, e.g. {{1.title}} or {{1.price}}. Never \
write literal numbers, prices, or ratings yourself. Do not invent records that are not listed.";

/// User message for the formatting pass: the records as opaque context
pub fn build_format_prompt(records: &[Record]) -> String {
    let mut prompt = String::from("Records:\n");
    for (index, record) in records.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. {}\n",
            index + 1,
            serde_json::Value::Object(record.clone())
        ));
    }
    prompt.push_str("\nWrite one short paragraph presenting these records.");
    prompt
}

fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*(\d+)\.([A-Za-z0-9_]+)\s*\}\}").expect("must be valid regex"))
}

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("must be valid regex"))
}

/// Substitute placeholders from the records and verify containment
///
/// Returns `None` (discard the prose) when a placeholder points
/// nowhere, or when the final text carries any number that is not a
/// value drawn from the records.
pub fn render(prose: &str, records: &[Record]) -> Option<String> {
    let mut rendered = String::with_capacity(prose.len());
    let mut last_end = 0;

    for captures in placeholder_pattern().captures_iter(prose) {
        let overall = captures.get(0).expect("match exists");
        let index: usize = captures.get(1)?.as_str().parse().ok()?;
        let field = captures.get(2)?.as_str();

        // 1-based record index
        let record = records.get(index.checked_sub(1)?)?;
        let value = record.get(field)?;

        rendered.push_str(&prose[last_end..overall.start()]);
        rendered.push_str(&value_to_text(value)?);
        last_end = overall.end();
    }
    rendered.push_str(&prose[last_end..]);

    // Containment check: every remaining number must come from a record
    let allowed = allowed_numbers(records);
    for number in number_pattern().find_iter(&rendered) {
        if !allowed.contains(number.as_str()) {
            return None;
        }
    }

    Some(rendered)
}

/// Render one substitutable value; objects and arrays are not allowed
fn value_to_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Every numeric token present anywhere in the records, including
/// numbers embedded in string fields
fn allowed_numbers(records: &[Record]) -> HashSet<String> {
    let mut allowed = HashSet::new();
    for record in records {
        collect_numbers(&serde_json::Value::Object(record.clone()), &mut allowed);
    }
    allowed
}

fn collect_numbers(value: &serde_json::Value, out: &mut HashSet<String>) {
    match value {
        serde_json::Value::Number(n) => {
            out.insert(n.to_string());
        }
        serde_json::Value::String(s) => {
            for number in number_pattern().find_iter(s) {
                out.insert(number.as_str().to_owned());
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_numbers(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_numbers(item, out);
            }
        }
        serde_json::Value::Bool(_) | serde_json::Value::Null => {}
    }
}
