//! Response normalizer: turns untrusted backend text into a conformant [`ResumeRecord`].
//!
//! Only total unparseability is fatal. Everything else is repaired locally:
//! - list fields that are absent or not arrays become empty lists
//! - entries with a missing, blank, or repeated `id` get `<prefix>-<index>`
//!   (position in their own list, per list)
//! - missing scalar fields become empty strings
//! - list elements that are not objects become blank entries in place
//! - unknown keys are ignored
//!
//! The normalizer never sees or produces `personalInfo.photo`; the session
//! merges the uploaded photo after the fact.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::resume::{
    Education, Experience, ListEntry, PersonalInfo, Reference, ResumeRecord,
};
use crate::resume::schema::{
    entry_fields, OBJECTIVE_KEY, PERSONAL_INFO_KEY, PERSONAL_INFO_FIELDS, SKILLS_KEY,
};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response is valid JSON but not an object (found {0})")]
    NotAnObject(&'static str),
}

/// Parses and normalizes a raw backend response.
pub fn normalize(raw: &str) -> Result<ResumeRecord, NormalizeError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))?;
    normalize_value(value)
}

/// Normalizes an already-parsed value. Fails only when it is not a JSON object.
pub fn normalize_value(value: Value) -> Result<ResumeRecord, NormalizeError> {
    let root = match value {
        Value::Object(root) => root,
        other => return Err(NormalizeError::NotAnObject(json_kind(&other))),
    };

    Ok(ResumeRecord {
        personal_info: normalize_personal_info(root.get(PERSONAL_INFO_KEY)),
        objective: coerce_string(root.get(OBJECTIVE_KEY), OBJECTIVE_KEY),
        experience: normalize_entries::<Experience>(&root),
        education: normalize_entries::<Education>(&root),
        skills: normalize_skills(root.get(SKILLS_KEY)),
        references: normalize_entries::<Reference>(&root),
    })
}

fn normalize_personal_info(value: Option<&Value>) -> PersonalInfo {
    let fields = match value {
        Some(Value::Object(fields)) => fields,
        other => {
            if other.is_some_and(|v| !v.is_null()) {
                warn!("personalInfo is not an object; using empty contact fields");
            }
            return PersonalInfo::default();
        }
    };

    let mut info = PersonalInfo::default();
    for spec in PERSONAL_INFO_FIELDS {
        let value = coerce_string(fields.get(spec.name), spec.name);
        match spec.name {
            "name" => info.name = value,
            "email" => info.email = value,
            "phone" => info.phone = value,
            "address" => info.address = value,
            _ => {}
        }
    }
    info
}

fn normalize_entries<T: ListEntry>(root: &Map<String, Value>) -> Vec<T> {
    let kind = T::KIND;
    let items: &[Value] = match root.get(kind.key()) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => {
            debug!("{kind} missing from response; using empty list");
            &[]
        }
        Some(other) => {
            warn!(
                "{kind} is {} instead of an array; using empty list",
                json_kind(other)
            );
            &[]
        }
    };

    let no_fields = Map::new();
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let fields = match item {
            Value::Object(fields) => fields,
            other => {
                warn!(
                    "{kind}[{index}] is {} instead of an object; keeping a blank entry",
                    json_kind(other)
                );
                &no_fields
            }
        };

        let given = coerce_string(fields.get("id"), "id").trim().to_string();
        let id = if given.is_empty() || seen.contains(&given) {
            let fallback = fallback_id(kind.id_prefix(), index, &seen);
            debug!("{kind}[{index}] id {given:?} replaced with {fallback}");
            fallback
        } else {
            given
        };
        seen.insert(id.clone());

        let mut entry = T::blank(id);
        for spec in entry_fields(kind).iter().filter(|f| f.name != "id") {
            entry.set_field(spec.name, coerce_string(fields.get(spec.name), spec.name));
        }
        entries.push(entry);
    }

    entries
}

/// Position-in-list fallback id. Only unique within the list being normalized;
/// user-added entries get session-scoped ids from the store instead.
fn fallback_id(prefix: &str, index: usize, taken: &HashSet<String>) -> String {
    let base = format!("{prefix}-{index}");
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn normalize_skills(value: Option<&Value>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Vec::new(),
        Some(other) => {
            warn!(
                "skills is {} instead of an array; using empty list",
                json_kind(other)
            );
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => {
                warn!("skipping {} skill entry", json_kind(other));
                None
            }
        })
        .collect()
}

/// Reads a scalar field as a string. Numbers and booleans are stringified,
/// an array of strings is joined one item per line, anything else is empty.
fn coerce_string(value: Option<&Value>, field: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Object(_)) => {
            warn!("field '{field}' is an object; using empty string");
            String::new()
        }
        Some(Value::Null) | None => String::new(),
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

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::store::validate_record;
    use serde_json::json;

    const MINIMAL: &str = r#"{"personalInfo":{"name":"A","email":"","phone":"","address":""},"objective":"","experience":[],"education":[],"skills":[],"references":[]}"#;

    #[test]
    fn test_minimal_valid_response_is_unchanged() {
        let record = normalize(MINIMAL).unwrap();
        assert_eq!(record.personal_info.name, "A");
        assert!(record.experience.is_empty());

        let original: Value = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), original);
    }

    #[test]
    fn test_missing_ids_get_positional_fallbacks() {
        let raw = json!({
            "personalInfo": {"name": "A", "email": "", "phone": "", "address": ""},
            "objective": "",
            "experience": [
                {"title": "X", "company": "Y", "dates": "2020"},
                {"title": "Z", "company": "W", "dates": "2021"}
            ],
            "education": [],
            "skills": [],
            "references": []
        });
        let record = normalize(&raw.to_string()).unwrap();
        let ids: Vec<&str> = record.experience.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["exp-0", "exp-1"]);
        assert_eq!(record.experience[0].title, "X");
        assert_eq!(record.experience[1].company, "W");
        assert_eq!(record.experience[0].location, "");
    }

    #[test]
    fn test_fallbacks_are_per_list() {
        let raw = json!({
            "experience": [{"title": "X"}],
            "education": [{"school": "S"}],
            "references": [{"name": "R"}]
        });
        let record = normalize(&raw.to_string()).unwrap();
        assert_eq!(record.experience[0].id, "exp-0");
        assert_eq!(record.education[0].id, "edu-0");
        assert_eq!(record.references[0].id, "ref-0");
    }

    #[test]
    fn test_missing_lists_become_empty() {
        let raw = json!({
            "personalInfo": {"name": "A"},
            "objective": "o",
            "experience": [],
            "education": []
        });
        let record = normalize(&raw.to_string()).unwrap();
        assert!(record.skills.is_empty());
        assert!(record.references.is_empty());
    }

    #[test]
    fn test_non_array_lists_become_empty() {
        let raw = json!({
            "experience": "none",
            "education": {"school": "S"},
            "skills": "Cooking, Cleaning",
            "references": 3
        });
        let record = normalize(&raw.to_string()).unwrap();
        assert!(record.experience.is_empty());
        assert!(record.education.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.references.is_empty());
    }

    #[test]
    fn test_unparseable_response_is_malformed() {
        let err = normalize("Sorry, I cannot help.").unwrap_err();
        assert!(matches!(err, NormalizeError::Parse(_)));
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        let err = normalize("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, NormalizeError::NotAnObject("an array")));
        assert!(normalize("\"just text\"").is_err());
    }

    #[test]
    fn test_empty_object_fills_every_key() {
        let record = normalize("{}").unwrap();
        assert_eq!(record, ResumeRecord::default());
        let value = serde_json::to_value(&record).unwrap();
        for key in ["name", "email", "phone", "address"] {
            assert_eq!(value["personalInfo"][key], "");
        }
        assert_eq!(value["objective"], "");
    }

    #[test]
    fn test_duplicate_and_blank_ids_are_repaired() {
        let raw = json!({
            "references": [
                {"id": "ref-1", "name": "A"},
                {"id": "ref-1", "name": "B"},
                {"id": "   ", "name": "C"},
                {"name": "D"}
            ]
        });
        let record = normalize(&raw.to_string()).unwrap();
        let ids: Vec<&str> = record.references.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ref-1", "ref-1-1", "ref-2", "ref-3"]);
        assert!(validate_record(&record).is_ok());
    }

    #[test]
    fn test_fallback_avoids_ids_already_taken() {
        let raw = json!({
            "experience": [
                {"id": "exp-1", "title": "first"},
                {"title": "second"}
            ]
        });
        let record = normalize(&raw.to_string()).unwrap();
        assert_eq!(record.experience[0].id, "exp-1");
        assert_eq!(record.experience[1].id, "exp-1-1");
    }

    #[test]
    fn test_order_is_preserved() {
        let raw = json!({
            "education": [
                {"id": "edu-9", "school": "Third"},
                {"id": "edu-2", "school": "First"},
                {"school": "Second"}
            ]
        });
        let record = normalize(&raw.to_string()).unwrap();
        let schools: Vec<&str> = record.education.iter().map(|e| e.school.as_str()).collect();
        assert_eq!(schools, vec!["Third", "First", "Second"]);
    }

    #[test]
    fn test_unknown_fields_and_photo_are_ignored() {
        let raw = json!({
            "personalInfo": {"name": "A", "photo": "data:image/png;base64,AAAA", "linkedin": "x"},
            "hobbies": ["chess"],
            "experience": [{"id": "exp-0", "title": "T", "salary": 10}]
        });
        let record = normalize(&raw.to_string()).unwrap();
        assert!(record.personal_info.photo.is_none());
        assert_eq!(record.experience[0].title, "T");
    }

    #[test]
    fn test_scalar_coercions() {
        let raw = json!({
            "personalInfo": {"name": "A", "phone": 9171234567u64},
            "objective": null,
            "experience": [{
                "title": "Helper",
                "dates": 2019,
                "description": ["Cleaned rooms", "Cooked meals"]
            }],
            "skills": ["Cooking", 42, null, {"nested": true}, "Cooking"]
        });
        let record = normalize(&raw.to_string()).unwrap();
        assert_eq!(record.personal_info.phone, "9171234567");
        assert_eq!(record.objective, "");
        assert_eq!(record.experience[0].dates, "2019");
        assert_eq!(
            record.experience[0].description,
            "Cleaned rooms\nCooked meals"
        );
        assert_eq!(record.skills, vec!["Cooking", "42", "Cooking"]);
    }

    #[test]
    fn test_non_object_entries_become_blank_entries_in_place() {
        let raw = json!({
            "experience": ["garbage", {"title": "Kept"}, null],
            "references": [42]
        });
        let record = normalize(&raw.to_string()).unwrap();

        let ids: Vec<&str> = record.experience.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["exp-0", "exp-1", "exp-2"]);
        assert_eq!(record.experience[0], Experience::blank("exp-0".to_string()));
        assert_eq!(record.experience[1].title, "Kept");
        assert_eq!(record.references[0].id, "ref-0");
        assert!(validate_record(&record).is_ok());
    }

    #[test]
    fn test_normalizing_valid_record_is_idempotent() {
        let raw = json!({
            "personalInfo": {"name": "A", "email": "a@b.c", "phone": "1", "address": "X"},
            "objective": "Obj",
            "experience": [{"title": "T"}, {"id": "exp-7", "title": "U"}],
            "education": [{"school": "S"}],
            "skills": ["one", "two"],
            "references": [{"name": "R"}]
        });
        let once = normalize(&raw.to_string()).unwrap();
        let twice = normalize(&serde_json::to_string(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_every_object_response_satisfies_invariants() {
        let samples = [
            json!({}),
            json!({"personalInfo": null, "experience": null}),
            json!({"experience": [{}, {}, {}], "education": [{"id": ""}, {"id": ""}]}),
            json!({"references": [{"id": "x"}, {"id": "x"}, {"id": "x"}]}),
            json!({"personalInfo": "nobody", "skills": [[1, 2]]}),
        ];
        for sample in samples {
            let record = normalize_value(sample.clone()).unwrap();
            assert!(
                validate_record(&record).is_ok(),
                "invariants violated for {sample}"
            );
        }
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let raw = format!("```json\n{MINIMAL}\n```");
        assert_eq!(normalize(&raw).unwrap().personal_info.name, "A");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }
}
