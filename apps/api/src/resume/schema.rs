//! The one definition of the record's shape.
//!
//! Both the response schema sent to the generation backend and the local
//! normalizer read these tables.

use serde_json::{json, Map, Value};

use crate::models::resume::ListKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
}

const fn required(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        required: true,
    }
}

const fn optional(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
    }
}

pub const PERSONAL_INFO_KEY: &str = "personalInfo";
pub const OBJECTIVE_KEY: &str = "objective";
pub const SKILLS_KEY: &str = "skills";

/// Personal info fields produced by extraction. `photo` is deliberately absent.
pub const PERSONAL_INFO_FIELDS: &[FieldSpec] = &[
    required("name"),
    required("email"),
    required("phone"),
    required("address"),
];

pub const EXPERIENCE_FIELDS: &[FieldSpec] = &[
    required("id"),
    required("title"),
    required("company"),
    optional("location"),
    required("dates"),
    optional("description"),
];

pub const EDUCATION_FIELDS: &[FieldSpec] = &[
    required("id"),
    required("school"),
    required("degree"),
    required("dates"),
    optional("location"),
];

pub const REFERENCE_FIELDS: &[FieldSpec] = &[
    required("id"),
    required("name"),
    required("contact"),
    optional("relation"),
];

/// Top-level keys, all required (lists at minimum as empty containers).
pub const TOP_LEVEL_KEYS: &[&str] = &[
    PERSONAL_INFO_KEY,
    OBJECTIVE_KEY,
    "experience",
    "education",
    SKILLS_KEY,
    "references",
];

pub fn entry_fields(kind: ListKind) -> &'static [FieldSpec] {
    match kind {
        ListKind::Experience => EXPERIENCE_FIELDS,
        ListKind::Education => EDUCATION_FIELDS,
        ListKind::References => REFERENCE_FIELDS,
    }
}

/// Response schema in the OpenAPI subset accepted by `generationConfig.responseSchema`.
pub fn response_schema() -> Value {
    let mut properties = Map::new();
    properties.insert(
        PERSONAL_INFO_KEY.to_string(),
        object_schema(PERSONAL_INFO_FIELDS),
    );
    properties.insert(OBJECTIVE_KEY.to_string(), json!({ "type": "STRING" }));
    for kind in ListKind::ALL {
        properties.insert(
            kind.key().to_string(),
            json!({ "type": "ARRAY", "items": object_schema(entry_fields(kind)) }),
        );
    }
    properties.insert(
        SKILLS_KEY.to_string(),
        json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
    );

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": TOP_LEVEL_KEYS,
    })
}

fn object_schema(fields: &[FieldSpec]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.to_string(), json!({ "type": "STRING" })))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
        .collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Education, Experience, PersonalInfo, Reference, ResumeRecord};

    fn keys_of<T: serde::Serialize>(value: &T) -> Vec<String> {
        let mut keys: Vec<String> = serde_json::to_value(value)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn names(fields: &[FieldSpec]) -> Vec<String> {
        let mut names: Vec<String> = fields.iter().map(|f| f.name.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_tables_match_record_types() {
        assert_eq!(names(PERSONAL_INFO_FIELDS), keys_of(&PersonalInfo::default()));
        assert_eq!(names(EXPERIENCE_FIELDS), keys_of(&Experience::default()));
        assert_eq!(names(EDUCATION_FIELDS), keys_of(&Education::default()));
        assert_eq!(names(REFERENCE_FIELDS), keys_of(&Reference::default()));

        let mut top: Vec<String> = TOP_LEVEL_KEYS.iter().map(|k| k.to_string()).collect();
        top.sort();
        assert_eq!(top, keys_of(&ResumeRecord::default()));
    }

    #[test]
    fn test_response_schema_required_sets() {
        let schema = response_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 6);

        let exp_required = &schema["properties"]["experience"]["items"]["required"];
        assert_eq!(exp_required, &json!(["id", "title", "company", "dates"]));

        let edu_required = &schema["properties"]["education"]["items"]["required"];
        assert_eq!(edu_required, &json!(["id", "school", "degree", "dates"]));

        let ref_required = &schema["properties"]["references"]["items"]["required"];
        assert_eq!(ref_required, &json!(["id", "name", "contact"]));

        let personal_required = &schema["properties"]["personalInfo"]["required"];
        assert_eq!(
            personal_required,
            &json!(["name", "email", "phone", "address"])
        );
    }

    #[test]
    fn test_response_schema_never_asks_for_photo() {
        let schema = response_schema();
        assert!(schema["properties"]["personalInfo"]["properties"]
            .get("photo")
            .is_none());
    }

    #[test]
    fn test_skills_are_string_array() {
        let schema = response_schema();
        assert_eq!(schema["properties"]["skills"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["skills"]["items"]["type"], "STRING");
    }
}
