use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Contact block at the top of a resume.
///
/// `photo` is an opaque handle (a data URL in practice) that only ever comes
/// from a local upload. Extraction never produces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub dates: String,
    /// One bullet point per line.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub id: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub relation: String,
}

/// The canonical resume artifact held by the session and handed to exporters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl ResumeRecord {
    /// Hand-authored record shown before any extraction has run.
    pub fn placeholder() -> Self {
        Self {
            personal_info: PersonalInfo {
                name: "Jordan Avery Reyes".to_string(),
                email: "jordan.reyes@example.com".to_string(),
                phone: "0917 555 0142".to_string(),
                address: "Santa Teresita, Batangas".to_string(),
                photo: None,
            },
            objective: "Dedicated and hardworking professional with hands-on experience in \
                housekeeping and domestic assistance. Adapts quickly to fast-paced \
                environments, keeps high organizational standards, and delivers dependable \
                service with integrity."
                .to_string(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            references: Vec::new(),
        }
    }
}

/// The three id-bearing lists of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Experience,
    Education,
    References,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [ListKind::Experience, ListKind::Education, ListKind::References];

    /// JSON key of the list inside a record.
    pub fn key(self) -> &'static str {
        match self {
            ListKind::Experience => "experience",
            ListKind::Education => "education",
            ListKind::References => "references",
        }
    }

    /// Prefix used by the extraction naming convention (`exp-0`, `edu-0`, `ref-0`).
    pub fn id_prefix(self) -> &'static str {
        match self {
            ListKind::Experience => "exp",
            ListKind::Education => "edu",
            ListKind::References => "ref",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experience" => Ok(ListKind::Experience),
            "education" => Ok(ListKind::Education),
            "references" => Ok(ListKind::References),
            other => Err(format!("Unknown list '{other}'")),
        }
    }
}

/// Common surface of list entries so the store can edit any list generically.
pub trait ListEntry: Clone {
    const KIND: ListKind;

    fn id(&self) -> &str;

    /// A new entry with the given id and every other field empty.
    fn blank(id: String) -> Self;

    /// Sets a named field. Returns false when the entry has no such field.
    /// The id is not editable through this path.
    fn set_field(&mut self, field: &str, value: String) -> bool;
}

impl ListEntry for Experience {
    const KIND: ListKind = ListKind::Experience;

    fn id(&self) -> &str {
        &self.id
    }

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "company" => &mut self.company,
            "location" => &mut self.location,
            "dates" => &mut self.dates,
            "description" => &mut self.description,
            _ => return false,
        };
        *slot = value;
        true
    }
}

impl ListEntry for Education {
    const KIND: ListKind = ListKind::Education;

    fn id(&self) -> &str {
        &self.id
    }

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "school" => &mut self.school,
            "degree" => &mut self.degree,
            "dates" => &mut self.dates,
            "location" => &mut self.location,
            _ => return false,
        };
        *slot = value;
        true
    }
}

impl ListEntry for Reference {
    const KIND: ListKind = ListKind::References;

    fn id(&self) -> &str {
        &self.id
    }

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "contact" => &mut self.contact,
            "relation" => &mut self.relation,
            _ => return false,
        };
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(ResumeRecord::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("personalInfo"));
        assert!(obj["experience"].is_array());
        assert!(obj["references"].is_array());
    }

    #[test]
    fn test_photo_omitted_when_absent() {
        let value = serde_json::to_value(PersonalInfo::default()).unwrap();
        assert!(value.get("photo").is_none());
    }

    #[test]
    fn test_placeholder_has_empty_lists() {
        let record = ResumeRecord::placeholder();
        assert!(!record.personal_info.name.is_empty());
        assert!(record.experience.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.personal_info.photo.is_none());
    }

    #[test]
    fn test_list_kind_round_trips_through_str() {
        for kind in ListKind::ALL {
            assert_eq!(kind.key().parse::<ListKind>().unwrap(), kind);
        }
        assert!("skills".parse::<ListKind>().is_err());
    }

    #[test]
    fn test_set_field_rejects_unknown_and_id() {
        let mut exp = Experience::blank("exp-0".to_string());
        assert!(exp.set_field("title", "Cook".to_string()));
        assert!(!exp.set_field("id", "other".to_string()));
        assert!(!exp.set_field("salary", "lots".to_string()));
        assert_eq!(exp.title, "Cook");
        assert_eq!(exp.id, "exp-0");
    }
}
