//! Keyword heuristic proposing a presentation template from raw input text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
    Modern,
    Contemporary,
    Harvard,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Contemporary,
        TemplateId::Harvard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Contemporary => "contemporary",
            TemplateId::Harvard => "harvard",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown template '{s}'"))
    }
}

/// Rules in priority order; the first rule with any matching keyword wins.
const RULES: &[(&[&str], TemplateId)] = &[
    (&["harvard", "academic"], TemplateId::Harvard),
    (&["modern", "design"], TemplateId::Modern),
];

/// Proposes a template from case-insensitive keyword hits in `raw_text`.
/// `None` means no proposal: the caller keeps its current choice.
pub fn suggest_template(raw_text: &str) -> Option<TemplateId> {
    let lowered = raw_text.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, template)| *template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvard_keywords() {
        assert_eq!(suggest_template("Harvard Law School"), Some(TemplateId::Harvard));
        assert_eq!(
            suggest_template("ACADEMIC achievements"),
            Some(TemplateId::Harvard)
        );
    }

    #[test]
    fn test_modern_keywords() {
        assert_eq!(suggest_template("Modern kitchen"), Some(TemplateId::Modern));
        assert_eq!(suggest_template("graphic DESIGNER"), Some(TemplateId::Modern));
    }

    #[test]
    fn test_harvard_wins_over_modern() {
        assert_eq!(
            suggest_template("modern design, studied at harvard"),
            Some(TemplateId::Harvard)
        );
    }

    #[test]
    fn test_no_keywords_no_proposal() {
        assert_eq!(suggest_template("Domestic helper, Qatar 2021 - 2023"), None);
        assert_eq!(suggest_template(""), None);
    }

    #[test]
    fn test_substring_match_inside_words() {
        assert_eq!(suggest_template("Academically gifted"), Some(TemplateId::Harvard));
    }

    #[test]
    fn test_template_id_parse_and_default() {
        assert_eq!(TemplateId::default(), TemplateId::Classic);
        assert_eq!("Contemporary".parse::<TemplateId>(), Ok(TemplateId::Contemporary));
        assert!("fancy".parse::<TemplateId>().is_err());
    }

    #[test]
    fn test_template_id_serde() {
        assert_eq!(serde_json::to_string(&TemplateId::Harvard).unwrap(), "\"harvard\"");
        let t: TemplateId = serde_json::from_str("\"modern\"").unwrap();
        assert_eq!(t, TemplateId::Modern);
    }
}
