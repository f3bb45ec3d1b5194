//! Resume documents — the on-disk `.resume` shape, its store and TXT export.

mod export;
mod store;

pub use export::format_resume_txt;
pub use store::ResumeStore;

use serde::{Deserialize, Serialize};

/// A saved resume. Only `id`, `title` and `updated` are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub id: String,
    pub title: String,
    /// RFC 3339 timestamp of the last save.
    pub updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ResumeContent>,
    /// Base64 data URL or external link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Job description the content was tailored against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_desc: Option<String>,
    /// Template: "professional" | "modern" | "compact".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
}

impl ResumeData {
    /// Fresh resume with a random id, stamped now.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            updated: now(),
            content: None,
            image: None,
            job_desc: None,
            theme: None,
            font: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated = now();
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeContent {
    pub personal: Personal,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub skills: Vec<SkillGroup>,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Personal {
    pub full_name: String,
    pub email: String,
    pub location: String,
    pub headline: String,
    pub socials: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub location: String,
    pub gpa: String,
    pub date: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub date: DateRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub date: DateRange,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGroup {
    pub category: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Award {
    pub title: String,
    pub organizer: String,
    pub date: DateRange,
    pub description: String,
    pub location: String,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_content() -> ResumeContent {
        ResumeContent {
            personal: Personal {
                full_name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                location: "London".into(),
                headline: "Analyst".into(),
                github: Some("github.com/ada".into()),
                ..Default::default()
            },
            education: vec![Education {
                school: "University of London".into(),
                degree: "BSc Mathematics".into(),
                location: "London".into(),
                gpa: "3.9".into(),
                date: DateRange {
                    from: "1832".into(),
                    to: Some("1835".into()),
                },
                courses: Some(vec!["Calculus".into(), "Logic".into()]),
            }],
            experience: vec![Experience {
                job_title: "Programmer".into(),
                company: "Analytical Engine".into(),
                location: "London".into(),
                description: "Wrote the first published algorithm.".into(),
                date: DateRange {
                    from: "1842".into(),
                    to: None,
                },
                notes: Some(vec!["Bernoulli numbers".into()]),
            }],
            projects: vec![Project {
                name: "Note G".into(),
                link: None,
                date: DateRange {
                    from: "1843".into(),
                    to: None,
                },
                description: "Annotated translation.".into(),
                technologies: vec!["Punched cards".into()],
            }],
            skills: vec![SkillGroup {
                category: "Math".into(),
                items: vec!["Analysis".into(), "Algebra".into()],
            }],
            awards: Vec::new(),
        }
    }

    #[test]
    fn new_resume_has_uuid_and_timestamp() {
        let a = ResumeData::new("Backend");
        let b = ResumeData::new("Backend");
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&a.updated).is_ok());
        assert!(a.content.is_none());
    }

    #[test]
    fn minimal_document_parses() {
        let r: ResumeData =
            serde_json::from_str(r#"{"id": "1", "title": "t", "updated": "2025-01-01T00:00:00Z"}"#)
                .unwrap();
        assert_eq!(r.title, "t");
        assert!(r.job_desc.is_none());
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let mut r = ResumeData::new("x");
        r.job_desc = Some("Rust engineer".into());
        r.content = Some(sample_content());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["jobDesc"], "Rust engineer");
        assert_eq!(json["content"]["personal"]["fullName"], "Ada Lovelace");
        assert_eq!(json["content"]["experience"][0]["jobTitle"], "Programmer");
        assert!(json["content"]["experience"][0]["date"].get("to").is_none());
        assert!(json.get("image").is_none());
    }
}
