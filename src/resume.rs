//! Structured résumé records → directive markup.
//!
//! The JSON shape is the one produced by the résumé extraction service
//! (`user_name`, `user_education`, `internship_experience`, ...). Scalar
//! fields may arrive as strings or numbers; missing fields are skipped.

use std::fmt::Write as _;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Accept a string, a number or a bool; treat null and blank as absent.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let text = match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    #[serde(deserialize_with = "scalar")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "scalar")]
    pub user_university: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub dates: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub user_major: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub user_graduate_year: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub user_gpa: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub user_language_score: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Internship {
    #[serde(deserialize_with = "scalar")]
    pub company: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub role: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub location: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub dates: Option<String>,
    pub description_points: Vec<String>,
}

/// A research project or an extracurricular activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(alias = "research_project", alias = "organization", deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub role: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub location: Option<String>,
    #[serde(deserialize_with = "scalar")]
    pub dates: Option<String>,
    pub description_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resume {
    #[serde(deserialize_with = "scalar")]
    pub user_name: Option<String>,
    pub user_contact_info: ContactInfo,
    #[serde(deserialize_with = "scalar")]
    pub user_location: Option<String>,
    pub user_education: Vec<Education>,
    pub internship_experience: Vec<Internship>,
    pub user_research_experience: Vec<Activity>,
    pub user_extracurricular_activities: Vec<Activity>,
}

impl Resume {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as a directive document ready for [`crate::blocks::parse_blocks`].
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        if let Some(name) = &self.user_name {
            let _ = writeln!(md, "# {name}");
        }

        md.push_str("## Basic Information\n\n");
        labelled(&mut md, "Phone", &self.user_contact_info.phone);
        labelled(&mut md, "Email", &self.user_contact_info.email);
        labelled(&mut md, "Address", &self.user_location);
        md.push('\n');

        section(&mut md, "Education", &self.user_education, |md, edu| {
            if edu.user_university.is_some() || edu.dates.is_some() {
                region_pair(
                    md,
                    &[edu.user_university.as_deref().map(bold)],
                    &[edu.dates.clone()],
                );
            }
            for (label, value) in [
                ("Major", &edu.user_major),
                ("Degree", &edu.degree),
                ("Graduation year", &edu.user_graduate_year),
                ("GPA", &edu.user_gpa),
                ("Language score", &edu.user_language_score),
                ("Details", &edu.details),
            ] {
                if let Some(v) = value {
                    let _ = writeln!(md, "- {label}: {v}");
                }
            }
        });

        section(&mut md, "Internships", &self.internship_experience, |md, job| {
            if job.company.is_some() || job.dates.is_some() {
                region_pair(
                    md,
                    &[
                        job.company.as_deref().map(bold),
                        job.role.as_deref().map(|r| format!("*{r}*")),
                    ],
                    &[job.location.clone(), job.dates.clone()],
                );
            }
            bullets(md, &job.description_points);
        });

        section(&mut md, "Research", &self.user_research_experience, |md, a| {
            activity(md, a, "Project", "Project details");
        });

        section(
            &mut md,
            "Extracurricular Activities",
            &self.user_extracurricular_activities,
            |md, a| activity(md, a, "Organization", "Activity details"),
        );

        md
    }
}

/// Parse a résumé record and render it as directive markup.
pub fn json_to_markdown(json: &str) -> Result<String> {
    Ok(Resume::from_json(json)?.to_markdown())
}

fn bold(s: &str) -> String {
    format!("**{s}**")
}

fn labelled(md: &mut String, label: &str, value: &Option<String>) {
    if let Some(v) = value {
        let _ = writeln!(md, "**{label}:** {v}");
    }
}

fn bullets(md: &mut String, points: &[String]) {
    for point in points.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        let _ = writeln!(md, "- {point}");
    }
}

/// A `left` region immediately followed by a `right` region, which the block
/// parser pairs into rows.
fn region_pair(md: &mut String, left: &[Option<String>], right: &[Option<String>]) {
    md.push_str("::: left\n");
    for line in left.iter().flatten() {
        let _ = writeln!(md, "{line}");
    }
    md.push_str(":::\n::: right\n");
    for line in right.iter().flatten() {
        let _ = writeln!(md, "{line}");
    }
    md.push_str(":::\n");
}

/// Heading plus entries separated by rules. Empty lists emit nothing.
fn section<T>(md: &mut String, title: &str, entries: &[T], mut entry: impl FnMut(&mut String, &T)) {
    if entries.is_empty() {
        return;
    }
    let _ = write!(md, "## {title}\n\n");
    for (i, item) in entries.iter().enumerate() {
        entry(md, item);
        if i + 1 < entries.len() {
            md.push_str("---\n\n");
        }
    }
    md.push('\n');
}

fn activity(md: &mut String, a: &Activity, title_label: &str, points_label: &str) {
    labelled(md, title_label, &a.title);
    labelled(md, "Role", &a.role);
    labelled(md, "Location", &a.location);
    labelled(md, "Dates", &a.dates);
    if !a.description_points.is_empty() {
        let _ = writeln!(md, "**{points_label}:**");
        bullets(md, &a.description_points);
    }
}
