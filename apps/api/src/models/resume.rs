//! Structured résumé returned by the optimizer and rendered by the client.
//!
//! Section titles are carried alongside the content because the model writes
//! them in the job description's language.

use serde::{Deserialize, Deserializer, Serialize};

use crate::llm_client::strip_json_fences;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(deserialize_with = "null_as_default")]
    pub education_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Education,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub details: String,
}

/// Models write `null` for sections they leave empty; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ResumeDocument {
    /// Parses model output into a résumé, tolerating ```json fences.
    ///
    /// An object with none of the expected content (no name, no summary, no
    /// experience) is rejected so an unrelated JSON reply is not stored.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let doc: ResumeDocument = serde_json::from_str(strip_json_fences(text))?;
        if doc.is_blank() {
            return Err(serde::de::Error::custom("résumé JSON has no content"));
        }
        Ok(doc)
    }

    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.summary.trim().is_empty() && self.experience.is_empty()
    }
}
