use serde::{Deserialize, Serialize};

/// A skill tag attached to a freelancer. Two skills are the same skill when
/// their ids match, whatever the description says.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Skill {
    pub id: i64,
    pub description: String,
}

/// A freelancer record as returned by the marketplace API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Freelancer {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub timezone: String,
    pub hourly_rate: f64,
    pub rating: f64,
    pub available: bool,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl Freelancer {
    /// First letter of every word in the name, used as the avatar fallback.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }
}

/// Filter payload sent to `POST /freelancers`. Unset fields are left out of
/// the JSON body entirely.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

impl FreelancerFilter {
    pub fn has_skill(&self, description: &str) -> bool {
        self.skills
            .as_deref()
            .is_some_and(|skills| skills.iter().any(|s| s == description))
    }
}
