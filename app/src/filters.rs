//! Filter state for the dashboard and the option sets derived from the
//! currently loaded freelancers.

use std::collections::BTreeSet;

use common::{Freelancer, FreelancerFilter, Skill};

pub const HOURLY_RATE_MIN: u32 = 0;
pub const HOURLY_RATE_MAX: u32 = 150;
pub const HOURLY_RATE_STEP: u32 = 5;
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;

/// One edit to the filter. Every variant produces a new filter value and
/// therefore a re-fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Location(Option<String>),
    Timezone(Option<String>),
    HourlyRate { min: u32, max: u32 },
    HourlyRateMin(u32),
    HourlyRateMax(u32),
    RatingMin(f64),
    RatingMax(Option<f64>),
    AvailableOnly(bool),
    ToggleSkill(String),
    Reset,
}

/// The current filter plus the free-text search term.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    filter: FreelancerFilter,
    search_term: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            filter: initial_filter(),
            search_term: String::new(),
        }
    }

    pub fn filter(&self) -> &FreelancerFilter {
        &self.filter
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Local only: the search term never reaches the remote payload.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn apply(&mut self, change: FilterChange) {
        if matches!(change, FilterChange::Reset) {
            self.search_term.clear();
        }
        self.filter = next_filter(&self.filter, &change);
    }

    pub fn toggle_skill(&mut self, description: impl Into<String>) {
        self.apply(FilterChange::ToggleSkill(description.into()));
    }

    pub fn reset(&mut self) {
        self.apply(FilterChange::Reset);
    }

    /// Case-insensitive substring match over the name and skill descriptions.
    /// A blank term matches everyone.
    pub fn matches_search(&self, freelancer: &Freelancer) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        freelancer.name.to_lowercase().contains(&term)
            || freelancer
                .skills
                .iter()
                .any(|s| s.description.to_lowercase().contains(&term))
    }
}

fn initial_filter() -> FreelancerFilter {
    FreelancerFilter {
        hourly_rate_min: Some(HOURLY_RATE_MIN),
        hourly_rate_max: Some(HOURLY_RATE_MAX),
        rating_min: Some(RATING_MIN),
        available_only: Some(false),
        skills: Some(Vec::new()),
        ..Default::default()
    }
}

/// Builds the filter that follows `prev` once `change` is applied. Fields the
/// change does not name are carried over.
pub fn next_filter(prev: &FreelancerFilter, change: &FilterChange) -> FreelancerFilter {
    // start from a copy so the previous filter stays untouched
    let mut next = prev.clone();
    match change {
        FilterChange::Location(location) => next.location = location.clone(),
        FilterChange::Timezone(timezone) => next.timezone = timezone.clone(),
        FilterChange::HourlyRate { min, max } => {
            next.hourly_rate_min = Some(snap_rate(*min));
            next.hourly_rate_max = Some(snap_rate(*max));
        }
        FilterChange::HourlyRateMin(min) => next.hourly_rate_min = Some(snap_rate(*min)),
        FilterChange::HourlyRateMax(max) => next.hourly_rate_max = Some(snap_rate(*max)),
        FilterChange::RatingMin(min) => next.rating_min = Some(snap_rating(*min)),
        FilterChange::RatingMax(max) => next.rating_max = max.map(snap_rating),
        FilterChange::AvailableOnly(only) => next.available_only = Some(*only),
        FilterChange::ToggleSkill(description) => {
            // remove if selected, append otherwise
            let mut skills = prev.skills.clone().unwrap_or_default();
            if let Some(pos) = skills.iter().position(|s| s == description) {
                skills.remove(pos);
            } else {
                skills.push(description.clone());
            }
            next.skills = Some(skills);
        }
        FilterChange::Reset => next = initial_filter(),
    }
    next
}

/// Clamps to the slider range and rounds to the nearest step of 5.
fn snap_rate(rate: u32) -> u32 {
    let rate = rate.min(HOURLY_RATE_MAX);
    (rate + HOURLY_RATE_STEP / 2) / HOURLY_RATE_STEP * HOURLY_RATE_STEP
}

/// Clamps to 0..=5 and rounds to one decimal.
fn snap_rating(rating: f64) -> f64 {
    if !rating.is_finite() {
        return RATING_MIN;
    }
    (rating.clamp(RATING_MIN, RATING_MAX) * 10.0).round() / 10.0
}

pub fn unique_locations(freelancers: &[Freelancer]) -> Vec<String> {
    freelancers
        .iter()
        .map(|f| f.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn unique_timezones(freelancers: &[Freelancer]) -> Vec<String> {
    freelancers
        .iter()
        .map(|f| f.timezone.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Skills of the loaded freelancers, one per id (first occurrence wins),
/// ordered by description.
pub fn all_skills(freelancers: &[Freelancer]) -> Vec<Skill> {
    // dedup by id while walking every freelancer's skills
    let mut seen = BTreeSet::new();
    let mut skills: Vec<Skill> = freelancers
        .iter()
        .flat_map(|f| f.skills.iter())
        .filter(|s| seen.insert(s.id))
        .cloned()
        .collect();
    skills.sort_by(|a, b| a.description.cmp(&b.description));
    skills
}
