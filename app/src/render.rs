//! Plain-text rendering of the two pages.

use std::fmt::Write;

use client::FreelancerSource;
use common::Freelancer;

use crate::dashboard::Dashboard;
use crate::filters::{HOURLY_RATE_MAX, HOURLY_RATE_MIN, RATING_MIN};
use crate::login::LoginPage;

pub const APP_NAME: &str = "FreelanceHub";
pub const NO_RESULTS: &str = "No freelancers found matching your search criteria.";

const TABLE_HEADERS: [&str; 7] = [
    "Freelancer",
    "Location",
    "Timezone",
    "Rate",
    "Rating",
    "Status",
    "Skills",
];

pub fn render_login(page: &LoginPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{APP_NAME}");
    let _ = writeln!(out, "Sign in to access the marketplace");
    let _ = writeln!(out);
    if let Some(banner) = page.banner() {
        let _ = writeln!(out, "Error! {banner}");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "Email: {}", page.email());
    let _ = writeln!(out, "[ {} ]", page.button_label());
    out
}

pub fn render_dashboard<S: FreelancerSource>(dashboard: &Dashboard<S>) -> String {
    let mut out = String::new();
    let filters = dashboard.filters();
    let filter = filters.filter();
    let stats = dashboard.stats();

    let _ = writeln!(out, "{APP_NAME}    Hello, {}", dashboard.session().email);
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Freelancers: {}", stats.total);
    let _ = writeln!(out, "Available Freelancers: {}", stats.available);
    let _ = writeln!(out, "Availability Rate: {}%", stats.availability_rate);
    let _ = writeln!(out);

    let _ = writeln!(out, "Filters");
    let _ = writeln!(
        out,
        "  Location: {}",
        filter.location.as_deref().unwrap_or("All locations")
    );
    let _ = writeln!(out, "    options: {}", join_or_dash(&dashboard.locations()));
    let _ = writeln!(
        out,
        "  Timezone: {}",
        filter.timezone.as_deref().unwrap_or("All timezones")
    );
    let _ = writeln!(out, "    options: {}", join_or_dash(&dashboard.timezones()));
    let _ = writeln!(
        out,
        "  Availability: {}",
        if filter.available_only.unwrap_or(false) {
            "Available only"
        } else {
            "Everyone"
        }
    );
    let _ = writeln!(
        out,
        "  Hourly Rate: ${} - ${}",
        filter.hourly_rate_min.unwrap_or(HOURLY_RATE_MIN),
        filter.hourly_rate_max.unwrap_or(HOURLY_RATE_MAX)
    );
    let _ = writeln!(
        out,
        "  Rating min: > {}",
        filter.rating_min.unwrap_or(RATING_MIN)
    );
    if let Some(max) = filter.rating_max {
        let _ = writeln!(out, "  Rating max: < {max}");
    }
    let chips: Vec<String> = dashboard
        .skills()
        .iter()
        .map(|s| {
            let mark = if filter.has_skill(&s.description) { 'x' } else { ' ' };
            format!("[{mark}] {}", s.description)
        })
        .collect();
    let _ = writeln!(out, "  Skills: {}", join_or_dash(&chips));
    let _ = writeln!(out);

    let _ = write!(out, "Freelancers List");
    if !filters.search_term().trim().is_empty() {
        let _ = write!(out, "  (search: {})", filters.search_term().trim());
    }
    let _ = writeln!(out);

    let visible = dashboard.visible_freelancers();
    let rows: Vec<[String; 7]> = visible.iter().map(|f| table_row(f)).collect();
    out.push_str(&render_table(&rows));
    if visible.is_empty() {
        let _ = writeln!(out, "{NO_RESULTS}");
    }
    out
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn table_row(freelancer: &Freelancer) -> [String; 7] {
    [
        format!("({}) {}", freelancer.initials(), freelancer.name),
        freelancer.location.clone(),
        freelancer.timezone.clone(),
        format!("${}/hr", freelancer.hourly_rate),
        format!("★ {}", freelancer.rating),
        if freelancer.available {
            "Available".to_string()
        } else {
            "Unavailable".to_string()
        },
        skills_cell(freelancer),
    ]
}

/// First two skills, then `+N` for the rest.
fn skills_cell(freelancer: &Freelancer) -> String {
    let mut parts: Vec<String> = freelancer
        .skills
        .iter()
        .take(2)
        .map(|s| s.description.clone())
        .collect();
    if freelancer.skills.len() > 2 {
        parts.push(format!("+{}", freelancer.skills.len() - 2));
    }
    parts.join(", ")
}

fn render_table(rows: &[[String; 7]]) -> String {
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = TABLE_HEADERS.map(str::to_string);
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("-+-"));
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, row: &[String; 7], widths: &[usize; 7]) {
    let cells: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", cells.join(" | ").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{Mount, Paging};
    use crate::filters::{FilterChange, FilterState};
    use client::{MockFreelancerSource, Session, SessionStore};
    use common::Skill;

    fn freelancer(id: i64, name: &str, available: bool, skills: &[&str]) -> Freelancer {
        Freelancer {
            id,
            name: name.to_string(),
            location: "Lisbon".to_string(),
            timezone: "WET".to_string(),
            hourly_rate: 60.0,
            rating: 4.5,
            available,
            skills: skills
                .iter()
                .enumerate()
                .map(|(i, d)| Skill {
                    id: id * 10 + i as i64,
                    description: d.to_string(),
                })
                .collect(),
        }
    }

    async fn dashboard_with(list: Vec<Freelancer>) -> Dashboard<MockFreelancerSource> {
        let mut source = MockFreelancerSource::new();
        source
            .expect_list_freelancers()
            .returning(move |_| Ok(list.clone()));
        let store = SessionStore::in_memory();
        store.save(&Session::new("a@b.com", "tok1")).unwrap();
        match Dashboard::mount(source, &store, FilterState::new(), Paging::default())
            .await
            .unwrap()
        {
            Mount::Ready(dashboard) => dashboard,
            Mount::Redirect(_) => panic!("expected a session"),
        }
    }

    #[test]
    fn test_login_page_banner() {
        let page = LoginPage::new();
        let text = render_login(&page);
        assert!(text.contains("Sign in to access the marketplace"));
        assert!(text.contains("[ Sign In ]"));
        assert!(!text.contains("Error!"));
    }

    #[tokio::test]
    async fn test_dashboard_stats_cards() {
        let dashboard = dashboard_with(vec![
            freelancer(1, "Ada Lovelace", true, &["Rust"]),
            freelancer(2, "Alan Turing", true, &["Go"]),
            freelancer(3, "Grace Hopper", false, &["COBOL"]),
            freelancer(4, "Linus T", true, &["C"]),
        ])
        .await;

        let text = render_dashboard(&dashboard);
        assert!(text.contains("Hello, a@b.com"));
        assert!(text.contains("Total Freelancers: 4"));
        assert!(text.contains("Available Freelancers: 3"));
        assert!(text.contains("Availability Rate: 75%"));
        assert!(text.contains("(AL) Ada Lovelace"));
        assert!(text.contains("$60/hr"));
        assert!(text.contains("★ 4.5"));
        assert!(!text.contains(NO_RESULTS));
    }

    #[tokio::test]
    async fn test_empty_dashboard() {
        let dashboard = dashboard_with(vec![]).await;

        let text = render_dashboard(&dashboard);
        assert!(text.contains("Availability Rate: 0%"));
        assert!(!text.contains("NaN"));
        assert!(text.contains(NO_RESULTS));
        assert!(text.contains("Location: All locations"));
        assert!(text.contains("Hourly Rate: $0 - $150"));
        assert!(text.contains("Rating min: > 0"));
    }

    #[tokio::test]
    async fn test_selected_skill_is_marked() {
        let mut dashboard =
            dashboard_with(vec![freelancer(1, "Ada Lovelace", true, &["Rust", "Go"])]).await;
        dashboard
            .change(FilterChange::ToggleSkill("Rust".to_string()))
            .await;

        let text = render_dashboard(&dashboard);
        assert!(text.contains("[x] Rust"));
        assert!(text.contains("[ ] Go"));
    }

    #[test]
    fn test_skills_cell_truncates() {
        let f = freelancer(1, "Ada", true, &["Rust", "Go", "Elm", "Zig"]);
        assert_eq!(skills_cell(&f), "Rust, Go, +2");
        let f = freelancer(2, "Bob", true, &["Rust"]);
        assert_eq!(skills_cell(&f), "Rust");
    }
}
