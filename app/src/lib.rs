//! FreelanceHub
//!
//! Login page and freelancer dashboard for the marketplace API, driven from
//! the terminal.

pub mod browse;
pub mod dashboard;
pub mod filters;
pub mod login;
pub mod render;
pub mod sequence;
pub mod stats;

/// Where a controller wants the user to go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

