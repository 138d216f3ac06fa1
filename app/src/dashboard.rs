//! Dashboard controller: gates on the session, re-fetches on every filter
//! change and keeps only the newest response.

use std::sync::Arc;

use client::{FetchError, FreelancerQuery, FreelancerSource, Session, SessionError, SessionStore};
use common::{Freelancer, Skill};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::Route;
use crate::filters::{self, FilterChange, FilterState};
use crate::sequence::{RequestSequence, Ticket};
use crate::stats::DashboardStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u32,
    pub limit: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: client::freelancers::DEFAULT_PAGE,
            limit: client::freelancers::DEFAULT_LIMIT,
        }
    }
}

pub enum Mount<S> {
    Ready(Dashboard<S>),
    Redirect(Route),
}

/// A fetch that has been issued but not yet settled.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub ticket: Ticket,
    pub query: FreelancerQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced; carries the new length.
    Applied(usize),
    /// A newer fetch was issued before this one settled.
    Stale,
    /// The fetch failed and the previous list is still shown.
    Failed,
}

/// What a spawned fetch hands back: its ticket and the remote answer.
pub type FetchResult = (Ticket, Result<Vec<Freelancer>, FetchError>);

pub struct Dashboard<S> {
    source: Arc<S>,
    session: Session,
    filters: FilterState,
    paging: Paging,
    freelancers: Vec<Freelancer>,
    sequence: RequestSequence,
}

impl<S: FreelancerSource> Dashboard<S> {
    /// Redirects to the login page when nobody is signed in, otherwise loads
    /// the first page with `filters`.
    pub async fn mount(
        source: S,
        store: &SessionStore,
        filters: FilterState,
        paging: Paging,
    ) -> Result<Mount<S>, SessionError> {
        let Some(session) = store.load()? else {
            info!("no session, redirecting to login");
            return Ok(Mount::Redirect(Route::Login));
        };

        let mut dashboard = Self {
            source: Arc::new(source),
            session,
            filters,
            paging,
            freelancers: Vec::new(),
            sequence: RequestSequence::new(),
        };
        dashboard.refresh().await;
        Ok(Mount::Ready(dashboard))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Everything the last applied fetch returned.
    pub fn freelancers(&self) -> &[Freelancer] {
        &self.freelancers
    }

    /// The loaded freelancers narrowed by the search term.
    pub fn visible_freelancers(&self) -> Vec<&Freelancer> {
        self.freelancers
            .iter()
            .filter(|f| self.filters.matches_search(f))
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_freelancers(&self.freelancers)
    }

    pub fn locations(&self) -> Vec<String> {
        filters::unique_locations(&self.freelancers)
    }

    pub fn timezones(&self) -> Vec<String> {
        filters::unique_timezones(&self.freelancers)
    }

    pub fn skills(&self) -> Vec<Skill> {
        filters::all_skills(&self.freelancers)
    }

    /// Applies one filter edit and issues exactly one fetch for the result.
    pub async fn change(&mut self, change: FilterChange) -> FetchOutcome {
        let pending = self.begin_change(change);
        let result = self.source.list_freelancers(pending.query).await;
        self.finish_fetch(pending.ticket, result)
    }

    /// Applies one filter edit and issues the ticket for its fetch without
    /// waiting on it.
    pub fn begin_change(&mut self, change: FilterChange) -> PendingFetch {
        self.filters.apply(change);
        self.begin_fetch()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.filters.set_search_term(term);
    }

    pub async fn refresh(&mut self) -> FetchOutcome {
        let pending = self.begin_fetch();
        let result = self.source.list_freelancers(pending.query).await;
        self.finish_fetch(pending.ticket, result)
    }

    /// Issues a ticket for the current filter. Callers that run fetches
    /// concurrently settle each one with [`Dashboard::finish_fetch`].
    pub fn begin_fetch(&mut self) -> PendingFetch {
        let ticket = self.sequence.issue();
        let query = FreelancerQuery::new(self.filters.filter().clone())
            .with_page(self.paging.page, self.paging.limit)
            .with_session(Some(&self.session));
        info!(ticket = ticket.value(), filter = ?query.filter, "fetching freelancers with filters");
        PendingFetch { ticket, query }
    }

    pub fn finish_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Freelancer>, FetchError>,
    ) -> FetchOutcome {
        // only the newest ticket may touch the list, whatever it carries
        if !self.sequence.is_latest(ticket) {
            debug!(ticket = ticket.value(), "discarding stale response");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(freelancers) => {
                info!(ticket = ticket.value(), count = freelancers.len(), "fetched freelancers");
                self.freelancers = freelancers;
                FetchOutcome::Applied(self.freelancers.len())
            }
            Err(e) => {
                // keep showing what was loaded before
                error!(ticket = ticket.value(), status = ?e.status(), error = %e, "error fetching freelancers");
                FetchOutcome::Failed
            }
        }
    }

    pub fn logout(self, store: &SessionStore) -> Result<Route, SessionError> {
        store.clear()?;
        Ok(Route::Login)
    }
}

impl<S: FreelancerSource + 'static> Dashboard<S> {
    /// Runs `pending` on `tasks`. The caller keeps handling input and settles
    /// the result with [`Dashboard::finish_fetch`] once it joins.
    pub fn spawn_fetch(&self, pending: PendingFetch, tasks: &mut JoinSet<FetchResult>) {
        let source = Arc::clone(&self.source);
        let PendingFetch { ticket, query } = pending;
        tasks.spawn(async move {
            let result = source.list_freelancers(query).await;
            (ticket, result)
        });
    }
}
