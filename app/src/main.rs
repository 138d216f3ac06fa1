//! FreelanceHub terminal front end
//!
//! Signs in against the marketplace API and prints the freelancer
//! dashboard, either once with filters from the command line or
//! interactively from stdin.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use app::Route;
use app::browse::{self, BrowseCommand};
use app::dashboard::{Dashboard, FetchOutcome, FetchResult, Mount, Paging};
use app::filters::{FilterChange, FilterState};
use app::login::{LoginOutcome, LoginPage};
use app::render::{render_dashboard, render_login};
use clap::{Args, Parser, Subcommand};
use client::{ApiConfig, AuthClient, FreelancerClient, SessionStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "freelancehub")]
#[command(about = "Browse the FreelanceHub marketplace from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the marketplace API
    #[arg(long, env = "API_URL", global = true)]
    api_url: Option<String>,

    /// Where the session is kept between runs
    #[arg(long, env = "FREELANCEHUB_SESSION", global = true)]
    session_file: Option<PathBuf>,

    /// Give up on a request after this many seconds
    #[arg(long, env = "FREELANCEHUB_TIMEOUT", value_name = "SECS", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Print the dashboard once
    Dashboard(DashboardArgs),
    /// Drive the dashboard with line commands
    Browse,
}

#[derive(Args)]
struct DashboardArgs {
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    timezone: Option<String>,
    #[arg(long)]
    rate_min: Option<u32>,
    #[arg(long)]
    rate_max: Option<u32>,
    #[arg(long)]
    rating_min: Option<f64>,
    #[arg(long)]
    rating_max: Option<f64>,
    #[arg(long)]
    available_only: bool,
    /// Repeat to select several skills
    #[arg(long = "skill")]
    skills: Vec<String>,
    /// Narrow the list by name or skill
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

impl DashboardArgs {
    fn filter_state(&self) -> FilterState {
        let mut state = FilterState::new();
        let mut changes = vec![
            FilterChange::Location(self.location.clone()),
            FilterChange::Timezone(self.timezone.clone()),
            FilterChange::AvailableOnly(self.available_only),
            FilterChange::RatingMax(self.rating_max),
        ];
        if let Some(min) = self.rate_min {
            changes.push(FilterChange::HourlyRateMin(min));
        }
        if let Some(max) = self.rate_max {
            changes.push(FilterChange::HourlyRateMax(max));
        }
        if let Some(min) = self.rating_min {
            changes.push(FilterChange::RatingMin(min));
        }
        changes.extend(self.skills.iter().cloned().map(FilterChange::ToggleSkill));

        for change in changes {
            state.apply(change);
        }
        if let Some(term) = &self.search {
            state.set_search_term(term.clone());
        }
        state
    }

    fn paging(&self) -> Paging {
        Paging {
            page: self.page,
            limit: self.limit,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn default_session_file() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("freelancehub").join("session.json"))
        .unwrap_or_else(|| PathBuf::from(".freelancehub-session.json"))
}

fn api_config(api_url: Option<&str>, timeout: Option<u64>) -> Result<ApiConfig> {
    let config = match api_url {
        Some(url) => ApiConfig::new(url)?,
        None => ApiConfig::from_env().context("set --api-url or API_URL")?,
    };
    Ok(match timeout {
        Some(secs) => config.with_timeout(Duration::from_secs(secs)),
        None => config,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let Cli {
        api_url,
        session_file,
        timeout,
        command,
    } = Cli::parse();

    let session_file = session_file.unwrap_or_else(default_session_file);
    let store = SessionStore::file(&session_file);

    match command {
        Commands::Login { email, password } => {
            let auth = AuthClient::new(api_config(api_url.as_deref(), timeout)?);
            login(&auth, &store, email, password).await
        }
        Commands::Logout => {
            store.clear()?;
            println!("👋 Signed out");
            Ok(())
        }
        Commands::Dashboard(args) => {
            let source = FreelancerClient::new(api_config(api_url.as_deref(), timeout)?);
            match Dashboard::mount(source, &store, args.filter_state(), args.paging()).await? {
                Mount::Ready(dashboard) => print!("{}", render_dashboard(&dashboard)),
                Mount::Redirect(route) => print_redirect(route),
            }
            Ok(())
        }
        Commands::Browse => {
            let source = FreelancerClient::new(api_config(api_url.as_deref(), timeout)?);
            match Dashboard::mount(source, &store, FilterState::new(), Paging::default()).await? {
                Mount::Ready(dashboard) => browse(dashboard, &store).await,
                Mount::Redirect(route) => {
                    print_redirect(route);
                    Ok(())
                }
            }
        }
    }
}

async fn login(
    auth: &AuthClient,
    store: &SessionStore,
    email: String,
    password: String,
) -> Result<()> {
    let mut page = LoginPage::new();
    page.set_email(email);
    page.set_password(password);

    match page.submit(auth, store).await? {
        LoginOutcome::Navigate(Route::Dashboard) => {
            println!("✅ Signed in as {}", page.email());
            println!("   Next: freelancehub dashboard");
        }
        LoginOutcome::Navigate(route) => print_redirect(route),
        LoginOutcome::Rejected => print!("{}", render_login(&page)),
    }
    Ok(())
}

fn print_redirect(route: Route) {
    match route {
        Route::Login => println!("🔒 Not signed in. Run `freelancehub login` first."),
        Route::Dashboard => println!("➡️  Run `freelancehub dashboard` to continue."),
    }
}

/// Reads commands while fetches run on a [`JoinSet`]. Each response is
/// settled as it arrives; responses overtaken by a newer fetch are dropped.
async fn browse(mut dashboard: Dashboard<FreelancerClient>, store: &SessionStore) -> Result<()> {
    print!("{}", render_dashboard(&dashboard));
    println!("\nType `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: JoinSet<FetchResult> = JoinSet::new();
    let mut stdin_open = true;

    while stdin_open || !in_flight.is_empty() {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    // drain what is still loading, then stop
                    stdin_open = false;
                    continue;
                };
                let command = match browse::parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("❌ {e}");
                        continue;
                    }
                };

                match command {
                    BrowseCommand::Change(change) => {
                        let pending = dashboard.begin_change(change);
                        dashboard.spawn_fetch(pending, &mut in_flight);
                        println!("⏳ Loading...");
                    }
                    BrowseCommand::Refresh => {
                        let pending = dashboard.begin_fetch();
                        dashboard.spawn_fetch(pending, &mut in_flight);
                        println!("⏳ Loading...");
                    }
                    BrowseCommand::Search(term) => {
                        dashboard.set_search_term(term);
                        println!();
                        print!("{}", render_dashboard(&dashboard));
                    }
                    BrowseCommand::Help => println!("{}", browse::HELP),
                    BrowseCommand::Logout => {
                        in_flight.abort_all();
                        let route = dashboard.logout(store)?;
                        println!("👋 Signed out");
                        print_redirect(route);
                        return Ok(());
                    }
                    BrowseCommand::Quit => return Ok(()),
                }
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                let (ticket, result) = joined?;
                match dashboard.finish_fetch(ticket, result) {
                    FetchOutcome::Stale => {}
                    FetchOutcome::Failed => {
                        eprintln!("❌ Could not load freelancers, showing the previous list");
                    }
                    FetchOutcome::Applied(_) => {
                        println!();
                        print!("{}", render_dashboard(&dashboard));
                    }
                }
            }
        }
    }
    Ok(())
}
