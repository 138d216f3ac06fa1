use std::sync::LazyLock;

use client::{AuthError, Authenticator, Credentials, Session, SessionError, SessionStore};
use regex::Regex;
use thiserror::Error;
use tracing::{error, info};

use crate::Route;

/// Shown for every failed sign-in, whatever the remote side said.
pub const INVALID_CREDENTIALS: &str = "User Credentials are invalid!";

/// `local@domain`, no whitespace: the same shape an email input accepts.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("A sign-in request is already in progress")]
    Busy,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigate(Route),
    Rejected,
}

/// The sign-in form. `Idle -> Submitting -> {Succeeded, Failed}`; a failed
/// form can be submitted again.
#[derive(Debug)]
pub struct LoginPage {
    email: String,
    password: String,
    state: LoginState,
    rejected: bool,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            state: LoginState::Idle,
            rejected: false,
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.state, LoginState::Idle | LoginState::Failed)
    }

    /// Stays up once a sign-in has been rejected, until one succeeds.
    pub fn banner(&self) -> Option<&'static str> {
        self.rejected.then_some(INVALID_CREDENTIALS)
    }

    pub fn button_label(&self) -> &'static str {
        if self.state == LoginState::Submitting {
            "Signing in..."
        } else {
            "Sign In"
        }
    }

    pub fn validate(&self) -> Result<Credentials, FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(FormError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        Ok(Credentials::new(email, self.password.clone()))
    }

    /// Moves to `Submitting` and hands back the credentials to send.
    pub fn begin_submit(&mut self) -> Result<Credentials, FormError> {
        if !self.can_submit() {
            return Err(FormError::Busy);
        }
        let credentials = self.validate()?;
        self.state = LoginState::Submitting;
        Ok(credentials)
    }

    /// Settles a submission. On success the session is persisted before the
    /// page asks to navigate.
    pub fn finish_submit(
        &mut self,
        credentials: &Credentials,
        result: Result<String, AuthError>,
        store: &SessionStore,
    ) -> Result<LoginOutcome, SessionError> {
        match result {
            Ok(access_token) => {
                let session = Session::new(credentials.email.clone(), access_token);
                if let Err(e) = store.save(&session) {
                    self.state = LoginState::Idle;
                    return Err(e);
                }
                self.state = LoginState::Succeeded;
                self.rejected = false;
                info!(email = %credentials.email, "signed in");
                Ok(LoginOutcome::Navigate(Route::Dashboard))
            }
            Err(e) => {
                error!(error = %e, "sign-in rejected");
                self.state = LoginState::Failed;
                self.rejected = true;
                Ok(LoginOutcome::Rejected)
            }
        }
    }

    pub async fn submit<A>(
        &mut self,
        auth: &A,
        store: &SessionStore,
    ) -> Result<LoginOutcome, LoginError>
    where
        A: Authenticator + ?Sized,
    {
        let credentials = self.begin_submit()?;
        let result = auth.login(credentials.clone()).await;
        Ok(self.finish_submit(&credentials, result, store)?)
    }
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::MockAuthenticator;
    use client::session::{ACCESS_TOKEN_KEY, IS_AUTHENTICATED_KEY, USER_EMAIL_KEY};

    fn filled_page(email: &str, password: &str) -> LoginPage {
        let mut page = LoginPage::new();
        page.set_email(email);
        page.set_password(password);
        page
    }

    #[tokio::test]
    async fn test_successful_login_persists_session() {
        let mut auth = MockAuthenticator::new();
        auth.expect_login()
            .withf(|c| c.email == "a@b.com" && c.password == "x")
            .times(1)
            .returning(|_| Ok("tok1".to_string()));
        let store = SessionStore::in_memory();
        let mut page = filled_page("a@b.com", "x");

        let outcome = page.submit(&auth, &store).await.unwrap();

        assert_eq!(outcome, LoginOutcome::Navigate(Route::Dashboard));
        assert_eq!(page.state(), LoginState::Succeeded);
        assert_eq!(store.raw(IS_AUTHENTICATED_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(store.raw(USER_EMAIL_KEY).unwrap().as_deref(), Some("a@b.com"));
        assert_eq!(store.raw(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn test_rejected_login_shows_fixed_banner() {
        let mut auth = MockAuthenticator::new();
        auth.expect_login().times(1).returning(|_| {
            Err(AuthError::Rejected {
                status: 401,
                message: "bad creds".to_string(),
            })
        });
        let store = SessionStore::in_memory();
        let mut page = filled_page("a@b.com", "x");

        let outcome = page.submit(&auth, &store).await.unwrap();

        assert_eq!(outcome, LoginOutcome::Rejected);
        assert_eq!(page.banner(), Some("User Credentials are invalid!"));
        assert_eq!(page.state(), LoginState::Failed);
        assert!(page.can_submit());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.raw(USER_EMAIL_KEY).unwrap(), None);
        assert_eq!(store.raw(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_resubmit_after_failure() {
        let mut auth = MockAuthenticator::new();
        auth.expect_login()
            .withf(|c| c.password == "wrong")
            .times(1)
            .returning(|_| {
                Err(AuthError::Rejected {
                    status: 401,
                    message: "bad creds".to_string(),
                })
            });
        auth.expect_login()
            .withf(|c| c.password == "right")
            .times(1)
            .returning(|_| Ok("tok2".to_string()));
        let store = SessionStore::in_memory();
        let mut page = filled_page("a@b.com", "wrong");

        assert_eq!(page.submit(&auth, &store).await.unwrap(), LoginOutcome::Rejected);

        page.set_password("right");
        let outcome = page.submit(&auth, &store).await.unwrap();
        assert_eq!(outcome, LoginOutcome::Navigate(Route::Dashboard));
        assert_eq!(page.banner(), None);
        assert_eq!(store.load().unwrap(), Some(Session::new("a@b.com", "tok2")));
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_remote() {
        let mut auth = MockAuthenticator::new();
        auth.expect_login().times(0);
        let store = SessionStore::in_memory();

        let mut page = filled_page("", "x");
        assert!(matches!(
            page.submit(&auth, &store).await,
            Err(LoginError::Form(FormError::MissingEmail))
        ));

        let mut page = filled_page("not-an-email", "x");
        assert!(matches!(
            page.submit(&auth, &store).await,
            Err(LoginError::Form(FormError::InvalidEmail))
        ));

        let mut page = filled_page("a@b.com", "");
        assert!(matches!(
            page.submit(&auth, &store).await,
            Err(LoginError::Form(FormError::MissingPassword))
        ));
        assert_eq!(page.state(), LoginState::Idle);
    }

    /// Accepts the first write, then reports every later one as failed.
    struct FlakyStore {
        inner: client::MemoryStore,
        writes: std::sync::atomic::AtomicUsize,
    }

    impl client::KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
            if self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst) > 0 {
                return Err(SessionError::Io(std::io::Error::other("disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), SessionError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_storage_failure_after_login_leaves_no_session() {
        let store = SessionStore::new(FlakyStore {
            inner: client::MemoryStore::new(),
            writes: std::sync::atomic::AtomicUsize::new(0),
        });
        let mut page = filled_page("a@b.com", "x");
        let credentials = page.begin_submit().unwrap();

        let result = page.finish_submit(&credentials, Ok("tok1".to_string()), &store);

        assert!(matches!(result, Err(SessionError::Io(_))));
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.raw(USER_EMAIL_KEY).unwrap(), None);
        assert_eq!(page.state(), LoginState::Idle);
        assert_eq!(page.banner(), None);
    }

    #[test]
    fn test_submitting_disables_submit() {
        let mut page = filled_page("a@b.com", "x");
        assert_eq!(page.button_label(), "Sign In");

        page.begin_submit().unwrap();

        assert_eq!(page.state(), LoginState::Submitting);
        assert!(!page.can_submit());
        assert_eq!(page.button_label(), "Signing in...");
        assert_eq!(page.begin_submit(), Err(FormError::Busy));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@example.co.uk"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a b@c.com"));
    }
}
