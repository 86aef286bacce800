//! In-process forum backend.
//!
//! Behaves like a JSON API: rejected requests carry a `422` (or `401`) status
//! and an `{"errors": [{"detail", "path"}]}` body naming the offending field.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use super::{ApiError, Credentials, ErrorDetail, ErrorResponse, ForumClient, Registration, Session};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 30;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
struct Account {
    id: u64,
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct Store {
    accounts: Vec<Account>,
    sessions: HashSet<String>,
}

impl Store {
    fn find(&self, identification: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| {
            account.username.eq_ignore_ascii_case(identification)
                || account.email.eq_ignore_ascii_case(identification)
        })
    }
}

/// A forum that lives in memory, with optional latency and outages.
#[derive(Debug)]
pub struct InMemoryForum {
    store: Mutex<Store>,
    latency: Duration,
    offline: AtomicBool,
    next_id: AtomicU64,
    next_token: AtomicU64,
}

impl Default for InMemoryForum {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl InMemoryForum {
    /// An empty forum answering after `latency`.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            latency,
            offline: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            next_token: AtomicU64::new(1),
        }
    }

    /// A forum with a couple of demo accounts.
    #[must_use]
    pub fn seeded(latency: Duration) -> Self {
        let forum = Self::new(latency);
        forum.add_account("admin", "admin@example.com", "correct-horse");
        forum.add_account("toby", "toby@example.com", "hunter2hunter2");
        forum
    }

    pub fn add_account(&self, username: &str, email: &str, password: &str) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut store) = self.store.lock() {
            store.accounts.push(Account {
                id,
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            });
        }
    }

    /// Make every following request fail at the transport level.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    async fn round_trip(&self) -> Result<MutexGuard<'_, Store>, ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::Relaxed) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        self.store
            .lock()
            .map_err(|_| ApiError::Transport("forum state is unavailable".to_string()))
    }

    fn open_session(&self, store: &mut Store, account: &Account) -> Session {
        let token = format!(
            "{}-{}",
            account.id,
            self.next_token.fetch_add(1, Ordering::Relaxed)
        );
        store.sessions.insert(token.clone());
        Session {
            user_id: account.id,
            username: account.username.clone(),
            token,
        }
    }
}

fn rejected(status: u16, errors: Vec<ErrorDetail>) -> ApiError {
    ApiError::Rejected {
        status,
        body: json!(ErrorResponse::new(errors)),
    }
}

fn required(path: &str, value: &str, errors: &mut Vec<ErrorDetail>) -> bool {
    if value.trim().is_empty() {
        errors.push(ErrorDetail::new(format!("The {path} field is required."), path));
        return false;
    }
    true
}

fn looks_like_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
}

#[async_trait]
impl ForumClient for InMemoryForum {
    async fn log_in(&self, credentials: Credentials) -> Result<Session, ApiError> {
        let mut errors = Vec::new();
        required("identification", &credentials.identification, &mut errors);
        required("password", &credentials.password, &mut errors);

        let mut store = self.round_trip().await?;
        if !errors.is_empty() {
            return Err(rejected(422, errors));
        }

        let account = store
            .find(credentials.identification.trim())
            .filter(|account| account.password == credentials.password)
            .cloned();
        let Some(account) = account else {
            debug!(identification = %credentials.identification, "Rejected login");
            return Err(rejected(
                401,
                vec![ErrorDetail::new("Your login details were incorrect.", "password")],
            ));
        };

        info!(user = %account.username, "Logged in");
        Ok(self.open_session(&mut store, &account))
    }

    async fn sign_up(&self, registration: Registration) -> Result<Session, ApiError> {
        let username = registration.username.trim();
        let email = registration.email.trim();

        let mut store = self.round_trip().await?;

        let mut errors = Vec::new();
        if required("username", username, &mut errors) {
            let len = username.chars().count();
            if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
                errors.push(ErrorDetail::new(
                    format!("The username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters."),
                    "username",
                ));
            } else if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                errors.push(ErrorDetail::new(
                    "The username may only contain letters, numbers, dashes and underscores.",
                    "username",
                ));
            } else if store.accounts.iter().any(|a| a.username.eq_ignore_ascii_case(username)) {
                errors.push(ErrorDetail::new("The username has already been taken.", "username"));
            }
        }
        if required("email", email, &mut errors) {
            if !looks_like_email(email) {
                errors.push(ErrorDetail::new("The email must be a valid email address.", "email"));
            } else if store.accounts.iter().any(|a| a.email.eq_ignore_ascii_case(email)) {
                errors.push(ErrorDetail::new("The email has already been taken.", "email"));
            }
        }
        if required("password", &registration.password, &mut errors)
            && registration.password.chars().count() < MIN_PASSWORD_LEN
        {
            errors.push(ErrorDetail::new(
                format!("The password must be at least {MIN_PASSWORD_LEN} characters."),
                "password",
            ));
        }

        if !errors.is_empty() {
            debug!(count = errors.len(), "Rejected registration");
            return Err(rejected(422, errors));
        }

        let account = Account {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username: username.to_string(),
            email: email.to_string(),
            password: registration.password,
        };
        store.accounts.push(account.clone());
        info!(user = %account.username, "Registered account");
        Ok(self.open_session(&mut store, &account))
    }

    async fn log_out(&self, session: &Session) -> Result<(), ApiError> {
        let mut store = self.round_trip().await?;
        if !store.sessions.remove(&session.token) {
            return Err(rejected(
                401,
                vec![ErrorDetail::new("Your session has expired.", "")],
            ));
        }
        info!(user = %session.username, "Logged out");
        Ok(())
    }
}
