//! Per-login race guard for user creation.
//!
//! Creating a user claims its login for a short window before the row is
//! written. A second create for the same login inside that window cancels the
//! pending claim and is itself rejected, so neither request wins. The claim is
//! released when the ticket is dropped, whatever the outcome of the create.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use thiserror::Error;
use tokio::{sync::Notify, time::sleep};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error(
        "Failed to create user with login {login} because someone tried to do it too in the last {window_ms} ms!"
    )]
    Contended { login: String, window_ms: u128 },
    #[error(
        "Failed to create user with login {login} because someone tried to do it too in the next {window_ms} ms!"
    )]
    Cancelled { login: String, window_ms: u128 },
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    cancel: Arc<Notify>,
}

#[derive(Debug)]
struct Inner {
    window: Duration,
    pending: Mutex<HashMap<String, Pending>>,
    next_generation: AtomicU64,
}

impl Inner {
    fn pending(&self) -> MutexGuard<'_, HashMap<String, Pending>> {
        // Every critical section is a single map operation, so a poisoned lock is still consistent.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of logins with a create in flight. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SignupGuard {
    inner: Arc<Inner>,
}

impl SignupGuard {
    /// A zero `window` disables the guard: claims always succeed and
    /// [`SignupTicket::wait`] returns immediately.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                window,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Claim `login` for the length of the window.
    ///
    /// # Errors
    /// Returns [`GuardError::Contended`] if another create holds the login;
    /// that create is cancelled as well.
    pub fn claim(&self, login: &str) -> Result<SignupTicket, GuardError> {
        if self.inner.window.is_zero() {
            return Ok(SignupTicket::unguarded(login));
        }

        let mut pending = self.inner.pending();
        if let Some(existing) = pending.remove(login) {
            existing.cancel.notify_one();
            warn!(login, "concurrent signup for the same login, cancelling both");
            return Err(GuardError::Contended {
                login: login.to_string(),
                window_ms: self.inner.window.as_millis(),
            });
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = Arc::new(Notify::new());
        pending.insert(
            login.to_string(),
            Pending {
                generation,
                cancel: Arc::clone(&cancel),
            },
        );
        debug!(login, generation, "signup claim registered");

        Ok(SignupTicket {
            guard: Some(Arc::clone(&self.inner)),
            login: login.to_string(),
            generation,
            cancel,
        })
    }

    /// Whether a create for `login` is currently in flight.
    #[must_use]
    pub fn is_pending(&self, login: &str) -> bool {
        self.inner.pending().contains_key(login)
    }
}

/// Claim on a login. Dropping it releases the claim if it is still current.
#[derive(Debug)]
pub struct SignupTicket {
    guard: Option<Arc<Inner>>,
    login: String,
    generation: u64,
    cancel: Arc<Notify>,
}

impl SignupTicket {
    fn unguarded(login: &str) -> Self {
        Self {
            guard: None,
            login: login.to_string(),
            generation: 0,
            cancel: Arc::new(Notify::new()),
        }
    }

    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Hold the claim for the whole window.
    ///
    /// # Errors
    /// Returns [`GuardError::Cancelled`] if a competing create arrived first.
    pub async fn wait(&self) -> Result<(), GuardError> {
        let Some(inner) = &self.guard else {
            return Ok(());
        };

        tokio::select! {
            biased;
            () = self.cancel.notified() => Err(GuardError::Cancelled {
                login: self.login.clone(),
                window_ms: inner.window.as_millis(),
            }),
            () = sleep(inner.window) => Ok(()),
        }
    }
}

impl Drop for SignupTicket {
    fn drop(&mut self) {
        let Some(inner) = &self.guard else {
            return;
        };

        let mut pending = inner.pending();
        if pending
            .get(&self.login)
            .is_some_and(|entry| entry.generation == self.generation)
        {
            pending.remove(&self.login);
        }
    }
}
