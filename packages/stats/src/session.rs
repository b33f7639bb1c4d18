//! Explicit back-office session.
//!
//! A [`Session`] is created once by the host (server or CLI) with
//! [`Session::init`], shared by reference with whichever client needs to
//! authenticate, and ended with [`Session::teardown`]. After teardown,
//! requests go out unauthenticated.

use std::sync::{Arc, PoisonError, RwLock};

/// Credentials for the statistics service.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
}

impl Session {
    /// Starts a session with an optional bearer token.
    #[must_use]
    pub fn init(token: Option<String>) -> Arc<Self> {
        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_some() {
            log::debug!("Statistics session started with bearer token");
        } else {
            log::debug!("Statistics session started without credentials");
        }
        Arc::new(Self {
            token: RwLock::new(token),
        })
    }

    /// Ends the session, discarding its credentials.
    pub fn teardown(&self) {
        let mut token = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if token.take().is_some() {
            log::debug!("Statistics session torn down");
        }
    }

    /// Whether the session currently holds credentials.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Adds the session's credentials to a request.
    #[must_use]
    pub fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
