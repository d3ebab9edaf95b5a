// src/application/credentials.rs
//! Process-wide cache for the platform access token.
//!
//! The cache moves between three states: `Absent`, `Valid` and `Refreshing`.
//! A refresh is a single shared future; every caller that arrives while it is
//! in flight awaits the same request and receives the same outcome.

use crate::application::ports::platform::{
    AccessToken, CredentialIssuer, IssuedCredential, PlatformError,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct Credential {
    token: AccessToken,
    obtained_at: Instant,
    expires_at: Instant,
}

impl Credential {
    fn from_issued(issued: IssuedCredential, obtained_at: Instant) -> Self {
        Self {
            token: issued.token,
            obtained_at,
            expires_at: obtained_at + issued.expires_in,
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn obtained_at(&self) -> Instant {
        self.obtained_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    fn is_usable(&self, now: Instant, margin: Duration) -> bool {
        self.remaining(now) > margin
    }
}

#[derive(Debug, Clone, Error)]
#[error("credential unavailable: {cause}")]
pub struct CredentialUnavailable {
    pub cause: PlatformError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Absent,
    Valid { remaining: Duration },
    Refreshing,
}

impl CredentialStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Valid { .. } => "valid",
            Self::Refreshing => "refreshing",
        }
    }
}

type Flight = Shared<BoxFuture<'static, Result<Credential, CredentialUnavailable>>>;

enum CacheState {
    Absent,
    Valid(Credential),
    Refreshing { generation: u64, flight: Flight },
}

struct Inner {
    state: CacheState,
    generation: u64,
}

pub struct CredentialCache {
    issuer: Arc<dyn CredentialIssuer>,
    margin: Duration,
    inner: Mutex<Inner>,
}

impl CredentialCache {
    pub fn new(issuer: Arc<dyn CredentialIssuer>, margin: Duration) -> Self {
        Self {
            issuer,
            margin,
            inner: Mutex::new(Inner {
                state: CacheState::Absent,
                generation: 0,
            }),
        }
    }

    /// Returns a credential that is not inside the refresh margin, fetching a
    /// new one when needed. Concurrent callers share one issuer request.
    pub async fn acquire(&self) -> Result<Credential, CredentialUnavailable> {
        let (generation, flight) = {
            let mut inner = self.lock();
            if let CacheState::Valid(credential) = &inner.state {
                if credential.is_usable(Instant::now(), self.margin) {
                    return Ok(credential.clone());
                }
                debug!("cached credential is inside the refresh margin");
            }

            if let CacheState::Refreshing { generation, flight } = &inner.state {
                (*generation, flight.clone())
            } else {
                inner.generation += 1;
                let generation = inner.generation;
                let flight = self.start_refresh();
                inner.state = CacheState::Refreshing {
                    generation,
                    flight: flight.clone(),
                };
                (generation, flight)
            }
        };

        let outcome = flight.await;
        self.settle(generation, &outcome);
        outcome
    }

    /// Drops the cached credential if it is the one the platform just
    /// rejected, so the next [`acquire`](Self::acquire) fetches a fresh token.
    pub fn invalidate(&self, rejected: &AccessToken) -> bool {
        let mut inner = self.lock();
        let is_current =
            matches!(&inner.state, CacheState::Valid(current) if current.token() == rejected);
        if is_current {
            warn!("platform rejected the cached credential; dropping it");
            inner.state = CacheState::Absent;
        }
        is_current
    }

    pub fn status(&self) -> CredentialStatus {
        let inner = self.lock();
        match &inner.state {
            CacheState::Absent => CredentialStatus::Absent,
            CacheState::Valid(credential) => CredentialStatus::Valid {
                remaining: credential.remaining(Instant::now()),
            },
            CacheState::Refreshing { .. } => CredentialStatus::Refreshing,
        }
    }

    fn start_refresh(&self) -> Flight {
        let issuer = Arc::clone(&self.issuer);
        async move {
            debug!("requesting a new platform credential");
            let issued = issuer
                .issue()
                .await
                .map_err(|cause| CredentialUnavailable { cause })?;
            if issued.expires_in.is_zero() {
                return Err(CredentialUnavailable {
                    cause: PlatformError::InvalidResponse(
                        "issuer returned a credential without lifetime".into(),
                    ),
                });
            }
            Ok(Credential::from_issued(issued, Instant::now()))
        }
        .boxed()
        .shared()
    }

    fn settle(&self, generation: u64, outcome: &Result<Credential, CredentialUnavailable>) {
        let mut inner = self.lock();
        let still_current = matches!(
            &inner.state,
            CacheState::Refreshing { generation: current, .. } if *current == generation
        );
        if !still_current {
            return;
        }

        inner.state = match outcome {
            Ok(credential) => {
                info!(
                    expires_in_secs = credential.remaining(Instant::now()).as_secs(),
                    "platform credential refreshed"
                );
                CacheState::Valid(credential.clone())
            }
            Err(err) => {
                warn!(error = %err, "platform credential refresh failed");
                CacheState::Absent
            }
        };
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
