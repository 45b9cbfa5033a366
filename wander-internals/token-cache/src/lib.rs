//! Wander Token Cache
//! Copyright (c) 2026 Mamy Ratsimbazafy
//! Licensed and distributed under either of
//!   * MIT license (license terms at the root of the package or at http://opensource.org/licenses/MIT).
//!   * Apache v2 license (license terms at the root of the package or at http://www.apache.org/licenses/LICENSE-2.0).
//! at your option. This file may not be copied, modified, or distributed except according to those terms.

//! wander-internals/token-cache
//! A single-slot cache for expiring OAuth access tokens, with an injectable clock

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Tokens are considered expired this long before the issuer says they are
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Source of the current instant
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the cache.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<std::sync::Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(std::sync::Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A freshly issued token, as reported by the authorization server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: Duration,
}

#[derive(Clone, Debug)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Holds at most one access token and refreshes it on demand
///
/// The slot is locked for the whole read-check-refresh sequence, so callers
/// racing on an expired token wait for a single refresh instead of issuing
/// one each.
///
/// # Examples
///
/// ```ignore
/// let cache = TokenCache::new();
/// let token = cache
///     .get_or_refresh(|| async { fetch_token().await })
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct TokenCache {
    slot: Arc<Mutex<Option<CachedToken>>>,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            clock: Arc::new(SystemClock),
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl TokenCache {
    /// Create an empty cache on the system clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache reading time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            ..Default::default()
        }
    }

    pub fn safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    /// Return the cached token if it is still valid, otherwise run `refresh`
    /// and cache what it returns
    ///
    /// The stored expiry is `fetched_at + expires_in - safety_margin`. A
    /// failed refresh leaves the slot untouched and is handed back as is.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken, E>>,
    {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if self.clock.now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        let issued = refresh().await?;
        let lifetime = issued.expires_in.saturating_sub(self.safety_margin);
        *slot = Some(CachedToken {
            access_token: issued.access_token.clone(),
            expires_at: self.clock.now() + lifetime,
        });

        Ok(issued.access_token)
    }

    /// Time left before the cached token must be refreshed, if one is cached
    pub async fn remaining(&self) -> Option<Duration> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .map(|cached| cached.expires_at.saturating_duration_since(self.clock.now()))
    }

    /// Drop the cached token so the next call refreshes
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}
