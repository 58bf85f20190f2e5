//! Service lifecycle: startup indexing gates query handling.

use crate::indexer::Indexer;
use crate::types::IndexOutcome;
use fastrag_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

const UNINITIALIZED: u8 = 0;
const INDEXING: u8 = 1;
const READY: u8 = 2;

/// Lifecycle state of the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Uninitialized,
    Indexing,
    Ready,
}

impl LifecycleState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            INDEXING => Self::Indexing,
            READY => Self::Ready,
            _ => Self::Uninitialized,
        }
    }
}

/// `Uninitialized -> Indexing -> Ready`.
///
/// Queries are accepted only once `Ready`. A failed or abandoned startup
/// returns to `Uninitialized` so it can be retried.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: AtomicU8,
}

/// Resets `Indexing` back to `Uninitialized` unless disarmed.
struct StartGuard<'a> {
    state: &'a AtomicU8,
    armed: bool,
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.store(UNINITIALIZED, Ordering::Release);
        }
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LifecycleState::Ready
    }

    /// Fail unless startup indexing has completed.
    pub fn ensure_ready(&self) -> AppResult<()> {
        match self.state() {
            LifecycleState::Ready => Ok(()),
            LifecycleState::Indexing => Err(AppError::Internal(
                "Service is still indexing the corpus".to_string(),
            )),
            LifecycleState::Uninitialized => Err(AppError::Internal(
                "Service has not been started".to_string(),
            )),
        }
    }

    /// Run startup indexing and move to `Ready`.
    ///
    /// Returns `None` when the service is already ready. A start attempted
    /// while another is indexing is rejected.
    pub async fn start<S: AsRef<str>>(
        &self,
        indexer: &Indexer,
        pages: &[S],
    ) -> AppResult<Option<IndexOutcome>> {
        match self
            .state
            .compare_exchange(UNINITIALIZED, INDEXING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(READY) => return Ok(None),
            Err(_) => {
                return Err(AppError::Internal(
                    "Startup indexing is already in progress".to_string(),
                ))
            }
        }

        let mut guard = StartGuard {
            state: &self.state,
            armed: true,
        };

        match indexer.index_if_empty(pages).await {
            Ok(outcome) => {
                guard.armed = false;
                self.state.store(READY, Ordering::Release);
                tracing::info!("Service ready");
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::error!("Startup indexing failed: {}", e);
                Err(e)
            }
        }
    }
}
