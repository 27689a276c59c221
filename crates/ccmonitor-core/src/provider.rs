//! Usage record source trait
//!
//! This module defines the `UsageSource` trait that provider crates implement.
//! The monitor re-reads the whole history through it on every cycle.

use crate::error::Result;
use crate::types::UsageEvent;
use async_trait::async_trait;

/// Trait for sources of usage history.
///
/// A failed load is reported as
/// [`CcmonitorError::DataUnavailable`](crate::error::CcmonitorError::DataUnavailable)
/// (or `NoClaudeDirectory` when nothing could be discovered). The core never
/// retries; the polling loop simply tries again on its next tick.
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Load every known usage event, sorted by timestamp.
    async fn load_events(&self) -> Result<Vec<UsageEvent>>;
}

#[async_trait]
impl<T: UsageSource + ?Sized> UsageSource for Box<T> {
    async fn load_events(&self) -> Result<Vec<UsageEvent>> {
        (**self).load_events().await
    }
}
