//! Publish/subscribe for owner-scoped live queries.
//!
//! Every successful write publishes a [`Change`]. A [`LiveQuery`] wakes up on
//! changes for its owner; the caller then re-runs the query to get the
//! refreshed result set (see [`crate::Notes::next_snapshot`]).

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::{NoteId, NoteQuery, OwnerId};

const LIVE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Created(NoteId),
    Updated(NoteId),
    Removed(NoteId),
    Completed { id: NoteId, completed: bool },
    GroupRenamed { from: String, to: String, count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub owner: OwnerId,
    pub kind: ChangeKind,
}

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("live query hub closed")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct LiveHub {
    sender: broadcast::Sender<Change>,
}

impl Default for LiveHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, change: Change) {
        debug!(owner = %change.owner, kind = ?change.kind, "publishing change");
        // no subscribers is not an error
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self, owner: Option<OwnerId>, query: NoteQuery) -> LiveQuery {
        LiveQuery {
            owner,
            query,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

pub struct LiveQuery {
    owner: Option<OwnerId>,
    query: NoteQuery,
    receiver: broadcast::Receiver<Change>,
}

impl LiveQuery {
    pub fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    pub fn query(&self) -> &NoteQuery {
        &self.query
    }

    /// Wait for the next write affecting this query's owner.
    ///
    /// Returns `Ok(None)` when the subscriber lagged behind and missed
    /// changes; the result set must be refreshed either way. An anonymous
    /// query never wakes up.
    pub async fn changed(&mut self) -> Result<Option<Change>, LiveError> {
        let Some(owner) = &self.owner else {
            return std::future::pending().await;
        };
        loop {
            match self.receiver.recv().await {
                Ok(change) if &change.owner == owner => return Ok(Some(change)),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(owner = %owner, skipped, "live query lagged, forcing refresh");
                    return Ok(None);
                }
                Err(RecvError::Closed) => return Err(LiveError::Closed),
            }
        }
    }
}
