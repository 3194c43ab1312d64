//! Domain entities.

use std::{fmt, sync::OnceLock, time::Duration};

use tokio::sync::Mutex;

use super::{
    connection::FrameSink,
    error::TransportError,
    value_object::{Category, DisplayName, ParticipantId, Timestamp},
};

/// One joined user and the outbound half of its connection.
///
/// The connection is only reachable through [`Participant::send`] and
/// [`Participant::close`]. The mutex around it is the participant's write lock
/// and is held for a single write at a time.
pub struct Participant {
    id: ParticipantId,
    display_name: DisplayName,
    category: Category,
    joined_at: Timestamp,
    left_at: OnceLock<Timestamp>,
    connection: Mutex<Box<dyn FrameSink>>,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        display_name: DisplayName,
        category: Category,
        joined_at: Timestamp,
        connection: Box<dyn FrameSink>,
    ) -> Self {
        Self {
            id,
            display_name,
            category,
            joined_at,
            left_at: OnceLock::new(),
            connection: Mutex::new(connection),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn joined_at(&self) -> Timestamp {
        self.joined_at
    }

    pub fn left_at(&self) -> Option<Timestamp> {
        self.left_at.get().copied()
    }

    pub fn has_left(&self) -> bool {
        self.left_at.get().is_some()
    }

    /// Record the departure time.
    ///
    /// Returns `false` if a departure was already recorded; the first value wins.
    pub fn mark_left(&self, at: Timestamp) -> bool {
        self.left_at.set(at).is_ok()
    }

    /// Write one frame, waiting at most `timeout` for the write lock and the write.
    ///
    /// The write lock is released before this returns.
    pub async fn send(&self, payload: String, timeout: Duration) -> Result<(), TransportError> {
        let write = async {
            let mut connection = self.connection.lock().await;
            connection.send_text(payload).await
        };
        match tokio::time::timeout(timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }

    /// Close the underlying connection.
    pub async fn close(&self, timeout: Duration) -> Result<(), TransportError> {
        let close = async {
            let mut connection = self.connection.lock().await;
            connection.close().await
        };
        match tokio::time::timeout(timeout, close).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout)),
        }
    }
}

impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("category", &self.category)
            .field("joined_at", &self.joined_at)
            .field("left_at", &self.left_at.get())
            .finish_non_exhaustive()
    }
}
