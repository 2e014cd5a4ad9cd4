//! Room to session mapping.
//!
//! The registry lock guards creation, lookup and removal only. A session's
//! own lock may be held while calling into the registry; the registry never
//! waits on a session lock.

use crate::error::EngineError;
use crate::pivot::GameMode;
use crate::session::{RoomId, Session, SessionId};
use crate::stage::StageTable;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

/// Shared handle to one live session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    session: Arc<Mutex<Session>>,
}

impl SessionHandle {
    /// Registry generation of the session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Enters the session's critical section.
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}

/// Manages all live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<RoomId, SessionHandle>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a forming session in `room`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SessionExists`] if the room already has one.
    #[instrument(skip(self, stages))]
    pub async fn create(
        &self,
        room: RoomId,
        mode: GameMode,
        stages: StageTable,
    ) -> Result<SessionHandle, EngineError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&room) {
            debug!("Room already has a session");
            return Err(EngineError::SessionExists { room });
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let handle = SessionHandle {
            id,
            session: Arc::new(Mutex::new(Session::new(id, room.clone(), mode, stages))),
        };
        sessions.insert(room, handle.clone());
        info!(session_id = %id, "Session registered");
        Ok(handle)
    }

    /// Looks up the session in `room`.
    pub async fn get(&self, room: &RoomId) -> Option<SessionHandle> {
        self.sessions.lock().await.get(room).cloned()
    }

    /// Looks up the session in `room` only if it is still generation `id`.
    pub async fn get_exact(&self, room: &RoomId, id: SessionId) -> Option<SessionHandle> {
        self.get(room).await.filter(|handle| handle.id == id)
    }

    /// Removes generation `id` from `room`. A newer session in the same room
    /// is left alone.
    #[instrument(skip(self))]
    pub async fn remove(&self, room: &RoomId, id: SessionId) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(room) {
            Some(handle) if handle.id == id => {
                sessions.remove(room);
                info!("Session removed");
                true
            }
            _ => false,
        }
    }

    /// Rooms with a live session, sorted.
    pub async fn rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.sessions.lock().await.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no session is live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
