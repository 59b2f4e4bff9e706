use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{PlaySession, Result, SessionError, UserId};

pub type SharedSession = Arc<Mutex<PlaySession>>;

/// Running games, at most one per user.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<UserId, SharedSession>,
}

pub(crate) fn lock(session: &SharedSession) -> Result<MutexGuard<'_, PlaySession>> {
    session.lock().map_err(|_| SessionError::Poisoned)
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: PlaySession) -> Result<SharedSession> {
        match self.sessions.entry(session.user_id().to_owned()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyPlaying),
            Entry::Vacant(slot) => {
                let shared = Arc::new(Mutex::new(session));
                slot.insert(Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    pub fn get(&self, user_id: &str) -> Option<SharedSession> {
        self.sessions.get(user_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }

    /// Removes the user's session, but only if it is still `session`. A game
    /// started after `session` ended stays in place.
    pub fn remove(&self, user_id: &str, session: &SharedSession) -> bool {
        self.sessions
            .remove_if(user_id, |_, current| Arc::ptr_eq(current, session))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions with no activity for longer than `timeout`. Sessions busy in
    /// another handler are skipped and picked up by a later sweep.
    pub fn idle(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<(UserId, SharedSession)> {
        let mut idle = Vec::new();
        let mut busy = 0usize;

        for entry in self.sessions.iter() {
            match entry.value().try_lock() {
                Ok(session) if session.is_idle(now, timeout) => {
                    idle.push((entry.key().clone(), Arc::clone(entry.value())));
                }
                Ok(_) => {}
                Err(_) => busy += 1,
            }
        }

        if busy > 0 {
            log::debug!("Skipped {busy} busy sessions while sweeping");
        }
        idle
    }
}
