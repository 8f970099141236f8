//! Local session cache.
//!
//! The current user is held in memory by [`SessionStore`] and mirrored to the device's
//! key-value storage under [`SESSION_KEY`], so a restart picks it back up. Views that need
//! the user's identity receive a [`SessionContext`] snapshot built once at start-up and
//! must call [`SessionContext::require`] before rendering anything role-gated.

use crate::constants::SESSION_KEY;
use crate::role::Role;
use crate::storage::KeyValueStore;
use crate::{CardioError, CardioResult};
use serde::{Deserialize, Serialize};

/// Identity of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Owns the at-most-one active [`Session`] and its persisted copy.
///
/// # Examples
///
/// ```
/// use cardio_core::{MemoryStore, Role, Session, SessionStore};
///
/// let mut sessions = SessionStore::open(MemoryStore::new());
/// sessions
///     .login(Session { user_id: 1, username: "admin".into(), role: Role::Admin })
///     .unwrap();
/// assert!(sessions.context().is_authenticated());
/// ```
#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
    current: Option<Session>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wraps `store` and immediately loads any persisted session.
    ///
    /// # Arguments
    ///
    /// * `store` - Key-value storage shared with the rest of the app's local state.
    ///
    /// # Returns
    ///
    /// A store whose [`current`](Self::current) is the persisted session, or `None` when
    /// nothing usable was stored.
    pub fn open(store: S) -> Self {
        let mut this = Self {
            store,
            current: None,
        };
        this.load();
        this
    }

    /// Re-reads the persisted session, replacing the in-memory one.
    ///
    /// Absent, unreadable or malformed values all yield `None`; the latter two are logged.
    pub fn load(&mut self) -> Option<Session> {
        self.current = match self.store.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("ignoring malformed stored session: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("failed to read stored session: {}", e);
                None
            }
        };
        self.current.clone()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Persists `session` and makes it current, overwriting whatever was there.
    ///
    /// # Arguments
    ///
    /// * `session` - Identity returned by a successful login.
    ///
    /// # Returns
    ///
    /// `Ok(())` once the session is stored. On a storage error the in-memory session is left
    /// unchanged, so memory never runs ahead of what a restart would load.
    pub fn login(&mut self, session: Session) -> CardioResult<()> {
        let raw = serde_json::to_string(&session).map_err(CardioError::Serialization)?;
        self.store.set(SESSION_KEY, &raw)?;
        tracing::info!(user_id = session.user_id, "session stored");
        self.current = Some(session);
        Ok(())
    }

    /// Clears the session and wipes **all** persisted application storage, chat history
    /// included.
    ///
    /// Goes straight to [`KeyValueStore::clear`], which does not read the stored data, so a
    /// corrupt store can always be logged out of.
    pub fn logout(&mut self) -> CardioResult<()> {
        self.current = None;
        self.store.clear()?;
        tracing::info!("session cleared and local storage wiped");
        Ok(())
    }

    /// Snapshot of the current session for handing to views.
    pub fn context(&self) -> SessionContext {
        SessionContext::new(self.current.clone())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Explicit session context threaded through role-gated code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    session: Option<Session>,
}

impl SessionContext {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    /// The active session, or [`CardioError::NoActiveSession`].
    pub fn require(&self) -> CardioResult<&Session> {
        self.session.as_ref().ok_or(CardioError::NoActiveSession)
    }

    pub fn role(&self) -> CardioResult<Role> {
        self.require().map(|s| s.role)
    }

    /// The active session if its role is one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> CardioResult<&Session> {
        let session = self.require()?;
        if allowed.contains(&session.role) {
            Ok(session)
        } else {
            Err(CardioError::Forbidden(session.role))
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
