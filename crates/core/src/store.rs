//! Credential store: the single source of truth for the current session
//!
//! Reads are lock-free snapshots. Writes replace the whole session and are
//! stamped with an [`Attempt`] so that results of superseded operations can be
//! discarded (last-writer-wins by initiation order, not arrival order).

use crate::session::Session;
use crate::storage::{ACCESS_TOKEN_KEY, TokenStorage};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, warn};

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Sequence number of a session-writing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Attempt(u64);

impl Attempt {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

struct Inner {
    current: ArcSwap<Session>,
    latest_attempt: AtomicU64,
    write_lock: Mutex<()>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    storage: Option<Arc<dyn TokenStorage>>,
}

/// Shared handle to the current session
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

impl CredentialStore {
    /// Create an anonymous store without persistence
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an anonymous store that persists the access token
    pub fn with_storage(storage: Arc<dyn TokenStorage>) -> Self {
        Self::build(Some(storage))
    }

    fn build(storage: Option<Arc<dyn TokenStorage>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: ArcSwap::from_pointee(Session::Anonymous),
                latest_attempt: AtomicU64::new(0),
                write_lock: Mutex::new(()),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                storage,
            }),
        }
    }

    /// Current session snapshot
    pub fn session(&self) -> Arc<Session> {
        self.inner.current.load_full()
    }

    /// Current access token, read at call time
    pub fn access_token(&self) -> Option<String> {
        self.inner.current.load().access_token().map(str::to_owned)
    }

    /// Replace the current session, superseding any in-flight attempt
    pub fn set_session(&self, session: Session) {
        let attempt = self.begin_attempt();
        self.apply(attempt, session);
    }

    /// Reset to the anonymous session
    pub fn clear_session(&self) {
        self.set_session(Session::Anonymous);
    }

    /// Start a new session-writing operation
    pub fn begin_attempt(&self) -> Attempt {
        let sequence = self.inner.latest_attempt.fetch_add(1, Ordering::SeqCst) + 1;
        Attempt(sequence)
    }

    /// Whether no newer attempt has been started since `attempt`
    pub fn is_current(&self, attempt: Attempt) -> bool {
        self.inner.latest_attempt.load(Ordering::SeqCst) == attempt.0
    }

    /// Write the result of `attempt` unless it has been superseded.
    ///
    /// Returns `false` when the result was discarded.
    pub fn apply(&self, attempt: Attempt, session: Session) -> bool {
        self.write_if(session, || {
            if self.is_current(attempt) {
                Some(attempt)
            } else {
                debug!(
                    attempt = attempt.0,
                    latest = self.inner.latest_attempt.load(Ordering::SeqCst),
                    "Discarding result of superseded session attempt"
                );
                None
            }
        })
    }

    /// Reset to anonymous only while the store still holds `token`.
    ///
    /// Used when a call made with `token` was rejected: a session installed
    /// since then is left alone. Returns `false` when nothing was cleared.
    pub fn clear_if_token(&self, token: Option<&str>) -> bool {
        self.write_if(Session::Anonymous, || {
            if self.inner.current.load().access_token() == token {
                Some(self.begin_attempt())
            } else {
                debug!("Session changed since the rejected call, keeping it");
                None
            }
        })
    }

    /// Store `session` if `admit` yields the attempt to stamp it with.
    ///
    /// The write lock is held until listeners have run, so notifications
    /// arrive in the same order as the writes.
    fn write_if<F>(&self, session: Session, admit: F) -> bool
    where
        F: FnOnce() -> Option<Attempt>,
    {
        let Ok(_guard) = self.inner.write_lock.lock() else {
            warn!("Credential store write lock poisoned, dropping write");
            return false;
        };

        let Some(attempt) = admit() else {
            return false;
        };

        let session = Arc::new(session);
        self.inner.current.store(Arc::clone(&session));
        self.persist(&session);

        debug!(
            attempt = attempt.0,
            authenticated = session.is_authenticated(),
            "Session replaced"
        );
        self.notify(&session);
        true
    }

    /// Access token left in local storage by an earlier run.
    ///
    /// It is never turned into a session on its own: identity claims come
    /// only from a successful refresh or login.
    pub fn persisted_token(&self) -> Option<String> {
        let storage = self.inner.storage.as_ref()?;
        match storage.load(ACCESS_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read persisted access token: {e}");
                None
            }
        }
    }

    /// Register a listener invoked synchronously after every write.
    ///
    /// Listeners run under the store's write lock and must not write to the
    /// store themselves.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn persist(&self, session: &Session) {
        let Some(storage) = &self.inner.storage else {
            return;
        };

        let result = match session.access_token() {
            Some(token) => storage.save(ACCESS_TOKEN_KEY, token),
            None => storage.remove(ACCESS_TOKEN_KEY),
        };
        if let Err(e) = result {
            warn!("Failed to persist access token: {e}");
        }
    }

    fn notify(&self, session: &Session) {
        // Snapshot so listeners may subscribe or unsubscribe while running
        let listeners: Vec<Listener> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(session);
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session", &self.session())
            .field(
                "latest_attempt",
                &self.inner.latest_attempt.load(Ordering::SeqCst),
            )
            .finish_non_exhaustive()
    }
}

/// Listener registration; dropping it unsubscribes
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription {
    store: Weak<Inner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade()
            && let Ok(mut listeners) = inner.listeners.lock()
        {
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use crate::storage::MemoryTokenStorage;

    #[test]
    fn test_starts_anonymous() {
        let store = CredentialStore::new();
        assert_eq!(*store.session(), Session::Anonymous);
        assert_eq!(store.access_token(), None);
    }

    #[test]
    fn test_session_reflects_last_write() {
        let store = CredentialStore::new();
        let writes = [
            Session::authenticated("a", "u1", Role::User),
            Session::Anonymous,
            Session::authenticated("b", "u2", Role::Admin),
            Session::authenticated("c", "u3", Role::User),
        ];

        for session in writes {
            store.set_session(session.clone());
            assert_eq!(*store.session(), session);
        }

        store.clear_session();
        assert_eq!(*store.session(), Session::Anonymous);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = CredentialStore::new();
        store.set_session(Session::authenticated("abc", "u1", Role::User));

        store.clear_session();
        let once = store.session();
        store.clear_session();
        let twice = store.session();

        assert_eq!(once, twice);
        assert_eq!(*twice, Session::Anonymous);
    }

    #[test]
    fn test_superseded_attempt_is_discarded() {
        let store = CredentialStore::new();
        let slow = store.begin_attempt();
        let fast = store.begin_attempt();

        assert!(store.apply(fast, Session::authenticated("t2", "u2", Role::User)));
        assert!(!store.apply(slow, Session::authenticated("t1", "u1", Role::User)));

        assert_eq!(store.access_token().as_deref(), Some("t2"));
    }

    #[test]
    fn test_set_session_supersedes_in_flight_attempt() {
        let store = CredentialStore::new();
        let in_flight = store.begin_attempt();

        store.clear_session();

        assert!(!store.is_current(in_flight));
        assert!(!store.apply(in_flight, Session::authenticated("late", "u1", Role::User)));
        assert_eq!(*store.session(), Session::Anonymous);
    }

    #[test]
    fn test_attempt_sequence_is_monotonic() {
        let store = CredentialStore::new();
        let first = store.begin_attempt();
        let second = store.begin_attempt();
        assert!(second > first);
        assert_eq!(second.sequence(), first.sequence() + 1);
    }

    #[test]
    fn test_subscribers_observe_writes_until_unsubscribed() {
        let store = CredentialStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let subscription = {
            let seen = Arc::clone(&seen);
            store.subscribe(move |session| {
                seen.lock().unwrap().push(session.user_id().map(str::to_owned));
            })
        };

        store.set_session(Session::authenticated("t1", "u1", Role::User));
        store.clear_session();
        subscription.unsubscribe();
        store.set_session(Session::authenticated("t2", "u2", Role::User));

        assert_eq!(*seen.lock().unwrap(), vec![Some("u1".to_string()), None]);
    }

    #[test]
    fn test_discarded_write_does_not_notify() {
        let store = CredentialStore::new();
        let calls = Arc::new(AtomicU64::new(0));
        let _subscription = {
            let calls = Arc::clone(&calls);
            store.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        let stale = store.begin_attempt();
        store.clear_session();
        store.apply(stale, Session::authenticated("t1", "u1", Role::User));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_writes_notify_in_store_order() {
        let store = CredentialStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _subscription = {
            let seen = Arc::clone(&seen);
            store.subscribe(move |session| {
                if session.access_token() == Some("first") {
                    std::thread::sleep(std::time::Duration::from_millis(200));
                }
                seen.lock().unwrap().push(session.access_token().map(str::to_owned));
            })
        };

        let first = {
            let store = store.clone();
            std::thread::spawn(move || {
                store.set_session(Session::authenticated("first", "u1", Role::User));
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        let second = {
            let store = store.clone();
            std::thread::spawn(move || {
                store.set_session(Session::authenticated("second", "u2", Role::User));
            })
        };
        first.join().unwrap();
        second.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen.last().cloned().flatten(), store.access_token());
    }

    #[test]
    fn test_clear_if_token_only_clears_matching_session() {
        let store = CredentialStore::new();
        store.set_session(Session::authenticated("t1", "u1", Role::User));
        let in_flight = store.begin_attempt();

        assert!(!store.clear_if_token(Some("t0")));
        assert_eq!(store.access_token().as_deref(), Some("t1"));
        // Nothing was written, so the in-flight attempt is still current
        assert!(store.is_current(in_flight));

        assert!(store.clear_if_token(Some("t1")));
        assert_eq!(*store.session(), Session::Anonymous);
        assert!(!store.is_current(in_flight));
    }

    #[test]
    fn test_persists_only_the_access_token() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let store = CredentialStore::with_storage(storage.clone());

        store.set_session(Session::authenticated("abc", "u1", Role::Admin));
        assert_eq!(
            storage.load(ACCESS_TOKEN_KEY).unwrap().as_deref(),
            Some("abc")
        );

        store.clear_session();
        assert_eq!(storage.load(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_persisted_token_does_not_authenticate() {
        let storage = Arc::new(MemoryTokenStorage::new());
        storage.save(ACCESS_TOKEN_KEY, "stale").unwrap();

        let store = CredentialStore::with_storage(storage);

        assert_eq!(store.persisted_token().as_deref(), Some("stale"));
        assert!(!store.session().is_authenticated());
        assert_eq!(store.access_token(), None);
    }
}
