//! Ephemeral (in-memory) challenge and credential stores.
//!
//! The verifier itself is a pure computation: it neither enforces single
//! use of a challenge nor commits the updated counter. Those contracts
//! belong to the storage layer, and these traits spell them out. The
//! in-memory implementation here is only really useful for demo sites,
//! testing, and as a reference for what a durable implementation must
//! guarantee - everything is lost on service restart.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::proto::{Counter, Credential};
use crate::AuthenticationChallenge;

/// Owns pending challenges, keyed by their nonce, and hands each out at
/// most once.
pub trait ChallengeStore {
    /// Persist a freshly issued challenge.
    fn put(&self, challenge: AuthenticationChallenge);

    /// Atomically remove and return the challenge for `nonce`.
    ///
    /// A second take of the same nonce returns `None`, which is what
    /// makes a challenge single use: take it before calling `finish`,
    /// whether or not the ceremony then succeeds.
    fn take(&self, nonce: &str) -> Option<AuthenticationChallenge>;
}

/// Read view of registered credentials plus the conditional counter
/// commit the anti-replay guarantee depends on.
pub trait CredentialStore {
    /// Register a credential under its key handle.
    fn insert(&self, key_handle: &str, credential: Credential);

    /// The current credential for a key handle.
    fn credential(&self, key_handle: &str) -> Option<Credential>;

    /// Commit `new` as the stored counter for `key_handle`, but only if
    /// the stored counter still equals `expected` (the value read before
    /// verification). Returns `false` when a concurrent ceremony got
    /// there first; the caller must then treat its own, already verified
    /// result as rejected, or the losing assertion could be replayed.
    fn commit_counter(&self, key_handle: &str, expected: Counter, new: Counter) -> bool;
}

/// Mutex protected maps implementing both stores.
#[derive(Debug, Default)]
pub struct EphemeralStore {
    challenges: Mutex<HashMap<String, AuthenticationChallenge>>,
    credentials: Mutex<HashMap<String, Credential>>,
}

impl EphemeralStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeStore for EphemeralStore {
    fn put(&self, challenge: AuthenticationChallenge) {
        let mut challenges = self.challenges.lock().expect("challenge lock poisoned");
        challenges.insert(challenge.challenge().to_string(), challenge);
    }

    fn take(&self, nonce: &str) -> Option<AuthenticationChallenge> {
        let mut challenges = self.challenges.lock().expect("challenge lock poisoned");
        challenges.remove(nonce)
    }
}

impl CredentialStore for EphemeralStore {
    fn insert(&self, key_handle: &str, credential: Credential) {
        let mut credentials = self.credentials.lock().expect("credential lock poisoned");
        credentials.insert(key_handle.to_string(), credential);
    }

    fn credential(&self, key_handle: &str) -> Option<Credential> {
        let credentials = self.credentials.lock().expect("credential lock poisoned");
        credentials.get(key_handle).cloned()
    }

    fn commit_counter(&self, key_handle: &str, expected: Counter, new: Counter) -> bool {
        let mut credentials = self.credentials.lock().expect("credential lock poisoned");
        match credentials.get_mut(key_handle) {
            Some(credential) if credential.counter == expected => {
                credential.counter = new;
                true
            }
            _ => false,
        }
    }
}
