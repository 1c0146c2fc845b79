//! u2f-rs - FIDO U2F for Rust Server Applications
//!
//! U2F is a challenge-response standard allowing a server to verify that
//! a signed assertion really was produced by a hardware token a user
//! registered earlier, as a second authentication factor. This library
//! implements the server (relying party) half of the authentication
//! ceremony: issue a challenge bound to a registered credential, then
//! verify the answer the token signed and produce the next expected
//! anti-replay counter.
//!
//! The flow maps onto two calls:
//!
//! * [`AuthenticationChallenge::generate`] starts a ceremony. Send its
//!   [`AuthenticationChallenge::sign_request`] to the client's
//!   `u2f.sign()`, and persist the challenge itself.
//! * [`AuthenticationChallenge::finish`] verifies the client's
//!   [`SignResponse`] against the stored [`Credential`] and returns the
//!   counter value you must persist on success.
//!
//! Credential registration, challenge expiry and counter persistence stay
//! with the calling application; the [`ephemeral`] module documents those
//! contracts and provides an in-memory reference implementation. Note in
//! particular that the verifier does not make a challenge single use and
//! does not serialise concurrent ceremonies for one credential - consume
//! the challenge via [`ephemeral::ChallengeStore::take`] before verifying,
//! and commit the counter with a compare-and-set, or an attacker who can
//! race you can replay an assertion.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod base64_data;
pub mod client_data;
pub mod codec;
pub mod constants;
pub mod crypto;
pub mod ephemeral;
pub mod error;
pub mod proto;

pub use crate::base64_data::Base64UrlSafeData;
pub use crate::crypto::{Crypto, OpenSSLCrypto};
pub use crate::error::U2fError;
pub use crate::proto::{Counter, Credential, SignRequest, SignResponse};

use crate::client_data::{canonicalize_origins, check_client_data};
use crate::codec::{decode_authenticate_response, signed_bytes};
use crate::constants::{
    CHALLENGE_SIZE_BYTES, CLIENT_DATA_TYPE_AUTHENTICATE, USER_PRESENT_FLAG, U2F_VERSION,
};

/// One outstanding authentication challenge, with the server-side policy
/// it was issued under. You must persist this between issuing the
/// challenge and the client answering it, associated with the user who
/// requested it.
///
/// The structure is immutable once built. Verifying an answer reads it
/// and the supplied [`Credential`] but mutates nothing, so `finish` is
/// safe to call from any thread; the hazards live at the storage
/// boundary (see [`ephemeral`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationChallenge {
    version: String,
    challenge: String,
    app_id: String,
    key_handle: String,
    allowed_origins: BTreeSet<String>,
}

// Two challenges are the same ceremony when the client-visible fields
// match. The allowed origin set is server policy, not ceremony identity,
// so it stays out of equality and hashing.
impl PartialEq for AuthenticationChallenge {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.challenge == other.challenge
            && self.app_id == other.app_id
            && self.key_handle == other.key_handle
    }
}

impl Eq for AuthenticationChallenge {}

impl Hash for AuthenticationChallenge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
        self.challenge.hash(state);
        self.app_id.hash(state);
        self.key_handle.hash(state);
    }
}

impl AuthenticationChallenge {
    /// Bind an existing challenge nonce to a credential and origin
    /// policy. `origins` are canonicalized here, once; they are compared
    /// verbatim afterwards.
    pub fn new(
        version: &str,
        challenge: &str,
        app_id: &str,
        key_handle: &str,
        origins: &[&str],
    ) -> Result<Self, U2fError> {
        Ok(AuthenticationChallenge {
            version: version.to_string(),
            challenge: challenge.to_string(),
            app_id: app_id.to_string(),
            key_handle: key_handle.to_string(),
            allowed_origins: canonicalize_origins(origins.iter().copied())?,
        })
    }

    /// Start a fresh ceremony against `key_handle`: a random 32 byte
    /// websafe base64 challenge under the current protocol version.
    pub fn generate(
        app_id: &str,
        key_handle: &str,
        origins: &[&str],
    ) -> Result<Self, U2fError> {
        let mut rng = rand::thread_rng();
        let nonce: [u8; CHALLENGE_SIZE_BYTES] = rng.gen();
        let challenge = URL_SAFE_NO_PAD.encode(nonce);
        Self::new(U2F_VERSION, &challenge, app_id, key_handle, origins)
    }

    /// The websafe base64 challenge nonce.
    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// The application id this ceremony is bound to.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// The handle of the credential that must answer this challenge.
    pub fn key_handle(&self) -> &str {
        &self.key_handle
    }

    /// The protocol version the answering token must speak.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The four field structure to hand to the client's `u2f.sign()`.
    pub fn sign_request(&self) -> SignRequest {
        SignRequest {
            version: self.version.clone(),
            challenge: self.challenge.clone(),
            app_id: self.app_id.clone(),
            key_handle: self.key_handle.clone(),
        }
    }

    /// Verify a token's answer to this challenge.
    ///
    /// `credential` is the stored public key and counter for the key
    /// handle this challenge was issued against; looking it up by that
    /// handle is the caller's responsibility.
    ///
    /// On success, returns `reported counter + 1`: the value to persist
    /// as the credential's counter, conditional on it not having moved in
    /// the meantime (see [`ephemeral::CredentialStore::commit_counter`]).
    /// On failure nothing must be persisted.
    pub fn finish<C: Crypto>(
        &self,
        crypto: &C,
        rsp: &SignResponse,
        credential: &Credential,
    ) -> Result<Counter, U2fError> {
        // Checks run cheapest first; the signature is only evaluated once
        // everything structural has already passed.
        let client_data = check_client_data(
            rsp.client_data.as_ref(),
            CLIENT_DATA_TYPE_AUTHENTICATE,
            &self.challenge,
            &self.allowed_origins,
        )?;

        let assertion = decode_authenticate_response(rsp.signature_data.as_ref())?;

        // The whole byte must equal the present bit: zero, or any
        // reserved bit set alongside it, is rejected.
        if assertion.user_presence != USER_PRESENT_FLAG {
            return Err(U2fError::UserNotPresent);
        }

        // Strict unsigned comparison, no wraparound tolerance.
        if assertion.counter <= credential.counter {
            debug!(
                reported = assertion.counter,
                stored = credential.counter,
                "rejecting replayed or stale counter"
            );
            return Err(U2fError::CounterTooLow);
        }

        let signed = signed_bytes(
            &crypto.hash(self.app_id.as_bytes()),
            assertion.user_presence,
            assertion.counter,
            &crypto.hash(client_data),
        );

        let key = crypto.decode_public_key(credential.public_key.as_ref())?;
        crypto.verify_signature(&key, &signed, &assertion.signature)?;

        // A counter pinned at u32::MAX can never satisfy the strict
        // comparison again, which permanently retires the credential.
        Ok(assertion.counter.saturating_add(1))
    }
}
