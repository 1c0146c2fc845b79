//! Validation of the client data a browser reports alongside a token's
//! assertion, and canonicalization of the web origins it is checked
//! against.

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::U2fError;

/// Client data as collected by the browser during a ceremony.
///
/// Parsing this is only ever a view onto the raw bytes: the literal bytes
/// the client produced are what the token hashed and signed, so they, not
/// any re-serialisation of this structure, flow onwards.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectedClientData {
    /// Which ceremony this client data was collected for.
    pub typ: String,
    /// The challenge the client echoed back.
    pub challenge: String,
    /// The web origin the browser asserted the request came from.
    pub origin: String,
}

/// Reduce an origin to its canonical `scheme://host[:port]` form, with
/// default ports elided, so membership tests are stable regardless of how
/// the origin was written down. Origins without a host (`file:`, `data:`)
/// have no canonical form.
fn canonicalize_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    match url.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

/// Canonicalize the allowed origin set once, at challenge construction.
/// An origin that cannot be canonicalized is a server misconfiguration.
pub(crate) fn canonicalize_origins<'a, I>(origins: I) -> Result<BTreeSet<String>, U2fError>
where
    I: IntoIterator<Item = &'a str>,
{
    origins
        .into_iter()
        .map(|origin| canonicalize_origin(origin).ok_or(U2fError::Configuration))
        .collect()
}

/// Check the reported client data against the ceremony's expectations and
/// hand back the exact bytes that participate in hashing.
pub(crate) fn check_client_data<'a>(
    client_data: &'a [u8],
    expected_type: &str,
    expected_challenge: &str,
    allowed_origins: &BTreeSet<String>,
) -> Result<&'a [u8], U2fError> {
    let collected: CollectedClientData = serde_json::from_slice(client_data)?;

    if collected.typ != expected_type {
        return Err(U2fError::InvalidClientDataType);
    }

    if collected.challenge != expected_challenge {
        return Err(U2fError::MismatchedChallenge);
    }

    let origin = canonicalize_origin(&collected.origin).ok_or(U2fError::InvalidOrigin)?;
    if !allowed_origins.contains(&origin) {
        debug!(%origin, "rejecting assertion from unrecognised origin");
        return Err(U2fError::InvalidOrigin);
    }

    Ok(client_data)
}
