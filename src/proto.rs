//! The JSON shaped structures exchanged with the client during a sign
//! ceremony, mirroring the U2F javascript API. These are what your
//! application serialises onto and off the wire.

use serde::{Deserialize, Serialize};

use crate::base64_data::Base64UrlSafeData;
use crate::error::U2fError;

/// The number of assertions a credential has produced, as enforced by the
/// anti-replay check. Strictly increasing across successful ceremonies.
pub type Counter = u32;

/// The challenge handed to the client's `u2f.sign()` call.
///
/// Exactly these four fields cross the wire. Server-side policy, in
/// particular the allowed origin set, never appears here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// Protocol version the answering token must speak.
    pub version: String,
    /// Websafe base64 challenge nonce.
    pub challenge: String,
    /// The application id this ceremony is bound to.
    pub app_id: String,
    /// Websafe base64 handle of the credential that must answer.
    pub key_handle: String,
}

/// What `u2f.sign()` hands back once the token has signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    /// The exact client data bytes the browser produced. These literal
    /// bytes are hashed into the signed payload, so they are carried
    /// as-is and never re-serialised.
    pub client_data: Base64UrlSafeData,
    /// The raw binary assertion: presence flag, counter and trailing
    /// signature. See [`crate::codec`] for the layout.
    pub signature_data: Base64UrlSafeData,
    /// Handle of the credential that answered.
    pub key_handle: String,
}

impl SignResponse {
    /// Parse a response straight from the JSON text a client posted.
    pub fn from_json(raw: &str) -> Result<Self, U2fError> {
        serde_json::from_str(raw).map_err(U2fError::from)
    }
}

/// A registered credential as the server stores it.
///
/// The library only ever reads this; committing the updated counter after
/// a successful ceremony is the caller's job (see [`crate::ephemeral`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// Raw ANSI X9.62 encoded public key captured at registration.
    pub public_key: Base64UrlSafeData,
    /// Last accepted anti-replay counter. A fresh registration starts
    /// at zero.
    pub counter: Counter,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{SignRequest, SignResponse};

    #[test]
    fn sign_request_serialises_with_camel_case_keys() {
        let req = SignRequest {
            version: "U2F_V2".to_string(),
            challenge: "LFl_uo1Tbq4ZBfBLZsaXn9rGkyQeLgAlSJp5hm-oYxE".to_string(),
            app_id: "https://example.com".to_string(),
            key_handle: "a2gx".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        // serde_json orders object keys alphabetically.
        assert_eq!(keys, ["appId", "challenge", "keyHandle", "version"]);
    }

    #[test]
    fn deserialise_sign_response() {
        let raw = r#"
        {
            "clientData": "eyJ0eXAiOiJuYXZpZ2F0b3IuaWQuZ2V0QXNzZXJ0aW9uIiwiY2hhbGxlbmdlIjoiYWJjMTIzIiwib3JpZ2luIjoiaHR0cHM6Ly9leGFtcGxlLmNvbSJ9",
            "signatureData": "AQAAAAYwMTIzNDU2Nzg5Ojs8PT4_QEFCQ0RFRkdISUpLTE1OT1BRUlNUVVZXWFlaW1xdXl9gYWJjZGVmZ2hpamtsbW5v",
            "keyHandle": "a2gx"
        }
        "#;
        let rsp = SignResponse::from_json(raw).unwrap();
        assert_eq!(rsp.key_handle, "a2gx");
        // First byte of the assertion is the presence flag.
        assert_eq!(rsp.signature_data.as_ref()[0], 0x01);
        assert!(rsp.client_data.as_ref().starts_with(b"{\"typ\":"));
    }

    #[test]
    fn malformed_response_is_an_error() {
        assert!(SignResponse::from_json("{\"clientData\": 5}").is_err());
    }
}
