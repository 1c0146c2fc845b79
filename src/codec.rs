//! Encoding and decoding of the raw binary messages a U2F token produces.
//!
//! The `signatureData` blob of a sign response carries no length prefix:
//!
//! | offset | size | field                          |
//! |--------|------|--------------------------------|
//! | 0      | 1    | user presence flag             |
//! | 1      | 4    | counter, big endian unsigned   |
//! | 5      | rest | DER encoded ECDSA signature    |

use byteorder::{BigEndian, WriteBytesExt};
use nom::combinator::rest;
use nom::number::complete::{be_u32, u8 as any_u8};
use nom::IResult;

use crate::error::U2fError;
use crate::proto::Counter;

/// A token's raw answer to a sign request, decoded from `signatureData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateResponse {
    /// The user presence byte the token reported. Only
    /// [`crate::constants::USER_PRESENT_FLAG`] is acceptable.
    pub user_presence: u8,
    /// The per-signature counter the token reported for this ceremony.
    pub counter: Counter,
    /// Signature over the bytes [`signed_bytes`] reconstructs.
    pub signature: Vec<u8>,
}

fn authenticate_response_parser(i: &[u8]) -> IResult<&[u8], AuthenticateResponse> {
    let (i, user_presence) = any_u8(i)?;
    let (i, counter) = be_u32(i)?;
    let (i, signature) = rest(i)?;
    Ok((
        i,
        AuthenticateResponse {
            user_presence,
            counter,
            signature: signature.to_vec(),
        },
    ))
}

/// Decode a raw assertion blob.
///
/// Everything after the five byte prefix is the signature, which must not
/// be empty; a token always signs.
pub fn decode_authenticate_response(data: &[u8]) -> Result<AuthenticateResponse, U2fError> {
    let (_, rsp) =
        authenticate_response_parser(data).map_err(|_| U2fError::AssertionTooShort)?;
    if rsp.signature.is_empty() {
        return Err(U2fError::SignatureMissing);
    }
    Ok(rsp)
}

/// Reassemble the exact byte sequence the token signed:
/// `app_id_hash ‖ user_presence ‖ counter (big endian) ‖ client_data_hash`.
///
/// A single signature over this blob binds the application identity, the
/// presence decision, the anti-replay counter and the ceremony's client
/// data together; there is no other authentication layer.
pub fn signed_bytes(
    app_id_hash: &[u8],
    user_presence: u8,
    counter: Counter,
    client_data_hash: &[u8],
) -> Vec<u8> {
    let mut data = Vec::with_capacity(app_id_hash.len() + 5 + client_data_hash.len());
    data.extend_from_slice(app_id_hash);
    data.push(user_presence);
    data.write_u32::<BigEndian>(counter)
        .expect("writing to a vec cannot fail");
    data.extend_from_slice(client_data_hash);
    data
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{decode_authenticate_response, signed_bytes};
    use crate::error::U2fError;

    #[test]
    fn decode_splits_prefix_and_signature() {
        let mut blob = vec![0x01, 0x00, 0x00, 0x01, 0x02];
        blob.extend_from_slice(&[0x30, 0x44, 0xaa, 0xbb]);

        let rsp = decode_authenticate_response(&blob).unwrap();
        assert_eq!(rsp.user_presence, 0x01);
        assert_eq!(rsp.counter, 258);
        assert_eq!(rsp.signature, vec![0x30, 0x44, 0xaa, 0xbb]);
    }

    #[test]
    fn decode_rejects_short_blob() {
        assert!(matches!(
            decode_authenticate_response(&[0x01, 0x00, 0x00]),
            Err(U2fError::AssertionTooShort)
        ));
        assert!(matches!(
            decode_authenticate_response(&[]),
            Err(U2fError::AssertionTooShort)
        ));
    }

    #[test]
    fn decode_rejects_prefix_without_signature() {
        assert!(matches!(
            decode_authenticate_response(&[0x01, 0x00, 0x00, 0x00, 0x06]),
            Err(U2fError::SignatureMissing)
        ));
    }

    #[test]
    fn signed_bytes_layout() {
        let app_hash = [0x11u8; 32];
        let cd_hash = [0x22u8; 32];
        let data = signed_bytes(&app_hash, 0x01, 6, &cd_hash);

        assert_eq!(data.len(), 69);
        assert_eq!(&data[..32], &app_hash);
        assert_eq!(data[32], 0x01);
        assert_eq!(&data[33..37], &hex::decode("00000006").unwrap()[..]);
        assert_eq!(&data[37..], &cd_hash);
    }
}
