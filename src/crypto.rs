//! Cryptographic operation wrapper for U2F. This module exists to allow
//! ease of auditing, safe operation wrappers, and cryptographic provider
//! abstraction. The default provider is OpenSSL.

use openssl::{bn, ec, hash, nid, pkey, sha, sign};
use tracing::error;

use crate::error::U2fError;

/// The cryptographic capability a ceremony needs to verify assertions.
///
/// The provider is injected into [`crate::AuthenticationChallenge::finish`]
/// rather than instantiated by the verifier itself, so an alternative
/// provider, or a deterministic fake in tests, can stand in without the
/// verification logic changing.
pub trait Crypto {
    /// The decoded public key form this provider verifies with.
    type PublicKey;

    /// Digest arbitrary bytes. U2F_V2 tokens sign SHA-256 digests.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Decode a credential's stored public key from its raw encoded form.
    fn decode_public_key(&self, raw: &[u8]) -> Result<Self::PublicKey, U2fError>;

    /// Verify `signature` over `signed_bytes` with `key`. Any failure,
    /// including a malformed signature encoding, is
    /// [`U2fError::InvalidSignature`].
    fn verify_signature(
        &self,
        key: &Self::PublicKey,
        signed_bytes: &[u8],
        signature: &[u8],
    ) -> Result<(), U2fError>;
}

/// [`Crypto`] backed by OpenSSL: SHA-256 digests, raw ANSI X9.62
/// uncompressed P-256 public keys, DER encoded ECDSA signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSSLCrypto;

impl Crypto for OpenSSLCrypto {
    type PublicKey = pkey::PKey<pkey::Public>;

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = sha::Sha256::new();
        hasher.update(data);
        hasher.finish().to_vec()
    }

    fn decode_public_key(&self, raw: &[u8]) -> Result<Self::PublicKey, U2fError> {
        // Registration hands the server the uncompressed point 0x04 ‖ x ‖ y.
        let group = ec::EcGroup::from_curve_name(nid::Nid::X9_62_PRIME256V1)?;
        let mut ctx = bn::BigNumContext::new()?;

        let point = ec::EcPoint::from_bytes(&group, raw, &mut ctx)
            .map_err(|_| U2fError::InvalidPublicKey)?;
        let ec_key = ec::EcKey::from_public_key(&group, &point)
            .map_err(|_| U2fError::InvalidPublicKey)?;
        // Confirms the coordinates actually lie on the curve.
        ec_key.check_key().map_err(|_| U2fError::InvalidPublicKey)?;

        pkey::PKey::from_ec_key(ec_key).map_err(U2fError::from)
    }

    fn verify_signature(
        &self,
        key: &Self::PublicKey,
        signed_bytes: &[u8],
        signature: &[u8],
    ) -> Result<(), U2fError> {
        let mut verifier = sign::Verifier::new(hash::MessageDigest::sha256(), key)?;
        verifier.update(signed_bytes)?;

        match verifier.verify(signature) {
            Ok(true) => Ok(()),
            Ok(false) => Err(U2fError::InvalidSignature),
            Err(err) => {
                error!(?err, "signature did not decode");
                Err(U2fError::InvalidSignature)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Crypto, OpenSSLCrypto};
    use crate::error::U2fError;
    use openssl::{bn, ec, nid, pkey, sign};

    fn generated_key() -> (Vec<u8>, pkey::PKey<pkey::Private>) {
        let group = ec::EcGroup::from_curve_name(nid::Nid::X9_62_PRIME256V1).unwrap();
        let ec_key = ec::EcKey::generate(&group).unwrap();
        let mut ctx = bn::BigNumContext::new().unwrap();
        let raw = ec_key
            .public_key()
            .to_bytes(&group, ec::PointConversionForm::UNCOMPRESSED, &mut ctx)
            .unwrap();
        (raw, pkey::PKey::from_ec_key(ec_key).unwrap())
    }

    #[test]
    fn sha256_matches_known_vector() {
        let crypto = OpenSSLCrypto;
        assert_eq!(
            crypto.hash(b"https://example.com"),
            hex::decode("100680ad546ce6a577f42f52df33b4cfdca756859e664b8d7de329b150d09ce9")
                .unwrap()
        );
    }

    #[test]
    fn decodes_uncompressed_point() {
        let (raw, _) = generated_key();
        assert_eq!(raw.len(), 65);
        assert_eq!(raw[0], 0x04);
        assert!(OpenSSLCrypto.decode_public_key(&raw).is_ok());
    }

    #[test]
    fn rejects_bytes_that_are_not_a_point() {
        assert!(matches!(
            OpenSSLCrypto.decode_public_key(&[0x04; 65]),
            Err(U2fError::InvalidPublicKey)
        ));
        assert!(matches!(
            OpenSSLCrypto.decode_public_key(b"junk"),
            Err(U2fError::InvalidPublicKey)
        ));
    }

    #[test]
    fn verifies_a_signature_and_rejects_tampering() {
        let crypto = OpenSSLCrypto;
        let (raw, private) = generated_key();
        let key = crypto.decode_public_key(&raw).unwrap();

        let message = b"counter and client data and friends";
        let mut signer =
            sign::Signer::new(openssl::hash::MessageDigest::sha256(), &private).unwrap();
        signer.update(message).unwrap();
        let signature = signer.sign_to_vec().unwrap();

        assert!(crypto.verify_signature(&key, message, &signature).is_ok());

        assert!(matches!(
            crypto.verify_signature(&key, b"different message", &signature),
            Err(U2fError::InvalidSignature)
        ));
        assert!(matches!(
            crypto.verify_signature(&key, message, b"not a der signature"),
            Err(U2fError::InvalidSignature)
        ));
    }
}
