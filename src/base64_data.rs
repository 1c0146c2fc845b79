//! Binary data that always encodes to websafe (URL-safe, unpadded) base64
//! but forgives the alternative alphabets and padding styles clients and
//! their libraries disagree about when decoding.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::engine::GeneralPurpose;
use base64::Engine;
use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const ALLOWED_DECODING_FORMATS: [GeneralPurpose; 4] =
    [URL_SAFE_NO_PAD, URL_SAFE, STANDARD, STANDARD_NO_PAD];

/// Try each tolerated base64 flavour in turn.
pub(crate) fn decode_forgiving(value: &str) -> Option<Vec<u8>> {
    ALLOWED_DECODING_FORMATS
        .iter()
        .find_map(|engine| engine.decode(value).ok())
}

/// Owned bytes that serialise as a websafe base64 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base64UrlSafeData(pub Vec<u8>);

impl fmt::Display for Base64UrlSafeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", URL_SAFE_NO_PAD.encode(&self.0))
    }
}

impl From<Vec<u8>> for Base64UrlSafeData {
    fn from(data: Vec<u8>) -> Self {
        Base64UrlSafeData(data)
    }
}

impl From<&[u8]> for Base64UrlSafeData {
    fn from(data: &[u8]) -> Self {
        Base64UrlSafeData(data.to_vec())
    }
}

impl From<Base64UrlSafeData> for Vec<u8> {
    fn from(data: Base64UrlSafeData) -> Self {
        data.0
    }
}

impl AsRef<[u8]> for Base64UrlSafeData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

struct Base64UrlSafeDataVisitor;

impl<'de> Visitor<'de> for Base64UrlSafeDataVisitor {
    type Value = Base64UrlSafeData;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a base64 encoded string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        decode_forgiving(v)
            .map(Base64UrlSafeData)
            .ok_or_else(|| Error::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Base64UrlSafeData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(Base64UrlSafeDataVisitor)
    }
}

impl Serialize for Base64UrlSafeData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&URL_SAFE_NO_PAD.encode(&self.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::Base64UrlSafeData;

    #[test]
    fn decodes_any_tolerated_flavour() {
        // "hello?>" exercises the characters the alphabets disagree on.
        let expect = Base64UrlSafeData(vec![0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x3f, 0x3e]);
        for raw in ["\"aGVsbG8_Pg==\"", "\"aGVsbG8_Pg\"", "\"aGVsbG8/Pg==\"", "\"aGVsbG8/Pg\""] {
            let decoded: Base64UrlSafeData = serde_json::from_str(raw).unwrap();
            assert_eq!(decoded, expect);
        }
    }

    #[test]
    fn always_emits_websafe_without_padding() {
        let data = Base64UrlSafeData(vec![0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x3f, 0x3e]);
        assert_eq!(serde_json::to_string(&data).unwrap(), "\"aGVsbG8_Pg\"");
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Base64UrlSafeData>("\"!!not base64!!\"").is_err());
    }
}
