//! Fixed values of the U2F_V2 message family.

/// Protocol version every token this library talks to must speak.
pub const U2F_VERSION: &str = "U2F_V2";

// Can this ever change?
/// Size of the random challenge nonce before websafe base64 encoding.
pub const CHALLENGE_SIZE_BYTES: usize = 32;

/// The single defined user presence bit. Bits 1 through 7 are reserved
/// and must be zero, so the whole byte is compared, not just bit 0.
pub const USER_PRESENT_FLAG: u8 = 0x01;

/// Client data `typ` for an authentication ceremony.
pub const CLIENT_DATA_TYPE_AUTHENTICATE: &str = "navigator.id.getAssertion";

/// Client data `typ` for a registration ceremony. This library does not
/// verify registrations, but the constant is declared so the two
/// ceremonies can never be mistaken for one another.
pub const CLIENT_DATA_TYPE_REGISTER: &str = "navigator.id.finishEnrollment";
