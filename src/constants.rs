/// Alphabet for public note urls: 26 upper + 26 lower + 10 digits
pub const SHORT_URL_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a generated short url (62^10 possible codes)
pub const SHORT_URL_LEN: usize = 10;

/// Maximum candidates tried before giving up on a unique short url
pub const MAX_SHORT_URL_ATTEMPTS: u32 = 16;

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "derive.sid";

/// Default session lifetime in seconds (1 day)
pub const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;

/// Longest accepted session lifetime in seconds (1 year)
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 86_400;

/// Random bytes in a session token (hex encoded in the cookie)
pub const SESSION_TOKEN_BYTES: usize = 32;

// =============================================================================
// Error Messages
// =============================================================================

pub const ERR_EMAIL_REQUIRED: &str = "Email is required";
pub const ERR_NAME_REQUIRED: &str = "Name is required";
pub const ERR_PASSWORD_REQUIRED: &str = "Password is required";
pub const ERR_ID_REQUIRED: &str = "Id is required";

/// Returned when an update tries to null out a note's name
pub const ERR_NAME_NOT_NULL: &str = "Name cannot be null";
