use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::constants::SESSION_TOKEN_BYTES;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with Argon2id and a random salt
///
/// Returns the PHC string (algorithm, parameters, salt and hash), e.g.
/// `$argon2id$v=19$m=19456,t=2,p=1$...`
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(format!("Hash generation failed: {}", e)))
}

/// Verify a password against a stored PHC hash
///
/// Returns `Ok(false)` on mismatch. The comparison is constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::PasswordHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::PasswordHash(format!("Verification failed: {}", e))),
    }
}

// =============================================================================
// Session Tokens
// =============================================================================

/// Generate a fresh opaque session token (hex encoded random bytes)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compute the hex-encoded HMAC-SHA256 of `data` under `secret`
pub fn sign_hmac(data: &str, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Signing(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify HMAC-SHA256 signature
///
/// # Arguments
/// * `data` - The data that was signed
/// * `signature` - The hex-encoded HMAC signature
/// * `secret` - The signing secret (from environment)
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Build the cookie value for a session token: `<token>.<signature>`
pub fn sign_session_token(token: &str, secret: &str) -> Result<String, AppError> {
    Ok(format!("{}.{}", token, sign_hmac(token, secret)?))
}

/// Split a signed cookie value and return the token if the signature holds
pub fn unsign_session_token<'a>(value: &'a str, secret: &str) -> Option<&'a str> {
    let (token, signature) = value.rsplit_once('.')?;
    if token.is_empty() || !verify_hmac(token, signature, secret) {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_argon2id() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter2"));
    }

    #[test]
    fn test_hash_password_is_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(verify_password("p", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_generate_session_token() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), SESSION_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_hmac_valid() {
        let signature = sign_hmac("test data", "test-secret-key").unwrap();
        assert!(verify_hmac("test data", &signature, "test-secret-key"));
    }

    #[test]
    fn test_verify_hmac_invalid_signature() {
        assert!(!verify_hmac("test data", &"0".repeat(64), "test-secret-key"));
        assert!(!verify_hmac("test data", "not-hex", "test-secret-key"));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let signature = sign_hmac("test data", "test-secret-key").unwrap();
        assert!(!verify_hmac("test data", &signature, "wrong-secret"));
    }

    #[test]
    fn test_session_token_roundtrip() {
        let token = generate_session_token();
        let cookie = sign_session_token(&token, "secret").unwrap();
        assert_eq!(unsign_session_token(&cookie, "secret"), Some(token.as_str()));
    }

    #[test]
    fn test_unsign_rejects_tampering() {
        let cookie = sign_session_token("abc", "secret").unwrap();
        assert_eq!(unsign_session_token(&cookie, "other"), None);

        let forged = cookie.replacen("abc", "abd", 1);
        assert_eq!(unsign_session_token(&forged, "secret"), None);

        assert_eq!(unsign_session_token("no-dot", "secret"), None);
        assert_eq!(unsign_session_token(".deadbeef", "secret"), None);
    }
}
