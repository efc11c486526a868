//! Bearer token codec.
//!
//! Tokens are self-describing strings of the form
//! `token_<64 hex chars>_<user uuid>`. The hex segment is 32 bytes of
//! CSPRNG output and is never persisted; the user id rides in the token
//! itself, so authentication is a decode plus a user lookup. There is no
//! signature and no expiry. Swapping this scheme for signed or
//! server-side tokens only touches this module and the extractor.

use rand::RngCore;
use uuid::Uuid;

const TOKEN_PREFIX: &str = "token_";
const SECRET_BYTES: usize = 32;

/// Why a presented token was rejected. The display strings double as the
/// client-facing 401 messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Missing the `token_` prefix.
    #[error("Invalid token format")]
    BadPrefix,
    /// Prefix is there but the rest does not parse.
    #[error("Invalid token")]
    Malformed,
}

/// Issues a fresh bearer token for `user_id`.
pub fn issue(user_id: Uuid) -> String {
    let mut secret = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut secret);
    format!("{TOKEN_PREFIX}{}_{user_id}", hex::encode(secret))
}

/// Recovers the user id embedded in a presented token.
pub fn decode(token: &str) -> Result<Uuid, TokenError> {
    if !token.starts_with(TOKEN_PREFIX) {
        return Err(TokenError::BadPrefix);
    }
    let parts: Vec<&str> = token.split('_').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed);
    }
    Uuid::parse_str(parts[2]).map_err(|_| TokenError::Malformed)
}
