use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a random PKCE code verifier (43 URL-safe characters).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute the S256 PKCE code challenge from a verifier.
pub fn code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// The `state` tag sent with an attempt, derived from its verifier so a
/// resumed attempt keeps the same tag. It does not reveal the verifier.
pub fn attempt_state(verifier: &str) -> String {
    let hash = Sha256::digest(format!("state:{verifier}").as_bytes());
    URL_SAFE_NO_PAD.encode(&hash[..12])
}
