//! Project file integrity token
//!
//! Every project file stores `metadata.project_id`, a hex-encoded AES-256-GCM
//! encryption of a fixed magic value. Loading decrypts it and compares with
//! the magic value. The key ships with the program, so this only tells
//! "written by packsmith" apart from arbitrary JSON; it is not tamper-proofing.

use crate::{Error, Result};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use sha2::{Digest, Sha256};

const MAGIC: &[u8] = b"packsmith/modpack-project";
const KEY_PHRASE: &[u8] = b"packsmith project integrity key v1";
const NONCE: [u8; 12] = *b"packsmith-v1";

fn cipher() -> Result<Aes256Gcm> {
    let key = Sha256::digest(KEY_PHRASE);
    Aes256Gcm::new_from_slice(&key)
        .map_err(|e| Error::Other(format!("Failed to initialise integrity cipher: {}", e)))
}

/// Produce the integrity token stamped into new projects
///
/// The token is deterministic: every call returns the same string.
pub fn generate_token() -> Result<String> {
    let sealed = cipher()?
        .encrypt(Nonce::from_slice(&NONCE), MAGIC)
        .map_err(|e| Error::Other(format!("Failed to generate integrity token: {}", e)))?;
    Ok(hex::encode(sealed))
}

/// Check a token read from a project file
pub fn verify_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::InvalidProject(
            "metadata.project_id is missing".to_string(),
        ));
    }

    let sealed = hex::decode(token.trim()).map_err(|_| {
        Error::InvalidProject("metadata.project_id is not a valid token".to_string())
    })?;

    let opened = cipher()?
        .decrypt(Nonce::from_slice(&NONCE), sealed.as_slice())
        .map_err(|_| {
            Error::InvalidProject("metadata.project_id was not issued by packsmith".to_string())
        })?;

    if opened != MAGIC {
        return Err(Error::InvalidProject(
            "metadata.project_id does not match this tool".to_string(),
        ));
    }

    Ok(())
}
