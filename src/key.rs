use crate::error::{ColumnCryptError, Result};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Which half of a key pair an operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Public,
    Private,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Private => write!(f, "private"),
        }
    }
}

/// Loaded RSA key, read-only for the rest of the run
#[derive(Debug, Clone)]
pub enum KeyHandle {
    Public(RsaPublicKey),
    Private(RsaPrivateKey),
}

impl KeyHandle {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Public(_) => KeyKind::Public,
            Self::Private(_) => KeyKind::Private,
        }
    }

    /// Modulus size in bytes
    pub fn modulus_bytes(&self) -> usize {
        match self {
            Self::Public(key) => key.size(),
            Self::Private(key) => key.size(),
        }
    }
}

/// Load a key of the expected kind from a PEM or DER file
///
/// Public keys: SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`).
/// Private keys: PKCS#1 (`RSA PRIVATE KEY`) or unencrypted PKCS#8 (`PRIVATE KEY`).
pub fn load_key(path: &Path, expected: KeyKind) -> Result<KeyHandle> {
    let bytes = std::fs::read(path).map_err(|e| ColumnCryptError::KeyFormat {
        path: path.to_path_buf(),
        expected,
        reason: format!("cannot read key file: {}", e),
    })?;

    let handle = parse_key(&bytes, expected).map_err(|reason| ColumnCryptError::KeyFormat {
        path: path.to_path_buf(),
        expected,
        reason,
    })?;

    debug!(
        path = %path.display(),
        kind = %expected,
        bits = handle.modulus_bytes() * 8,
        "Loaded key"
    );
    Ok(handle)
}

/// Parse key material already in memory. The error is a human-readable reason.
pub fn parse_key(bytes: &[u8], expected: KeyKind) -> std::result::Result<KeyHandle, String> {
    match expected {
        KeyKind::Public => {
            if let Some(key) = parse_public(bytes) {
                Ok(KeyHandle::Public(key))
            } else if parse_private(bytes).is_some() {
                Err("found a private key".to_string())
            } else {
                Err(unrecognized_reason(bytes))
            }
        }
        KeyKind::Private => {
            if let Some(key) = parse_private(bytes) {
                Ok(KeyHandle::Private(key))
            } else if parse_public(bytes).is_some() {
                Err("found a public key".to_string())
            } else {
                Err(unrecognized_reason(bytes))
            }
        }
    }
}

fn pem_text(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes)
        .ok()
        .map(str::trim)
        .filter(|text| text.starts_with("-----BEGIN"))
}

fn parse_public(bytes: &[u8]) -> Option<RsaPublicKey> {
    match pem_text(bytes) {
        Some(text) => RsaPublicKey::from_public_key_pem(text)
            .ok()
            .or_else(|| RsaPublicKey::from_pkcs1_pem(text).ok()),
        None => RsaPublicKey::from_public_key_der(bytes)
            .ok()
            .or_else(|| RsaPublicKey::from_pkcs1_der(bytes).ok()),
    }
}

fn parse_private(bytes: &[u8]) -> Option<RsaPrivateKey> {
    match pem_text(bytes) {
        Some(text) => RsaPrivateKey::from_pkcs1_pem(text)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs8_pem(text).ok()),
        None => RsaPrivateKey::from_pkcs1_der(bytes)
            .ok()
            .or_else(|| RsaPrivateKey::from_pkcs8_der(bytes).ok()),
    }
}

fn unrecognized_reason(bytes: &[u8]) -> String {
    match pem_text(bytes) {
        Some(text) if text.contains("ENCRYPTED") => {
            "passphrase-protected keys are not supported".to_string()
        }
        Some(text) => {
            let label = text
                .lines()
                .next()
                .unwrap_or_default()
                .trim_matches('-')
                .trim_start_matches("BEGIN ");
            format!("unsupported PEM block: {}", label)
        }
        None => "not an RSA key in PEM or DER format".to_string(),
    }
}
