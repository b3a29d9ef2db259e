use crate::error::CellError;
use crate::options::OaepHash;
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};

fn padding(hash: OaepHash) -> Oaep {
    match hash {
        OaepHash::Sha1 => Oaep::new::<sha1::Sha1>(),
        OaepHash::Sha256 => Oaep::new::<sha2::Sha256>(),
    }
}

/// Largest plaintext (bytes) that fits under the key modulus with OAEP overhead
pub fn max_payload(key: &RsaPublicKey, hash: OaepHash) -> usize {
    key.size().saturating_sub(2 * hash.digest_len() + 2)
}

/// RSA-OAEP encrypt one value and base64 it for embedding in a text file
/// Each call draws a fresh OAEP seed, so equal inputs give different output
pub fn encrypt_value(
    value: &[u8],
    key: &RsaPublicKey,
    hash: OaepHash,
) -> std::result::Result<String, CellError> {
    let max = max_payload(key, hash);
    if value.len() > max {
        return Err(CellError::PayloadTooLarge {
            len: value.len(),
            max,
        });
    }

    let ciphertext = key
        .encrypt(&mut OsRng, padding(hash), value)
        .map_err(|e| CellError::Encryption(e.to_string()))?;
    Ok(STANDARD.encode(ciphertext))
}

/// Reverse `encrypt_value`: base64 decode, then RSA-OAEP decrypt
/// Embedded whitespace is ignored so line-wrapped base64 is accepted
pub fn decrypt_value(
    text: &[u8],
    key: &RsaPrivateKey,
    hash: OaepHash,
) -> std::result::Result<Vec<u8>, CellError> {
    let compact: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(CellError::EmptyCiphertext);
    }

    let ciphertext = STANDARD
        .decode(&compact)
        .map_err(|e| CellError::InvalidEncoding(e.to_string()))?;

    key.decrypt(padding(hash), &ciphertext)
        .map_err(|_| CellError::Decryption)
}
