//! AES-GCM sealing of request payloads.
//!
//! The shared secret is a hex string; its decoded bytes are the AES key, so
//! the secret must decode to 16, 24 or 32 bytes (AES-128/192/256).
//!
//! # Wire Format
//!
//! ```text
//! [12 bytes nonce][N bytes ciphertext][16 bytes auth tag]
//! ```
//!
//! The nonce is random per call and travels as the prefix of the sealed blob.

use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use rand::RngCore;
use zeroize::Zeroizing;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Size of the nonce in bytes (96 bits for GCM).
pub const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Cipher error types.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("entropy source failed: {0}")]
    Entropy(String),
    #[error("encryption failed: {0}")]
    EncryptFailed(String),
    #[error("decryption failed: {0}")]
    DecryptFailed(String),
    #[error("sealed payload too short")]
    InvalidFormat,
}

/// Result type for cipher operations.
pub type CipherResult<T> = Result<T, CipherError>;

#[derive(Clone)]
enum Inner {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM cipher keyed by the hex-decoded shared secret.
#[derive(Clone)]
pub struct EnvelopeCipher {
    inner: Inner,
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeCipher")
            .field("key_bits", &self.key_bits())
            .finish()
    }
}

impl EnvelopeCipher {
    /// Build a cipher from a hex-encoded shared secret.
    ///
    /// Fails if the secret is not valid hex or does not decode to an AES key
    /// length.
    pub fn from_hex_secret(secret: &str) -> CipherResult<Self> {
        let key = Zeroizing::new(
            hex::decode(secret).map_err(|e| CipherError::InvalidKey(format!("not hex: {e}")))?,
        );
        Self::from_key(&key)
    }

    /// Build a cipher from raw key bytes.
    pub fn from_key(key: &[u8]) -> CipherResult<Self> {
        let inner = match key.len() {
            16 => Aes128Gcm::new_from_slice(key).map(Inner::Aes128),
            24 => Aes192Gcm::new_from_slice(key).map(Inner::Aes192),
            32 => Aes256Gcm::new_from_slice(key).map(Inner::Aes256),
            n => {
                return Err(CipherError::InvalidKey(format!(
                    "{n} bytes, expected 16, 24 or 32"
                )))
            }
        }
        .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Key size in bits.
    pub fn key_bits(&self) -> usize {
        match self.inner {
            Inner::Aes128(_) => 128,
            Inner::Aes192(_) => 192,
            Inner::Aes256(_) => 256,
        }
    }

    /// Seal `plaintext` under a fresh random nonce.
    ///
    /// Returns `nonce || ciphertext || tag`.
    pub fn seal(&self, plaintext: &[u8]) -> CipherResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng()
            .try_fill_bytes(&mut nonce_bytes)
            .map_err(|e| CipherError::Entropy(e.to_string()))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = match &self.inner {
            Inner::Aes128(c) => c.encrypt(nonce, plaintext),
            Inner::Aes192(c) => c.encrypt(nonce, plaintext),
            Inner::Aes256(c) => c.encrypt(nonce, plaintext),
        }
        .map_err(|e| CipherError::EncryptFailed(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a blob produced by [`seal`](Self::seal).
    pub fn open(&self, sealed: &[u8]) -> CipherResult<Vec<u8>> {
        if sealed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::InvalidFormat);
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        match &self.inner {
            Inner::Aes128(c) => c.decrypt(nonce, ciphertext),
            Inner::Aes192(c) => c.decrypt(nonce, ciphertext),
            Inner::Aes256(c) => c.decrypt(nonce, ciphertext),
        }
        .map_err(|_| CipherError::DecryptFailed("authentication failed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SECRET: &str = "bbd3322487be9f3b2af1e7d1d3734f41";

    #[test]
    fn test_seal_open_roundtrip() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        let plaintext = br#"{"ai":"100000000000000001"}"#;

        let sealed = cipher.seal(plaintext).unwrap();
        assert_eq!(cipher.open(&sealed).unwrap(), plaintext);
    }

    #[test]
    fn test_sealed_format() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        let sealed = cipher.seal(b"test").unwrap();

        // nonce (12) + plaintext (4) + tag (16)
        assert_eq!(sealed.len(), NONCE_SIZE + 4 + TAG_SIZE);
    }

    #[test]
    fn test_key_sizes() {
        assert_eq!(EnvelopeCipher::from_key(&[1u8; 16]).unwrap().key_bits(), 128);
        assert_eq!(EnvelopeCipher::from_key(&[1u8; 24]).unwrap().key_bits(), 192);
        assert_eq!(EnvelopeCipher::from_key(&[1u8; 32]).unwrap().key_bits(), 256);
        assert!(matches!(
            EnvelopeCipher::from_key(&[1u8; 20]),
            Err(CipherError::InvalidKey(_))
        ));
        assert!(matches!(
            EnvelopeCipher::from_key(&[]),
            Err(CipherError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(matches!(
            EnvelopeCipher::from_hex_secret("not-a-hex-secret"),
            Err(CipherError::InvalidKey(_))
        ));
        // odd length
        assert!(EnvelopeCipher::from_hex_secret("abc").is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        let other = EnvelopeCipher::from_key(&[7u8; 16]).unwrap();

        let sealed = cipher.seal(b"secret").unwrap();
        assert!(matches!(
            other.open(&sealed),
            Err(CipherError::DecryptFailed(_))
        ));
    }

    #[test]
    fn test_tampering_detected() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        let mut sealed = cipher.seal(b"secret").unwrap();

        let last = sealed.len() - 1;
        sealed[last] ^= 1;
        assert!(cipher.open(&sealed).is_err());

        let mut sealed = cipher.seal(b"secret").unwrap();
        sealed[0] ^= 1;
        assert!(cipher.open(&sealed).is_err());
    }

    #[test]
    fn test_short_input_rejected() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        assert!(matches!(
            cipher.open(&[0u8; NONCE_SIZE + TAG_SIZE - 1]),
            Err(CipherError::InvalidFormat)
        ));
    }

    #[test]
    fn test_nonces_never_repeat() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        let mut seen = HashSet::new();

        for _ in 0..2000 {
            let sealed = cipher.seal(b"same payload").unwrap();
            let nonce: [u8; NONCE_SIZE] = sealed[..NONCE_SIZE].try_into().unwrap();
            assert!(seen.insert(nonce), "nonce reused");
        }
    }

    #[test]
    fn test_debug_hides_key() {
        let cipher = EnvelopeCipher::from_hex_secret(SECRET).unwrap();
        let debug = format!("{:?}", cipher);
        assert!(debug.contains("128"));
        assert!(!debug.contains("bbd3"));
    }
}
