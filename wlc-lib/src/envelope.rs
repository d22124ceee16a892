//! The `{"data": "<base64>"}` request envelope.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::crypto::EnvelopeCipher;
use crate::{Result, WlcError};

/// Encrypted request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Standard base64 of `nonce || ciphertext || tag`.
    pub data: String,
}

impl RequestEnvelope {
    /// Serialize `payload` to JSON and seal it.
    pub fn seal<T: Serialize + ?Sized>(cipher: &EnvelopeCipher, payload: &T) -> Result<Self> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| WlcError::Serialization(format!("request parameters: {}", e)))?;
        let sealed = cipher.seal(&plaintext)?;

        Ok(Self {
            data: STANDARD.encode(sealed),
        })
    }

    /// Decrypt the envelope back to the raw JSON payload bytes.
    pub fn open_bytes(&self, cipher: &EnvelopeCipher) -> Result<Vec<u8>> {
        let sealed = STANDARD
            .decode(&self.data)
            .map_err(|e| WlcError::Decode(format!("envelope data is not base64: {}", e)))?;
        Ok(cipher.open(&sealed)?)
    }

    /// Decrypt and deserialize the envelope payload.
    pub fn open<T: DeserializeOwned>(&self, cipher: &EnvelopeCipher) -> Result<T> {
        let plaintext = self.open_bytes(cipher)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| WlcError::Decode(format!("envelope payload: {}", e)))
    }

    /// The literal body string that is both sent and signed.
    pub fn to_body(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| WlcError::Serialization(format!("request envelope: {}", e)))
    }

    /// Parse a body string produced by [`to_body`](Self::to_body).
    pub fn from_body(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| WlcError::Decode(format!("request envelope: {}", e)))
    }
}
