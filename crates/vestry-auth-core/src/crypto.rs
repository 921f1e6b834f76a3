//! HMAC-SHA256 keying for gate tokens

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Keyed HMAC-SHA256 instance.
///
/// The key is validated and absorbed once; signing clones the keyed state.
#[derive(Clone)]
pub struct HmacKey {
    mac: HmacSha256,
    key_len: usize,
}

impl HmacKey {
    /// Shortest accepted secret, in bytes
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Key an HMAC with `secret`.
    ///
    /// # Errors
    /// Returns [`HmacKeyError::KeyTooShort`] below [`Self::MIN_KEY_LENGTH`].
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let secret = secret.as_ref();
        if secret.len() < Self::MIN_KEY_LENGTH {
            return Err(HmacKeyError::KeyTooShort {
                actual: secret.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }

        let mac = HmacSha256::new_from_slice(secret).map_err(|_| HmacKeyError::Rejected)?;
        Ok(Self {
            mac,
            key_len: secret.len(),
        })
    }

    /// MAC of `data`
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Check `tag` against the MAC of `data` in constant time
    pub fn verify(&self, data: &[u8], tag: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.verify_slice(tag).is_ok()
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("key_len", &self.key_len)
            .finish_non_exhaustive()
    }
}

/// Key setup errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum HmacKeyError {
    #[error("gate secret too short: got {actual} bytes, need at least {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },

    #[error("gate secret rejected by HMAC")]
    Rejected,
}
