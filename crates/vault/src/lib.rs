//! Sealed-container handling for ledger files.
//!
//! A [`Vault`] holds one AES-256 key and seals or unseals byte blobs in
//! the fixed container layout `IV || ciphertext` (AES-256-CBC, PKCS#7
//! padding, 16-byte random IV). Key material is sourced from a key file
//! that may be base64, hex, or raw bytes.

use std::path::Path;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, warn};

mod error;
mod key;

pub use error::{CryptoError, KeyError};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// CBC initialization vector length in bytes.
pub const IV_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Holds the ledger encryption key, if one has been loaded.
#[derive(Default)]
pub struct Vault {
    key: Option<[u8; KEY_LEN]>,
}

impl Vault {
    /// A vault with no key. [`Vault::encrypt`] and [`Vault::decrypt`]
    /// fail with [`CryptoError::NotReady`] until a key is loaded.
    pub fn new() -> Self {
        Self { key: None }
    }

    /// A vault primed with an in-memory key.
    pub fn with_key(key: [u8; KEY_LEN]) -> Self {
        Self { key: Some(key) }
    }

    /// Load key material from a file. See [`KeyError`] for the failure
    /// modes; on failure any previously loaded key is kept.
    pub fn load_key(&mut self, path: &Path) -> Result<(), KeyError> {
        let raw = std::fs::read(path)?;
        let Some(key) = key::decode_key_material(&raw) else {
            warn!(path = %path.display(), "key file is not a valid 32-byte key");
            return Err(KeyError::InvalidFormat);
        };
        self.key = Some(key);
        debug!(path = %path.display(), "encryption key loaded");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.key.is_some()
    }

    /// Seal a plaintext into an `IV || ciphertext` container under a
    /// fresh random IV.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let Some(key) = self.key.as_ref() else {
            return Err(CryptoError::NotReady);
        };

        let mut iv = [0u8; IV_LEN];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|_| CryptoError::RandomFailure)?;

        let cipher =
            Aes256CbcEnc::new_from_slices(key, &iv).map_err(|_| CryptoError::CipherFailure)?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut sealed = Vec::with_capacity(IV_LEN + ciphertext.len());
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Unseal an `IV || ciphertext` container.
    ///
    /// Containers too short to hold both parts are [`CryptoError::Malformed`].
    /// Everything the cipher rejects, including decryption under the
    /// wrong key, is [`CryptoError::CipherFailure`] with no finer detail.
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let Some(key) = self.key.as_ref() else {
            return Err(CryptoError::NotReady);
        };
        if sealed.len() <= IV_LEN {
            return Err(CryptoError::Malformed);
        }

        let (iv, ciphertext) = sealed.split_at(IV_LEN);
        let cipher =
            Aes256CbcDec::new_from_slices(key, iv).map_err(|_| CryptoError::CipherFailure)?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::CipherFailure)
    }
}
