use std::fmt;
use std::io;

/// Failure to turn a key file into usable key material.
#[derive(Debug)]
pub enum KeyError {
    Io(io::Error),
    /// The file was readable but no supported encoding produced a
    /// 32-byte key.
    InvalidFormat,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read key file: {}", err),
            Self::InvalidFormat => write!(f, "key file does not contain a 32-byte key"),
        }
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidFormat => None,
        }
    }
}

impl From<io::Error> for KeyError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Failure of a seal or unseal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// No key has been loaded yet.
    NotReady,
    /// The operating system randomness source failed.
    RandomFailure,
    /// The cipher rejected the input. Wrong keys and corrupt ciphertext
    /// both land here; callers get no finer detail.
    CipherFailure,
    /// The sealed container is too short to hold an IV and ciphertext.
    Malformed,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "no encryption key loaded"),
            Self::RandomFailure => write!(f, "system randomness unavailable"),
            Self::CipherFailure => write!(f, "cipher operation failed"),
            Self::Malformed => write!(f, "sealed container is malformed"),
        }
    }
}

impl std::error::Error for CryptoError {}
