#![no_main]

use libfuzzer_sys::fuzz_target;
use vault::{CryptoError, Vault, IV_LEN};

fuzz_target!(|data: &[u8]| {
    let vault = Vault::with_key([0x42; 32]);
    match vault.decrypt(data) {
        Ok(_) | Err(CryptoError::CipherFailure) => assert!(data.len() > IV_LEN),
        Err(CryptoError::Malformed) => assert!(data.len() <= IV_LEN),
        Err(CryptoError::NotReady) => panic!("keyed vault reported NotReady"),
        Err(CryptoError::RandomFailure) => panic!("decrypt touched the randomness source"),
    }
});
