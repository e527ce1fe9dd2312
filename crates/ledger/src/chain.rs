use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use md5::{Digest, Md5};
use tracing::{debug, warn};

use crate::record::InvoiceRecord;

/// Raw MD5 output length in bytes, before base64 encoding.
pub const CHAIN_DIGEST_LEN: usize = 16;

/// Compute the link digest for one record given the previous record's
/// stored hash.
///
/// The digest covers the concatenation of the article code, the decimal
/// rendering of quantity and timestamp, and the previous hash, in that
/// order. The very first record links against the empty string.
pub fn link_digest(article: &str, quantity: u32, timestamp: i64, previous_hash: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(article.as_bytes());
    hasher.update(quantity.to_string().as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(previous_hash.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Walk the ledger and flag every record from the first broken link
/// onward.
///
/// Each record's expected digest is recomputed from its fields and the
/// previous record's *stored* hash. On a match the chain advances to the
/// stored hash, so a ledger whose stored hashes are internally consistent
/// verifies end to end. The first mismatch invalidates that record and
/// the whole suffix after it; later records are not re-examined because
/// their link base is already untrusted.
pub fn verify_chain(records: &mut [InvoiceRecord]) {
    let mut previous_hash = String::new();
    for index in 0..records.len() {
        let expected = link_digest(
            &records[index].article,
            records[index].quantity,
            records[index].timestamp,
            &previous_hash,
        );
        if expected == records[index].hash {
            records[index].valid = true;
            previous_hash = records[index].hash.clone();
            continue;
        }

        warn!(
            index,
            expected = %expected,
            stored = %records[index].hash,
            "hash chain broken, invalidating suffix"
        );
        for record in &mut records[index..] {
            record.valid = false;
        }
        return;
    }
    debug!(records = records.len(), "hash chain verified");
}
