#![no_main]

use ledger::{parse_ledger, verify_chain};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut records) = parse_ledger(data) else {
        return;
    };

    verify_chain(&mut records);
    let first: Vec<bool> = records.iter().map(|r| r.valid).collect();
    verify_chain(&mut records);
    let second: Vec<bool> = records.iter().map(|r| r.valid).collect();
    assert_eq!(first, second, "verification must be idempotent");
});
