#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Layout: 8 bytes nonce, 8 bytes difficulty, remaining bytes payload.
    if data.len() < 16 {
        return;
    }
    let nonce = u64::from_be_bytes(data[..8].try_into().unwrap());
    let difficulty = u64::from_be_bytes(data[8..16].try_into().unwrap());
    let payload = &data[16..];

    // Verification must never panic and must agree with the raw work value.
    let value = powork_work::work_difficulty(payload, nonce);
    assert_eq!(
        powork_work::verify_work(payload, difficulty, nonce),
        value >= difficulty
    );
    assert!(powork_work::verify_work(payload, 0, nonce));
});
