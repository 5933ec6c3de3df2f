#![no_main]

use libfuzzer_sys::fuzz_target;
use peptrend::logparse::parse_log;

fuzz_target!(|data: &[u8]| {
    // Arbitrary log bodies must either parse or return an error
    if let Ok(log) = parse_log(data, "mozilla-central_linux_test-peptest.txt", None) {
        let _ = log.into_records(None);
    }
});
