#![no_main]

use libfuzzer_sys::fuzz_target;
use peptrend::route::RouteParams;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(params) = RouteParams::parse(input) {
            // A parsed route must survive a round trip through its permalink
            let reparsed = RouteParams::parse(&params.to_hash());
            assert_eq!(reparsed, Ok(params));
        }
    }
});
