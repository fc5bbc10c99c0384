#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_zone::record::types::ResourceRecord;
use dns_zone::zones::deserialise::ParseContext;

fuzz_target!(|rr: ResourceRecord| {
    let encoded = rr.encode();
    assert_eq!(
        Some(rr),
        ResourceRecord::decode(&encoded, &ParseContext::default()),
        "{encoded}"
    );
});
