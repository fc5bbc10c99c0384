#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_zone::zones::entries::extract_entries;

fuzz_target!(|data: &str| {
    for entry in extract_entries(data) {
        assert!(!entry.trim().is_empty());
        assert!(!entry.ends_with(' '));
    }
});
