#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_zone::zones::types::Zone;

fuzz_target!(|data: &str| {
    if let Ok(zone) = Zone::load_str(data, None) {
        let dumped = zone.dump();
        match Zone::load_str(&dumped, None) {
            Ok(reloaded) => assert_eq!(zone.records.len(), reloaded.records.len(), "{dumped}"),
            Err(error) => panic!("expected successful reload: {error}"),
        }
    }
});
