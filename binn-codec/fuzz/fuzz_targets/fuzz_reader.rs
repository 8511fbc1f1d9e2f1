#![no_main]

use binn_codec::{to_json, ContainerRef, Item};
use libfuzzer_sys::fuzz_target;

// Readers must stay in bounds on unvalidated bytes too.
fuzz_target!(|data: &[u8]| {
    if let Ok((Item::Container(c), _)) = Item::read(data) {
        for entry in c.entries() {
            if let Ok((_, item)) = entry {
                let _ = item.as_i64();
                let _ = item.as_f64();
                let _ = item.as_str();
            }
        }
        let _ = c.list_get(1);
        let _ = c.map_get(0);
        let _ = c.object_get("");
    }

    if let Ok(reader) = ContainerRef::open(data) {
        for entry in reader.entries() {
            assert!(entry.is_ok());
        }
        let _ = to_json(&Item::Container(reader));
    }
});
