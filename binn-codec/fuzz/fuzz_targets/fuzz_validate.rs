#![no_main]

use binn_codec::{encoded_size, validate, Value};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = encoded_size(data);

    if let Ok(header) = validate(data) {
        assert!(header.size <= data.len());

        // A valid container reloads into an identical compact encoding.
        if header.type_tag.is_container() {
            let value = Value::from_bytes(data).expect("validated container reloads");
            let again = Value::from_bytes(value.as_bytes()).expect("compact form reloads");
            assert_eq!(value.as_bytes(), again.as_bytes());
        }
    }
});
