#![no_main]

use binn_format::varint::{decode_field, encode_field};
use binn_format::ContainerHeader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((value, consumed)) = decode_field(data) {
        assert!(consumed <= data.len());
        let encoded = encode_field(value).expect("decoded field re-encodes");
        assert!(encoded.len() <= consumed);
    }

    if let Ok((header, header_len)) = ContainerHeader::decode(data) {
        assert!(header_len <= header.size);
        assert!(header.size <= data.len());
    }
});
