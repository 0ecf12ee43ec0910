#![no_main]

use bacobj_core::encoding::reader::Reader;
use bacobj_core::encoding::value::decode_application_data_value;
use bacobj_core::encoding::writer::Writer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    if let Ok(value) = decode_application_data_value(&mut r) {
        // Anything that decodes must re-encode without error into a buffer
        // no larger than the input it came from (plus tag overhead).
        let mut buf = vec![0u8; data.len() + 8];
        let mut w = Writer::new(&mut buf);
        let _ = bacobj_core::encoding::value::encode_application_data_value(&mut w, &value);
    }
});
