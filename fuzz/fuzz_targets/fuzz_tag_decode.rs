#![no_main]

use bacobj_core::encoding::reader::Reader;
use bacobj_core::encoding::tag::Tag;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    // Decoding must never panic or read out of bounds, only return errors.
    while Tag::decode(&mut r).is_ok() {
        if r.is_empty() {
            break;
        }
    }
});
