#![no_main]

use libfuzzer_sys::fuzz_target;
use nfe_bridge::core::{classify_buyer, resolve_operation, Direction};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mid = s.char_indices().nth(s.chars().count() / 2).map_or(s.len(), |(i, _)| i);
        let (left, right) = s.split_at(mid);
        let _ = classify_buyer(left, right);
        let _ = resolve_operation(s, Direction::Incoming, left, right);
        let _ = resolve_operation(s, Direction::Outgoing, right, left);
        let _ = s.parse::<Direction>();
    }
});
