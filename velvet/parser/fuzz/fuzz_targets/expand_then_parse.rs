#![no_main]
use libfuzzer_sys::fuzz_target;
use velvet_parser::{expand_source, parse_expanded, MacroTable, TextualExpander};

// Expanding text without macro declarations must not change it
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if s.contains("!macro") {
            return;
        }
        let mut table = MacroTable::default();
        if let Ok(expanded) = expand_source(s, &mut table, &TextualExpander) {
            assert_eq!(expanded, s);
            let _ = parse_expanded(&expanded);
        }
    }
});
