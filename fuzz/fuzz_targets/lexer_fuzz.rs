//! Lexer fuzz target: feed arbitrary text to the lexer and, when it lexes,
//! run the literals through a resource template.
//! The lexer must not panic; it returns tokens or a LexError.
//! Build with: cargo fuzz run lexer_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let Ok(tokens) = kdlc::lex(s) else {
        return;
    };

    let Ok(template) = kdlc::Template::from_slots(&[
        ("word", kdlc::BinaryType::Dwrd),
        ("text", kdlc::BinaryType::Cnnn(8)),
        ("blob", kdlc::BinaryType::Hexd),
    ]) else {
        return;
    };
    let mut resource = kdlc::Resource::new("fuzz", 0, "", &template);
    for (token, slot) in tokens.iter().zip(["word", "text", "blob"].iter().cycle()) {
        let _ = resource.write_token(slot, token);
    }
    if let Ok(bytes) = resource.assemble() {
        let mut back = kdlc::Resource::new("fuzz", 0, "", &template);
        let _ = back.import(&bytes);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run lexer_fuzz");
}
