//! Han script helpers
//!
//! Exercises are ranked partly by how many Chinese characters they contain.
//! Punctuation, Latin letters, digits and full-width symbols don't count.

/// Whether `c` belongs to the Han script (ideographs, radicals and the
/// handful of ideographic marks such as 々 and 〇).
pub fn is_han(c: char) -> bool {
    matches!(c as u32,
        0x2E80..=0x2E99
        | 0x2E9B..=0x2EF3
        | 0x2F00..=0x2FD5
        | 0x3005
        | 0x3007
        | 0x3021..=0x3029
        | 0x3038..=0x303B
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFA6D
        | 0xFA70..=0xFAD9
        | 0x16FE2..=0x16FE3
        | 0x16FF0..=0x16FF1
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x2F800..=0x2FA1F
        | 0x30000..=0x323AF
    )
}

pub fn han_character_count(text: &str) -> usize {
    text.chars().filter(|c| is_han(*c)).count()
}
