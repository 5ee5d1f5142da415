//! `acw_sc__v2` cookie derivation.
//!
//! The challenge page embeds a 40 character token (`arg1`). The browser
//! script reorders it through a fixed permutation and XORs the result with a
//! fixed hex keystream; the server only releases the redirect once the
//! derived value comes back as the `acw_sc__v2` cookie.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use std::sync::LazyLock;

/// Cookie name the server checks.
pub const COOKIE_NAME: &str = "acw_sc__v2";

/// `POS_LIST[slot]` is the 1-indexed token position copied into `slot`.
const POS_LIST: [usize; 40] = [
    15, 35, 29, 24, 33, 16, 1, 38, 10, 9, 19, 31, 40, 27, 22, 23, 25, 13, 6, 11, 39, 18, 20, 8,
    14, 21, 32, 26, 2, 30, 7, 4, 17, 5, 3, 28, 34, 37, 12, 36,
];

const MASK_B64: &str = "MzAwMDE3NjAwMDg1NjAwNjA2MTUwMTUzMzAwMzY5MDAyNzgwMDM3NQ==";

static MASK: LazyLock<String> = LazyLock::new(|| {
    BASE64_STANDARD
        .decode(MASK_B64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
});

/// Inverse of `POS_LIST`: index `p` holds the slot for 1-indexed position `p`.
static SLOTS: LazyLock<[Option<usize>; 41]> = LazyLock::new(|| {
    let mut slots = [None; 41];
    for (slot, &pos) in POS_LIST.iter().enumerate() {
        slots[pos] = Some(slot);
    }
    slots
});

/// Decoded keystream.
pub fn mask() -> &'static str {
    MASK.as_str()
}

/// Reorder the token through the permutation table.
///
/// Characters beyond position 40 have no slot and are dropped, so the
/// output is only as long as the number of placed characters.
pub fn rearrange(token: &str) -> String {
    let mut output: [Option<char>; 40] = [None; 40];
    for (i, c) in token.chars().enumerate() {
        if let Some(Some(slot)) = SLOTS.get(i + 1) {
            output[*slot] = Some(c);
        }
    }
    output.iter().flatten().collect()
}

/// Parse the leading hex digits of a chunk, 0 when there are none.
fn parse_hex_chunk(chunk: &[char]) -> u8 {
    chunk
        .iter()
        .map_while(|c| c.to_digit(16))
        .fold(0u8, |acc, d| (acc << 4) | d as u8)
}

/// Derive the `acw_sc__v2` cookie value from a challenge token.
pub fn solve(token: &str) -> String {
    let data: Vec<char> = rearrange(token).chars().collect();
    let mask: Vec<char> = mask().chars().collect();

    let bytes: Vec<u8> = data
        .chunks(2)
        .zip(mask.chunks(2))
        .map(|(d, m)| parse_hex_chunk(d) ^ parse_hex_chunk(m))
        .collect();

    hex::encode(bytes)
}
