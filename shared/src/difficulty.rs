/// the string a winning digest has to start with
pub fn difficulty_target(difficulty: u32) -> String {
    "0".repeat(difficulty as usize)
}

/// `true` when the first `difficulty` characters of the hex digest are all `'0'`.
///
/// This is a prefix comparison on lowercase hex text, not a numeric bound.
/// A difficulty longer than the digest can never be met.
pub fn meets_difficulty(hex_digest: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    match hex_digest.as_bytes().get(..difficulty) {
        Some(prefix) => prefix.iter().all(|c| *c == b'0'),
        None => false,
    }
}

/// a block asking for no work marks the end of the chain
pub fn requires_work(difficulty: u32) -> bool {
    difficulty > 0
}
