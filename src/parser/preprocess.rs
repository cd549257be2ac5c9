use crate::kb::InputToken;

/// Inflected verb tags collapsed onto bare `VB` before lexicon lookup.
const VERB_TAGS: [&str; 5] = ["VBG", "VBZ", "VBN", "VBD", "VBP"];

/// Split whitespace-separated `word/TAG` tokens, collapsing inflected
/// verb tags. A token without a slash gets the empty tag.
pub fn preprocess(input: &str) -> Vec<InputToken> {
    input
        .split_whitespace()
        .map(|piece| {
            let (word, tag) = match piece.rsplit_once('/') {
                Some((word, tag)) => (word, tag),
                None => (piece, ""),
            };
            let tag = if VERB_TAGS.contains(&tag) { "VB" } else { tag };
            InputToken::new(word, tag)
        })
        .collect()
}
