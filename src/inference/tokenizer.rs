//! Word tokenizer shared by the model-backed and heuristic paths.

/// Characters that may appear inside a token.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '\''
}

/// Split text into lowercase tokens.
///
/// A token is a maximal run of ASCII letters and apostrophes. Digits,
/// whitespace, punctuation and non-ASCII characters separate tokens and are
/// dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if is_token_char(ch) {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
