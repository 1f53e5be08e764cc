//! Deterministic identifier conversion.
//!
//! Exported names are split at recorded word boundaries — underscores and
//! lower-to-upper case changes — then reassembled in the host convention:
//! snake_case for methods, PascalCase for the client type. The split is a
//! pure function of its input, so the same exported name always yields the
//! same identifier, and converting an already-converted name is a no-op.

/// Split a name into lowercase words at `_` and case boundaries.
#[must_use]
pub fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in name.chars() {
        if ch == '_' {
            if !current.is_empty() {
                words.push(current.clone());
                current.clear();
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(current.clone());
            current.clear();
        }
        current.extend(ch.to_lowercase());
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a name to a snake_case Rust identifier, escaping keywords with
/// a trailing underscore.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let joined = split_words(name).join("_");
    if is_rust_keyword(&joined) {
        format!("{joined}_")
    } else {
        joined
    }
}

/// Convert a name to a PascalCase Rust identifier.
#[must_use]
pub fn to_pascal_case(name: &str) -> String {
    split_words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Keywords that cannot be used as bare identifiers.
fn is_rust_keyword(word: &str) -> bool {
    matches!(
        word,
        "as" | "async" | "await" | "break" | "const" | "continue" | "crate" | "dyn" | "else"
            | "enum" | "extern" | "false" | "fn" | "for" | "if" | "impl" | "in" | "let" | "loop"
            | "match" | "mod" | "move" | "mut" | "pub" | "ref" | "return" | "self" | "static"
            | "struct" | "super" | "trait" | "true" | "type" | "unsafe" | "use" | "where"
            | "while"
    )
}
