//! Identifier normalization shared by service enumeration and linker
//! placeholder resolution. Both sides must agree on the same routine, or
//! cross-service links silently fail to resolve.

/// Splits on `-`, `_`, and whitespace; lowercases the first word, title-cases
/// the rest, and joins with no separator.
pub fn to_camel_case(s: &str) -> String {
    let parts: Vec<&str> = s
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let Some((first, rest)) = parts.split_first() else {
        return String::new();
    };

    let mut result = first.to_lowercase();
    for part in rest {
        let mut chars = part.chars();
        if let Some(head) = chars.next() {
            result.push(head.to_ascii_uppercase());
            result.push_str(&chars.as_str().to_lowercase());
        }
    }
    result
}
