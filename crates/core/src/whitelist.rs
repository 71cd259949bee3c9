//! URL whitelist matching
//!
//! Patterns are anchored literals: a pattern matches only a URL that is
//! byte-for-byte identical to it. Metacharacters carry no meaning, so
//! `/docs/*` matches the literal path `/docs/*` and nothing else.

/// True iff `url` equals some non-empty pattern in the union of the
/// global and personal whitelists. Empty patterns are skipped, never
/// evaluated. First match short-circuits; order does not affect the
/// result.
pub fn is_whitelisted(url: &str, global: &[String], personal: &[String]) -> bool {
    global
        .iter()
        .chain(personal.iter())
        .filter(|pattern| !pattern.is_empty())
        .any(|pattern| pattern.as_str() == url)
}
