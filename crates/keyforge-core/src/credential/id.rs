//! Record identifier derivation

use chrono::{DateTime, Utc};

/// Derive a record id from its name and creation time
///
/// Lowercases the name, collapses each whitespace run to `-`, then appends the
/// creation time in Unix milliseconds. Two records with the same name created
/// in the same millisecond collide.
pub fn derive_id(name: &str, at: DateTime<Utc>) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    format!("{}-{}", slug, at.timestamp_millis())
}
