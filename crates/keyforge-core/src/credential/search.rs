//! Client-side search over materialized records

use super::types::CredentialRecord;

/// Case-insensitive substring match against name, username and category
///
/// Keeps input order. An empty query matches everything.
pub fn filter_records<'a>(records: &'a [CredentialRecord], query: &str) -> Vec<&'a CredentialRecord> {
    if query.is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| matches_query(record, &needle))
        .collect()
}

fn matches_query(record: &CredentialRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record
            .username
            .as_deref()
            .is_some_and(|username| username.to_lowercase().contains(needle))
        || record.category.as_str().to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Category;
    use crate::crypto::SecretString;
    use chrono::Utc;

    fn record(id: &str, name: &str, username: Option<&str>, category: Category) -> CredentialRecord {
        CredentialRecord {
            id: id.to_string(),
            name: name.to_string(),
            category,
            username: username.map(str::to_string),
            secret: SecretString::new("pw"),
            website: None,
            notes: Some("matches nothing in notes: gmail".to_string()),
            created_at: Utc::now(),
        }
    }

    fn fixtures() -> Vec<CredentialRecord> {
        vec![
            record("1", "Gmail", Some("alice@example.com"), Category::Email),
            record("2", "Amazon", Some("alice"), Category::Shopping),
            record("3", "Chase", None, Category::Banking),
        ]
    }

    fn ids(records: Vec<&CredentialRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let records = fixtures();
        assert_eq!(ids(filter_records(&records, "")), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_case_insensitive_fields() {
        let records = fixtures();
        assert_eq!(ids(filter_records(&records, "GMAIL")), vec!["1"]);
        assert_eq!(ids(filter_records(&records, "ALICE")), vec!["1", "2"]);
        assert_eq!(ids(filter_records(&records, "bank")), vec!["3"]);
    }

    #[test]
    fn test_missing_username_and_notes_ignored() {
        let records = fixtures();
        assert_eq!(ids(filter_records(&records, "notes")), Vec::<&str>::new());
        assert!(filter_records(&records, "zzz").is_empty());
    }
}
