//! Contract state shared by the in-process ledger backends

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::LedgerEntry;
use crate::error::{KeyforgeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookEntry {
    encrypted_data: String,
    category: String,
    active: bool,
}

/// Per-account password table with contract semantics
///
/// Ids keep insertion order. Deleting unmarks an entry; its id can never be
/// added again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LedgerBook {
    entries: IndexMap<String, BookEntry>,
}

fn reverted(reason: &str) -> KeyforgeError {
    KeyforgeError::TransportFailed(format!("execution reverted: {}", reason))
}

impl LedgerBook {
    pub(crate) fn add(&mut self, id: &str, encrypted_data: &str, category: &str) -> Result<()> {
        if id.is_empty() {
            return Err(reverted("password id cannot be empty"));
        }
        if self.entries.contains_key(id) {
            return Err(reverted("password id already exists"));
        }

        self.entries.insert(
            id.to_string(),
            BookEntry {
                encrypted_data: encrypted_data.to_string(),
                category: category.to_string(),
                active: true,
            },
        );
        Ok(())
    }

    pub(crate) fn delete(&mut self, id: &str) -> Result<()> {
        match self.entries.get_mut(id) {
            Some(entry) if entry.active => {
                entry.active = false;
                Ok(())
            }
            _ => Err(reverted("password does not exist")),
        }
    }

    pub(crate) fn active_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.active)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub(crate) fn get(&self, id: &str) -> Result<LedgerEntry> {
        match self.entries.get(id) {
            Some(entry) if entry.active => Ok(LedgerEntry {
                encrypted_data: entry.encrypted_data.clone(),
                category: entry.category.clone(),
            }),
            _ => Err(reverted("password does not exist")),
        }
    }

    pub(crate) fn exists(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.active)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_get_delete() {
        let mut book = LedgerBook::default();
        book.add("a-1", "payload", "Email").unwrap();

        assert!(book.exists("a-1"));
        assert_eq!(book.get("a-1").unwrap().category, "Email");

        book.delete("a-1").unwrap();
        assert!(!book.exists("a-1"));
        assert!(book.get("a-1").is_err());
        assert!(book.active_ids().is_empty());
    }

    #[test]
    fn test_deleted_id_stays_reserved() {
        let mut book = LedgerBook::default();
        book.add("a-1", "payload", "Email").unwrap();
        book.delete("a-1").unwrap();

        let err = book.add("a-1", "other", "Email").unwrap_err();
        assert!(err.is_transport());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_rejections() {
        let mut book = LedgerBook::default();
        assert!(book.add("", "payload", "Email").is_err());
        assert!(book.delete("missing").is_err());

        book.add("a-1", "payload", "Email").unwrap();
        assert!(book.add("a-1", "payload", "Email").is_err());
        book.delete("a-1").unwrap();
        assert!(book.delete("a-1").is_err());
    }

    #[test]
    fn test_ids_keep_insertion_order() {
        let mut book = LedgerBook::default();
        for id in ["c", "a", "b"] {
            book.add(id, "p", "Other").unwrap();
        }
        book.delete("a").unwrap();
        assert_eq!(book.active_ids(), vec!["c", "b"]);
    }
}
