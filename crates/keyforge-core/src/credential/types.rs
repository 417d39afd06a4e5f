//! Credential type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::SecretString;
use crate::error::{KeyforgeError, Result};

/// Credential category, stored in plaintext next to the encoded payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    SocialMedia,
    Email,
    Shopping,
    Banking,
    Work,
    Entertainment,
    Gaming,
    Travel,
    Education,
    Healthcare,
    Other,
    /// Free-form category outside the built-in set
    Custom(String),
}

impl Category {
    /// Built-in categories, in display order
    pub const BUILT_IN: [Category; 11] = [
        Category::SocialMedia,
        Category::Email,
        Category::Shopping,
        Category::Banking,
        Category::Work,
        Category::Entertainment,
        Category::Gaming,
        Category::Travel,
        Category::Education,
        Category::Healthcare,
        Category::Other,
    ];

    /// Label as stored on the ledger
    pub fn as_str(&self) -> &str {
        match self {
            Self::SocialMedia => "Social Media",
            Self::Email => "Email",
            Self::Shopping => "Shopping",
            Self::Banking => "Banking",
            Self::Work => "Work",
            Self::Entertainment => "Entertainment",
            Self::Gaming => "Gaming",
            Self::Travel => "Travel",
            Self::Education => "Education",
            Self::Healthcare => "Healthcare",
            Self::Other => "Other",
            Self::Custom(label) => label,
        }
    }

    /// Parse a label; unknown labels become `Custom`
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        Self::BUILT_IN
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .cloned()
            .unwrap_or_else(|| Self::Custom(label.to_string()))
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// User input for a new credential
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub name: String,
    pub category: Category,
    pub username: Option<String>,
    pub secret: SecretString,
    pub website: Option<String>,
    pub notes: Option<String>,
}

impl NewCredential {
    pub fn new(name: &str, category: Category, secret: impl Into<SecretString>) -> Self {
        Self {
            name: name.to_string(),
            category,
            username: None,
            secret: secret.into(),
            website: None,
            notes: None,
        }
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = Some(website.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Check the required fields: name, secret, category
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KeyforgeError::MissingField("name"));
        }
        if self.secret.is_empty() {
            return Err(KeyforgeError::MissingField("secret"));
        }
        if self.category.is_blank() {
            return Err(KeyforgeError::MissingField("category"));
        }
        Ok(())
    }

    /// Split off the part that goes inside the encoded payload
    pub(crate) fn to_payload(&self, created_at: DateTime<Utc>) -> CredentialPayload {
        CredentialPayload {
            name: self.name.clone(),
            username: self.username.clone(),
            password: self.secret.expose().to_string(),
            website: self.website.clone(),
            notes: self.notes.clone(),
            created_at,
        }
    }
}

/// Everything except id and category, as packed into the ledger payload
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for CredentialPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPayload")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("website", &self.website)
            .field("notes", &self.notes)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A credential reconstructed from the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub username: Option<String>,
    pub secret: SecretString,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Merge a decoded payload with the id and category read alongside it
    pub fn from_parts(id: &str, category: Category, payload: CredentialPayload) -> Self {
        Self {
            id: id.to_string(),
            name: payload.name,
            category,
            username: payload.username,
            secret: SecretString::new(payload.password),
            website: payload.website,
            notes: payload.notes,
            created_at: payload.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_built_in_ignores_case_and_padding() {
        assert_eq!(Category::parse("social media"), Category::SocialMedia);
        assert_eq!(Category::parse("  BANKING "), Category::Banking);
    }

    #[test]
    fn test_parse_custom_label_is_trimmed() {
        let category = Category::parse(" Crypto ");
        assert_eq!(category, Category::Custom("Crypto".to_string()));
        assert_eq!(category.as_str(), "Crypto");
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"Crypto\"");
    }

    #[test]
    fn test_blank_custom_category_fails_validation() {
        let credential = NewCredential::new("Ledger", Category::parse("   "), "pw");
        assert!(matches!(
            credential.validate(),
            Err(KeyforgeError::MissingField("category"))
        ));
    }
}
