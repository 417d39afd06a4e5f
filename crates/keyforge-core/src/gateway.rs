//! Credential store gateway
//!
//! Maps [`CredentialRecord`]s to and from `(id, payload, category)` triples on
//! the ledger. The gateway holds no credentials, does no retries and keeps no
//! cache; every call goes straight to the ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::codec::PayloadCodec;
use crate::credential::{derive_id, Category, CredentialRecord, NewCredential};
use crate::error::{KeyforgeError, Result};
use crate::ledger::Ledger;

/// Outcome of a listing that keeps per-record failures
#[derive(Debug, Default)]
pub struct ListReport {
    /// Records that were read and decoded
    pub records: Vec<CredentialRecord>,
    /// Ids that could not be read or decoded, with the reason
    pub failures: Vec<(String, KeyforgeError)>,
}

impl ListReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Gateway between in-memory records and the ledger contract
pub struct CredentialGateway {
    ledger: Arc<dyn Ledger>,
    codec: Arc<dyn PayloadCodec>,
    clock: fn() -> DateTime<Utc>,
}

impl CredentialGateway {
    pub fn new(ledger: Arc<dyn Ledger>, codec: Arc<dyn PayloadCodec>) -> Self {
        Self {
            ledger,
            codec,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for ids and creation timestamps
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Store a new credential and return its id
    ///
    /// Validation happens before any ledger call.
    pub async fn add(&self, credential: NewCredential) -> Result<String> {
        credential.validate()?;

        let now = (self.clock)();
        let id = derive_id(&credential.name, now);
        let encoded = self.codec.encode(&credential.to_payload(now))?;

        self.ledger
            .add_password(&id, &encoded, credential.category.as_str())
            .await
            .map_err(into_transport)?;

        info!("Added password {} ({})", id, credential.category);
        Ok(id)
    }

    /// Read and decode one credential
    ///
    /// A ledger read that succeeds with an undecodable payload is reported as
    /// `DecodeFailed`, never as a partially filled record.
    pub async fn get(&self, id: &str) -> Result<CredentialRecord> {
        let entry = self
            .ledger
            .get_password(id)
            .await
            .map_err(into_transport)?;

        let payload = self.codec.decode(id, &entry.encrypted_data)?;
        debug!("Read password {}", id);

        Ok(CredentialRecord::from_parts(
            id,
            Category::parse(&entry.category),
            payload,
        ))
    }

    /// List every readable credential, silently dropping the rest
    ///
    /// Dropped ids are logged at `warn`. Use [`list_detailed`](Self::list_detailed)
    /// to see them.
    pub async fn list(&self) -> Result<Vec<CredentialRecord>> {
        let report = self.list_detailed().await?;
        for (id, err) in &report.failures {
            warn!("Skipping password {}: {}", id, err);
        }
        Ok(report.records)
    }

    /// List every credential, reporting the ones that failed
    ///
    /// Per-id reads run concurrently; records keep the ledger's id order.
    pub async fn list_detailed(&self) -> Result<ListReport> {
        let ids = self
            .ledger
            .get_all_password_ids()
            .await
            .map_err(into_transport)?;

        let results = join_all(ids.iter().map(|id| self.get(id))).await;

        let mut report = ListReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(record) => report.records.push(record),
                Err(err) => report.failures.push((id, err)),
            }
        }

        debug!(
            "Listed {} passwords ({} failed)",
            report.records.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Delete a credential; the ledger keeps its id reserved
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.ledger
            .delete_password(id)
            .await
            .map_err(into_transport)?;

        info!("Deleted password {}", id);
        Ok(())
    }

    /// Whether the ledger holds a live record under `id`
    pub async fn exists(&self, id: &str) -> Result<bool> {
        self.ledger.password_exists(id).await.map_err(into_transport)
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    pub fn backend_name(&self) -> &'static str {
        self.ledger.backend_name()
    }
}

/// Collapse any ledger-side error into `TransportFailed` with its message
fn into_transport(err: KeyforgeError) -> KeyforgeError {
    match err {
        KeyforgeError::TransportFailed(_) => err,
        other => KeyforgeError::TransportFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EncodedCodec;
    use crate::ledger::{InMemoryLedger, LedgerEntry};
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn gateway(ledger: Arc<InMemoryLedger>) -> CredentialGateway {
        CredentialGateway::new(ledger, Arc::new(EncodedCodec::new())).with_clock(fixed_clock)
    }

    fn gmail() -> NewCredential {
        NewCredential::new("Gmail Account", Category::Email, "Aa1!Aa1!Aa1!")
            .with_username("alice@example.com")
            .with_website("https://mail.google.com")
            .with_notes("recovery codes in safe")
    }

    /// Ledger that fails every call
    struct DownLedger;

    #[async_trait]
    impl Ledger for DownLedger {
        async fn add_password(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Err(KeyforgeError::TransportFailed("network unreachable".to_string()))
        }
        async fn delete_password(&self, _: &str) -> Result<()> {
            Err(KeyforgeError::TransportFailed("network unreachable".to_string()))
        }
        async fn get_all_password_ids(&self) -> Result<Vec<String>> {
            Err(KeyforgeError::TransportFailed("network unreachable".to_string()))
        }
        async fn get_password(&self, _: &str) -> Result<LedgerEntry> {
            Err(KeyforgeError::TransportFailed("network unreachable".to_string()))
        }
        async fn password_exists(&self, _: &str) -> Result<bool> {
            Err(KeyforgeError::TransportFailed("network unreachable".to_string()))
        }
        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn test_add_then_get_reconstructs_record() {
        let ledger = Arc::new(InMemoryLedger::new());
        let gateway = gateway(ledger.clone());

        let id = gateway.add(gmail()).await.unwrap();
        assert_eq!(id, "gmail-account-1700000000000");
        assert_eq!(gateway.backend_name(), "memory");
        assert_eq!(gateway.codec_name(), "encoded");

        let entry = ledger.get_password(&id).await.unwrap();
        assert_eq!(entry.category, "Email");

        let record = gateway.get(&id).await.unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "Gmail Account");
        assert_eq!(record.category, Category::Email);
        assert_eq!(record.username.as_deref(), Some("alice@example.com"));
        assert_eq!(record.secret.expose(), "Aa1!Aa1!Aa1!");
        assert_eq!(record.website.as_deref(), Some("https://mail.google.com"));
        assert_eq!(record.notes.as_deref(), Some("recovery codes in safe"));
        assert_eq!(record.created_at, fixed_clock());
    }

    #[tokio::test]
    async fn test_missing_fields_issue_no_ledger_call() {
        let ledger = Arc::new(InMemoryLedger::new());
        let gateway = gateway(ledger.clone());

        let empty_secret = NewCredential::new("Gmail", Category::Email, "");
        assert!(matches!(
            gateway.add(empty_secret).await,
            Err(KeyforgeError::MissingField("secret"))
        ));

        let empty_name = NewCredential::new("  ", Category::Email, "pw");
        assert!(matches!(
            gateway.add(empty_name).await,
            Err(KeyforgeError::MissingField("name"))
        ));

        let empty_category = NewCredential::new("Gmail", Category::Custom(String::new()), "pw");
        assert!(matches!(
            gateway.add(empty_category).await,
            Err(KeyforgeError::MissingField("category"))
        ));

        assert_eq!(ledger.request_count(), 0);
    }

    #[tokio::test]
    async fn test_same_name_same_instant_is_rejected_by_ledger() {
        let gateway = gateway(Arc::new(InMemoryLedger::new()));

        gateway.add(gmail()).await.unwrap();
        let err = gateway.add(gmail()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_get_undecodable_payload_is_decode_failed() {
        let ledger = Arc::new(InMemoryLedger::new());
        ledger.add_password("junk-1", "!!not base64!!", "Work").await.unwrap();

        let err = gateway(ledger).get("junk-1").await.unwrap_err();
        assert!(matches!(err, KeyforgeError::DecodeFailed { ref id, .. } if id == "junk-1"));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_transport_failure() {
        let err = gateway(Arc::new(InMemoryLedger::new()))
            .get("nope")
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_list_drops_undecodable_entries() {
        let ledger = Arc::new(InMemoryLedger::new());
        let gateway = gateway(ledger.clone());

        gateway.add(gmail()).await.unwrap();
        gateway
            .add(NewCredential::new("Chase", Category::Banking, "s3cret!"))
            .await
            .unwrap();
        ledger.add_password("junk-1", "%%%", "Work").await.unwrap();
        ledger.add_password("junk-2", "bnVsbA==", "Work").await.unwrap();
        let amazon = NewCredential::new("Amazon", Category::Shopping, "x").to_payload(fixed_clock());
        let encoded = EncodedCodec::new().encode(&amazon).unwrap();
        ledger.add_password("amazon-3", &encoded, "Shopping").await.unwrap();

        let records = gateway.list().await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Gmail Account", "Chase", "Amazon"]);

        let report = gateway.list_detailed().await.unwrap();
        assert_eq!(report.records.len(), 3);
        assert!(!report.is_complete());
        let failed: Vec<&str> = report.failures.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, vec!["junk-1", "junk-2"]);
    }

    #[tokio::test]
    async fn test_delete_removes_from_listing() {
        let ledger = Arc::new(InMemoryLedger::new());
        let gateway = gateway(ledger);

        let id = gateway.add(gmail()).await.unwrap();
        assert!(gateway.exists(&id).await.unwrap());

        gateway.delete(&id).await.unwrap();
        assert!(!gateway.exists(&id).await.unwrap());
        assert!(gateway.list().await.unwrap().is_empty());
        assert!(gateway.delete(&id).await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn test_transport_failures_surface_message() {
        let gateway = CredentialGateway::new(Arc::new(DownLedger), Arc::new(EncodedCodec::new()));

        let err = gateway.add(gmail()).await.unwrap_err();
        assert_eq!(err.to_string(), "Ledger request failed: network unreachable");
        assert!(gateway.list().await.unwrap_err().is_transport());
        assert!(gateway.delete("x").await.unwrap_err().is_transport());
    }
}
