//! URL shortening service
//!
//! Stateless orchestrator over an injected [`Storage`]: validates, encodes and
//! stores URLs. Shared by every interface that drives the core.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{Result, TinylinkError};
use crate::services::deletion::DeletionPipeline;
use crate::storage::{Stats, Storage, StoredUrl};
use crate::utils::encoder::CodeScheme;
use crate::utils::url_validator;

/// Outcome of [`ShorteningService::add`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shortened {
    /// Newly stored for this owner
    Created(String),
    /// The owner had already shortened this URL; same code
    Existing(String),
}

impl Shortened {
    pub fn code(&self) -> &str {
        match self {
            Shortened::Created(code) | Shortened::Existing(code) => code,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            Shortened::Created(code) | Shortened::Existing(code) => code,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Shortened::Created(_))
    }
}

#[derive(Clone)]
pub struct ShorteningService {
    storage: Arc<dyn Storage>,
    scheme: CodeScheme,
}

impl ShorteningService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_scheme(storage, CodeScheme::default())
    }

    pub fn with_scheme(storage: Arc<dyn Storage>, scheme: CodeScheme) -> Self {
        Self { storage, scheme }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn scheme(&self) -> CodeScheme {
        self.scheme
    }

    /// Code this service would assign to `url`.
    pub fn encode(&self, url: &str) -> String {
        self.scheme.encode(url)
    }

    /// Pre-flight check for interfaces; same rule `add` applies.
    pub fn validate_url(&self, url: &str) -> Result<()> {
        url_validator::validate_url(url)
    }

    /// Shorten `url` for `owner_id`.
    ///
    /// A storage `Conflict` means the owner already has this code, which
    /// with a deterministic encoder means the same URL: reported as
    /// [`Shortened::Existing`] rather than an error.
    pub async fn add(&self, url: &str, owner_id: &str) -> Result<Shortened> {
        self.validate_url(url)?;
        let code = self.encode(url);

        match self.storage.add(&code, url, owner_id).await {
            Ok(()) => {
                info!("Shortened {} -> {} for {}", url, code, owner_id);
                Ok(Shortened::Created(code))
            }
            Err(e) if e.is_conflict() => {
                debug!("{} already shortened as {} for {}", url, code, owner_id);
                Ok(Shortened::Existing(code))
            }
            Err(e) => Err(e),
        }
    }

    /// Shorten `{correlation_id: url}` for one owner, returning
    /// `{correlation_id: code}`.
    ///
    /// Every URL is validated before storage is touched; one invalid entry
    /// fails the whole batch. Codes the owner already had count as success.
    pub async fn add_batch(
        &self,
        batch: &HashMap<String, String>,
        owner_id: &str,
    ) -> Result<HashMap<String, String>> {
        for (correlation_id, url) in batch {
            self.validate_url(url).map_err(|e| {
                TinylinkError::invalid_url(format!("{}: {}", correlation_id, e.message()))
            })?;
        }

        if batch.is_empty() {
            return Ok(HashMap::new());
        }

        let mut by_code: HashMap<String, String> = HashMap::with_capacity(batch.len());
        let mut by_correlation: HashMap<String, String> = HashMap::with_capacity(batch.len());

        for (correlation_id, url) in batch {
            let code = self.encode(url);
            if let Some(previous) = by_code.get(&code)
                && previous != url
            {
                warn!(
                    "Code {} collides in batch: {} and {}; keeping the latter",
                    code, previous, url
                );
            }
            by_code.insert(code.clone(), url.clone());
            by_correlation.insert(correlation_id.clone(), code);
        }

        match self.storage.add_batch(&by_code, owner_id).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                debug!("Batch for {} had existing codes: {}", owner_id, e.message());
            }
            Err(e) => return Err(e),
        }

        info!(
            "Shortened batch of {} URLs ({} codes) for {}",
            batch.len(),
            by_code.len(),
            owner_id
        );
        Ok(by_correlation)
    }

    pub async fn get(&self, code: &str) -> Result<String> {
        self.storage.get(code).await
    }

    pub async fn get_all(&self, owner_id: &str) -> Result<HashMap<String, StoredUrl>> {
        self.storage.get_all(owner_id).await
    }

    pub async fn delete(&self, code: &str, owner_id: &str) -> Result<()> {
        self.storage.delete(code, owner_id).await
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        self.storage.get_stats().await
    }

    pub async fn ping(&self) -> Result<()> {
        self.storage.ping().await
    }

    /// Pipeline deleting many codes against the same storage.
    pub fn deletion_pipeline(&self, workers: usize) -> DeletionPipeline {
        DeletionPipeline::new(Arc::clone(&self.storage), workers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> ShorteningService {
        ShorteningService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_shortened_accessors() {
        let created = Shortened::Created("abc".into());
        let existing = Shortened::Existing("abc".into());
        assert!(created.is_new());
        assert!(!existing.is_new());
        assert_eq!(created.code(), existing.code());
        assert_eq!(existing.into_code(), "abc");
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_storage() {
        let service = service();
        let err = service.add("not a url", "u1").await.unwrap_err();
        assert!(matches!(err, TinylinkError::InvalidUrl(_)));
        assert_eq!(service.get_stats().await.unwrap(), Stats::default());
    }

    #[tokio::test]
    async fn test_batch_validation_is_atomic() {
        let service = service();
        let batch = HashMap::from([
            ("ok".to_string(), "https://ok.test".to_string()),
            ("bad".to_string(), "nope".to_string()),
        ]);

        let err = service.add_batch(&batch, "u1").await.unwrap_err();
        assert!(err.message().starts_with("bad:"));
        assert!(service.get_all("u1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_batch_same_url_twice() {
        let service = service();
        let batch = HashMap::from([
            ("a".to_string(), "https://same.test".to_string()),
            ("b".to_string(), "https://same.test".to_string()),
        ]);

        let codes = service.add_batch(&batch, "u1").await.unwrap();
        assert_eq!(codes["a"], codes["b"]);
        assert_eq!(service.get_stats().await.unwrap().total_urls, 1);
    }

    #[tokio::test]
    async fn test_digest_scheme() {
        let service =
            ShorteningService::with_scheme(Arc::new(MemoryStore::new()), CodeScheme::Digest);
        let code = service.add("https://example.com/a", "u1").await.unwrap();
        assert_eq!(code.code().len(), 11);
        assert_eq!(service.scheme(), CodeScheme::Digest);
    }
}
