// src/services/cover_cache.rs
//
// Cover Resolution Cache
//
// RESPONSIBILITIES:
// - Resolve a manga id to a displayable cover URL
// - Memoize successful resolutions per (manga id, quality)
// - Fall back to a placeholder on failure, without memoizing the failure
// - Warm the cache in the background for a batch of ids
//
// The cache lives for the session. Entries only leave it through
// `invalidate`, `clear`, or an optional time-to-live.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use log::{debug, warn};
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::domain::CoverQuality;
use crate::error::AppResult;
use crate::integrations::CatalogClient;

pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.mangadex.org";
pub const DEFAULT_PLACEHOLDER_URL: &str =
    "https://via.placeholder.com/230x320/667eea/ffffff?text=No+Cover";

/// Cover cache configuration
#[derive(Debug, Clone)]
pub struct CoverCacheConfig {
    pub uploads_url: String,
    pub placeholder_url: String,
    /// Quality used by `prefetch_covers`
    pub default_quality: CoverQuality,
    /// `None` keeps entries for the whole session
    pub ttl: Option<Duration>,
}

impl Default for CoverCacheConfig {
    fn default() -> Self {
        Self {
            uploads_url: DEFAULT_UPLOADS_URL.to_string(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            default_quality: CoverQuality::default(),
            ttl: None,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedCover {
    url: String,
    stored_at: Instant,
}

pub struct CoverCache {
    catalog: Arc<dyn CatalogClient>,
    config: CoverCacheConfig,
    entries: RwLock<HashMap<(String, CoverQuality), CachedCover>>,
}

impl CoverCache {
    pub fn new(catalog: Arc<dyn CatalogClient>, config: CoverCacheConfig) -> Self {
        Self {
            catalog,
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn placeholder_url(&self) -> &str {
        &self.config.placeholder_url
    }

    pub fn default_quality(&self) -> CoverQuality {
        self.config.default_quality
    }

    /// Cover URL for a manga; never fails, the placeholder stands in for
    /// any problem
    pub async fn get_cover_url(&self, manga_id: &str, quality: CoverQuality) -> String {
        if manga_id.trim().is_empty() {
            return self.config.placeholder_url.clone();
        }

        if let Some(url) = self.cached(manga_id, quality) {
            return url;
        }

        match self.resolve(manga_id, quality).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!("No cover found for {}", manga_id);
                self.config.placeholder_url.clone()
            }
            Err(e) => {
                warn!("Failed to resolve cover for {}: {}", manga_id, e);
                self.config.placeholder_url.clone()
            }
        }
    }

    /// Synchronous hit path: the memoized URL, if present and fresh
    pub fn cached(&self, manga_id: &str, quality: CoverQuality) -> Option<String> {
        let entries = self.entries.read();
        let cover = entries.get(&(manga_id.to_string(), quality))?;
        if self.is_expired(cover) {
            return None;
        }
        Some(cover.url.clone())
    }

    /// Resolve a batch of covers in the background at the default quality.
    /// Failures are logged by the individual lookups and otherwise ignored.
    pub fn prefetch_covers(self: &Arc<Self>, manga_ids: Vec<String>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let quality = cache.config.default_quality;
            let lookups = manga_ids
                .iter()
                .filter(|id| cache.cached(id, quality).is_none())
                .map(|id| cache.get_cover_url(id, quality));
            let resolved = join_all(lookups).await;
            debug!("Prefetched {} covers", resolved.len());
        })
    }

    pub fn build_cover_url(&self, manga_id: &str, file_name: &str, quality: CoverQuality) -> String {
        let base = self.config.uploads_url.trim_end_matches('/');
        match quality.suffix() {
            Some(size) => format!("{}/covers/{}/{}.{}.jpg", base, manga_id, file_name, size),
            None => format!("{}/covers/{}/{}", base, manga_id, file_name),
        }
    }

    /// Drop every quality of one manga
    pub fn invalidate(&self, manga_id: &str) {
        self.entries.write().retain(|(id, _), _| id != manga_id);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // INTERNAL
    // ========================================================================

    async fn resolve(&self, manga_id: &str, quality: CoverQuality) -> AppResult<Option<String>> {
        let Some(file_name) = self.catalog.fetch_cover_file_name(manga_id).await? else {
            return Ok(None);
        };

        let url = self.build_cover_url(manga_id, &file_name, quality);
        self.entries.write().insert(
            (manga_id.to_string(), quality),
            CachedCover {
                url: url.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(Some(url))
    }

    fn is_expired(&self, cover: &CachedCover) -> bool {
        self.config
            .ttl
            .is_some_and(|ttl| cover.stored_at.elapsed() >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::integrations::MockCatalogClient;
    use mockall::predicate::eq;

    fn cache(catalog: MockCatalogClient, config: CoverCacheConfig) -> CoverCache {
        CoverCache::new(Arc::new(catalog), config)
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .with(eq("m1"))
            .times(1)
            .returning(|_| Ok(Some("f.jpg".to_string())));
        let cache = cache(catalog, CoverCacheConfig::default());

        let first = cache.get_cover_url("m1", CoverQuality::Thumb512).await;
        let second = cache.get_cover_url("m1", CoverQuality::Thumb512).await;

        assert_eq!(first, "https://uploads.mangadex.org/covers/m1/f.jpg.512.jpg");
        assert_eq!(first, second);
        assert_eq!(cache.cached("m1", CoverQuality::Thumb512), Some(first));
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_is_not_memoized() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .times(2)
            .returning(|_| Err(AppError::Transport("offline".to_string())));
        let cache = cache(catalog, CoverCacheConfig::default());

        for _ in 0..2 {
            assert_eq!(
                cache.get_cover_url("m1", CoverQuality::Thumb256).await,
                DEFAULT_PLACEHOLDER_URL
            );
        }
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_cover_uses_placeholder() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .returning(|_| Ok(None));
        let cache = cache(catalog, CoverCacheConfig::default());

        assert_eq!(
            cache.get_cover_url("m1", CoverQuality::Original).await,
            DEFAULT_PLACEHOLDER_URL
        );
        assert_eq!(cache.cached("m1", CoverQuality::Original), None);
    }

    #[tokio::test]
    async fn test_empty_id_skips_catalog() {
        let catalog = MockCatalogClient::new();
        let cache = cache(catalog, CoverCacheConfig::default());
        assert_eq!(
            cache.get_cover_url(" ", CoverQuality::Thumb256).await,
            DEFAULT_PLACEHOLDER_URL
        );
    }

    #[test]
    fn test_build_cover_url() {
        let cache = cache(MockCatalogClient::new(), CoverCacheConfig::default());
        assert_eq!(
            cache.build_cover_url("m", "a.png", CoverQuality::Original),
            "https://uploads.mangadex.org/covers/m/a.png"
        );
        assert_eq!(
            cache.build_cover_url("m", "a.png", CoverQuality::Thumb256),
            "https://uploads.mangadex.org/covers/m/a.png.256.jpg"
        );
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .times(4)
            .returning(|id| Ok(Some(format!("{}.jpg", id))));
        let cache = cache(catalog, CoverCacheConfig::default());

        cache.get_cover_url("a", CoverQuality::Thumb256).await;
        cache.get_cover_url("a", CoverQuality::Thumb512).await;
        cache.get_cover_url("b", CoverQuality::Thumb256).await;
        assert_eq!(cache.len(), 3);

        cache.invalidate("a");
        assert_eq!(cache.len(), 1);
        assert!(cache.cached("b", CoverQuality::Thumb256).is_some());

        cache.get_cover_url("a", CoverQuality::Thumb256).await;
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .times(2)
            .returning(|_| Ok(Some("f.jpg".to_string())));
        let config = CoverCacheConfig {
            ttl: Some(Duration::ZERO),
            ..Default::default()
        };
        let cache = cache(catalog, config);

        cache.get_cover_url("m1", CoverQuality::Thumb256).await;
        assert_eq!(cache.cached("m1", CoverQuality::Thumb256), None);
        cache.get_cover_url("m1", CoverQuality::Thumb256).await;
    }

    #[tokio::test]
    async fn test_prefetch_warms_cache_and_tolerates_failures() {
        let mut catalog = MockCatalogClient::new();
        catalog
            .expect_fetch_cover_file_name()
            .returning(|id| match id {
                "bad" => Err(AppError::Transport("boom".to_string())),
                other => Ok(Some(format!("{}.jpg", other))),
            });
        let cache = Arc::new(cache(catalog, CoverCacheConfig::default()));

        let handle = cache.prefetch_covers(vec!["a".to_string(), "bad".to_string(), "c".to_string()]);
        handle.await.unwrap();

        assert!(cache.cached("a", CoverQuality::Thumb256).is_some());
        assert!(cache.cached("c", CoverQuality::Thumb256).is_some());
        assert!(cache.cached("bad", CoverQuality::Thumb256).is_none());
    }
}
