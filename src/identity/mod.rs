/// Identity directory access
///
/// User profiles live in an external directory and are joined into feed
/// views at aggregation time. The directory is reached through the
/// `IdentityDirectory` trait so callers can swap in a caching layer or a
/// test double without touching the resolver contract; the production
/// implementation is an HTTP JSON client.
///
/// The directory caps batch lookups at 110 ids per request. `resolve`
/// chunks larger sets transparently and merges the results into one map.
use crate::config::IdentityConfig;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Maximum ids per directory batch request, enforced by the directory.
pub const DIRECTORY_BATCH_LIMIT: usize = 110;

/// Upper bound for the username fallback scan.
const USERNAME_SCAN_LIMIT: usize = 200;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Fetch profiles for up to `DIRECTORY_BATCH_LIMIT` ids. Unknown ids
    /// are simply absent from the response, not an error.
    async fn fetch_by_ids(&self, ids: Vec<String>) -> Result<Vec<UserProfile>>;

    /// Direct lookup by directory username.
    async fn fetch_by_username(&self, username: String) -> Result<Option<UserProfile>>;

    /// List up to `limit` profiles (used by the username fallback scan).
    async fn list(&self, limit: usize) -> Result<Vec<UserProfile>>;
}

/// HTTP client for the identity directory API
pub struct HttpIdentityDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityDirectory {
    pub fn new(config: &IdentityConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.api_token
        ))
        .map_err(|e| AppError::Internal(format!("invalid directory token: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::Internal(format!("directory client build failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn users_url(&self) -> String {
        format!("{}/v1/users", self.base_url)
    }
}

#[async_trait]
impl IdentityDirectory for HttpIdentityDirectory {
    async fn fetch_by_ids(&self, ids: Vec<String>) -> Result<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = self
            .client
            .get(self.users_url())
            .query(&[("ids", ids.join(","))])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UserProfile>>()
            .await?;

        Ok(profiles)
    }

    async fn fetch_by_username(&self, username: String) -> Result<Option<UserProfile>> {
        let mut profiles = self
            .client
            .get(self.users_url())
            .query(&[("username", username)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UserProfile>>()
            .await?;

        let first = profiles.drain(..).next();
        Ok(first)
    }

    async fn list(&self, limit: usize) -> Result<Vec<UserProfile>> {
        let profiles = self
            .client
            .get(self.users_url())
            .query(&[("limit", limit.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UserProfile>>()
            .await?;

        Ok(profiles)
    }
}

/// Batches and merges directory lookups
pub struct IdentityResolver {
    directory: Arc<dyn IdentityDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Arc<dyn IdentityDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve a set of user ids to profiles.
    ///
    /// Duplicates in the input collapse to one lookup; the output holds one
    /// entry per distinct id the directory knows. Absent ids are left out —
    /// callers that require a profile treat the gap as a failure.
    pub async fn resolve(&self, user_ids: &[String]) -> Result<HashMap<String, UserProfile>> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = user_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut profiles = HashMap::with_capacity(distinct.len());
        for chunk in distinct.chunks(DIRECTORY_BATCH_LIMIT) {
            for profile in self.directory.fetch_by_ids(chunk.to_vec()).await? {
                profiles.insert(profile.id.clone(), profile);
            }
        }

        Ok(profiles)
    }

    /// Look up a profile by username.
    ///
    /// A direct lookup first; on a miss, a bounded scan matching the
    /// external (linked-account) username, since directory usernames and
    /// external handles are distinct namespaces.
    pub async fn resolve_by_username(&self, username: &str) -> Result<UserProfile> {
        if let Some(profile) = self
            .directory
            .fetch_by_username(username.to_string())
            .await?
        {
            return Ok(profile);
        }

        let candidates = self.directory.list(USERNAME_SCAN_LIMIT).await?;
        candidates
            .into_iter()
            .find(|p| p.external_username.as_deref() == Some(username))
            .ok_or_else(|| AppError::Identity(format!("user not found: {}", username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            username: Some(format!("name-{}", id)),
            external_username: None,
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn resolve_collapses_duplicates_into_one_lookup() {
        let mut directory = MockIdentityDirectory::new();
        directory
            .expect_fetch_by_ids()
            .with(predicate::eq(vec!["a".to_string(), "b".to_string()]))
            .times(1)
            .returning(|ids| Ok(ids.iter().map(|id| profile(id)).collect()));

        let resolver = IdentityResolver::new(Arc::new(directory));
        let ids = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let resolved = resolver.resolve(&ids).await.unwrap();

        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains_key("a"));
        assert!(resolved.contains_key("b"));
    }

    #[tokio::test]
    async fn resolve_chunks_large_sets_at_the_directory_limit() {
        let total = DIRECTORY_BATCH_LIMIT * 2 + 30;
        let mut directory = MockIdentityDirectory::new();
        directory
            .expect_fetch_by_ids()
            .times(3)
            .returning(|ids| {
                assert!(ids.len() <= DIRECTORY_BATCH_LIMIT);
                Ok(ids.iter().map(|id| profile(id)).collect())
            });

        let resolver = IdentityResolver::new(Arc::new(directory));
        let ids: Vec<String> = (0..total).map(|i| format!("user_{}", i)).collect();
        let resolved = resolver.resolve(&ids).await.unwrap();

        assert_eq!(resolved.len(), total);
    }

    #[tokio::test]
    async fn resolve_leaves_unknown_ids_out() {
        let mut directory = MockIdentityDirectory::new();
        directory
            .expect_fetch_by_ids()
            .times(1)
            .returning(|_| Ok(vec![profile("a")]));

        let resolver = IdentityResolver::new(Arc::new(directory));
        let ids = vec!["a".to_string(), "ghost".to_string()];
        let resolved = resolver.resolve(&ids).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert!(!resolved.contains_key("ghost"));
    }

    #[tokio::test]
    async fn username_lookup_falls_back_to_external_scan() {
        let mut directory = MockIdentityDirectory::new();
        directory
            .expect_fetch_by_username()
            .times(1)
            .returning(|_| Ok(None));
        directory.expect_list().times(1).returning(|_| {
            Ok(vec![UserProfile {
                id: "user_9".into(),
                username: None,
                external_username: Some("gh-handle".into()),
                image_url: String::new(),
            }])
        });

        let resolver = IdentityResolver::new(Arc::new(directory));
        let found = resolver.resolve_by_username("gh-handle").await.unwrap();
        assert_eq!(found.id, "user_9");

        let mut directory = MockIdentityDirectory::new();
        directory
            .expect_fetch_by_username()
            .times(1)
            .returning(|_| Ok(None));
        directory.expect_list().times(1).returning(|_| Ok(vec![]));

        let resolver = IdentityResolver::new(Arc::new(directory));
        let missing = resolver.resolve_by_username("nobody").await;
        assert!(matches!(missing, Err(AppError::Identity(_))));
    }
}
