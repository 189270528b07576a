//! Directory batching behavior through the public resolver API.

use async_trait::async_trait;
use pulse_service::error::Result;
use pulse_service::identity::{IdentityDirectory, IdentityResolver, DIRECTORY_BATCH_LIMIT};
use pulse_service::models::UserProfile;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Records every batch it receives and answers with synthetic profiles.
struct RecordingDirectory {
    calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl RecordingDirectory {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IdentityDirectory for RecordingDirectory {
    async fn fetch_by_ids(&self, ids: Vec<String>) -> Result<Vec<UserProfile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(ids.len());
        Ok(ids
            .into_iter()
            .map(|id| UserProfile {
                username: Some(format!("name-{}", id)),
                external_username: None,
                image_url: String::new(),
                id,
            })
            .collect())
    }

    async fn fetch_by_username(&self, _username: String) -> Result<Option<UserProfile>> {
        Ok(None)
    }

    async fn list(&self, _limit: usize) -> Result<Vec<UserProfile>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn large_id_sets_are_chunked_at_the_directory_limit() {
    let directory = Arc::new(RecordingDirectory::new());
    let resolver = IdentityResolver::new(directory.clone());

    let total = DIRECTORY_BATCH_LIMIT * 3 + 7;
    let ids: Vec<String> = (0..total).map(|i| format!("user_{}", i)).collect();

    let resolved = resolver.resolve(&ids).await.unwrap();

    assert_eq!(resolved.len(), total);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 4);

    let sizes = directory.batch_sizes.lock().unwrap();
    assert_eq!(
        *sizes,
        vec![
            DIRECTORY_BATCH_LIMIT,
            DIRECTORY_BATCH_LIMIT,
            DIRECTORY_BATCH_LIMIT,
            7
        ]
    );
}

#[tokio::test]
async fn duplicate_ids_resolve_through_a_single_batch() {
    let directory = Arc::new(RecordingDirectory::new());
    let resolver = IdentityResolver::new(directory.clone());

    let ids = vec![
        "user_a".to_string(),
        "user_b".to_string(),
        "user_a".to_string(),
        "user_b".to_string(),
    ];

    let resolved = resolver.resolve(&ids).await.unwrap();

    assert_eq!(resolved.len(), 2);
    assert_eq!(directory.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*directory.batch_sizes.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn empty_input_never_reaches_the_directory() {
    let directory = Arc::new(RecordingDirectory::new());
    let resolver = IdentityResolver::new(directory.clone());

    let resolved = resolver.resolve(&[]).await.unwrap();

    assert!(resolved.is_empty());
    assert_eq!(directory.calls.load(Ordering::SeqCst), 0);
}
