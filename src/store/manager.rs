//! Post store: the only writer of the index and content files

use crate::cache::ReadCache;
use crate::config::Config;
use crate::error::{QuireError, QuireResult};
use crate::store::content::ContentDir;
use crate::store::index::IndexFile;
use crate::store::lock;
use crate::store::post::{Direction, Post, PostDraft};
use crate::store::saga::{compensate, Saga};
use crate::store::slug::{is_valid_slug, slugify, unique_slug};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

/// Index document plus content directory, with an optional read cache to
/// invalidate after every mutation
///
/// The store holds no state of its own between calls; every operation
/// re-reads the index. Mutations take the writer lock for their duration.
#[derive(Debug, Clone)]
pub struct PostStore {
    index: IndexFile,
    content: ContentDir,
    cache: Option<ReadCache>,
}

impl PostStore {
    /// Create a store without a read cache
    pub fn new(index: IndexFile, content: ContentDir) -> Self {
        Self {
            index,
            content,
            cache: None,
        }
    }

    /// Attach the read cache that mutations invalidate
    pub fn with_cache(mut self, cache: ReadCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the store and its read cache from configuration
    pub fn from_config(config: &Config) -> Self {
        let index = IndexFile::new(config.index_path());
        let cache = ReadCache::new(config.snapshot_path(), index.clone(), config.cache.ttl());
        Self::new(index, ContentDir::new(config.posts_dir())).with_cache(cache)
    }

    pub fn index(&self) -> &IndexFile {
        &self.index
    }

    pub fn content(&self) -> &ContentDir {
        &self.content
    }

    pub fn cache(&self) -> Option<&ReadCache> {
        self.cache.as_ref()
    }

    /// All posts in display order
    pub async fn list(&self) -> QuireResult<Vec<Post>> {
        Ok(self.index.load().await?.posts)
    }

    /// Look up a post; malformed slugs are simply not found
    pub async fn find_by_slug(&self, slug: &str) -> QuireResult<Option<Post>> {
        if !is_valid_slug(slug) {
            return Ok(None);
        }
        let doc = self.index.load().await?;
        Ok(doc.posts.into_iter().find(|p| p.slug == slug))
    }

    /// Whether a post already uses `slug`
    pub async fn slug_exists(&self, slug: &str) -> QuireResult<bool> {
        Ok(self.index.load().await?.contains(slug))
    }

    /// Raw content markup, or a placeholder if the file is missing
    pub async fn load_content(&self, slug: &str) -> String {
        self.content.load(slug).await
    }

    /// Create a post at the head of the list
    ///
    /// The index is written first, then the content file. If the content
    /// write fails the index is restored to its state before the call.
    pub async fn create(&self, draft: PostDraft) -> QuireResult<Post> {
        let base = base_slug(&draft)?;
        let _guard = lock::acquire(self.index.path()).await?;

        let before = self.index.load().await?;
        let slug = unique_slug(&base, |s| before.contains(s));
        let post = Post::from_draft(slug.clone(), &draft);

        let mut after = before.clone();
        after.posts.insert(0, post.clone());

        let index = &self.index;
        let mut saga = Saga::new("create");
        saga.step(
            "write index",
            index.save(&after),
            Some(compensate(move || async move { index.save(&before).await })),
        )
        .await?;
        let written = saga
            .step(
                "write content",
                self.content.write(&slug, &draft.content),
                None,
            )
            .await;
        if let Err(e) = written {
            // The index was rewritten twice (or left dangling if the restore failed).
            self.invalidate_cache().await;
            return Err(e);
        }
        saga.commit();

        self.invalidate_cache().await;
        info!("Created post: {}", slug);
        Ok(post)
    }

    /// Edit the post at `original_slug` in place
    ///
    /// The slug is only recomputed when the title changes. The old content
    /// file is removed after the new one has been written. A failed content
    /// write is reported but the index change is kept.
    pub async fn update(&self, original_slug: &str, draft: PostDraft) -> QuireResult<Post> {
        require_slug(original_slug)?;
        let base = base_slug(&draft)?;
        let _guard = lock::acquire(self.index.path()).await?;

        let mut doc = self.index.load().await?;
        let pos = doc
            .position(original_slug)
            .ok_or_else(|| QuireError::PostNotFound(original_slug.to_string()))?;

        let slug = if doc.posts[pos].title != draft.title {
            unique_slug(&base, |s| s != original_slug && doc.contains(s))
        } else {
            original_slug.to_string()
        };

        doc.posts[pos].apply(slug.clone(), &draft);
        let post = doc.posts[pos].clone();

        let mut saga = Saga::new("update");
        saga.step("write index", self.index.save(&doc), None).await?;

        let written = saga
            .step(
                "write content",
                self.content.write(&slug, &draft.content),
                None,
            )
            .await;
        if let Err(e) = written {
            // The index already changed; readers must not keep the old view.
            self.invalidate_cache().await;
            return Err(e);
        }

        if slug != original_slug {
            self.content.remove_best_effort(original_slug).await;
            debug!("Renamed content {} -> {}", original_slug, slug);
        }
        saga.commit();

        self.invalidate_cache().await;
        info!("Updated post: {}", slug);
        Ok(post)
    }

    /// Remove a post; its content file is deleted on a best-effort basis
    pub async fn delete(&self, slug: &str) -> QuireResult<Post> {
        require_slug(slug)?;
        let _guard = lock::acquire(self.index.path()).await?;

        let mut doc = self.index.load().await?;
        let pos = doc
            .position(slug)
            .ok_or_else(|| QuireError::PostNotFound(slug.to_string()))?;
        let removed = doc.posts.remove(pos);

        self.index.save(&doc).await?;
        self.content.remove_best_effort(slug).await;

        self.invalidate_cache().await;
        info!("Deleted post: {}", slug);
        Ok(removed)
    }

    /// Swap a post with its neighbour; returns `false` at the boundary
    pub async fn reorder(&self, slug: &str, direction: Direction) -> QuireResult<bool> {
        require_slug(slug)?;
        let _guard = lock::acquire(self.index.path()).await?;

        let mut doc = self.index.load().await?;
        let pos = doc
            .position(slug)
            .ok_or_else(|| QuireError::PostNotFound(slug.to_string()))?;

        let target = match direction {
            Direction::Up => pos.checked_sub(1),
            Direction::Down => Some(pos + 1).filter(|&next| next < doc.posts.len()),
        };
        let Some(target) = target else {
            debug!("Post {} already at the {} boundary", slug, direction);
            return Ok(false);
        };

        doc.posts.swap(pos, target);
        self.index.save(&doc).await?;

        self.invalidate_cache().await;
        info!("Moved post {} {}", slug, direction);
        Ok(true)
    }

    /// Randomize the whole order
    pub async fn shuffle_all(&self) -> QuireResult<()> {
        let _guard = lock::acquire(self.index.path()).await?;

        let mut doc = self.index.load().await?;
        doc.posts.shuffle(&mut rand::thread_rng());
        self.index.save(&doc).await?;

        self.invalidate_cache().await;
        info!("Shuffled {} posts", doc.posts.len());
        Ok(())
    }

    /// Drop the read cache snapshot
    pub async fn clear_cache(&self) -> QuireResult<()> {
        match &self.cache {
            Some(cache) => cache.invalidate().await,
            None => Ok(()),
        }
    }

    async fn invalidate_cache(&self) {
        if let Err(e) = self.clear_cache().await {
            warn!("Failed to invalidate read cache: {}", e);
        }
    }
}

fn require_slug(slug: &str) -> QuireResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(QuireError::validation(format!("malformed slug '{}'", slug)))
    }
}

fn base_slug(draft: &PostDraft) -> QuireResult<String> {
    if draft.title.is_empty() {
        return Err(QuireError::validation("title is required"));
    }
    let base = slugify(&draft.title);
    if base.is_empty() {
        return Err(QuireError::validation(
            "title must contain at least one ASCII letter or digit",
        ));
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{SnapshotState, DEFAULT_TTL};
    use crate::store::content::CONTENT_PLACEHOLDER;
    use crate::store::post::IndexDocument;
    use tempfile::TempDir;

    fn test_store() -> (PostStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let index = IndexFile::new(temp.path().join("posts.json"));
        let cache = ReadCache::new(
            temp.path().join("cache").join("posts.cache"),
            index.clone(),
            DEFAULT_TTL,
        );
        let store =
            PostStore::new(index, ContentDir::new(temp.path().join("posts"))).with_cache(cache);
        (store, temp)
    }

    fn draft(title: &str, content: &str) -> PostDraft {
        PostDraft::new(title, "desc", "rust, web", "", content)
    }

    async fn slugs(store: &PostStore) -> Vec<String> {
        store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect()
    }

    async fn seed(store: &PostStore, slugs: &[&str]) {
        // create() inserts at the head, so seed in reverse
        for slug in slugs.iter().rev() {
            store.create(draft(slug, "<p>x</p>")).await.unwrap();
        }
    }

    #[tokio::test]
    async fn list_is_empty_without_index() {
        let (store, _temp) = test_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_writes_index_and_content() {
        let (store, _temp) = test_store();
        let post = store
            .create(draft("Hello, World!", "<p>Hi</p>"))
            .await
            .unwrap();

        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert!(is_valid_slug(&post.slug));
        assert_eq!(store.load_content("hello-world").await, "<p>Hi</p>");
        assert_eq!(
            store.find_by_slug("hello-world").await.unwrap(),
            Some(post)
        );
    }

    #[tokio::test]
    async fn same_title_twice_gets_suffix() {
        let (store, _temp) = test_store();
        let first = store.create(draft("My Post", "1")).await.unwrap();
        let second = store.create(draft("My Post", "2")).await.unwrap();

        assert_eq!(first.slug, "my-post");
        assert_eq!(second.slug, "my-post-1");
        assert_eq!(slugs(&store).await, vec!["my-post-1", "my-post"]);
        assert!(store.slug_exists("my-post-1").await.unwrap());
    }

    #[tokio::test]
    async fn create_with_existing_slug_present() {
        let (store, _temp) = test_store();
        store.create(draft("hello world", "a")).await.unwrap();
        let post = store.create(draft("Hello, World!", "b")).await.unwrap();
        assert_eq!(post.slug, "hello-world-1");
    }

    #[tokio::test]
    async fn create_rolls_back_index_when_content_write_fails() {
        let (store, _temp) = test_store();
        store.create(draft("Existing", "e")).await.unwrap();
        let before = store.index().load().await.unwrap();

        // A directory in place of the content file makes the write fail.
        std::fs::create_dir_all(store.content().path_for("doomed").join("x")).unwrap();

        let err = store.create(draft("Doomed", "d")).await.unwrap_err();
        assert!(matches!(err, QuireError::ContentWrite { .. }));

        let after = store.index().load().await.unwrap();
        assert!(!after.contains("doomed"));
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn create_rejects_titles_without_slug_characters() {
        let (store, _temp) = test_store();
        let err = store.create(draft("!!!", "x")).await.unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
        assert!(!store.index().path().exists());
    }

    #[tokio::test]
    async fn find_by_invalid_slug_is_none() {
        let (store, _temp) = test_store();
        seed(&store, &["a"]).await;
        assert_eq!(store.find_by_slug("../a").await.unwrap(), None);
        assert_eq!(store.find_by_slug("A").await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_same_title_keeps_slug() {
        let (store, _temp) = test_store();
        let created = store.create(draft("Stable", "old")).await.unwrap();

        let edited = PostDraft::new("Stable", "new description", "misc", "", "new body");
        let updated = store.update("stable", edited).await.unwrap();

        assert_eq!(updated.slug, created.slug);
        assert_eq!(updated.description, "new description");
        assert_eq!(updated.tags, vec!["misc"]);
        assert_eq!(store.load_content("stable").await, "new body");
    }

    #[tokio::test]
    async fn update_new_title_renames_and_removes_old_content() {
        let (store, _temp) = test_store();
        store.create(draft("Old Name", "body")).await.unwrap();

        let updated = store
            .update("old-name", draft("New Name", "body v2"))
            .await
            .unwrap();

        assert_eq!(updated.slug, "new-name");
        assert!(store.content().exists("new-name").await);
        assert!(!store.content().exists("old-name").await);
        assert_eq!(slugs(&store).await, vec!["new-name"]);
    }

    #[tokio::test]
    async fn update_rename_respects_uniqueness() {
        let (store, _temp) = test_store();
        seed(&store, &["taken", "mine"]).await;

        let updated = store.update("mine", draft("Taken", "x")).await.unwrap();
        assert_eq!(updated.slug, "taken-1");
        assert_eq!(slugs(&store).await, vec!["taken", "taken-1"]);
    }

    #[tokio::test]
    async fn update_title_case_change_can_keep_slug() {
        let (store, _temp) = test_store();
        store.create(draft("release notes", "x")).await.unwrap();

        let updated = store
            .update("release-notes", draft("Release Notes", "x"))
            .await
            .unwrap();
        assert_eq!(updated.slug, "release-notes");
        assert!(store.content().exists("release-notes").await);
    }

    #[tokio::test]
    async fn update_content_failure_keeps_index_change() {
        let (store, _temp) = test_store();
        store.create(draft("Before", "body")).await.unwrap();
        std::fs::create_dir_all(store.content().path_for("after").join("x")).unwrap();

        let err = store
            .update("before", draft("After", "body"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuireError::ContentWrite { .. }));

        assert_eq!(slugs(&store).await, vec!["after"]);
        // The old body survives because removal only follows a good write.
        assert!(store.content().exists("before").await);
    }

    #[tokio::test]
    async fn update_missing_post() {
        let (store, _temp) = test_store();
        let err = store.update("ghost", draft("Ghost", "x")).await.unwrap_err();
        assert!(matches!(err, QuireError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn delete_then_find_and_delete_again() {
        let (store, _temp) = test_store();
        seed(&store, &["a", "b"]).await;

        let removed = store.delete("a").await.unwrap();
        assert_eq!(removed.slug, "a");
        assert_eq!(store.find_by_slug("a").await.unwrap(), None);
        assert_eq!(slugs(&store).await, vec!["b"]);
        assert!(!store.content().exists("a").await);
        assert_eq!(store.load_content("a").await, CONTENT_PLACEHOLDER);

        let err = store.delete("a").await.unwrap_err();
        assert!(matches!(err, QuireError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn delete_rejects_malformed_slug() {
        let (store, _temp) = test_store();
        let err = store.delete("../posts").await.unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
    }

    #[tokio::test]
    async fn reorder_scenarios() {
        let (store, _temp) = test_store();
        seed(&store, &["a", "b", "c"]).await;
        assert_eq!(slugs(&store).await, vec!["a", "b", "c"]);

        assert!(store.reorder("b", Direction::Up).await.unwrap());
        assert_eq!(slugs(&store).await, vec!["b", "a", "c"]);

        assert!(!store.reorder("b", Direction::Up).await.unwrap());
        assert!(!store.reorder("c", Direction::Down).await.unwrap());
        assert_eq!(slugs(&store).await, vec!["b", "a", "c"]);

        assert!(store.reorder("a", Direction::Up).await.unwrap());
        assert!(store.reorder("a", Direction::Down).await.unwrap());
        assert_eq!(slugs(&store).await, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn reorder_missing_post() {
        let (store, _temp) = test_store();
        let err = store.reorder("nope", Direction::Down).await.unwrap_err();
        assert!(matches!(err, QuireError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn shuffle_keeps_the_same_posts() {
        let (store, _temp) = test_store();
        seed(&store, &["a", "b", "c", "d", "e"]).await;

        store.shuffle_all().await.unwrap();
        let mut after = slugs(&store).await;
        after.sort();
        assert_eq!(after, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn mutations_invalidate_cache() {
        let (store, _temp) = test_store();
        seed(&store, &["a", "b"]).await;
        let cache = store.cache().unwrap().clone();

        cache.get().await.unwrap();
        assert_eq!(cache.state().await, SnapshotState::Fresh);

        store.reorder("b", Direction::Up).await.unwrap();
        assert_eq!(cache.state().await, SnapshotState::Absent);

        let doc = cache.get().await.unwrap();
        assert_eq!(doc, store.index().load().await.unwrap());
        assert_eq!(doc.slugs(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn boundary_noop_leaves_cache_alone() {
        let (store, _temp) = test_store();
        seed(&store, &["a"]).await;
        let cache = store.cache().unwrap().clone();
        cache.get().await.unwrap();

        store.reorder("a", Direction::Up).await.unwrap();
        assert_eq!(cache.state().await, SnapshotState::Fresh);
    }

    #[tokio::test]
    async fn preserves_unknown_index_fields() {
        let (store, _temp) = test_store();
        let mut doc = IndexDocument::default();
        doc.extra
            .insert("theme".to_string(), serde_json::json!("dark"));
        store.index().save(&doc).await.unwrap();

        store.create(draft("Kept", "x")).await.unwrap();
        let reloaded = store.index().load().await.unwrap();
        assert_eq!(reloaded.extra["theme"], "dark");
    }

    #[tokio::test]
    async fn concurrent_creates_do_not_lose_posts() {
        let (store, _temp) = test_store();
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(draft(&format!("Post {i}"), "x")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn failed_create_invalidates_cache() {
        let (store, _temp) = test_store();
        seed(&store, &["a"]).await;
        let cache = store.cache().unwrap().clone();
        cache.get().await.unwrap();

        std::fs::create_dir_all(store.content().path_for("doomed").join("x")).unwrap();
        store.create(draft("Doomed", "d")).await.unwrap_err();

        assert_eq!(cache.state().await, SnapshotState::Absent);
        assert_eq!(cache.get().await.unwrap().slugs(), vec!["a"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reads_never_cache_an_older_index() {
        let (store, _temp) = test_store();
        seed(&store, &["a", "b"]).await;
        let cache = store.cache().unwrap().clone();

        for round in 0..300 {
            let reader = {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get().await })
            };
            let direction = if round % 2 == 0 {
                Direction::Up
            } else {
                Direction::Down
            };
            assert!(store.reorder("b", direction).await.unwrap());
            reader.await.unwrap().unwrap();

            assert_eq!(
                cache.get().await.unwrap(),
                store.index().load().await.unwrap(),
                "snapshot behind the index after round {round}"
            );
        }
    }

    /// Store whose index temp file name exceeds the filesystem name limit,
    /// so every index save fails while loads still work
    fn unsavable_store() -> (PostStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let name = format!("{}.json", "p".repeat(235));
        let index = IndexFile::new(temp.path().join(name));
        let store = PostStore::new(index, ContentDir::new(temp.path().join("posts")));
        std::fs::create_dir_all(store.content().dir()).unwrap();
        (store, temp)
    }

    fn stored_post(slug: &str) -> Post {
        Post {
            title: slug.to_uppercase(),
            slug: slug.to_string(),
            description: String::new(),
            tags: vec![],
            featured_image: None,
            date: "2024-05-01 09:00:00".to_string(),
        }
    }

    /// Write the index and content files directly, bypassing `save`
    fn plant(store: &PostStore, slugs: &[&str]) -> String {
        let doc = IndexDocument::with_posts(slugs.iter().map(|s| stored_post(s)).collect());
        let raw = serde_json::to_string_pretty(&doc).unwrap();
        std::fs::write(store.index().path(), &raw).unwrap();
        for slug in slugs {
            std::fs::write(store.content().path_for(slug), format!("<p>{slug}</p>")).unwrap();
        }
        raw
    }

    #[tokio::test]
    async fn create_index_failure_writes_no_content() {
        let (store, _temp) = unsavable_store();
        let before = plant(&store, &["a"]);

        let err = store.create(draft("Fresh", "<p>new</p>")).await.unwrap_err();
        assert!(matches!(err, QuireError::IndexWrite { .. }), "{err:?}");

        assert!(!store.content().path_for("fresh").exists());
        assert_eq!(std::fs::read_to_string(store.index().path()).unwrap(), before);
    }

    #[tokio::test]
    async fn update_index_failure_leaves_content_alone() {
        let (store, _temp) = unsavable_store();
        let before = plant(&store, &["a"]);

        let err = store
            .update("a", draft("Renamed", "<p>changed</p>"))
            .await
            .unwrap_err();
        assert!(matches!(err, QuireError::IndexWrite { .. }), "{err:?}");

        assert!(!store.content().path_for("renamed").exists());
        assert_eq!(
            std::fs::read_to_string(store.content().path_for("a")).unwrap(),
            "<p>a</p>"
        );
        assert_eq!(std::fs::read_to_string(store.index().path()).unwrap(), before);
    }

    #[tokio::test]
    async fn delete_index_failure_keeps_content_file() {
        let (store, _temp) = unsavable_store();
        let before = plant(&store, &["a", "b"]);

        let err = store.delete("a").await.unwrap_err();
        assert!(matches!(err, QuireError::IndexWrite { .. }), "{err:?}");

        assert!(store.content().path_for("a").exists());
        assert_eq!(std::fs::read_to_string(store.index().path()).unwrap(), before);
    }
}
