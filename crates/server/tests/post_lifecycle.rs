mod common;

use blog_server::auth::Credentials;
use blog_server::models::PostInput;
use blog_server::store::{PageRequest, Sort};
use blog_server::Error;
use tempfile::TempDir;

#[tokio::test]
async fn test_hello_world_end_to_end() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    let token = state
        .auth
        .register(&Credentials::new("admin", "admin123"))
        .await
        .unwrap();
    assert!(state.auth.authenticate(&token).is_ok());

    let first = state
        .posts
        .create(&PostInput::new("Hello World", "x").published(true))
        .await
        .unwrap();
    assert_eq!(first.slug, "hello-world");
    assert!(first.published);
    assert_eq!(first.created_at, first.updated_at);

    let fetched = state.posts.get_by_slug("hello-world").await.unwrap();
    assert_eq!(fetched, first);

    let second = state
        .posts
        .create(&PostInput::new("Hello World", "again"))
        .await
        .unwrap();
    assert_ne!(second.slug, first.slug);
    let suffix = second.slug.strip_prefix("hello-world-").unwrap();
    assert!(!suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_create_rejects_blank_fields() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    let err = state
        .posts
        .create(&PostInput::new("", "content"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = state
        .posts
        .create(&PostInput::new("Title", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_update_keeps_slug_and_replaces_fields() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    let post = state
        .posts
        .create(
            &PostInput::new("Original Title", "body")
                .with_tags("rust,axum")
                .with_cover_image("cover.png")
                .published(true),
        )
        .await
        .unwrap();

    let updated = state
        .posts
        .update(post.id, &PostInput::new("A Completely New Title", "new body"))
        .await
        .unwrap();

    assert_eq!(updated.slug, "original-title");
    assert_eq!(updated.title, "A Completely New Title");
    assert_eq!(updated.content, "new body");
    // full replacement: omitted optional fields are cleared
    assert_eq!(updated.cover_image, None);
    assert_eq!(updated.tags, None);
    assert!(!updated.published);
    assert_eq!(updated.created_at, post.created_at);
    assert!(updated.updated_at >= post.updated_at);

    assert!(state.posts.get_by_slug("a-completely-new-title").await.is_err());
    assert_eq!(state.posts.get_by_slug("original-title").await.unwrap(), updated);
}

#[tokio::test]
async fn test_update_missing_post() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    let err = state
        .posts
        .update(404, &PostInput::new("Title", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_then_lookup_fails() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    let post = state
        .posts
        .create(&PostInput::new("Short Lived", "gone soon"))
        .await
        .unwrap();

    state.posts.delete(post.id).await.unwrap();

    assert!(matches!(
        state.posts.get_by_slug(&post.slug).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        state.posts.get_by_id(post.id).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        state.posts.delete(post.id).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_search() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    state
        .posts
        .create(&PostInput::new("The Art of Clean Code", "principles").with_tags("coding,best-practices"))
        .await
        .unwrap();
    state
        .posts
        .create(&PostInput::new("Why I Love Framer Motion", "animations").with_tags("frontend,react"))
        .await
        .unwrap();
    state
        .posts
        .create(&PostInput::new("100% Coverage", "testing"))
        .await
        .unwrap();

    let request = PageRequest::default();

    let empty = state.posts.search("", &request).await.unwrap();
    assert_eq!(empty.total_elements, 0);
    assert!(empty.content.is_empty());

    let clean = state.posts.search("clean", &request).await.unwrap();
    assert_eq!(clean.total_elements, 1);
    assert_eq!(clean.content[0].title, "The Art of Clean Code");

    let by_tag = state.posts.search("REACT", &request).await.unwrap();
    assert_eq!(by_tag.total_elements, 1);
    assert_eq!(by_tag.content[0].slug, "why-i-love-framer-motion");

    // wildcards are literal
    let percent = state.posts.search("%", &request).await.unwrap();
    assert_eq!(percent.total_elements, 1);
    assert_eq!(percent.content[0].slug, "100-coverage");

    let none = state.posts.search("haskell", &request).await.unwrap();
    assert!(none.empty);

    let blank = state.posts.search("   ", &request).await.unwrap();
    assert!(blank.empty);
}

#[tokio::test]
async fn test_search_keeps_surrounding_spaces() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;
    let request = PageRequest::default();

    state
        .posts
        .create(&PostInput::new("The Art of Clean Code", "principles"))
        .await
        .unwrap();
    state
        .posts
        .create(&PostInput::new("Codecs Explained", "audio"))
        .await
        .unwrap();

    let both = state.posts.search("code", &request).await.unwrap();
    assert_eq!(both.total_elements, 2);

    let word = state.posts.search(" code", &request).await.unwrap();
    assert_eq!(word.total_elements, 1);
    assert_eq!(word.content[0].title, "The Art of Clean Code");
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;
    let request = PageRequest::default();

    let post = state
        .posts
        .create(&PostInput::new("École Notes", "cours").with_tags("Français"))
        .await
        .unwrap();
    assert_eq!(post.slug, "cole-notes");

    for query in ["école", "ÉCOLE", "École Notes", "FRANÇAIS", "français"] {
        let page = state.posts.search(query, &request).await.unwrap();
        assert_eq!(page.total_elements, 1, "query {:?}", query);
        assert_eq!(page.content[0].id, post.id);
    }
}

#[tokio::test]
async fn test_listing_pagination_and_filters() {
    let dir = TempDir::new().unwrap();
    let state = common::test_state(dir.path()).await;

    for i in 0..5 {
        state
            .posts
            .create(&PostInput::new(format!("Post {}", i), "body").published(i % 2 == 0))
            .await
            .unwrap();
    }

    // default sort: newest first
    let page = state.posts.list(&PageRequest::new(0, 2)).await.unwrap();
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.content[0].title, "Post 4");
    assert_eq!(page.content[1].title, "Post 3");
    assert!(page.first && !page.last);

    let last = state.posts.list(&PageRequest::new(2, 2)).await.unwrap();
    assert_eq!(last.content.len(), 1);
    assert_eq!(last.content[0].title, "Post 0");
    assert!(last.last);

    let beyond = state.posts.list(&PageRequest::new(10, 2)).await.unwrap();
    assert!(beyond.content.is_empty());
    assert_eq!(beyond.total_elements, 5);

    let by_title: Sort = "title,asc".parse().unwrap();
    let sorted = state
        .posts
        .list(&PageRequest::new(0, 10).with_sort(by_title))
        .await
        .unwrap();
    let titles: Vec<_> = sorted.content.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Post 0", "Post 1", "Post 2", "Post 3", "Post 4"]);

    let published = state
        .posts
        .list_published(&PageRequest::default())
        .await
        .unwrap();
    assert_eq!(published.total_elements, 3);
    assert!(published.content.iter().all(|p| p.published));
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let dir = TempDir::new().unwrap();

    let mut config = common::test_config(dir.path());
    config.database_url = format!(
        "sqlite://{}",
        dir.path().join("seed.sqlite").to_string_lossy().replace('\\', "/")
    );
    config.seed_defaults = true;

    let state = blog_server::build_state(config.clone()).await.unwrap();
    let page = state.posts.list(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 3);
    // oldest sample was created two days ago, so newest is first
    assert_eq!(page.content[0].slug, "why-i-love-framer-motion");
    assert_eq!(page.content[2].slug, "getting-started-spring-boot-nextjs");
    drop(state);

    let state = blog_server::build_state(config).await.unwrap();
    let page = state.posts.list(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 3);

    let token = state
        .auth
        .login(&Credentials::new("admin", "admin123"))
        .await
        .unwrap();
    assert_eq!(state.auth.authenticate(&token).unwrap().username, "admin");

    let clean = state.posts.search("clean", &PageRequest::default()).await.unwrap();
    assert_eq!(clean.content[0].slug, "art-of-clean-code");
}
