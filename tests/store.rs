mod common;

use std::collections::BTreeSet;

use blogly::error::StoreError;
use blogly::models::{PostInput, UserInput, DEFAULT_IMAGE_URL};
use blogly::store::{posts, tags, users};
use common::test_pool;

#[tokio::test]
async fn list_users_orders_by_last_then_first_name() {
    let db = test_pool().await;
    users::create(&db, &UserInput::new("Carl", "Zeta", None)).await.unwrap();
    users::create(&db, &UserInput::new("Bea", "Alpha", None)).await.unwrap();
    users::create(&db, &UserInput::new("Abe", "Alpha", None)).await.unwrap();

    let names: Vec<String> = users::list(&db)
        .await
        .unwrap()
        .iter()
        .map(|u| u.full_name())
        .collect();
    assert_eq!(names, vec!["Abe Alpha", "Bea Alpha", "Carl Zeta"]);
}

#[tokio::test]
async fn create_user_rejects_empty_names() {
    let db = test_pool().await;
    let err = users::create(&db, &UserInput::new("", "Smith", None))
        .await
        .unwrap_err();
    match err {
        StoreError::Validation(errors) => assert!(errors.contains_key("first_name")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(users::count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn create_user_defaults_image() {
    let db = test_pool().await;
    let user = users::create(&db, &UserInput::new("A", "B", Some(""))).await.unwrap();
    assert_eq!(user.image_url, DEFAULT_IMAGE_URL);
    assert_eq!(users::get(&db, user.id).await.unwrap(), user);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let db = test_pool().await;
    let input = UserInput::new("A", "B", None);

    assert!(matches!(users::get(&db, 1).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(users::update(&db, 1, &input).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(users::delete(&db, 1).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(posts::get(&db, 1).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(posts::delete(&db, 1).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(
        posts::update(&db, 1, &PostInput::new("T", "C", [])).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(tags::get(&db, 1).await, Err(StoreError::NotFound { .. })));
    assert!(matches!(tags::update(&db, 1, "x").await, Err(StoreError::NotFound { .. })));
    assert!(matches!(tags::delete(&db, 1).await, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn create_post_for_missing_user_is_not_found() {
    let db = test_pool().await;
    let err = posts::create(&db, 99, &PostInput::new("T", "C", []))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "user", id: 99 }));
}

#[tokio::test]
async fn post_tags_are_exactly_the_requested_existing_tags() {
    let db = test_pool().await;
    let user = users::create(&db, &UserInput::new("A", "B", None)).await.unwrap();
    let t1 = tags::create(&db, "one").await.unwrap();
    let t2 = tags::create(&db, "two").await.unwrap();
    tags::create(&db, "three").await.unwrap();

    let post = posts::create(&db, user.id, &PostInput::new("T", "C", [t1.id, t2.id, 404]))
        .await
        .unwrap();

    let fetched: Vec<i64> = posts::tags_for(&db, post.id)
        .await
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(fetched, vec![t1.id, t2.id]);
}

#[tokio::test]
async fn update_post_replaces_tag_set() {
    let db = test_pool().await;
    let user = users::create(&db, &UserInput::new("A", "B", None)).await.unwrap();
    let t1 = tags::create(&db, "one").await.unwrap();
    let t2 = tags::create(&db, "two").await.unwrap();
    let t3 = tags::create(&db, "three").await.unwrap();
    let post = posts::create(&db, user.id, &PostInput::new("T", "C", [t1.id, t2.id]))
        .await
        .unwrap();

    let updated = posts::update(&db, post.id, &PostInput::new("New", "Body", [t3.id]))
        .await
        .unwrap();
    assert_eq!(updated.title, "New");
    assert_eq!(updated.content, "Body");
    assert_eq!(updated.created_at, post.created_at);
    assert_eq!(
        posts::tag_ids(&db, post.id).await.unwrap(),
        BTreeSet::from([t3.id])
    );
}

#[tokio::test]
async fn delete_user_cascades_to_posts_and_memberships() {
    let db = test_pool().await;
    let doomed = users::create(&db, &UserInput::new("Doomed", "User", None)).await.unwrap();
    let other = users::create(&db, &UserInput::new("Other", "User", None)).await.unwrap();
    let tag = tags::create(&db, "shared").await.unwrap();

    let p1 = posts::create(&db, doomed.id, &PostInput::new("1", "c", [tag.id])).await.unwrap();
    let p2 = posts::create(&db, doomed.id, &PostInput::new("2", "c", [tag.id])).await.unwrap();
    let kept = posts::create(&db, other.id, &PostInput::new("3", "c", [tag.id])).await.unwrap();

    let removed = users::delete(&db, doomed.id).await.unwrap();
    assert_eq!(removed, 2);

    for id in [p1.id, p2.id] {
        assert!(posts::get(&db, id).await.is_err());
        assert!(posts::tag_ids(&db, id).await.unwrap().is_empty());
    }
    assert!(posts::list_by_user(&db, doomed.id).await.unwrap().is_empty());
    assert_eq!(posts::tag_ids(&db, kept.id).await.unwrap(), BTreeSet::from([tag.id]));
    assert_eq!(tags::count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn list_posts_by_user_filters_by_that_user() {
    let db = test_pool().await;
    let a = users::create(&db, &UserInput::new("A", "A", None)).await.unwrap();
    let b = users::create(&db, &UserInput::new("B", "B", None)).await.unwrap();
    posts::create(&db, a.id, &PostInput::new("first", "c", [])).await.unwrap();
    posts::create(&db, a.id, &PostInput::new("second", "c", [])).await.unwrap();
    posts::create(&db, b.id, &PostInput::new("other", "c", [])).await.unwrap();

    let titles: Vec<String> = posts::list_by_user(&db, a.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[tokio::test]
async fn list_recent_caps_and_orders() {
    let db = test_pool().await;
    let user = users::create(&db, &UserInput::new("Jane", "Smith", None)).await.unwrap();
    for n in 0..4 {
        posts::create(&db, user.id, &PostInput::new(&format!("p{n}"), "c", [])).await.unwrap();
    }

    let recent = posts::list_recent(&db, 3).await.unwrap();
    let titles: Vec<&str> = recent.iter().map(|s| s.post.title.as_str()).collect();
    assert_eq!(titles, vec!["p3", "p2", "p1"]);
    assert!(recent.iter().all(|s| s.author_name == "Jane Smith"));
    assert!(posts::list_recent(&db, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_tag_name_conflicts_and_count_is_unchanged() {
    let db = test_pool().await;
    tags::create(&db, "fun").await.unwrap();

    let err = tags::create(&db, " fun ").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { field: "name", .. }));
    assert_eq!(tags::count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn update_tag_conflicts_on_duplicate_but_allows_same_name() {
    let db = test_pool().await;
    tags::create(&db, "taken").await.unwrap();
    let tag = tags::create(&db, "mine").await.unwrap();

    assert!(matches!(
        tags::update(&db, tag.id, "taken").await,
        Err(StoreError::Conflict { .. })
    ));
    assert_eq!(tags::update(&db, tag.id, "mine").await.unwrap().name, "mine");
}

#[tokio::test]
async fn delete_tag_keeps_posts() {
    let db = test_pool().await;
    let user = users::create(&db, &UserInput::new("A", "B", None)).await.unwrap();
    let t1 = tags::create(&db, "one").await.unwrap();
    let t2 = tags::create(&db, "two").await.unwrap();
    let post = posts::create(&db, user.id, &PostInput::new("T", "C", [t1.id, t2.id]))
        .await
        .unwrap();

    tags::delete(&db, t1.id).await.unwrap();

    assert_eq!(posts::get(&db, post.id).await.unwrap().id, post.id);
    assert_eq!(posts::tag_ids(&db, post.id).await.unwrap(), BTreeSet::from([t2.id]));
    assert!(tags::posts_for(&db, t2.id).await.unwrap().iter().any(|p| p.id == post.id));
}

#[tokio::test]
async fn seed_populates_sample_data_and_is_repeatable() {
    let db = test_pool().await;

    let first = blogly::cli::seed(&db).await.unwrap();
    let second = blogly::cli::seed(&db).await.unwrap();
    assert_eq!(first, second);

    assert_eq!(users::count(&db).await.unwrap(), second.users as i64);
    assert_eq!(tags::count(&db).await.unwrap(), second.tags as i64);
    assert_eq!(
        posts::list_recent(&db, 100).await.unwrap().len(),
        second.posts
    );
}
