use rstest::{fixture, rstest};

use super::*;

fn record(passport: &str, nickname: &str) -> NewUserRecord {
    NewUserRecord {
        passport: Passport::new(passport).expect("passport"),
        nickname: Nickname::new(nickname).expect("nickname"),
        password: PasswordDigest::from_stored(format!("digest-{passport}")),
        avatar: format!("/upload/avatar/{passport}.jpg"),
    }
}

#[fixture]
fn store() -> MemoryForumStore {
    MemoryForumStore::new()
}

#[rstest]
#[tokio::test]
async fn failed_unit_of_work_discards_its_writes(store: MemoryForumStore) {
    let result: Result<UserId, Error> = store
        .run(|tx| {
            Box::pin(async move {
                tx.insert(&record("alice", "Alice"))
                    .await
                    .map_err(|err| Error::internal(err.to_string()))?;
                Err(Error::conflict("abort after insert"))
            })
        })
        .await;

    assert!(result.is_err());
    assert_eq!(store.user_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn successful_unit_of_work_commits(store: MemoryForumStore) {
    let id = store
        .run(|tx| {
            Box::pin(async move {
                tx.insert(&record("alice", "Alice"))
                    .await
                    .map_err(|err| Error::internal(err.to_string()))
            })
        })
        .await
        .expect("commit");

    let user = UserRepository::find_by_id(&store, id)
        .await
        .expect("query")
        .expect("row");
    assert_eq!(user.passport.as_str(), "alice");
    assert!(user.is_enabled());
}

#[rstest]
#[case(record("alice", "Other"), UserPersistenceError::PassportTaken)]
#[case(record("bob", "Alice"), UserPersistenceError::NicknameTaken)]
#[tokio::test]
async fn inserts_enforce_uniqueness(
    store: MemoryForumStore,
    #[case] duplicate: NewUserRecord,
    #[case] expected: UserPersistenceError,
) {
    store.seed_user(record("alice", "Alice"), false).await.expect("seed");

    let err = store
        .seed_user(duplicate, false)
        .await
        .expect_err("duplicate rejected");
    assert_eq!(err, expected);
}

#[rstest]
#[tokio::test]
async fn credentials_match_on_passport_and_digest(store: MemoryForumStore) {
    let alice = store.seed_user(record("alice", "Alice"), false).await.expect("seed");

    let found = store
        .find_by_credentials("alice", &PasswordDigest::from_stored("digest-alice"))
        .await
        .expect("query");
    assert_eq!(found.map(|u| u.id), Some(alice.id));

    let missed = store
        .find_by_credentials("alice", &PasswordDigest::from_stored("nope"))
        .await
        .expect("query");
    assert!(missed.is_none());
}

#[rstest]
#[tokio::test]
async fn stats_group_by_kind_and_scope_to_user(store: MemoryForumStore) {
    let alice = store.seed_user(record("alice", "Alice"), false).await.expect("seed");
    let bob = store.seed_user(record("bob", "Bob"), false).await.expect("seed");
    for (user, kind) in [
        (alice.id, ContentKind::Article),
        (alice.id, ContentKind::Article),
        (bob.id, ContentKind::Topic),
    ] {
        store
            .seed_content(ContentSeed {
                kind,
                category_id: 1,
                user_id: user,
                title: "t".into(),
                view_count: 0,
            })
            .await;
    }

    let global = store.group_count_content_by_kind(None).await.expect("stats");
    assert_eq!(
        global,
        vec![("article".to_owned(), 2), ("topic".to_owned(), 1)]
    );
    let mine = store
        .group_count_content_by_kind(Some(alice.id))
        .await
        .expect("stats");
    assert_eq!(mine, vec![("article".to_owned(), 2)]);
}

#[rstest]
#[tokio::test]
async fn reply_listing_filters_and_pages(store: MemoryForumStore) {
    let alice = store.seed_user(record("alice", "Alice"), false).await.expect("seed");
    for n in 0..3 {
        store
            .create(&NewReply {
                parent_id: 0,
                target_type: "topic".into(),
                target_id: 7,
                user_id: alice.id,
                title: format!("re {n}"),
                content: "body".into(),
            })
            .await
            .expect("create");
    }

    let page = ReplyRepository::list(
        &store,
        &ReplyFilter {
            target_type: Some("topic".into()),
            target_id: Some(7),
            user_id: None,
            page: PageRequest::new(Some(1), Some(2)),
        },
    )
    .await
    .expect("list");
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].title, "re 2");

    assert!(store.delete(page.items[0].id).await.expect("delete"));
    assert!(!store.delete(page.items[0].id).await.expect("delete again"));
    assert_eq!(store.count_replies(Some(alice.id)).await.expect("count"), 2);
}

#[rstest]
#[tokio::test]
async fn deleting_a_reply_releases_the_target_counter(store: MemoryForumStore) {
    let alice = store.seed_user(record("alice", "Alice"), false).await.expect("seed");
    let topic = store
        .seed_content(ContentSeed {
            kind: ContentKind::Topic,
            category_id: 1,
            user_id: alice.id,
            title: "welcome".into(),
            view_count: 0,
        })
        .await;
    let reply = store
        .create(&NewReply {
            parent_id: 0,
            target_type: "topic".into(),
            target_id: topic.id,
            user_id: alice.id,
            title: "re".into(),
            content: "body".into(),
        })
        .await
        .expect("create");

    let topics = ContentFilter {
        kind: Some(ContentKind::Topic),
        category_id: None,
        user_id: None,
        sort: ContentSort::Latest,
        page: PageRequest::new(None, None),
    };
    let listed = ContentQuery::list(&store, &topics).await.expect("list");
    assert_eq!(listed.items.first().map(|c| c.reply_count), Some(1));

    assert!(store.delete(reply.id).await.expect("delete"));

    let listed = ContentQuery::list(&store, &topics).await.expect("list");
    assert_eq!(listed.items.first().map(|c| c.reply_count), Some(0));
    assert_eq!(store.count_replies(None).await.expect("count"), 0);
}
