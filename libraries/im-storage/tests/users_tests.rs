//! User and password integration tests


use im_core::types::*;
use im_core::IdentityManager;
use test_helpers::*;

#[tokio::test]
async fn test_create_user_normalizes_and_hashes() {
    let db = TestDb::new().await;
    let user_id = db
        .store
        .create_user(CreateUserRequest {
            username: "  alice   smith ".into(),
            email: " alice@example.com ".into(),
            phone_number: " 555  0100 ".into(),
            password: "hunter2".into(),
            description: "ops".into(),
            ..Default::default()
        })
        .await
        .expect("create")
        .user_id;

    assert!(user_id.as_str().starts_with(USER_ID_PREFIX));
    let user = db.store.get_user(&user_id).await.expect("get");
    assert_eq!(user.username, "alice smith");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.phone_number, "555 0100");
    assert_eq!(user.password_hash, "plain$hunter2");
    assert_eq!(user.status, Status::Active);
}

#[tokio::test]
async fn test_create_user_requires_username_and_password() {
    let db = TestDb::new().await;
    assert_invalid_argument(
        db.store
            .create_user(CreateUserRequest {
                username: "   ".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await,
    );
    assert_invalid_argument(
        db.store
            .create_user(CreateUserRequest {
                username: "bob".into(),
                ..Default::default()
            })
            .await,
    );
}

#[tokio::test]
async fn test_duplicate_username_or_email_is_rejected() {
    let db = TestDb::new().await;
    create_test_user(&db.store, "alice").await;

    assert_invalid_argument(
        db.store
            .create_user(CreateUserRequest {
                username: "alice".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await,
    );
    assert_invalid_argument(
        db.store
            .create_user(CreateUserRequest {
                username: "alice2".into(),
                email: "alice@example.com".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await,
    );
}

#[tokio::test]
async fn test_users_without_email_do_not_collide() {
    let db = TestDb::new().await;
    for name in ["a", "b"] {
        db.store
            .create_user(CreateUserRequest {
                username: name.into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await
            .expect("create without email");
    }
}

#[tokio::test]
async fn test_modify_user_partial_update() {
    let db = TestDb::new().await;
    let user_id = create_test_user(&db.store, "alice").await;

    db.store
        .modify_user(
            &user_id,
            ModifyUserRequest {
                description: "on call".into(),
                phone_number: "  555 ".into(),
                ..Default::default()
            },
        )
        .await
        .expect("modify");

    let user = db.store.get_user(&user_id).await.expect("get");
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.description, "on call");
    assert_eq!(user.phone_number, "555");
    assert_eq!(user.password_hash, "plain$secret");
}

#[tokio::test]
async fn test_modify_user_to_taken_username_is_rejected() {
    let db = TestDb::new().await;
    create_test_user(&db.store, "alice").await;
    let bob = create_test_user(&db.store, "bob").await;

    assert_invalid_argument(
        db.store
            .modify_user(
                &bob,
                ModifyUserRequest {
                    username: "alice".into(),
                    ..Default::default()
                },
            )
            .await,
    );
    assert_not_found(
        db.store
            .modify_user(&UserId::new("usr-missing"), ModifyUserRequest::default())
            .await,
    );
}

#[tokio::test]
async fn test_delete_users_drops_memberships() {
    let db = TestDb::new().await;
    let group = create_test_group(&db.store, None, "team").await;
    let alice = create_test_user(&db.store, "alice").await;
    db.store
        .join_group(membership(&[&group], &[&alice]))
        .await
        .expect("join");

    assert_invalid_argument(
        db.store
            .delete_users(DeleteUsersRequest { user_id: vec![] })
            .await,
    );

    let deleted = db
        .store
        .delete_users(DeleteUsersRequest {
            user_id: vec![alice.clone()],
        })
        .await
        .expect("delete");
    assert_eq!(deleted.user_id, vec![alice.clone()]);

    let user = db.store.get_user(&alice).await.expect("get");
    assert_eq!(user.status, Status::Deleted);

    let with_groups = db.store.get_user_with_groups(&alice).await.expect("get");
    assert!(with_groups.groups.is_empty());

    // No members left, so the group can go
    db.store
        .delete_groups(DeleteGroupsRequest {
            group_id: vec![group],
        })
        .await
        .expect("delete group");
}

#[tokio::test]
async fn test_compare_password() {
    let db = TestDb::new().await;
    let alice = create_test_user(&db.store, "alice").await;

    assert!(db.store.compare_password(&alice, "secret").await.expect("compare"));
    assert!(!db.store.compare_password(&alice, "wrong").await.expect("compare"));
    assert_not_found(
        db.store
            .compare_password(&UserId::new("usr-ghost"), "secret")
            .await,
    );
}

#[tokio::test]
async fn test_modify_password() {
    let db = TestDb::new().await;
    let alice = create_test_user(&db.store, "alice").await;
    let before = db.store.get_user(&alice).await.expect("get");

    assert_invalid_argument(db.store.modify_password(&alice, "").await);
    assert_not_found(
        db.store
            .modify_password(&UserId::new("usr-ghost"), "next")
            .await,
    );

    db.store
        .modify_password(&alice, "next")
        .await
        .expect("modify password");
    assert!(db.store.compare_password(&alice, "next").await.expect("compare"));
    assert!(!db.store.compare_password(&alice, "secret").await.expect("compare"));

    let after = db.store.get_user(&alice).await.expect("get");
    assert!(after.update_time >= before.update_time);
}

#[tokio::test]
async fn test_user_wire_form_hides_password() {
    let db = TestDb::new().await;
    let alice = create_test_user(&db.store, "alice").await;
    let user = db.store.get_user(&alice).await.expect("get");
    let json = serde_json::to_value(&user).expect("serialize");
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password").is_none());
}
