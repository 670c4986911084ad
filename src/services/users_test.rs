use super::*;

fn alice() -> NewUser<'static> {
    NewUser { username: "alice", firstname: "Alice", lastname: "Liddell", password: "rabbit-hole" }
}

// =============================================================================
// password hashing
// =============================================================================

#[test]
fn hash_password_is_phc_argon2id() {
    let hash = hash_password("hunter2").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(!hash.contains("hunter2"));
}

#[test]
fn hash_password_salts_each_call() {
    assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
}

#[test]
fn verify_password_matches_only_original() {
    let hash = hash_password("correct horse").unwrap();
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("battery staple", &hash));
}

#[test]
fn verify_password_rejects_garbage_hash() {
    assert!(!verify_password("anything", "not-a-phc-string"));
}

// =============================================================================
// UserStore
// =============================================================================

#[tokio::test]
async fn register_then_verify() {
    let store = UserStore::new();
    let profile = store.register(alice()).await.unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.firstname, "Alice");
    assert_eq!(profile.lastname, "Liddell");

    let verified = store.verify("alice", "rabbit-hole").await.unwrap();
    assert_eq!(verified, profile);
}

#[tokio::test]
async fn register_trims_username() {
    let store = UserStore::new();
    let profile = store
        .register(NewUser { username: "  bob ", ..alice() })
        .await
        .unwrap();
    assert_eq!(profile.username, "bob");
    assert!(store.verify("bob", "rabbit-hole").await.is_ok());
}

#[tokio::test]
async fn register_duplicate_username_fails() {
    let store = UserStore::new();
    store.register(alice()).await.unwrap();
    let err = store.register(alice()).await.unwrap_err();
    assert!(matches!(err, UserError::UsernameTaken));
    assert_eq!(err.to_string(), "Username already taken");
}

#[tokio::test]
async fn register_blank_fields_fail() {
    let store = UserStore::new();
    let err = store
        .register(NewUser { firstname: " ", ..alice() })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "firstname is required");

    let err = store
        .register(NewUser { password: "", ..alice() })
        .await
        .unwrap_err();
    assert!(matches!(err, UserError::MissingField("password")));
}

#[tokio::test]
async fn verify_wrong_password_and_unknown_user_look_the_same() {
    let store = UserStore::new();
    store.register(alice()).await.unwrap();

    let wrong = store.verify("alice", "nope").await.unwrap_err();
    let unknown = store.verify("mallory", "rabbit-hole").await.unwrap_err();
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(matches!(wrong, UserError::InvalidCredentials));
}

#[tokio::test]
async fn get_by_id() {
    let store = UserStore::new();
    let profile = store.register(alice()).await.unwrap();
    assert_eq!(store.get(profile.id).await, Some(profile));
    assert_eq!(store.get(Uuid::new_v4()).await, None);
}

#[test]
fn profile_serializes_public_fields_only() {
    let profile = UserProfile {
        id: Uuid::nil(),
        username: "carol".into(),
        firstname: "Carol".into(),
        lastname: "Danvers".into(),
    };
    let json = serde_json::to_value(&profile).unwrap();
    assert_eq!(json["username"], "carol");
    assert_eq!(json["firstname"], "Carol");
    assert_eq!(json["lastname"], "Danvers");
    assert!(json.get("password_hash").is_none());
}

#[test]
fn dummy_hash_is_a_real_argon2_hash() {
    let hash = DUMMY_HASH.as_deref().unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(PasswordHash::new(hash).is_ok());
}

#[tokio::test]
async fn verify_unknown_user_checks_password_against_dummy_hash() {
    let store = UserStore::new();
    // Even the dummy's own password must not authenticate a missing account.
    let err = store.verify("ghost", "no-such-account").await.unwrap_err();
    assert!(matches!(err, UserError::InvalidCredentials));
    assert!(LazyLock::force(&DUMMY_HASH).is_some());
}

#[tokio::test]
async fn get_indexes_every_registered_account() {
    let store = UserStore::new();
    let a = store.register(alice()).await.unwrap();
    let b = store
        .register(NewUser { username: "bob", ..alice() })
        .await
        .unwrap();
    assert_eq!(store.get(a.id).await.unwrap().username, "alice");
    assert_eq!(store.get(b.id).await.unwrap().username, "bob");
}
