//! Integration tests for the remote user service contract and the
//! read-through mirror load.
//!
//! These tests run the API client against a local mock server; nothing here
//! touches the real demo endpoint.

use userhub::api::ApiClient;
use userhub::bus::CreationBus;
use userhub::mirror::{ops, MirrorStore};
use userhub::models::{User, UserDraft};

use std::sync::{Arc, Mutex};

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ann_json() -> serde_json::Value {
    serde_json::json!({
        "id": 1,
        "name": "Ann",
        "username": "ann",
        "email": "ann@example.com",
        "phone": "555-0100",
        "website": "ann.example.com",
        "address": {
            "street": "1 Main St",
            "suite": "Apt 4",
            "city": "Springfield",
            "zipcode": "12345",
            "geo": {"lat": "40.0", "lng": "-75.0"}
        },
        "company": {
            "name": "Acme",
            "catchPhrase": "Make it so",
            "bs": "synergies"
        }
    })
}

fn complete_draft() -> UserDraft {
    UserDraft {
        name: "Ann".to_string(),
        username: "ann".to_string(),
        email: "ann@example.com".to_string(),
        phone: "555-0100".to_string(),
        website: "ann.example.com".to_string(),
    }
}

#[tokio::test]
async fn test_fetch_users_parses_wire_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![ann_json()]))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).unwrap();
    let users = api.fetch_users().await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, 1);
    assert_eq!(users[0].name, "Ann");
    assert_eq!(
        users[0].company.as_ref().unwrap().tagline.as_deref(),
        Some("synergies")
    );
}

#[tokio::test]
async fn test_load_is_read_through_and_seeds_the_mirror() {
    let server = MockServer::start().await;

    // The remote list is fetched exactly once; the second load is served
    // from the mirror file.
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![ann_json()]))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();
    let api = ApiClient::new(server.uri()).unwrap();

    let first = store.load(&api).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, "Ann");

    // Mirror now holds the list
    let mirrored = store.read().unwrap().unwrap();
    assert_eq!(mirrored.len(), 1);

    let second = store.load(&api).await.unwrap();
    assert_eq!(second.len(), 1);
}

#[tokio::test]
async fn test_load_surfaces_remote_failure_without_writing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();
    let api = ApiClient::new(server.uri()).unwrap();

    assert!(store.load(&api).await.is_err());
    assert!(store.read().unwrap().is_none());
}

#[tokio::test]
async fn test_create_flow_posts_once_mirrors_once_publishes_once() {
    let server = MockServer::start().await;

    // The demo service echoes the body with its own constant identifier
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_partial_json(serde_json::json!({
            "name": "Ann",
            "username": "ann",
            "email": "ann@example.com"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 11,
            "name": "Ann",
            "username": "ann",
            "email": "ann@example.com",
            "phone": "555-0100",
            "website": "ann.example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = MirrorStore::new(dir.path().to_path_buf()).unwrap();
    let api = ApiClient::new(server.uri()).unwrap();

    let bus = CreationBus::new();
    let delivered: Arc<Mutex<Vec<User>>> = Arc::new(Mutex::new(Vec::new()));
    let _sub = {
        let delivered = Arc::clone(&delivered);
        bus.subscribe(move |user: &User| delivered.lock().unwrap().push(user.clone()))
    };

    // The same sequence the app applies for a validated create
    let draft = complete_draft();
    assert!(draft.validate().is_ok());

    let created = api.create_user(&draft).await.unwrap();
    assert_eq!(created.id, 11);

    let mut users: Vec<User> = Vec::new();
    ops::append(&mut users, created.clone());
    store.save(&users).unwrap();
    bus.publish(&created);

    let mirrored = store.read().unwrap().unwrap();
    assert_eq!(mirrored.len(), 1);
    assert_eq!(mirrored[0].name, "Ann");

    let delivered = delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, created.id);
}

#[tokio::test]
async fn test_unsubscribed_listener_misses_the_creation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 11,
            "name": "Ann",
            "username": "ann",
            "email": "ann@example.com"
        })))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).unwrap();
    let bus = CreationBus::new();

    let first_calls = Arc::new(Mutex::new(0usize));
    let second_calls = Arc::new(Mutex::new(0usize));

    let sub1 = {
        let calls = Arc::clone(&first_calls);
        bus.subscribe(move |_: &User| *calls.lock().unwrap() += 1)
    };
    let _sub2 = {
        let calls = Arc::clone(&second_calls);
        bus.subscribe(move |_: &User| *calls.lock().unwrap() += 1)
    };

    sub1.unsubscribe();

    let created = api.create_user(&complete_draft()).await.unwrap();
    bus.publish(&created);

    assert_eq!(*first_calls.lock().unwrap(), 0);
    assert_eq!(*second_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_update_and_delete_contract() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/users/3"))
        .and(body_partial_json(serde_json::json!({"id": 3, "name": "Bobby"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 3,
            "name": "Bobby",
            "username": "bob",
            "email": "bob@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/users/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).unwrap();

    let mut draft = complete_draft();
    draft.name = "Bobby".to_string();
    draft.username = "bob".to_string();
    draft.email = "bob@example.com".to_string();

    let updated = api.update_user(3, &draft).await.unwrap();
    assert_eq!(updated.id, 3);
    assert_eq!(updated.name, "Bobby");

    api.delete_user(3).await.unwrap();
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri()).unwrap();
    assert!(api.delete_user(7).await.is_err());
}
