// Drives the client library against a live server on a random local port

use civic_client::api::{ApiClient, ApiError, VoteApi};
use civic_client::auth::AuthState;
use civic_client::session::SessionStore;
use civic_client::storage::{FileStorageAdapter, MemoryStorageAdapter};
use civic_client::votes::{VoteController, VoteError};
use civic_server::db::Database;
use civic_server::seed::{Loader, OperatorSeed, ReferenceCatalog};
use civic_server::{app, state::AppState};
use civic_types::{ContentKind, JurisdictionLevel, VoteDirection, VoteTally};

async fn spawn_server() -> String {
    let db = Database::in_memory().unwrap();
    db.initialize().unwrap();
    Loader::new(&db)
        .run(
            &ReferenceCatalog::standard(),
            &OperatorSeed::new("admin@civic.test", "Administrator", "operator-pass"),
        )
        .into_result()
        .unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(AppState::new(db))).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_login_persist_and_vote() {
    let base = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let mut api = ApiClient::new(&base, "http://127.0.0.1:9");

    let login = api.login("admin@civic.test", "operator-pass").await.unwrap();
    assert!(login.user.is_admin);

    let storage = FileStorageAdapter::with_store(SessionStore::at(dir.path().join("session")));
    let mut auth = AuthState::new(Box::new(storage));
    auth.set_credentials(login.user, login.session_token).unwrap();

    // A fresh process picks the session back up from disk
    let mut restored = AuthState::new(Box::new(FileStorageAdapter::with_store(SessionStore::at(
        dir.path().join("session"),
    ))));
    assert!(restored.restore().unwrap());

    let mut controller = VoteController::new(api.clone());
    let loaded = controller
        .load(&restored, ContentKind::FactCheck, "fc-9")
        .await
        .unwrap();
    assert_eq!(loaded, VoteTally::default());

    let up = controller
        .vote(&restored, ContentKind::FactCheck, "fc-9", VoteDirection::Up)
        .await
        .unwrap();
    assert_eq!(up, VoteTally::new(1, 0, Some(VoteDirection::Up)));

    let down = controller
        .vote(&restored, ContentKind::FactCheck, "fc-9", VoteDirection::Down)
        .await
        .unwrap();
    assert_eq!(down, VoteTally::new(0, 1, Some(VoteDirection::Down)));

    // Locally reconciled tally agrees with the server
    let server = api
        .fetch_tally(restored.token(), ContentKind::FactCheck, "fc-9")
        .await
        .unwrap();
    assert_eq!(VoteTally::from(&server), down);
}

#[tokio::test]
async fn test_anonymous_vote_is_rejected_locally() {
    let base = spawn_server().await;
    let auth = AuthState::new(Box::new(MemoryStorageAdapter::new()));
    let mut controller = VoteController::new(ApiClient::new(&base, "http://127.0.0.1:9"));

    let result = controller
        .vote(&auth, ContentKind::Politician, "p-1", VoteDirection::Up)
        .await;
    assert!(matches!(result, Err(VoteError::NotAuthenticated)));
}

#[tokio::test]
async fn test_reference_data_and_bad_login() {
    let base = spawn_server().await;
    let mut api = ApiClient::new(&base, "http://127.0.0.1:9");

    let regions = api.get_regions(Some("West")).await.unwrap();
    assert_eq!(regions.len(), 13);

    let offices = api.get_offices(Some(JurisdictionLevel::Federal)).await.unwrap();
    assert!(offices.iter().all(|o| o.level == JurisdictionLevel::Federal));

    let err = api.login("admin@civic.test", "wrong-password").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[tokio::test]
async fn test_unreachable_analysis_service_is_an_error() {
    let api = ApiClient::new("http://127.0.0.1:9", "http://127.0.0.1:9");
    assert!(api.get_fact_checks().await.is_err());
}
