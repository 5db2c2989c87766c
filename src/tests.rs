//! Integration tests for the volunteer backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::search::SearchIndex;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let index_path = temp_dir.path().join("index");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Initialize search index
        let search = Arc::new(SearchIndex::open(&index_path).expect("Failed to init search"));

        // Create config
        let config = Config {
            api_psk: psk.clone(),
            db_path,
            index_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            search,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Create a volunteer and return its ID.
async fn create_volunteer(fixture: &TestFixture, name: &str, skills: &[&str]) -> String {
    let resp = fixture
        .client
        .post(fixture.url("/api/volunteers"))
        .json(&json!({ "name": name, "skills": skills }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Create an event and return its ID.
async fn create_event(fixture: &TestFixture, name: &str, skills: &[&str], date: &str) -> String {
    let resp = fixture
        .client
        .post(fixture.url("/api/events"))
        .json(&json!({
            "name": name,
            "description": format!("{} description", name),
            "location": "Community Center",
            "requiredSkills": skills,
            "urgency": "Medium",
            "date": date
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_key() {
    let fixture = TestFixture::new().await;

    // Request without API key
    let resp = Client::new()
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_key() {
    let fixture = TestFixture::new().await;

    let resp = Client::new()
        .get(fixture.url("/api/datastore"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_valid_key() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_auth_disabled_without_psk() {
    let fixture = TestFixture::with_psk(None).await;

    let resp = Client::new()
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_datastore_get() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/datastore"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["schemaVersion"].is_number());
    assert!(body["data"]["revisionId"].is_number());
    assert!(body["data"]["volunteers"].is_array());
    assert!(body["data"]["events"].is_array());
    assert!(body["revisionId"].is_number());
}

#[tokio::test]
async fn test_volunteer_crud() {
    let fixture = TestFixture::new().await;

    // Create volunteer
    let create_resp = fixture
        .client
        .post(fixture.url("/api/volunteers"))
        .json(&json!({
            "name": "Alice Nguyen",
            "email": "alice@example.com",
            "skills": ["Cooking", "Medical Aid"],
            "availability": ["2030-05-01T09:00:00Z"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    assert_eq!(create_body["success"], true);
    let volunteer_id = create_body["data"]["id"].as_str().unwrap();
    assert_eq!(create_body["data"]["name"], "Alice Nguyen");
    assert_eq!(create_body["data"]["skills"], json!(["Cooking", "Medical Aid"]));
    assert_eq!(create_body["data"]["active"], true);
    let revision_after_create = create_body["revisionId"].as_i64().unwrap();

    // Get volunteer
    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/volunteers/{}", volunteer_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(get_resp.status(), 200);
    let get_body: Value = get_resp.json().await.unwrap();
    assert_eq!(get_body["data"]["skills"], json!(["Cooking", "Medical Aid"]));

    // Update volunteer
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/volunteers/{}", volunteer_id)))
        .json(&json!({
            "skills": ["Cooking", "Driving"],
            "expectedVersion": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["skills"], json!(["Cooking", "Driving"]));
    assert_eq!(update_body["data"]["version"], 2);
    let revision_after_update = update_body["revisionId"].as_i64().unwrap();
    assert!(revision_after_update > revision_after_create);

    // List volunteers
    let list_resp = fixture
        .client
        .get(fixture.url("/api/volunteers"))
        .send()
        .await
        .unwrap();

    assert_eq!(list_resp.status(), 200);
    let list_body: Value = list_resp.json().await.unwrap();
    assert!(list_body["data"].as_array().unwrap().len() >= 1);

    // Delete volunteer
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/volunteers/{}", volunteer_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(delete_resp.status(), 200);

    // Verify deleted
    let get_deleted_resp = fixture
        .client
        .get(fixture.url(&format!("/api/volunteers/{}", volunteer_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(get_deleted_resp.status(), 404);
}

#[tokio::test]
async fn test_volunteer_validation() {
    let fixture = TestFixture::new().await;

    // Empty name
    let resp = fixture
        .client
        .post(fixture.url("/api/volunteers"))
        .json(&json!({ "name": "", "skills": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Unknown skill labels are rejected at deserialization
    let resp2 = fixture
        .client
        .post(fixture.url("/api/volunteers"))
        .json(&json!({ "name": "Bob", "skills": ["Juggling"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp2.status(), 422);
}

#[tokio::test]
async fn test_event_crud() {
    let fixture = TestFixture::new().await;

    // Create event
    let create_resp = fixture
        .client
        .post(fixture.url("/api/events"))
        .json(&json!({
            "name": "Food Drive",
            "description": "Prepare and distribute meals",
            "location": "Community Kitchen",
            "requiredSkills": ["Cooking", "Driving"],
            "urgency": "High",
            "date": "2030-05-01T09:00:00Z"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    assert_eq!(create_body["success"], true);
    let event_id = create_body["data"]["id"].as_str().unwrap();
    assert_eq!(create_body["data"]["name"], "Food Drive");
    assert_eq!(create_body["data"]["urgency"], "High");
    assert_eq!(
        create_body["data"]["requiredSkills"],
        json!(["Cooking", "Driving"])
    );

    // Get event
    let get_resp = fixture
        .client
        .get(fixture.url(&format!("/api/events/{}", event_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(get_resp.status(), 200);

    // Update event
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/events/{}", event_id)))
        .json(&json!({
            "name": "Food Drive (Extended)",
            "urgency": "Critical"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["name"], "Food Drive (Extended)");
    assert_eq!(update_body["data"]["urgency"], "Critical");
    assert_eq!(update_body["data"]["version"], 2);

    // List events
    let list_resp = fixture
        .client
        .get(fixture.url("/api/events"))
        .send()
        .await
        .unwrap();

    assert_eq!(list_resp.status(), 200);

    // Delete event
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/events/{}", event_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(delete_resp.status(), 200);

    // Verify deleted
    let get_deleted_resp = fixture
        .client
        .get(fixture.url(&format!("/api/events/{}", event_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(get_deleted_resp.status(), 404);
}

#[tokio::test]
async fn test_event_validation() {
    let fixture = TestFixture::new().await;

    // No required skills
    let resp = fixture
        .client
        .post(fixture.url("/api/events"))
        .json(&json!({
            "name": "Skill-less Event",
            "description": "No skills needed",
            "location": "Anywhere",
            "requiredSkills": [],
            "urgency": "Low",
            "date": "2030-05-01T09:00:00Z"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Malformed date
    let resp2 = fixture
        .client
        .post(fixture.url("/api/events"))
        .json(&json!({
            "name": "Bad Date Event",
            "description": "Date is not a timestamp",
            "location": "Somewhere",
            "requiredSkills": ["Cooking"],
            "urgency": "Low",
            "date": "next Tuesday"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp2.status(), 400);
}

#[tokio::test]
async fn test_upcoming_events_excludes_past() {
    let fixture = TestFixture::new().await;

    create_event(&fixture, "Past Event", &["Cooking"], "2020-01-01T09:00:00Z").await;
    let future_id = create_event(
        &fixture,
        "Future Event",
        &["Cooking"],
        "2030-01-01T09:00:00Z",
    )
    .await;

    let resp = fixture
        .client
        .get(fixture.url("/api/events/upcoming"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], future_id.as_str());
}

#[tokio::test]
async fn test_optimistic_concurrency_conflict() {
    let fixture = TestFixture::new().await;

    let event_id = create_event(&fixture, "Versioned Event", &["Cooking"], "2030-05-01T09:00:00Z")
        .await;

    // Update with wrong version
    let conflict_resp = fixture
        .client
        .put(fixture.url(&format!("/api/events/{}", event_id)))
        .json(&json!({
            "name": "Should Fail",
            "expectedVersion": 999
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(conflict_resp.status(), 409);
    let conflict_body: Value = conflict_resp.json().await.unwrap();
    assert_eq!(conflict_body["success"], false);
    assert_eq!(conflict_body["error"]["code"], "VERSION_MISMATCH");
    assert!(conflict_body["error"]["details"]["currentVersion"].is_number());
}

#[tokio::test]
async fn test_best_match_full_scenario() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(
        &fixture,
        "Skilled Volunteer",
        &["Cooking", "Driving", "Teaching"],
    )
    .await;

    // X is a full match (2/2); Y is partial (3/4)
    let x_id = create_event(
        &fixture,
        "Event X",
        &["Cooking", "Driving"],
        "2030-06-01T09:00:00Z",
    )
    .await;
    create_event(
        &fixture,
        "Event Y",
        &["Cooking", "Driving", "Teaching", "Cleaning"],
        "2030-06-02T09:00:00Z",
    )
    .await;

    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/matching/best?volunteerId={}",
            volunteer_id
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["best"]["id"], x_id.as_str());
    assert_eq!(body["data"]["score"], 100);
    assert_eq!(
        body["data"]["overlappingSkills"],
        json!(["Cooking", "Driving"])
    );
    assert_eq!(body["data"]["missingSkills"], json!([]));
    assert_eq!(body["data"]["extraSkills"], json!(["Teaching"]));
}

#[tokio::test]
async fn test_best_match_tie_breaks_by_candidate_order() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "One-skill Volunteer", &["Cooking"]).await;

    // Both score 0.5; candidates arrive ordered by date, so P wins
    let p_id = create_event(
        &fixture,
        "Event P",
        &["Cooking", "Driving"],
        "2030-06-01T09:00:00Z",
    )
    .await;
    create_event(
        &fixture,
        "Event Q",
        &["Cooking", "Teaching"],
        "2030-06-02T09:00:00Z",
    )
    .await;

    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/matching/best?volunteerId={}",
            volunteer_id
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["best"]["id"], p_id.as_str());
    assert_eq!(body["data"]["score"], 50);
}

#[tokio::test]
async fn test_best_match_requires_candidate_events() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "Lonely Volunteer", &["Cooking"]).await;

    let resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/matching/best?volunteerId={}",
            volunteer_id
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_best_match_unknown_volunteer() {
    let fixture = TestFixture::new().await;

    create_event(&fixture, "Some Event", &["Cooking"], "2030-06-01T09:00:00Z").await;

    let resp = fixture
        .client
        .get(fixture.url("/api/matching/best?volunteerId=non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_matching_volunteers_excludes_inactive() {
    let fixture = TestFixture::new().await;

    let active_id = create_volunteer(&fixture, "Active Volunteer", &["Cooking"]).await;
    let inactive_resp = fixture
        .client
        .post(fixture.url("/api/volunteers"))
        .json(&json!({ "name": "Inactive Volunteer", "skills": [], "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(inactive_resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/matching/volunteers"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let volunteers = body["data"].as_array().unwrap();
    assert_eq!(volunteers.len(), 1);
    assert_eq!(volunteers[0]["id"], active_id.as_str());
}

#[tokio::test]
async fn test_assignment_flow() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "Assigned Volunteer", &["Cooking"]).await;
    let event_id = create_event(&fixture, "Soup Kitchen", &["Cooking"], "2030-06-01T09:00:00Z")
        .await;

    // Assign
    let assign_resp = fixture
        .client
        .post(fixture.url(&format!("/api/events/{}/assign-volunteer", event_id)))
        .json(&json!({ "volunteerId": volunteer_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(assign_resp.status(), 200);
    let assign_body: Value = assign_resp.json().await.unwrap();
    assert_eq!(assign_body["success"], true);
    assert!(assign_body["data"]["volunteerHistoryId"].is_string());
    assert_eq!(assign_body["data"]["eventId"], event_id.as_str());
    assert_eq!(assign_body["data"]["volunteerId"], volunteer_id.as_str());
    assert_eq!(assign_body["data"]["durationMinutes"], 90);

    // Assignment shows up on the event
    let list_resp = fixture
        .client
        .get(fixture.url(&format!("/api/events/{}/assignments", event_id)))
        .send()
        .await
        .unwrap();

    assert_eq!(list_resp.status(), 200);
    let list_body: Value = list_resp.json().await.unwrap();
    assert_eq!(list_body["data"], json!([volunteer_id]));

    // The volunteer got a notification
    let notif_resp = fixture
        .client
        .get(fixture.url(&format!(
            "/api/notifications?volunteerId={}",
            volunteer_id
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(notif_resp.status(), 200);
    let notif_body: Value = notif_resp.json().await.unwrap();
    let notifications = notif_body["data"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0]["message"]
        .as_str()
        .unwrap()
        .contains("Soup Kitchen"));
    assert_eq!(notifications[0]["read"], false);

    // Assigning the same pair again conflicts
    let dup_resp = fixture
        .client
        .post(fixture.url(&format!("/api/events/{}/assign-volunteer", event_id)))
        .json(&json!({ "volunteerId": volunteer_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(dup_resp.status(), 409);
    let dup_body: Value = dup_resp.json().await.unwrap();
    assert_eq!(dup_body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_assignment_requires_existing_parties() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "Hopeful Volunteer", &["Cooking"]).await;
    let event_id = create_event(&fixture, "Real Event", &["Cooking"], "2030-06-01T09:00:00Z")
        .await;

    // Unknown event
    let resp = fixture
        .client
        .post(fixture.url("/api/events/non-existent-id/assign-volunteer"))
        .json(&json!({ "volunteerId": volunteer_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Unknown volunteer
    let resp2 = fixture
        .client
        .post(fixture.url(&format!("/api/events/{}/assign-volunteer", event_id)))
        .json(&json!({ "volunteerId": "non-existent-id" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp2.status(), 404);
}

#[tokio::test]
async fn test_notifications_mark_all_read() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "Notified Volunteer", &["Cooking"]).await;
    let event_id = create_event(&fixture, "Garden Day", &["Cooking"], "2030-06-01T09:00:00Z")
        .await;

    fixture
        .client
        .post(fixture.url(&format!("/api/events/{}/assign-volunteer", event_id)))
        .json(&json!({ "volunteerId": volunteer_id }))
        .send()
        .await
        .unwrap();

    let mark_resp = fixture
        .client
        .post(fixture.url("/api/notifications/mark-all-read"))
        .send()
        .await
        .unwrap();

    assert_eq!(mark_resp.status(), 200);
    let mark_body: Value = mark_resp.json().await.unwrap();
    assert_eq!(mark_body["data"]["updated"], 1);

    let list_resp = fixture
        .client
        .get(fixture.url("/api/notifications"))
        .send()
        .await
        .unwrap();
    let list_body: Value = list_resp.json().await.unwrap();
    for notification in list_body["data"].as_array().unwrap() {
        assert_eq!(notification["read"], true);
    }
}

#[tokio::test]
async fn test_search_endpoint() {
    let fixture = TestFixture::new().await;

    create_event(
        &fixture,
        "River Cleanup",
        &["Gardening"],
        "2030-06-01T09:00:00Z",
    )
    .await;
    create_event(
        &fixture,
        "Charity Bake Sale",
        &["Cooking"],
        "2030-06-02T09:00:00Z",
    )
    .await;

    // Wait for search index to update
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let search_resp = fixture
        .client
        .get(fixture.url("/api/search?q=cleanup&limit=10"))
        .send()
        .await
        .unwrap();

    assert_eq!(search_resp.status(), 200);
    let search_body: Value = search_resp.json().await.unwrap();
    assert_eq!(search_body["success"], true);

    let results = search_body["data"]["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results[0]["event"]["name"]
        .as_str()
        .unwrap()
        .contains("Cleanup"));
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);

    let search_resp2 = fixture
        .client
        .get(fixture.url("/api/search?q=bake&limit=10"))
        .send()
        .await
        .unwrap();

    let search_body2: Value = search_resp2.json().await.unwrap();
    let results2 = search_body2["data"]["results"].as_array().unwrap();
    assert!(!results2.is_empty());
    assert!(results2[0]["event"]["name"]
        .as_str()
        .unwrap()
        .contains("Bake"));
}

#[tokio::test]
async fn test_volunteer_report_csv() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "Report Volunteer", &["Cooking"]).await;
    let event_id = create_event(&fixture, "Report Event", &["Cooking"], "2030-06-01T09:00:00Z")
        .await;

    fixture
        .client
        .post(fixture.url(&format!("/api/events/{}/assign-volunteer", event_id)))
        .json(&json!({ "volunteerId": volunteer_id, "durationMinutes": 120 }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/reports/volunteers"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("volunteer-activity-"));

    let body = resp.text().await.unwrap();
    assert!(body.contains("Report Volunteer"));
    assert!(body.contains("Report Event"));
    assert!(body.contains("120"));

    // A range in the far past excludes the assignment made just now
    let empty_resp = fixture
        .client
        .get(fixture.url(
            "/api/reports/volunteers?fromUtc=2000-01-01T00:00:00Z&toUtc=2000-12-31T23:59:59Z",
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(empty_resp.status(), 200);
    let empty_body = empty_resp.text().await.unwrap();
    assert!(!empty_body.contains("Report Volunteer"));

    // Malformed range
    let bad_resp = fixture
        .client
        .get(fixture.url("/api/reports/volunteers?fromUtc=yesterday"))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_resp.status(), 400);
}

#[tokio::test]
async fn test_event_report_csv() {
    let fixture = TestFixture::new().await;

    let volunteer_id = create_volunteer(&fixture, "Counted Volunteer", &["Cooking"]).await;
    let event_id = create_event(
        &fixture,
        "Participation Event",
        &["Cooking"],
        "2030-06-01T09:00:00Z",
    )
    .await;

    fixture
        .client
        .post(fixture.url(&format!("/api/events/{}/assign-volunteer", event_id)))
        .json(&json!({ "volunteerId": volunteer_id }))
        .send()
        .await
        .unwrap();

    let resp = fixture
        .client
        .get(fixture.url("/api/reports/events"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Participation Event"));
    assert!(body.contains("Community Center"));
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;

    // Get initial revision
    let initial_resp = fixture
        .client
        .get(fixture.url("/api/datastore/revision"))
        .send()
        .await
        .unwrap();
    let initial_body: Value = initial_resp.json().await.unwrap();
    let initial_revision = initial_body["data"]["revisionId"].as_i64().unwrap();

    // Create volunteer
    let create_resp = fixture
        .client
        .post(fixture.url("/api/volunteers"))
        .json(&json!({ "name": "Revision Volunteer", "skills": [] }))
        .send()
        .await
        .unwrap();
    let create_body: Value = create_resp.json().await.unwrap();
    let after_create = create_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_create, initial_revision + 1);

    let volunteer_id = create_body["data"]["id"].as_str().unwrap();

    // Update volunteer
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/volunteers/{}", volunteer_id)))
        .json(&json!({ "name": "Renamed Volunteer" }))
        .send()
        .await
        .unwrap();
    let update_body: Value = update_resp.json().await.unwrap();
    let after_update = update_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_update, initial_revision + 2);

    // Delete volunteer
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/volunteers/{}", volunteer_id)))
        .send()
        .await
        .unwrap();
    let delete_body: Value = delete_resp.json().await.unwrap();
    let after_delete = delete_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_delete, initial_revision + 3);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    // Get non-existent volunteer
    let resp = fixture
        .client
        .get(fixture.url("/api/volunteers/non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // Get non-existent event
    let resp2 = fixture
        .client
        .get(fixture.url("/api/events/non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp2.status(), 404);
}
