//! Integration tests for `RentalApiClient` using wiremock.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rental_client::model::{NewListing, ProfileChanges};
use rental_client::{ClientError, CredentialSlot, RentalApiClient};

const RESIDENCY_ID: &str = "6f1c2a40-2b5c-4d8e-9a1b-0c2d3e4f5a6b";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RentalApiClient, CredentialSlot) {
    let server = MockServer::start().await;
    let slot = CredentialSlot::default();
    let client = RentalApiClient::from_reqwest(
        &format!("{}/api", server.uri()),
        reqwest::Client::new(),
        slot.clone(),
    )
    .expect("client");
    (server, client, slot)
}

fn residency_json(title: &str) -> Value {
    json!({
        "id": RESIDENCY_ID,
        "title": title,
        "description": "Bright",
        "price": 1500,
        "address": "12 Rua Augusta",
        "city": "Lisbon",
        "country": "Portugal",
        "image": "https://img.example/loft.jpg",
        "facilities": ["wifi"],
        "userEmail": "owner@example.com",
        "createdAt": "2024-05-17T10:00:00Z",
        "updatedAt": "2024-05-17T10:00:00Z",
    })
}

fn residency_id() -> Uuid {
    Uuid::parse_str(RESIDENCY_ID).expect("uuid")
}

// ── Residencies ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_residencies_decodes_array() {
    let (server, client, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/residency"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([residency_json("Loft")])))
        .mount(&server)
        .await;

    let residencies = client.list_residencies().await.expect("list");
    assert_eq!(residencies.len(), 1);
    assert_eq!(residencies[0].id, residency_id());
    assert_eq!(residencies[0].user_email, "owner@example.com");
}

#[tokio::test]
async fn bearer_credential_is_attached() {
    let (server, client, slot) = setup().await;
    slot.set(SecretString::from("opaque-token".to_owned()));
    Mock::given(method("GET"))
        .and(path(format!("/api/residency/{RESIDENCY_ID}")))
        .and(header("authorization", "Bearer opaque-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(residency_json("Loft")))
        .expect(1)
        .mount(&server)
        .await;

    let residency = client.get_residency(residency_id()).await.expect("get");
    assert_eq!(residency.title, "Loft");
}

#[tokio::test]
async fn create_wraps_listing_in_data() {
    let (server, client, _) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/residency/create"))
        .and(body_partial_json(json!({
            "data": {"title": "Loft", "price": 1500, "userEmail": "owner@example.com"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(residency_json("Loft")))
        .expect(1)
        .mount(&server)
        .await;

    let listing = NewListing {
        title: "Loft".to_owned(),
        price: 1500,
        user_email: "owner@example.com".to_owned(),
        ..NewListing::default()
    };
    let created = client.create_residency(&listing).await.expect("create");
    assert_eq!(created.price, 1500);
}

#[tokio::test]
async fn missing_residency_maps_to_not_found() {
    let (server, client, _) = setup().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/residency/{RESIDENCY_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "not_found",
            "message": "Residency not found",
            "traceId": "00000000-0000-0000-0000-000000000001",
        })))
        .mount(&server)
        .await;

    let err = client
        .get_residency(residency_id())
        .await
        .expect_err("missing");
    assert!(err.is_not_found());
    let ClientError::Api {
        message, trace_id, ..
    } = err
    else {
        panic!("expected API error");
    };
    assert_eq!(message, "Residency not found");
    assert_eq!(
        trace_id.as_deref(),
        Some("00000000-0000-0000-0000-000000000001")
    );
}

// ── Users ───────────────────────────────────────────────────────────

#[tokio::test]
async fn booking_without_date_sends_null() {
    let (server, client, _) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/user/bookVisit/{RESIDENCY_ID}")))
        .and(body_json(json!({"email": "a@x.com", "date": null})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Booked successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .book_visit("a@x.com", residency_id(), None)
        .await
        .expect("book");
    assert_eq!(response.message, "Booked successfully");
}

#[tokio::test]
async fn repeated_booking_is_a_conflict() {
    let (server, client, _) = setup().await;
    Mock::given(method("POST"))
        .and(path(format!("/api/user/bookVisit/{RESIDENCY_ID}")))
        .and(body_json(json!({"email": "a@x.com", "date": "2024-02-01"})))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "conflict",
            "message": "Already booked",
        })))
        .mount(&server)
        .await;

    let err = client
        .book_visit("a@x.com", residency_id(), NaiveDate::from_ymd_opt(2024, 2, 1))
        .await
        .expect_err("conflict");
    assert!(err.is_conflict());
    assert_eq!(err.api_error_code(), Some("conflict"));
}

#[tokio::test]
async fn bookings_and_favourites_decode() {
    let (server, client, _) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/user/allBookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"residencyId": RESIDENCY_ID, "date": "2024-06-01"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/allFav"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([RESIDENCY_ID])))
        .mount(&server)
        .await;

    let bookings = client.list_bookings("a@x.com").await.expect("bookings");
    assert_eq!(bookings[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"));
    let favourites = client.list_favourites("a@x.com").await.expect("favourites");
    assert!(favourites.contains(&residency_id()));
}

#[tokio::test]
async fn profile_update_sends_only_changed_fields() {
    let (server, client, _) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/user/profile/update"))
        .and(body_json(json!({"email": "ada@example.com", "phone": "555"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "ada@example.com",
            "name": "Ada",
            "gender": "female",
            "phone": "555",
            "image": null,
            "bookedVisits": [],
            "favouriteResidencyIds": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let changes = ProfileChanges {
        phone: Some("555".to_owned()),
        ..ProfileChanges::default()
    };
    let profile = client
        .update_profile("ada@example.com", &changes)
        .await
        .expect("update");
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.phone.as_deref(), Some("555"));
}

// ── Failure shapes ──────────────────────────────────────────────────

#[tokio::test]
async fn non_json_error_body_is_kept_as_message() {
    let (server, client, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/residency"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.list_residencies().await.expect_err("gateway");
    assert!(
        matches!(
            &err,
            ClientError::Api { status: 502, code, message, .. }
                if code == "unknown" && message == "Bad Gateway"
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn malformed_success_body_is_a_deserialization_error() {
    let (server, client, _) = setup().await;
    Mock::given(method("GET"))
        .and(path("/api/residency"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
        .mount(&server)
        .await;

    let err = client.list_residencies().await.expect_err("malformed");
    assert!(
        matches!(&err, ClientError::Deserialization { body, .. } if body.contains("a list")),
        "unexpected error: {err:?}"
    );
}
