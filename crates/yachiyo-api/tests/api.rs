use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use jsonwebtoken::{EncodingKey, Header, encode};
use yachiyo_api::auth::{AuthSettings, create_token};
use yachiyo_api::{AppState, AppStateInner, router};
use yachiyo_db::Database;
use yachiyo_types::api::{Claims, NewRoom};
use yachiyo_types::models::Extra;

const SECRET: &str = "test-secret";

fn setup() -> (Router, AppState) {
    setup_with_cookies(false)
}

fn setup_with_cookies(secure_cookies: bool) -> (Router, AppState) {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        auth: AuthSettings {
            jwt_secret: SECRET.to_string(),
            secure_cookies,
        },
    });
    (router(state.clone()), state)
}

fn add_room(state: &AppState, seats: u32) -> Uuid {
    state
        .db
        .insert_room(&NewRoom {
            title: "Harbour view".to_string(),
            seats,
            extra: Extra::new(),
        })
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(resp: Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Full `Set-Cookie` header returned by `POST /jwt`.
async fn issue_cookie(app: &Router, email: &str) -> String {
    let resp = send(app, request(Method::POST, "/jwt", Some(json!({ "email": email })))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("token cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(json_body(resp).await, json!({ "status": true }));
    set_cookie
}

/// `name=value` pair to send back in a `Cookie` header.
async fn login(app: &Router, email: &str) -> String {
    let set_cookie = issue_cookie(app, email).await;
    set_cookie.split(';').next().unwrap().to_string()
}

fn cookie_attributes(set_cookie: &str) -> Vec<String> {
    set_cookie.split(';').skip(1).map(|a| a.trim().to_string()).collect()
}

fn with_cookie(cookie: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn checkout_takes_last_seat_then_reports_sold_out() {
    let (app, state) = setup();
    let id = add_room(&state, 1);
    let uri = format!("/rooms/checkout/{id}");

    let resp = send(&app, request(Method::PUT, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "message": "Booking successful" }));
    assert_eq!(state.db.get_room(&id).unwrap().unwrap().seats, 0);

    let resp = send(&app, request(Method::PUT, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await, json!({ "error": "No seats available" }));
    assert_eq!(state.db.get_room(&id).unwrap().unwrap().seats, 0);
}

#[tokio::test]
async fn checkout_unknown_room_is_not_found() {
    let (app, _state) = setup();
    let uri = format!("/rooms/checkout/{}", Uuid::new_v4());

    let resp = send(&app, request(Method::PUT, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await, json!({ "error": "Room not found" }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_sell_exactly_one_seat() {
    let (app, state) = setup();
    let id = add_room(&state, 1);
    let uri = format!("/rooms/checkout/{id}");

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let app = app.clone();
            let req = request(Method::PUT, &uri, None);
            tokio::spawn(async move { app.oneshot(req).await.unwrap().status() })
        })
        .collect();

    let mut statuses = Vec::new();
    for task in tasks {
        statuses.push(task.await.unwrap());
    }

    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let sold_out = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
    assert_eq!(ok, 1);
    assert_eq!(sold_out, 11);
    assert_eq!(state.db.get_room(&id).unwrap().unwrap().seats, 0);
}

#[tokio::test]
async fn room_details_and_checkout_views_match() {
    let (app, state) = setup();
    let id = add_room(&state, 3);

    let details_uri = format!("/rooms/details/{id}");
    let checkout_uri = format!("/rooms/checkout/{id}");
    let details = json_body(send(&app, request(Method::GET, &details_uri, None)).await).await;
    let checkout = json_body(send(&app, request(Method::GET, &checkout_uri, None)).await).await;
    assert_eq!(details, checkout);
    assert_eq!(details["seats"], 3);

    let rooms = json_body(send(&app, request(Method::GET, "/rooms", None)).await).await;
    assert_eq!(rooms.as_array().unwrap().len(), 1);

    let resp = send(&app, request(Method::GET, "/rooms/details/not-a-uuid", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_bookings_requires_token_cookie() {
    let (app, _state) = setup();

    let resp = send(&app, request(Method::GET, "/bookings", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await, json!({ "error": "Unauthorized access" }));

    let cookie = login(&app, "a@b.com").await;
    let resp = send(&app, with_cookie(&cookie, "/bookings")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!([]));
}

#[tokio::test]
async fn tampered_or_foreign_tokens_are_forbidden() {
    let (app, _state) = setup();
    let cookie = login(&app, "a@b.com").await;

    // Flip a character in the middle of the signature
    let sig_start = cookie.rfind('.').unwrap() + 1;
    let pos = sig_start + 10;
    let replacement = if &cookie[pos..pos + 1] == "A" { "B" } else { "A" };
    let mut tampered = cookie.clone();
    tampered.replace_range(pos..pos + 1, replacement);

    let resp = send(&app, with_cookie(&tampered, "/bookings")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await, json!({ "error": "Forbidden access" }));

    let mut payload = Extra::new();
    payload.insert("email".into(), json!("a@b.com"));
    let foreign = format!("token={}", create_token("some-other-secret", payload).unwrap());
    let resp = send(&app, with_cookie(&foreign, "/bookings")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bookings_lifecycle_and_email_filter() {
    let (app, _state) = setup();
    let cookie = login(&app, "a@b.com").await;
    let room_id = Uuid::new_v4();

    let mut ids = Vec::new();
    let seeds = [
        ("a@b.com", "2024-07-01"),
        ("c@d.com", "2024-07-02"),
        ("a@b.com", "2024-07-03"),
    ];
    for (email, date) in seeds {
        let body = json!({ "email": email, "date": date, "roomId": room_id, "guests": 2 });
        let resp = send(&app, request(Method::POST, "/bookings", Some(body))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let result = json_body(resp).await;
        assert_eq!(result["acknowledged"], true);
        ids.push(result["insertedId"].as_str().unwrap().to_string());
    }

    let mine = json_body(send(&app, with_cookie(&cookie, "/bookings?email=a@b.com")).await).await;
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|b| b["email"] == "a@b.com"));
    assert_eq!(mine[0]["guests"], 2);

    let all = json_body(send(&app, with_cookie(&cookie, "/bookings")).await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let uri = format!("/bookings/{}", ids[0]);
    let body = json!({ "newDate": "2024-08-15" });
    let resp = send(&app, request(Method::PUT, &uri, Some(body))).await;
    assert_eq!(
        json_body(resp).await,
        json!({ "acknowledged": true, "matchedCount": 1, "modifiedCount": 1 })
    );

    let resp = send(&app, request(Method::DELETE, &uri, None)).await;
    assert_eq!(json_body(resp).await, json!({ "acknowledged": true, "deletedCount": 1 }));

    let resp = send(&app, request(Method::DELETE, &uri, None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "acknowledged": true, "deletedCount": 0 }));
}

#[tokio::test]
async fn malformed_booking_payloads_are_rejected() {
    let (app, _state) = setup();

    let bad_email = json!({ "email": "nobody", "date": "2024-07-01", "roomId": Uuid::new_v4() });
    let resp = send(&app, request(Method::POST, "/bookings", Some(bad_email))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let bad_date = json!({ "email": "a@b.com", "date": "next tuesday", "roomId": Uuid::new_v4() });
    let resp = send(&app, request(Method::POST, "/bookings", Some(bad_date))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/bookings/{}", Uuid::new_v4());
    let body = json!({ "newDate": "2024-13-40" });
    let resp = send(&app, request(Method::PUT, &uri, Some(body))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reviews_filter_by_room_index() {
    let (app, _state) = setup();

    for (idx, rating) in [(1, 5), (2, 4), (1, 3)] {
        let body = json!({ "idx": idx, "rating": rating, "comment": "Lovely stay" });
        let resp = send(&app, request(Method::POST, "/reviews", Some(body))).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = send(&app, request(Method::GET, "/reviews?roomId=1", None)).await;
    let room_one = json_body(resp).await;
    let ratings: Vec<i64> = room_one
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["rating"].as_i64().unwrap())
        .collect();
    assert_eq!(ratings, [5, 3]);

    let all = json_body(send(&app, request(Method::GET, "/reviews", None)).await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let resp = send(&app, request(Method::GET, "/reviews?roomId=first", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "idx": 1, "rating": 9 });
    let resp = send(&app, request(Method::POST, "/reviews", Some(body))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn development_cookie_is_strict_and_not_secure() {
    let (app, _state) = setup_with_cookies(false);
    let attrs = cookie_attributes(&issue_cookie(&app, "a@b.com").await);

    assert!(attrs.iter().any(|a| a == "HttpOnly"));
    assert!(attrs.iter().any(|a| a == "SameSite=Strict"));
    assert!(attrs.iter().any(|a| a == "Path=/"));
    assert!(!attrs.iter().any(|a| a == "Secure"));
}

#[tokio::test]
async fn production_cookie_is_secure_and_cross_site() {
    let (app, _state) = setup_with_cookies(true);
    let attrs = cookie_attributes(&issue_cookie(&app, "a@b.com").await);

    assert!(attrs.iter().any(|a| a == "HttpOnly"));
    assert!(attrs.iter().any(|a| a == "SameSite=None"));
    assert!(attrs.iter().any(|a| a == "Secure"));
}

#[tokio::test]
async fn expired_token_is_forbidden() {
    let (app, _state) = setup();

    let now = chrono::Utc::now();
    let mut payload = Extra::new();
    payload.insert("email".into(), json!("a@b.com"));
    let claims = Claims {
        payload,
        iat: (now - chrono::Duration::days(3)).timestamp() as usize,
        exp: (now - chrono::Duration::days(2)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let resp = send(&app, with_cookie(&format!("token={token}"), "/bookings")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await, json!({ "error": "Forbidden access" }));
}

#[tokio::test]
async fn empty_email_filter_lists_every_booking() {
    let (app, _state) = setup();
    let cookie = login(&app, "a@b.com").await;

    for email in ["a@b.com", "c@d.com"] {
        let body = json!({ "email": email, "date": "2024-07-01", "roomId": Uuid::new_v4() });
        let resp = send(&app, request(Method::POST, "/bookings", Some(body))).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let all = json_body(send(&app, with_cookie(&cookie, "/bookings?email=")).await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn client_supplied_id_does_not_replace_booking_id() {
    let (app, _state) = setup();
    let cookie = login(&app, "a@b.com").await;

    let body = json!({
        "email": "a@b.com",
        "date": "2024-07-01",
        "roomId": Uuid::new_v4(),
        "id": "client-id",
    });
    let resp = send(&app, request(Method::POST, "/bookings", Some(body))).await;
    let inserted = json_body(resp).await;
    let inserted_id = inserted["insertedId"].as_str().unwrap().to_string();

    let listed = json_body(send(&app, with_cookie(&cookie, "/bookings")).await).await;
    assert_eq!(listed[0]["id"], inserted_id);

    let uri = format!("/bookings/{inserted_id}");
    let resp = send(&app, request(Method::DELETE, &uri, None)).await;
    assert_eq!(json_body(resp).await, json!({ "acknowledged": true, "deletedCount": 1 }));
}
