use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tower::ServiceExt;

use expense_tracker::app::{AppState, Repositories, build_router};
use expense_tracker::clock::ManualClock;
use expense_tracker::config::AppConfig;

/// Global counter for generating unique test emails
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique email for each test to avoid conflicts
fn unique_email(prefix: &str) -> String {
    let count = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}{}@test.example.com", prefix, count)
}

/// Test fixture: the full router over the in-memory store and a manual clock
struct TestContext {
    app: Router,
    clock: Arc<ManualClock>,
}

impl TestContext {
    fn new() -> Self {
        Self::with_env(&[])
    }

    fn with_env(overrides: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("JWT_SECRET".to_string(), "integration_secret".to_string()),
            ("BCRYPT_COST".to_string(), "4".to_string()),
        ]);
        for (key, value) in overrides {
            env.insert(key.to_string(), value.to_string());
        }
        let config = AppConfig::from_lookup(|key| env.get(key).cloned()).unwrap();

        let clock = Arc::new(ManualClock::new(Utc::now()));
        let state = AppState::new(
            &config.auth,
            config.cookie,
            Repositories::in_memory(),
            clock.clone(),
        );

        Self {
            app: build_router(state, &config),
            clock,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn post_json(&self, uri: &str, auth: Option<&str>, body: Value) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = auth {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn get(&self, uri: &str, auth: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = auth {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Register a salaried user, returning the response body and the cookie pair
    async fn register(&self, email: &str) -> (Value, String) {
        let response = self
            .post_json(
                "/api/auth/register",
                None,
                json!({
                    "name": "Integration User",
                    "email": email,
                    "password": "password123",
                    "profile_type": "salaried",
                    "preferred_currency": "USD"
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let cookie = session_cookie(&response).expect("register sets the session cookie");
        (parse_json_body(response.into_body()).await, cookie)
    }

    async fn category_id(&self, token: &str, name: &str) -> String {
        let response = self.get("/api/categories", Some(token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let categories = parse_json_body(response.into_body()).await;
        categories
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == name)
            .map(|c| c["id"].as_str().unwrap().to_string())
            .unwrap()
    }

    async fn create_transaction(&self, token: &str, category_id: &str, date: &str) -> Value {
        let response = self
            .post_json(
                "/api/transactions",
                Some(token),
                json!({
                    "amount": "25.00",
                    "description": format!("Rent {}", date),
                    "category_id": category_id,
                    "entry_type": "expense",
                    "date": date
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        parse_json_body(response.into_body()).await
    }

    async fn feed(&self, token: &str, limit: u32, cursor: Option<&str>) -> Value {
        let uri = match cursor {
            Some(cursor) => format!(
                "/api/transactions/feed?limit={}&cursor={}",
                limit,
                encode_query(cursor)
            ),
            None => format!("/api/transactions/feed?limit={}", limit),
        };
        let response = self.get(&uri, Some(token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        parse_json_body(response.into_body()).await
    }
}

/// Helper function to parse JSON response body
async fn parse_json_body(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Failed to parse JSON")
}

/// `session_token=<value>` from a Set-Cookie header
fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session_token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// Percent-encode the characters a cursor can contain that are unsafe in a query
fn encode_query(value: &str) -> String {
    value.replace('|', "%7C")
}

async fn error_code(response: Response) -> String {
    let body = parse_json_body(response.into_body()).await;
    body["error"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let response = ctx.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_sets_cookie_and_hides_password() {
    let ctx = TestContext::new();
    let email = unique_email("register");

    let response = ctx
        .post_json(
            "/api/auth/register",
            None,
            json!({
                "name": "Integration User",
                "email": email,
                "password": "password123"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=86400"));

    let body = parse_json_body(response.into_body()).await;
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["profile_type"], "salaried");
    assert_eq!(body["user"]["preferred_currency"], "USD");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let ctx = TestContext::new();
    let email = unique_email("dup");

    let short_password = ctx
        .post_json(
            "/api/auth/register",
            None,
            json!({"name": "User", "email": email, "password": "short"}),
        )
        .await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(short_password).await, "validation_error");

    ctx.register(&email).await;

    let duplicate = ctx
        .post_json(
            "/api/auth/register",
            None,
            json!({"name": "User", "email": email, "password": "password123"}),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(duplicate).await, "duplicate_email");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new();
    let email = unique_email("login");
    ctx.register(&email).await;

    let response = ctx
        .post_json(
            "/api/auth/login",
            None,
            json!({"email": email, "password": "not-the-password"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_credentials");
}

#[tokio::test]
async fn test_protected_endpoint_without_credentials() {
    let ctx = TestContext::new();

    let response = ctx.get("/api/auth/me", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "unauthenticated");
}

#[tokio::test]
async fn test_idle_timeout_then_fresh_login() {
    // Tokens outlive the idle window so the session decides
    let ctx = TestContext::with_env(&[("ACCESS_TOKEN_TTL_MINUTES", "1440")]);
    let email = unique_email("idle");

    let (registered, cookie) = ctx.register(&email).await;
    let old_token = registered["token"].as_str().unwrap().to_string();

    let response = ctx.get_with_cookie("/api/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = parse_json_body(response.into_body()).await;
    assert_eq!(me["email"], email);

    ctx.clock.advance(Duration::minutes(121));

    let response = ctx.get_with_cookie("/api/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "session_idle_timeout");

    let response = ctx
        .post_json(
            "/api/auth/login",
            None,
            json!({"email": email, "password": "password123"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let logged_in = parse_json_body(response.into_body()).await;
    let new_token = logged_in["token"].as_str().unwrap();
    assert_ne!(new_token, old_token);

    let response = ctx.get("/api/auth/me", Some(new_token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The old session stays revoked
    let response = ctx.get("/api/auth/me", Some(&old_token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "session_revoked");
}

#[tokio::test]
async fn test_activity_keeps_session_alive_until_absolute_expiry() {
    let ctx = TestContext::with_env(&[("ACCESS_TOKEN_TTL_MINUTES", "2880")]);
    let (registered, _) = ctx.register(&unique_email("absolute")).await;
    let token = registered["token"].as_str().unwrap();

    // Each request lands inside the idle window of the previous one
    for _ in 0..15 {
        ctx.clock.advance(Duration::minutes(90));
        let response = ctx.get("/api/auth/me", Some(token)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // 16 * 90 minutes = 24 hours
    ctx.clock.advance(Duration::minutes(90));
    let response = ctx.get("/api/auth/me", Some(token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "session_expired");
}

#[tokio::test]
async fn test_expired_token_rejected_while_session_live() {
    let ctx = TestContext::new();
    let (registered, cookie) = ctx.register(&unique_email("token")).await;
    let token = registered["token"].as_str().unwrap();

    ctx.clock.advance(Duration::minutes(15));

    let response = ctx.get("/api/auth/me", Some(token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_token");

    let response = ctx.get_with_cookie("/api/auth/me", &cookie).await;
    assert_eq!(error_code(response).await, "invalid_token");
}

#[tokio::test]
async fn test_default_token_lifetime_expires_before_idle_window() {
    let ctx = TestContext::new();
    let (registered, cookie) = ctx.register(&unique_email("defaults")).await;
    let token = registered["token"].as_str().unwrap();

    ctx.clock.advance(Duration::minutes(16));
    let response = ctx.get("/api/auth/me", Some(token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_token");

    // Past the idle window the token check still fails first
    ctx.clock.advance(Duration::minutes(110));
    let response = ctx.get_with_cookie("/api/auth/me", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "invalid_token");

    let response = ctx.get("/api/auth/me", Some(token)).await;
    assert_eq!(error_code(response).await, "invalid_token");
}

#[tokio::test]
async fn test_logout_revokes_and_clears_cookie() {
    let ctx = TestContext::new();
    let (registered, cookie) = ctx.register(&unique_email("logout")).await;
    let token = registered["token"].as_str().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cleared.starts_with("session_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    let response = ctx.get("/api/auth/me", Some(token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(response).await, "session_revoked");

    // Logging out again is harmless
    let response = ctx.post_json("/api/auth/logout", Some(token), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_profile() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("profile")).await;
    let token = registered["token"].as_str().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri("/api/auth/profile")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"name": "Renamed", "preferred_currency": "EUR"}).to_string(),
        ))
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let user = parse_json_body(response.into_body()).await;
    assert_eq!(user["name"], "Renamed");
    assert_eq!(user["preferred_currency"], "EUR");
    assert_eq!(user["profile_type"], "salaried");
}

#[tokio::test]
async fn test_feed_pages_by_date_then_id() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("feed")).await;
    let token = registered["token"].as_str().unwrap();
    let housing = ctx.category_id(token, "Housing").await;

    let mut ids = HashMap::new();
    for day in 1..=5 {
        let date = format!("2024-01-0{}", day);
        let created = ctx.create_transaction(token, &housing, &date).await;
        ids.insert(day, created["id"].as_str().unwrap().to_string());
    }

    let page1 = ctx.feed(token, 2, None).await;
    let dates: Vec<&str> = page1["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-01-04"]);
    assert_eq!(page1["has_more"], true);
    assert_eq!(page1["next_cursor"], format!("2024-01-04|{}", ids[&4]));

    let page2 = ctx
        .feed(token, 2, page1["next_cursor"].as_str())
        .await;
    let dates: Vec<&str> = page2["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-01-03", "2024-01-02"]);
    assert_eq!(page2["next_cursor"], format!("2024-01-02|{}", ids[&2]));

    let page3 = ctx
        .feed(token, 2, page2["next_cursor"].as_str())
        .await;
    let items = page3["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], ids[&1].as_str());
    assert_eq!(page3["has_more"], false);
    assert!(page3["next_cursor"].is_null());
}

#[tokio::test]
async fn test_feed_stable_under_concurrent_insert() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("insert")).await;
    let token = registered["token"].as_str().unwrap();
    let housing = ctx.category_id(token, "Housing").await;

    for date in ["2024-02-01", "2024-02-02", "2024-02-02", "2024-02-03"] {
        ctx.create_transaction(token, &housing, date).await;
    }

    let page1 = ctx.feed(token, 2, None).await;
    let mut seen: Vec<String> = page1["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();

    // Newer than anything already listed
    let late = ctx.create_transaction(token, &housing, "2024-03-01").await;

    let page2 = ctx
        .feed(token, 2, page1["next_cursor"].as_str())
        .await;
    let rest: Vec<String> = page2["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(rest.len(), 2);
    assert!(rest.iter().all(|id| !seen.contains(id)));
    assert!(!rest.contains(&late["id"].as_str().unwrap().to_string()));
    assert_eq!(page2["has_more"], false);

    seen.extend(rest);
    assert_eq!(seen.len(), 4);
}

#[tokio::test]
async fn test_feed_page_count_and_coverage() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("coverage")).await;
    let token = registered["token"].as_str().unwrap();
    let housing = ctx.category_id(token, "Housing").await;

    // Eleven rows over four dates, so several share a date
    let total: usize = 11;
    for i in 0..total {
        let date = format!("2024-04-0{}", 1 + i % 4);
        ctx.create_transaction(token, &housing, &date).await;
    }

    let page_size = 3;
    let mut cursor: Option<String> = None;
    let mut seen = Vec::new();
    let mut pages = 0;
    loop {
        let page = ctx.feed(token, page_size, cursor.as_deref()).await;
        pages += 1;
        for item in page["items"].as_array().unwrap() {
            seen.push(item["id"].as_str().unwrap().to_string());
        }
        if page["has_more"] == false {
            assert!(page["next_cursor"].is_null());
            break;
        }
        cursor = page["next_cursor"].as_str().map(str::to_string);
    }

    assert_eq!(pages, total.div_ceil(page_size as usize));
    assert_eq!(seen.len(), total);
    let mut unique = seen.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), total);
}

#[tokio::test]
async fn test_feed_rejects_malformed_cursor() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("cursor")).await;
    let token = registered["token"].as_str().unwrap();

    for cursor in ["2024-01-01", "%7C", "2024-01-01%7C"] {
        let response = ctx
            .get(
                &format!("/api/transactions/feed?cursor={}", cursor),
                Some(token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_cursor");
    }
}

#[tokio::test]
async fn test_type_mismatch_writes_nothing() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("mismatch")).await;
    let token = registered["token"].as_str().unwrap();
    let salary = ctx.category_id(token, "Salary").await;

    let response = ctx
        .post_json(
            "/api/transactions",
            Some(token),
            json!({
                "amount": "100.00",
                "category_id": salary,
                "entry_type": "expense",
                "date": "2024-01-15"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "category_type_mismatch");

    let page = ctx.feed(token, 10, None).await;
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_users_data_hidden() {
    let ctx = TestContext::new();
    let (alice, _) = ctx.register(&unique_email("alice")).await;
    let (bob, _) = ctx.register(&unique_email("bob")).await;
    let alice_token = alice["token"].as_str().unwrap();
    let bob_token = bob["token"].as_str().unwrap();

    let housing = ctx.category_id(alice_token, "Housing").await;
    let created = ctx
        .create_transaction(alice_token, &housing, "2024-01-10")
        .await;

    let response = ctx
        .get(
            &format!("/api/transactions/{}", created["id"].as_str().unwrap()),
            Some(bob_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .post_json(
            "/api/transactions",
            Some(bob_token),
            json!({
                "amount": "5.00",
                "category_id": housing,
                "date": "2024-01-10"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "category_not_found");

    let page = ctx.feed(bob_token, 10, None).await;
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_category_removes_its_transactions() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("cascade")).await;
    let token = registered["token"].as_str().unwrap();
    let housing = ctx.category_id(token, "Housing").await;
    let transport = ctx.category_id(token, "Transportation").await;

    ctx.create_transaction(token, &housing, "2024-05-01").await;
    ctx.create_transaction(token, &housing, "2024-05-02").await;
    let kept = ctx.create_transaction(token, &transport, "2024-05-03").await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/categories/{}", housing))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_json_body(response.into_body()).await;
    assert_eq!(body["deleted_transactions"], 2);

    let page = ctx.feed(token, 10, None).await;
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], kept["id"]);
}

#[tokio::test]
async fn test_currency_endpoints() {
    let ctx = TestContext::new();

    let response = ctx.get("/api/currencies", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = parse_json_body(response.into_body()).await;
    assert!(
        listing["currencies"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["code"] == "EUR")
    );
    assert_eq!(listing["rates"]["EUR"], 0.92);

    let response = ctx
        .get("/api/currencies/convert?amount=10&from=USD&to=XXX", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "invalid_currency");
}

#[tokio::test]
async fn test_filtered_transaction_listing() {
    let ctx = TestContext::new();
    let (registered, _) = ctx.register(&unique_email("filters")).await;
    let token = registered["token"].as_str().unwrap();
    let housing = ctx.category_id(token, "Housing").await;
    let transport = ctx.category_id(token, "Transportation").await;

    ctx.create_transaction(token, &housing, "2024-03-01").await;
    let inside = ctx.create_transaction(token, &housing, "2024-03-10").await;
    ctx.create_transaction(token, &transport, "2024-03-11").await;
    ctx.create_transaction(token, &housing, "2024-03-20").await;

    let uri = format!(
        "/api/transactions?start_date=2024-03-05&end_date=2024-03-15&category_id={}",
        housing
    );
    let response = ctx.get(&uri, Some(token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = parse_json_body(response.into_body()).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], inside["id"]);

    let response = ctx.get("/api/transactions", Some(token)).await;
    let all = parse_json_body(response.into_body()).await;
    let dates: Vec<&str> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2024-03-20", "2024-03-11", "2024-03-10", "2024-03-01"]);

    let response = ctx
        .get("/api/transactions?start_date=2024-03-31&end_date=2024-03-01", Some(token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let empty = parse_json_body(response.into_body()).await;
    assert!(empty.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_summary_report_and_dashboard() {
    let ctx = TestContext::new();
    ctx.clock
        .set(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap());
    let (registered, _) = ctx.register(&unique_email("reports")).await;
    let token = registered["token"].as_str().unwrap();
    let housing = ctx.category_id(token, "Housing").await;
    let transport = ctx.category_id(token, "Transportation").await;

    ctx.create_transaction(token, &housing, "2024-03-10").await;
    ctx.create_transaction(token, &housing, "2024-03-14").await;
    ctx.create_transaction(token, &transport, "2024-03-14").await;
    ctx.create_transaction(token, &housing, "2024-02-20").await;
    ctx.create_transaction(token, &housing, "2023-12-01").await;

    let response = ctx
        .get("/api/reports/summary?period=week", Some(token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = parse_json_body(response.into_body()).await;
    assert_eq!(summary["period"], "week");
    assert_eq!(summary["start_date"], "2024-03-08");
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["total"], "75.00");
    assert_eq!(summary["by_category"][0]["name"], "Housing");
    assert_eq!(summary["by_category"][0]["count"], 2);
    let trend = summary["daily_trend"].as_array().unwrap();
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0]["date"], "2024-03-10");
    assert_eq!(trend[1]["amount"], "50.00");

    let response = ctx
        .get("/api/reports/summary?period=week&entry_type=income", Some(token))
        .await;
    let income = parse_json_body(response.into_body()).await;
    assert_eq!(income["count"], 0);

    let response = ctx.get("/api/dashboard/stats", Some(token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = parse_json_body(response.into_body()).await;
    assert_eq!(stats["this_month"]["count"], 3);
    assert_eq!(stats["last_month"]["count"], 1);
    assert_eq!(stats["all_time"]["count"], 5);
    let change: f64 = stats["change_percentage"].as_str().unwrap().parse().unwrap();
    assert_eq!(change, 200.0);
    assert!(stats["categories_count"].as_i64().unwrap() > 0);

    let response = ctx.get("/api/dashboard/stats", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
