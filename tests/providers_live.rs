//! Live provider mode against mock SERP and LLM backends.

mod common;

use axum::http::{Method, StatusCode};
use common::{start_programmable_backend, MockRequest, Payload, TestApp, PRODUCTS_CSV};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use seller_hub::config::HubConfig;

fn live_app(serp: Option<SocketAddr>, llm: Option<SocketAddr>) -> TestApp {
    TestApp::new(live_config(serp, llm, 0))
}

fn live_config(serp: Option<SocketAddr>, llm: Option<SocketAddr>, delay_ms: u64) -> HubConfig {
    let mut config = HubConfig::default();
    config.rank.request_delay_ms = delay_ms;
    config.providers.request_timeout_secs = 5;
    if let Some(addr) = serp {
        config.providers.serp_api_key = Some("serp-test-key".into());
        config.providers.serp_base_url = format!("http://{}", addr);
    }
    if let Some(addr) = llm {
        config.providers.llm_api_key = Some("llm-test-key".into());
        config.providers.llm_base_url = format!("http://{}/v1", addr);
        config.providers.llm_model = "gpt-test".into();
    }
    config
}

async fn seeded(app: &TestApp) -> (String, Value) {
    let token = app.sign_up("live@example.com").await;
    let res = app.post_csv("/import/products", &token, PRODUCTS_CSV).await;
    assert_eq!(res.status, StatusCode::OK);
    let products = app.get("/products", &token).await.json();
    (token, products)
}

fn id_of(products: &Value, title: &str) -> String {
    products
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["title"] == title)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn chat_reply(content: Value) -> String {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content.to_string() } }] }).to_string()
}

#[tokio::test]
async fn test_live_rank_refresh_matches_listing_url() {
    let seen: Arc<Mutex<Vec<MockRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let serp = start_programmable_backend(move |req| {
        log.lock().unwrap().push(req.clone());
        if req.path() != "/search.json" {
            return (404, r#"{"error":"not found"}"#.into());
        }
        let body = if req.target.contains("q=place+value") || req.target.contains("q=place%20value") {
            json!({ "organic_results": [
                { "position": 1, "link": "https://other.example.org/a" },
                { "position": 2, "link": "https://other.example.org/b" },
                { "position": 3, "link": "http://EXAMPLE.com/product/place-value-2/" },
            ]})
        } else {
            json!({ "error": "Google hasn't returned any results for this query." })
        };
        (200, body.to_string())
    })
    .await;

    let app = live_app(Some(serp), None);
    let (token, products) = seeded(&app).await;

    for (title, phrase) in [("Place Value Game", "place value"), ("Fraction Worksheets", "fractions")] {
        let res = app
            .post_json(
                "/rank/keywords",
                &token,
                json!({ "product_id": id_of(&products, title), "phrase": phrase, "device": "mobile" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = app.request(Method::POST, "/rank/refresh", Some(&token), Payload::Empty).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let report = res.json();
    assert_eq!(report["mode"], "live");
    assert_eq!(report["found"], 1);
    assert_eq!(report["not_found"], 1);
    assert!(report["errors"].as_array().unwrap().is_empty());

    let positions: Vec<Value> = report["ranks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["position"].clone())
        .collect();
    assert!(positions.contains(&json!(3)));
    assert!(positions.contains(&Value::Null));

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.target.contains("api_key=serp-test-key")));
    assert!(requests.iter().all(|r| r.target.contains("device=mobile")));
}

#[tokio::test]
async fn test_live_rank_refresh_spaces_requests() {
    let arrivals: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let log = arrivals.clone();
    let serp = start_programmable_backend(move |_| {
        log.lock().unwrap().push(Instant::now());
        (200, json!({ "organic_results": [] }).to_string())
    })
    .await;

    let delay = Duration::from_millis(150);
    let app = TestApp::new(live_config(Some(serp), None, delay.as_millis() as u64));
    let (token, products) = seeded(&app).await;
    let id = id_of(&products, "Place Value Game");
    for phrase in ["place value", "base ten", "math centers"] {
        let res = app
            .post_json("/rank/keywords", &token, json!({ "product_id": id, "phrase": phrase }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let started = Instant::now();
    let res = app.request(Method::POST, "/rank/refresh", Some(&token), Payload::Empty).await;
    let elapsed = started.elapsed();
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    assert_eq!(res.json()["not_found"], 3);
    assert!(elapsed >= delay * 2, "refresh took {:?}", elapsed);

    let arrivals = arrivals.lock().unwrap();
    assert_eq!(arrivals.len(), 3);
    for pair in arrivals.windows(2) {
        assert!(pair[1] - pair[0] >= delay, "requests {:?} apart", pair[1] - pair[0]);
    }
}

#[tokio::test]
async fn test_live_rank_refresh_reports_upstream_errors_per_keyword() {
    let serp = start_programmable_backend(|_| (500, r#"{"error":"boom"}"#.into())).await;
    let app = live_app(Some(serp), None);
    let (token, products) = seeded(&app).await;

    app.post_json(
        "/rank/keywords",
        &token,
        json!({ "product_id": id_of(&products, "Place Value Game"), "phrase": "place value" }),
    )
    .await;

    let report = app
        .request(Method::POST, "/rank/refresh", Some(&token), Payload::Empty)
        .await
        .json();
    assert_eq!(report["mode"], "live");
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
    assert_eq!(report["errors"][0]["phrase"], "place value");
    assert!(report["ranks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_live_social_generation() {
    let seen: Arc<Mutex<Vec<MockRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let llm = start_programmable_backend(move |req| {
        log.lock().unwrap().push(req.clone());
        let content = json!({ "posts": [
            { "network": "twitter", "title": "Fractions made easy", "content": "Grab these worksheets!", "hashtags": ["#math", "fractions"] },
            { "network": "pinterest", "title": "Not requested", "content": "Dropped", "hashtags": [] },
        ]});
        (200, chat_reply(content))
    })
    .await;

    let app = live_app(None, Some(llm));
    let (token, products) = seeded(&app).await;
    let id = id_of(&products, "Fraction Worksheets");

    let res = app
        .request(
            Method::POST,
            &format!("/social/{}/generate?networks=twitter", id),
            Some(&token),
            Payload::Empty,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let body = res.json();
    assert_eq!(body["mode"], "live");
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["network"], "twitter");
    assert_eq!(posts[0]["hashtags"], json!(["math", "fractions"]));

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path(), "/v1/chat/completions");
    let sent: Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "gpt-test");
    assert!(sent["messages"][1]["content"].as_str().unwrap().contains("Fraction Worksheets"));
}

#[tokio::test]
async fn test_live_seo_variants() {
    let llm = start_programmable_backend(|_| {
        let content = json!({ "variants": [
            { "title": "Fraction Worksheets for 3rd Grade", "description": "Printable practice.", "tags": ["fractions"] },
        ]});
        (200, chat_reply(content))
    })
    .await;

    let app = live_app(None, Some(llm));
    let (token, products) = seeded(&app).await;
    let id = id_of(&products, "Fraction Worksheets");

    let res = app
        .request(Method::POST, &format!("/seo/{}/variants", id), Some(&token), Payload::Empty)
        .await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.text());
    let body = res.json();
    assert_eq!(body["mode"], "live");
    assert_eq!(body["variants"][0]["title"], "Fraction Worksheets for 3rd Grade");
}

#[tokio::test]
async fn test_llm_failure_is_bad_gateway() {
    let llm = start_programmable_backend(|_| (500, r#"{"error":{"message":"overloaded"}}"#.into())).await;
    let app = live_app(None, Some(llm));
    let (token, products) = seeded(&app).await;
    let id = id_of(&products, "Fraction Worksheets");

    let res = app
        .request(
            Method::POST,
            &format!("/social/{}/generate", id),
            Some(&token),
            Payload::Empty,
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_GATEWAY);
    assert!(res.json()["error"].is_string());

    let posts = app.get("/social", &token).await.json();
    assert!(posts["posts"].as_array().unwrap().is_empty());
}
