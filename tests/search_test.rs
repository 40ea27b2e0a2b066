mod common;

use assert2::check;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestApp;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn result_words(body: &Value) -> Vec<&str> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["word"].as_str().unwrap())
        .collect()
}

/// Scenario 1: an exact hit scores 1.0 and is tagged EXACT.
#[tokio::test]
async fn exact_hit_scores_one() {
    let app = TestApp::new().await;
    app.seed_corpus("fruit", &["apple", "banana", "cherry"]).await;

    let (status, body) = get(&app, "/search?q=apple&mode=smart&corpus_name=fruit").await;
    check!(status == StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    check!(results.len() == 1);
    check!(results[0]["word"] == "apple");
    check!(results[0]["score"].as_f64().unwrap() == 1.0);
    check!(results[0]["method"] == "exact");
}

/// Scenario 2: a single-character typo is recovered by the fuzzy matcher,
/// and an unrelated word with a similar prefix isn't pulled into the top 3.
#[tokio::test]
async fn fuzzy_recovers_single_char_typo() {
    let app = TestApp::new().await;
    app.seed_corpus("fruit", &["apple", "banana", "cherry", "peach"]).await;

    let (status, body) = get(
        &app,
        "/search?q=aple&mode=smart&min_score=0.6&corpus_name=fruit",
    )
    .await;
    check!(status == StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    check!(!results.is_empty());
    check!(results[0]["word"] == "apple");
    check!(results[0]["method"] == "fuzzy");
    let score = results[0]["score"].as_f64().unwrap();
    check!(score >= 0.65 && score <= 1.0);

    let top3 = result_words(&body);
    check!(!top3.iter().take(3).any(|w| *w == "peach"));
}

/// Scenario 3: a phrase match outranks single-word fragments of it.
#[tokio::test]
async fn phrase_beats_fragment() {
    let app = TestApp::new().await;
    app.seed_corpus("phrases", &["bo", "bob", "bon vivant", "vivid"]).await;

    let (status, body) = get(
        &app,
        "/search?q=bob%20vivnt&mode=fuzzy&min_score=0.3&corpus_name=phrases",
    )
    .await;
    check!(status == StatusCode::OK);

    let words = result_words(&body);
    check!(words.first() == Some(&"bon vivant"));
}

/// Scenario 4: exact mode returns only the literal match; smart mode adds
/// prefix expansions after it.
#[tokio::test]
async fn prefix_expansion_follows_exact_hit_in_smart_mode() {
    let app = TestApp::new().await;
    app.seed_corpus("animals", &["cat", "catalog", "catastrophe", "dog"]).await;

    let (status, exact_body) = get(&app, "/search?q=cat&mode=exact&corpus_name=animals").await;
    check!(status == StatusCode::OK);
    check!(result_words(&exact_body) == vec!["cat"]);

    let (status, smart_body) = get(&app, "/search?q=cat&mode=smart&corpus_name=animals").await;
    check!(status == StatusCode::OK);
    let results = smart_body["results"].as_array().unwrap();

    check!(results[0]["word"] == "cat");
    check!(results[0]["method"] == "exact");

    let prefix_words: Vec<&str> = results
        .iter()
        .filter(|r| r["method"] == "prefix")
        .map(|r| r["word"].as_str().unwrap())
        .collect();
    check!(prefix_words.contains(&"catalog"));
    check!(prefix_words.contains(&"catastrophe"));
}

/// Scenario 5: querying before the semantic index has been built degrades
/// to an empty, flagged response rather than failing the request.
#[tokio::test]
async fn semantic_fallback_reports_pending_without_erroring() {
    let app = TestApp::new().await;
    app.seed_corpus("fruit", &["apple", "banana", "cherry"]).await;

    let (status, body) = get(&app, "/search?q=fruit&mode=semantic&corpus_name=fruit").await;
    check!(status == StatusCode::OK);
    check!(body["results"].as_array().unwrap().is_empty());
    check!(body["metadata"]["semantic_pending"] == true);
}

/// Scenario 6: aggregating a master corpus unions its direct children and
/// reproduces the hash of a freshly built corpus over the same words.
#[tokio::test]
async fn aggregation_unions_children_and_matches_fresh_hash() {
    let app = TestApp::new().await;
    let master_id = app
        .state
        .corpus_store
        .create("master", Vec::<String>::new(), common_language(), common_type())
        .await
        .unwrap()
        .corpus_id;
    let c1 = app.seed_corpus("c1", &["a", "b"]).await;
    let c2 = app.seed_corpus("c2", &["b", "c"]).await;

    app.state.corpus_store.attach_child(master_id, c1).await.unwrap();
    app.state.corpus_store.attach_child(master_id, c2).await.unwrap();

    let aggregated = app.state.corpus_store.aggregate_master(master_id).await.unwrap();
    check!(aggregated.vocabulary == vec!["a".to_string(), "b".to_string(), "c".to_string()]);

    let fresh = floridify_search_core::corpus::Corpus::new(
        "fresh",
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        common_language(),
        common_type(),
    );
    check!(aggregated.vocabulary_hash == fresh.vocabulary_hash);
}

fn common_language() -> floridify_search_core::corpus::Language {
    floridify_search_core::corpus::Language::English
}

fn common_type() -> floridify_search_core::corpus::CorpusType {
    floridify_search_core::corpus::CorpusType::Custom
}
