use batch_core::{CallOutcome, Credentials, ResultRecord};
use batch_engine::{
    CallSettings, CategorizationApi, ExtractionApi, FailureKind, HttpCaller, RemoteCaller,
    DEFAULT_MODEL,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://a.example/news/1";

fn extraction_caller(server: &MockServer, settings: CallSettings) -> HttpCaller<ExtractionApi> {
    let api = ExtractionApi::new(&format!("{}/v1/extract", server.uri())).unwrap();
    HttpCaller::new(api, settings).unwrap()
}

#[tokio::test]
async fn extraction_posts_query_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/extract"))
        // base64("key:")
        .and(header("authorization", "Basic a2V5Og=="))
        .and(body_json(json!([{"url": TARGET, "pageType": "article"}])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "query": {},
            "article": {
                "headline": "hello world",
                "articleBodyHtml": "<p>hi</p><script>x()</script>",
                "articleBodyRaw": "<p>raw</p>",
                "articleBody": "hi",
                "description": "greeting"
            }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let caller = extraction_caller(&server, CallSettings::default());
    let outcome = caller.call(TARGET, &Credentials::new("key")).await;

    let CallOutcome::Record(ResultRecord::Article(article)) = outcome else {
        panic!("expected article, got {outcome:?}");
    };
    assert_eq!(article.title, "Hello World");
    assert_eq!(article.html, "<p>hi</p>");
    assert_eq!(article.raw_html, "<p>raw</p>");
    assert_eq!(article.url, TARGET);
    assert_eq!(article.description.as_deref(), Some("greeting"));
}

#[tokio::test]
async fn extraction_without_body_html_is_no_article() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"query": {}, "article": {"headline": "x"}}])),
        )
        .mount(&server)
        .await;

    let caller = extraction_caller(&server, CallSettings::default());
    assert_eq!(
        caller.call(TARGET, &Credentials::new("key")).await,
        CallOutcome::NoArticle
    );
}

#[tokio::test]
async fn categorization_sends_query_parameters() {
    let server = MockServer::start().await;
    let target = "https://b.example/2";
    Mock::given(method("GET"))
        .and(path("/class-1.1"))
        .and(query_param("key", "secret"))
        .and(query_param("url", target))
        .and(query_param("model", DEFAULT_MODEL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": {"code": "0", "msg": "OK"},
            "category_list": [
                {"code": "IAB19", "label": "Technology", "relevance": "100", "abs_relevance": "0.9"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = CategorizationApi::new(&format!("{}/class-1.1", server.uri()), DEFAULT_MODEL).unwrap();
    let caller = HttpCaller::new(api, CallSettings::default()).unwrap();
    let outcome = caller.call(target, &Credentials::new("secret")).await;

    let CallOutcome::Record(record) = outcome else {
        panic!("expected record, got {outcome:?}");
    };
    assert_eq!(record.source_url(), target);
    assert_eq!(record.categories()[0].label, "Technology");
}

#[tokio::test]
async fn error_status_becomes_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let caller = extraction_caller(&server, CallSettings::default());
    let err = caller
        .try_call(TARGET, &Credentials::new("key"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));

    let outcome = caller.call(TARGET, &Credentials::new("key")).await;
    let CallOutcome::Failed { reason } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(reason.contains("http status 500"), "{reason}");
}

#[tokio::test]
async fn malformed_body_becomes_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let caller = extraction_caller(&server, CallSettings::default());
    let err = caller
        .try_call(TARGET, &Credentials::new("key"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedPayload);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
        .mount(&server)
        .await;

    let settings = CallSettings {
        max_response_bytes: 16,
        ..CallSettings::default()
    };
    let caller = extraction_caller(&server, settings);
    let err = caller
        .try_call(TARGET, &Credentials::new("key"))
        .await
        .unwrap_err();
    assert!(
        matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }),
        "{err}"
    );
}

#[tokio::test]
async fn invalid_target_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let caller = extraction_caller(&server, CallSettings::default());
    let err = caller
        .try_call("not a url", &Credentials::new("key"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
