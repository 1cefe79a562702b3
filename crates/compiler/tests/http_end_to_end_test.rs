//! Compiler wired to the real HTTP client and a mock build service

mod common;

use common::Fixture;
use packbridge_compiler::Compiler;
use packbridge_core::ErrorKind;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_repeat_calls_reach_service_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/build"))
        .and(body_partial_json(json!({"context": {"page": "home"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {
                "stats": {"errors": [], "warnings": []},
                "assets": {"main": [{"name": "bundle-home.js"}, {"name": "home.css"}]}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = Fixture::new();
    let settings = fixture
        .settings()
        .build_url(format!("{}/build", server.uri()))
        .build()
        .unwrap();
    let compiler = Compiler::new(settings).unwrap();

    let mut context = packbridge_core::Context::new();
    context.insert("page".to_string(), json!("home"));

    for _ in 0..3 {
        let bundle = compiler
            .webpack("basic/webpack.config.js", Some(&context), None)
            .await
            .unwrap();
        assert_eq!(bundle.get_urls().len(), 2);
        assert!(bundle.render_css().contains("home.css"));
    }
}

#[tokio::test]
async fn test_service_failure_is_not_remembered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(2)
        .mount(&server)
        .await;

    let fixture = Fixture::new();
    let settings = fixture.settings().build_url(server.uri()).build().unwrap();
    let compiler = Compiler::new(settings).unwrap();

    for _ in 0..2 {
        let err = compiler
            .webpack("basic/webpack.config.js", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BuildServiceProtocol);
    }
    assert_eq!(compiler.memo_len(), 0);
}

#[tokio::test]
async fn test_path_list_payload_renders_service_urls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {
                "stats": {"errors": [], "warnings": []},
                "assets": [
                    "/srv/static/webpack/abc/bundle-home.js",
                    "/srv/static/webpack/abc/home.css"
                ],
                "urls": {"home": {
                    "js": ["https://cdn.example.com/webpack/abc/bundle-home.js"],
                    "css": ["https://cdn.example.com/webpack/abc/home.css"]
                }},
                "output": {"home": {
                    "js": ["/srv/static/webpack/abc/bundle-home.js"],
                    "css": ["/srv/static/webpack/abc/home.css"]
                }}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = Fixture::new();
    let settings = fixture.settings().build_url(server.uri()).build().unwrap();
    let compiler = Compiler::new(settings).unwrap();

    let bundle = compiler
        .webpack("basic/webpack.config.js", None, None)
        .await
        .unwrap();

    let names: Vec<_> = bundle
        .get_assets()
        .into_iter()
        .map(|asset| asset.name)
        .collect();
    assert_eq!(names, ["bundle-home.js", "home.css"]);
    assert_eq!(
        bundle.get_urls(),
        [
            "https://cdn.example.com/webpack/abc/bundle-home.js",
            "https://cdn.example.com/webpack/abc/home.css"
        ]
    );
    assert_eq!(
        bundle.render(),
        "<script src=\"https://cdn.example.com/webpack/abc/bundle-home.js\"></script>\n\
         <link rel=\"stylesheet\" href=\"https://cdn.example.com/webpack/abc/home.css\">"
    );
    assert_eq!(bundle.get_urls_by_entry().keys().collect::<Vec<_>>(), ["home"]);
}
