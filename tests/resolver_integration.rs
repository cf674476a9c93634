//! Integration tests for the lookup-service resolver.
//!
//! A wiremock server stands in for the lookup endpoint.

use workshop_core::{HttpTimeouts, LinkResolver, ResolveError, WorkshopResolver};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFERENCE: &str = "https://steamcommunity.com/sharedfiles/filedetails/?id=2721562982";
const ADDRESS: &str = "http://workshop9.abcvg.info/archive/636480/2721562982.zip";

fn resolver_for(server: &MockServer) -> WorkshopResolver {
    WorkshopResolver::new(format!("{}/online/steamonline.php", server.uri()), HttpTimeouts::none())
        .expect("resolver should build")
}

#[tokio::test]
async fn test_resolve_posts_form_and_matches_address() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/online/steamonline.php"))
        .and(body_string_contains("item=2721562982"))
        .and(body_string_contains("app=636480"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<p>Download: <a href=\"{ADDRESS}\">zip</a></p>")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resolved = resolver_for(&server)
        .resolve(REFERENCE, 636_480)
        .await
        .expect("lookup should match");

    assert_eq!(resolved, ADDRESS);
}

#[tokio::test]
async fn test_resolve_without_match_is_lookup_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("item not found"))
        .mount(&server)
        .await;

    let err = resolver_for(&server)
        .resolve(REFERENCE, 636_480)
        .await
        .expect_err("no address in body");

    assert!(matches!(err, ResolveError::NoMatch { ref item_id } if item_id == "2721562982"));
    assert!(err.is_lookup_failure());
}

#[tokio::test]
async fn test_resolve_ignores_status_when_body_matches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(ADDRESS))
        .mount(&server)
        .await;

    let resolved = resolver_for(&server)
        .resolve(REFERENCE, 636_480)
        .await
        .expect("body decides the outcome");

    assert_eq!(resolved, ADDRESS);
}

#[tokio::test]
async fn test_resolve_missing_identifier_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ADDRESS))
        .expect(0)
        .mount(&server)
        .await;

    let err = resolver_for(&server)
        .resolve("https://steamcommunity.com/sharedfiles/filedetails/", 636_480)
        .await
        .expect_err("reference has no id");

    assert!(matches!(err, ResolveError::MissingIdentifier { .. }));
    assert!(!err.is_lookup_failure());
}

#[tokio::test]
async fn test_resolve_unreachable_lookup_is_lookup_failure() {
    let resolver = WorkshopResolver::new("http://127.0.0.1:9/lookup", HttpTimeouts::none())
        .expect("resolver should build");

    let err = resolver
        .resolve(REFERENCE, 636_480)
        .await
        .expect_err("nothing listens on port 9");

    assert!(matches!(err, ResolveError::Lookup { .. }));
    assert!(err.is_lookup_failure());
}
