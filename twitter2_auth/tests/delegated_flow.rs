mod provider_support;

use reqwest::{header::AUTHORIZATION, Method, Url};
use serde_json::json;
use twitter2_auth::{
    auth::{AccessType, PendingAuthorization},
    error::ProtocolViolation,
    AccessToken, AnyAuthHandler, AuthHandler, Config, DelegatedAuthHandler, ErrorKind, OAuth10a,
    RequestDecorator, RequestToken,
};
use wiremock::matchers::{body_string, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use provider_support::{
    app, config, form_response, oauth_params, oauth_token_is, CONSUMER_KEY, CONSUMER_SECRET,
};

const CALLBACK: &str = "https://example.com/callback";

async fn mount_request_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(body_string_contains("oauth_callback="))
        .and(oauth_token_is(None))
        .respond_with(form_response(
            "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn delegated_handler(server: &MockServer, callback: Option<&str>) -> DelegatedAuthHandler {
    DelegatedAuthHandler::with_config(app(), callback, config(server)).expect("build handler")
}

#[test]
fn apply_auth_before_access_token_fails() {
    let handler = DelegatedAuthHandler::new(app(), None).expect("build handler");

    let err = handler.apply_auth().unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NoAccessToken));
    assert_eq!(handler.access_token(), None);
}

#[test]
fn set_access_token_parameterizes_decorator() {
    let mut handler = DelegatedAuthHandler::new(app(), None).expect("build handler");
    handler.set_access_token("first", "first-secret");
    handler.set_access_token("370773112-token", "token-secret");

    let decorator = handler.apply_auth().expect("apply auth");
    assert_eq!(
        decorator,
        RequestDecorator::OAuth1Signing(OAuth10a::new(
            CONSUMER_KEY,
            CONSUMER_SECRET,
            "370773112-token",
            "token-secret"
        ))
    );
    assert_eq!(
        handler.access_token(),
        Some(&AccessToken::new("370773112-token", "token-secret"))
    );
}

#[tokio::test]
async fn authorization_round_trip_signs_with_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(body_string("oauth_callback=https%3A%2F%2Fexample.com%2Fcallback"))
        .and(oauth_token_is(None))
        .respond_with(form_response(
            "oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string("oauth_verifier=verifier-123"))
        .and(oauth_token_is(Some("req-token")))
        .respond_with(form_response(
            "oauth_token=6253282-access&oauth_token_secret=access-secret\
             &user_id=6253282&screen_name=TwitterAPI",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, Some(CALLBACK));
    let pending = handler
        .get_authorization_url(false)
        .await
        .expect("authorization url");

    assert_eq!(
        pending.authorization_url(),
        format!("{}/oauth/authorize?oauth_token=req-token", server.uri())
    );
    assert_eq!(pending.request_token().token(), "req-token");
    assert_eq!(pending.request_token().token_secret(), "req-secret");

    let access_token = handler
        .get_access_token(pending, "verifier-123")
        .await
        .expect("access token");

    assert_eq!(access_token, AccessToken::new("6253282-access", "access-secret"));
    assert_eq!(handler.access_token(), Some(&access_token));

    let decorator = handler.apply_auth().expect("apply auth");
    let request = reqwest::Request::new(
        Method::GET,
        Url::parse("https://api.twitter.com/1.1/statuses/home_timeline.json").unwrap(),
    );
    let request = decorator.decorate(request).expect("decorate");
    let header = request.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
    let params = oauth_params(header);

    assert_eq!(params["oauth_token"], "6253282-access");
    assert_eq!(params["oauth_consumer_key"], CONSUMER_KEY);
    assert_eq!(params["oauth_signature_method"], "HMAC-SHA1");
}

#[tokio::test]
async fn sign_in_url_differs_only_in_path_and_refetches_token() {
    let server = MockServer::start().await;
    mount_request_token(&server, 2).await;

    let handler = delegated_handler(&server, Some(CALLBACK));
    let authorize = handler.get_authorization_url(false).await.expect("authorize url");
    let authenticate = handler.get_authorization_url(true).await.expect("authenticate url");

    assert_eq!(
        authenticate.authorization_url(),
        format!("{}/oauth/authenticate?oauth_token=req-token", server.uri())
    );
    assert_eq!(
        authenticate.authorization_url().replace("/authenticate?", "/authorize?"),
        authorize.authorization_url()
    );
}

#[tokio::test]
async fn missing_callback_requests_out_of_band_pin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(body_string("oauth_callback=oob"))
        .respond_with(form_response("oauth_token=req-token&oauth_token_secret=req-secret"))
        .expect(1)
        .mount(&server)
        .await;

    let handler = delegated_handler(&server, None);
    assert_eq!(handler.callback(), None);
    handler.get_authorization_url(false).await.expect("authorization url");
}

#[tokio::test]
async fn access_type_is_sent_with_request_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .and(body_string(
            "oauth_callback=https%3A%2F%2Fexample.com%2Fcallback&x_auth_access_type=read",
        ))
        .respond_with(form_response("oauth_token=req-token&oauth_token_secret=req-secret"))
        .expect(1)
        .mount(&server)
        .await;

    let handler = delegated_handler(&server, Some(CALLBACK)).access_type(AccessType::Read);
    handler.get_authorization_url(true).await.expect("authorization url");
}

#[tokio::test]
async fn request_token_error_status_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid consumer key"))
        .expect(1)
        .mount(&server)
        .await;

    let err = delegated_handler(&server, Some(CALLBACK))
        .get_authorization_url(false)
        .await
        .unwrap_err();

    match err.kind() {
        ErrorKind::Protocol(ProtocolViolation::ErrorStatus { status, body }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(&**body, "Invalid consumer key");
        }
        other => panic!("unexpected error kind: {:?}", other),
    }
    assert!(!err.is_transport());
    assert_eq!(
        err.endpoint(),
        Some(format!("{}/oauth/request_token", server.uri()).as_str())
    );
}

#[tokio::test]
async fn request_token_without_secret_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(form_response("oauth_token=req-token&oauth_callback_confirmed=true"))
        .expect(1)
        .mount(&server)
        .await;

    let err = delegated_handler(&server, Some(CALLBACK))
        .get_authorization_url(false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Protocol(ProtocolViolation::MissingField("oauth_token_secret"))
    ));
}

#[tokio::test]
async fn request_token_with_blank_secret_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/request_token"))
        .respond_with(form_response(
            "oauth_token=req-token&oauth_token_secret=&oauth_callback_confirmed=true",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = delegated_handler(&server, Some(CALLBACK))
        .get_authorization_url(false)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Protocol(ProtocolViolation::MissingField("oauth_token_secret"))
    ));
}

#[tokio::test]
async fn access_token_with_blank_secret_is_not_stored() {
    let server = MockServer::start().await;
    mount_request_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(form_response("oauth_token=6253282-access&oauth_token_secret="))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, Some(CALLBACK));
    let pending = handler.get_authorization_url(false).await.expect("authorization url");
    let err = handler.get_access_token(pending, "verifier-123").await.unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Protocol(ProtocolViolation::MissingField("oauth_token_secret"))
    ));
    assert_eq!(handler.access_token(), None);
}

#[tokio::test]
async fn failed_access_token_exchange_leaves_handler_without_token() {
    let server = MockServer::start().await;
    mount_request_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid request token"))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, Some(CALLBACK));
    let pending = handler.get_authorization_url(false).await.expect("authorization url");
    let err = handler.get_access_token(pending, "wrong").await.unwrap_err();

    assert!(err.is_protocol());
    assert!(matches!(handler.apply_auth().unwrap_err().kind(), ErrorKind::NoAccessToken));
}

#[tokio::test]
async fn resumed_authorization_exchanges_persisted_request_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string("oauth_verifier=verifier-456"))
        .and(oauth_token_is(Some("persisted-token")))
        .respond_with(form_response(
            "oauth_token=access&oauth_token_secret=access-secret",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let pending = PendingAuthorization::resume(
        RequestToken::new("persisted-token", "persisted-secret"),
        "https://api.twitter.com/oauth/authorize?oauth_token=persisted-token",
    );
    let mut handler = delegated_handler(&server, Some(CALLBACK));
    let access_token = handler
        .get_access_token(pending, "verifier-456")
        .await
        .expect("access token");

    assert_eq!(access_token, AccessToken::new("access", "access-secret"));
}

#[tokio::test]
async fn unreachable_provider_is_transport_error() {
    let config = Config::new().api_base("http://127.0.0.1:1").allow_http();
    let handler = DelegatedAuthHandler::with_config(app(), None, config).expect("build handler");

    let err = handler.get_authorization_url(false).await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(err.endpoint(), Some("http://127.0.0.1:1/oauth/request_token"));
}

#[tokio::test]
async fn password_exchange_returns_tokens_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .and(body_string(
            "x_auth_mode=client_auth&x_auth_password=hunter%202&x_auth_username=twitterapi",
        ))
        .and(oauth_token_is(None))
        .respond_with(form_response(
            "oauth_token=6253282-xauth&oauth_token_secret=xauth%2Fsecret",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    let access_token = handler
        .get_token_via_password("twitterapi", "hunter 2")
        .await
        .expect("access token");

    assert_eq!(access_token.token(), "6253282-xauth");
    assert_eq!(access_token.token_secret(), "xauth/secret");
    assert_eq!(
        handler.apply_auth().expect("apply auth"),
        RequestDecorator::from(OAuth10a::new(
            CONSUMER_KEY,
            CONSUMER_SECRET,
            "6253282-xauth",
            "xauth/secret"
        ))
    );
}

#[tokio::test]
async fn password_exchange_without_secret_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(form_response("oauth_token=6253282-xauth"))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    handler.set_access_token("earlier", "earlier-secret");

    let err = handler
        .get_token_via_password("twitterapi", "hunter2")
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Protocol(ProtocolViolation::MissingField("oauth_token_secret"))
    ));
    assert_eq!(
        handler.access_token(),
        Some(&AccessToken::new("earlier", "earlier-secret"))
    );
}

#[tokio::test]
async fn password_exchange_with_blank_tokens_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(form_response("oauth_token=&oauth_token_secret="))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    let err = handler
        .get_token_via_password("twitterapi", "hunter2")
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        ErrorKind::Protocol(ProtocolViolation::MissingField("oauth_token"))
    ));
    assert_eq!(handler.access_token(), None);
    assert!(matches!(handler.apply_auth().unwrap_err().kind(), ErrorKind::NoAccessToken));
}

#[tokio::test]
async fn username_is_resolved_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .and(query_param("skip_status", "true"))
        .and(oauth_token_is(Some("6253282-access")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 6253282,
            "id_str": "6253282",
            "name": "Twitter API",
            "screen_name": "TwitterAPI"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    handler.set_access_token("6253282-access", "access-secret");

    assert_eq!(handler.get_username().await.expect("username"), "TwitterAPI");
    assert_eq!(handler.get_username().await.expect("username"), "TwitterAPI");
}

#[tokio::test]
async fn username_is_memoized_across_token_changes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .and(oauth_token_is(Some("first")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "1",
            "screen_name": "first_user"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .and(oauth_token_is(Some("second")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "2",
            "screen_name": "second_user"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    handler.set_access_token("first", "secret");
    assert_eq!(handler.get_username().await.expect("username"), "first_user");

    handler.set_access_token("second", "secret");
    assert_eq!(handler.get_username().await.expect("username"), "first_user");
    assert_eq!(handler.access_token(), Some(&AccessToken::new("second", "secret")));
}

#[tokio::test]
async fn revoked_token_cannot_resolve_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{ "code": 89, "message": "Invalid or expired token." }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    handler.set_access_token("revoked", "secret");

    for _ in 0..2 {
        let err = handler.get_username().await.unwrap_err();
        match err.kind() {
            ErrorKind::IdentityUnresolved { status } => {
                assert_eq!(status.map(|status| status.as_u16()), Some(401));
            }
            other => panic!("unexpected error kind: {:?}", other),
        }
    }
}

#[tokio::test]
async fn response_without_screen_name_cannot_resolve_username() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id_str": "6253282" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = delegated_handler(&server, None);
    handler.set_access_token("6253282-access", "access-secret");

    let err = handler.get_username().await.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::IdentityUnresolved { status: None }));
}

#[tokio::test]
async fn username_requires_access_token() {
    let server = MockServer::start().await;

    let handler = AnyAuthHandler::from(delegated_handler(&server, None));
    let err = handler.get_username().await.unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::NoAccessToken));
    assert!(server.received_requests().await.unwrap().is_empty());
}
