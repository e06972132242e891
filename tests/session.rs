//! End-to-end tests of a session over HTTP against a mock server.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use scrobbler::{
    config::Config,
    credentials::Credentials,
    error::Error,
    http::Client,
    session::Session,
    track::{Rating, Scrobble, Source, Track},
};
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new("apikey", "secret", "rj", "", "tst", "1.0")
}

/// Mounts a handshake that hands out endpoints on the mock server itself.
async fn mount_handshake(server: &MockServer) {
    let body = format!("OK\nSESSIONKEY\n{0}/np_1.2\n{0}/protocol_1.2\n", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("hs", "true"))
        .and(query_param("p", "1.2.1"))
        .and(query_param("c", "tst"))
        .and(query_param("v", "1.0"))
        .and(query_param("u", "rj"))
        .and(query_param("api_key", "apikey"))
        .and(query_param("sk", ""))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer, config: &Config) -> Result<Session, Error> {
    let url = Url::parse(&format!("{}/", server.uri())).unwrap();
    Session::connect(credentials(), url, Client::new(config)).await
}

#[tokio::test]
async fn test_handshake() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    let session = connect(&server, &Config::default()).await.unwrap();

    assert!(session.transport().is_initialized());
    assert_eq!(session.state().session_key, "SESSIONKEY");
    assert_eq!(
        session.state().now_playing_url.as_str(),
        format!("{}/np_1.2", server.uri())
    );
    assert_eq!(
        session.state().submission_url.as_str(),
        format!("{}/protocol_1.2", server.uri())
    );
}

#[tokio::test]
async fn test_handshake_sends_user_agent() {
    let server = MockServer::start().await;
    let config = Config::with_user_agent("test-player/0.1");
    let user_agent = config.user_agent.clone();

    Mock::given(method("GET"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("BANNED\n"))
        .expect(1)
        .mount(&server)
        .await;

    let err = connect(&server, &config).await.err().unwrap();
    assert!(matches!(err, Error::Protocol(ref message) if message == "BANNED"));
}

#[tokio::test]
async fn test_handshake_refused() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("BADAUTH\n"))
        .mount(&server)
        .await;

    let err = connect(&server, &Config::default()).await.err().unwrap();
    assert!(matches!(err, Error::Protocol(ref message) if message == "BADAUTH"));
}

#[tokio::test]
async fn test_handshake_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("OK\n"))
        .mount(&server)
        .await;

    let err = connect(&server, &Config::default()).await.err().unwrap();
    assert!(matches!(err, Error::HttpStatus(500)));
}

#[tokio::test]
async fn test_handshake_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("OK\nSESSIONKEY\nhttp://np\nhttp://sub\n")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.timeout = Duration::from_millis(200);

    let err = connect(&server, &config).await.err().unwrap();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_now_playing() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/np_1.2"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("s=SESSIONKEY"))
        .and(body_string_contains("a=Sigur+R%C3%B3s"))
        .and(body_string_contains("t=Hopp%C3%ADpolla"))
        .and(body_string_contains("b=&"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK\n"))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server, &Config::default()).await.unwrap();
    session
        .now_playing(&Track::new("Sigur Rós", "Hoppípolla"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_now_playing_failed() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/np_1.2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("FAILED\nsome reason\n"))
        .mount(&server)
        .await;

    let session = connect(&server, &Config::default()).await.unwrap();
    let err = session
        .now_playing(&Track::new("Sigur Rós", "Hoppípolla"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(ref message) if message == "FAILED"));
}

#[tokio::test]
async fn test_submit() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/protocol_1.2"))
        .and(body_string_contains("s=SESSIONKEY"))
        .and(body_string_contains("a%5B0%5D=Sigur+R%C3%B3s"))
        .and(body_string_contains("i%5B0%5D=1700000000"))
        .and(body_string_contains("o%5B0%5D=L1b48a"))
        .and(body_string_contains("r%5B0%5D=B"))
        .and(body_string_contains("l%5B0%5D=&"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK\n"))
        .expect(1)
        .mount(&server)
        .await;

    let session = connect(&server, &Config::default()).await.unwrap();
    let scrobble = Scrobble::new(
        Track::new("Sigur Rós", "Hoppípolla"),
        UNIX_EPOCH + Duration::from_secs(1_700_000_000),
    )
    .with_source(Source::LastFm(Some("1b48a".to_owned())))
    .with_rating(Rating::Ban);

    session.submit(&scrobble).await.unwrap();
}

#[tokio::test]
async fn test_submit_invalid_sends_nothing() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK\n"))
        .expect(0)
        .mount(&server)
        .await;

    let session = connect(&server, &Config::default()).await.unwrap();
    let scrobble = Scrobble::new(Track::new("Sigur Rós", "Hoppípolla"), SystemTime::now());

    let err = session.submit(&scrobble).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_submit_http_status() {
    let server = MockServer::start().await;
    mount_handshake(&server).await;

    Mock::given(method("POST"))
        .and(path("/protocol_1.2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = connect(&server, &Config::default()).await.unwrap();
    let scrobble = Scrobble::new(
        Track::new("Sigur Rós", "Hoppípolla").with_length(Duration::from_secs(270)),
        SystemTime::now(),
    );

    let err = session.submit(&scrobble).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus(500)));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and drop a listener to get a port nothing is listening on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();

    let result = Session::connect(credentials(), url, Client::new(&Config::default())).await;
    assert!(matches!(result, Err(Error::Transport(_))));
}
