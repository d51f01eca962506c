use std::time::Duration;

use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::*;

static PROXY_TABLE: &str = r#"
<table class="table table-striped table-bordered">
<thead><tr><th>IP Address</th><th>Port</th><th>Code</th></tr></thead>
<tbody>
<tr><td>203.0.113.7</td><td>8080</td><td>US</td></tr>
<tr><td>198.51.100.23</td><td>3128</td><td>DE</td></tr>
<tr><td>203.0.113.999</td><td>80</td><td>??</td></tr>
<tr><td>192.0.2.1</td><td>99999</td><td>??</td></tr>
<tr><td>203.0.113.7</td><td>8080</td><td>US</td></tr>
<tr><td>192.0.2.44</td>
    <td>80</td><td>FR</td></tr>
</tbody>
</table>
"#;

fn addresses(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(Candidate::as_str).collect()
}

fn test_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .no_proxy()
        .build()
        .unwrap()
}

#[test]
fn test_extract_candidates_from_table() {
    let candidates = extract_candidates(PROXY_TABLE, &default_row_pattern());
    assert_eq!(
        addresses(&candidates),
        vec![
            "http://203.0.113.7:8080/",
            "http://198.51.100.23:3128/",
            "http://192.0.2.44/",
        ]
    );
}

#[test]
fn test_extract_candidates_without_rows() {
    let body = "<html><body>rate limited</body></html>";
    let candidates = extract_candidates(body, &default_row_pattern());
    assert!(candidates.is_empty());
}

#[test]
fn test_extract_candidates_with_custom_pattern() {
    let pattern = Regex::new(r"(?m)^(?P<ip>[\d.]+):(?P<port>\d+)$").unwrap();
    let body = "203.0.113.7:8080\nnot a proxy\n198.51.100.23:3128\n";
    let candidates = extract_candidates(body, &pattern);
    assert_eq!(
        addresses(&candidates),
        vec!["http://203.0.113.7:8080/", "http://198.51.100.23:3128/"]
    );
}

#[test]
fn test_pattern_requires_named_groups() {
    let url = Url::parse("https://proxies.invalid/").unwrap();
    let pattern = Regex::new(r"(?P<ip>[\d.]+):(\d+)").unwrap();
    assert!(matches!(
        ProxyListSource::with_pattern(url, pattern, test_client()),
        Err(FetchError::MissingCaptureGroup("port"))
    ));
}

#[tokio::test]
async fn test_fetch_proxy_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROXY_TABLE))
        .expect(1)
        .mount(&server)
        .await;

    let source = ProxyListSource::new(Url::parse(&server.uri()).unwrap(), test_client());
    let candidates = source.fetch_candidates().await.unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].as_str(), "http://203.0.113.7:8080/");
}

#[tokio::test]
async fn test_fetch_proxy_list_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = ProxyListSource::new(Url::parse(&server.uri()).unwrap(), test_client());
    assert!(matches!(
        source.fetch_candidates().await,
        Err(FetchError::Status(status)) if status == StatusCode::SERVICE_UNAVAILABLE
    ));
}

#[tokio::test]
async fn test_fetch_proxy_list_unreachable() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    let source = ProxyListSource::new(url, test_client());
    assert!(matches!(
        source.fetch_candidates().await,
        Err(FetchError::Request(_))
    ));
}

#[tokio::test]
async fn test_static_source() {
    let source = StaticSource::new(["http://203.0.113.7:8080", "https://198.51.100.23:443"]);
    let candidates = source.fetch_candidates().await.unwrap();
    assert_eq!(
        addresses(&candidates),
        vec!["http://203.0.113.7:8080/", "https://198.51.100.23/"]
    );

    let source = StaticSource::new(vec![
        "http://203.0.113.7:8080".to_string(),
        "nonsense".to_string(),
    ]);
    match source.fetch_candidates().await {
        Err(FetchError::InvalidCandidate { input, .. }) => assert_eq!(input, "nonsense"),
        other => panic!("unexpected {:?}", other),
    }

    assert!(StaticSource::new(Vec::<String>::new())
        .fetch_candidates()
        .await
        .unwrap()
        .is_empty());
}
