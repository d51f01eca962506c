use super::*;

#[test]
fn test_parse_proxy_address() {
    let candidate = Candidate::parse("http://203.0.113.7:8080").unwrap();
    assert_eq!(candidate.as_str(), "http://203.0.113.7:8080/");
    assert_eq!(candidate.url().port(), Some(8080));
    assert_eq!(candidate.to_string(), "http://203.0.113.7:8080/");
}

#[test]
fn test_equality_is_address_equality() {
    let a: Candidate = "http://203.0.113.7:8080".parse().unwrap();
    let b: Candidate = "http://203.0.113.7:8080/".parse().unwrap();
    let c: Candidate = "http://203.0.113.8:8080".parse().unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_rejects_unusable_addresses() {
    assert!(matches!(
        Candidate::parse("socks5://203.0.113.7:1080"),
        Err(CandidateError::Scheme(scheme)) if scheme == "socks5"
    ));
    assert!(matches!(
        Candidate::parse("203.0.113.7:8080"),
        Err(CandidateError::Parse(_)) | Err(CandidateError::Scheme(_))
    ));
    assert!(matches!(
        Candidate::parse("http://203.0.113.999:8080"),
        Err(CandidateError::Parse(_))
    ));
    assert!(matches!(
        Candidate::parse("http://203.0.113.7:70000"),
        Err(CandidateError::Parse(_))
    ));
}
