//! Tests for the uniform response model

use lanyard_core::http::*;
use lanyard_core::ErrorKind;

#[test]
fn test_success_iff_status_in_2xx_range() {
    for status in 100u16..600 {
        let response = Response::compose(status, Vec::new(), None);
        assert_eq!(
            response.is_success(),
            (200..300).contains(&status),
            "status {} misclassified",
            status
        );
    }
}

#[test]
fn test_every_failure_carries_a_concrete_error_kind() {
    let failures = [
        Response::compose(404, Vec::new(), None),
        Response::from_transport_failure(&TransportFailure::Timeout),
        Response::from_transport_failure(&TransportFailure::Cancelled),
        Response::from_transport_failure(&TransportFailure::Connection("refused".into())),
        Response::from_error(ErrorKind::BadUrl),
    ];
    for response in failures {
        assert!(!response.is_success());
        assert!(response.error().is_some(), "failure without an error kind");
    }
}

#[test]
fn test_reserved_transport_sentinels() {
    let timeout = Response::from_transport_failure(&TransportFailure::Timeout);
    assert_eq!(timeout.status_code(), STATUS_TIMEOUT);
    assert_eq!(STATUS_TIMEOUT, -1001);

    let cancelled = Response::from_transport_failure(&TransportFailure::Cancelled);
    assert_eq!(cancelled.status_code(), STATUS_CANCELLED);
    assert_eq!(STATUS_CANCELLED, -999);
}

#[test]
fn test_success_exposes_body_and_headers() {
    let headers = vec![("content-type".to_string(), "application/json".to_string())];
    let response = Response::compose(200, headers, Some(br#"{"n":1}"#.to_vec()));

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body(), Some(br#"{"n":1}"# as &[u8]));
    assert_eq!(response.headers().len(), 1);

    let decoded: serde_json::Value = response.json().unwrap();
    assert_eq!(decoded["n"], 1);
}

#[test]
fn test_non_2xx_is_server_error_with_payload_kept() {
    let response = Response::compose(500, Vec::new(), Some(b"oops".to_vec()));
    assert_eq!(response.error(), Some(&ErrorKind::ServerError));
    assert_eq!(response.body(), Some(b"oops" as &[u8]));
}
