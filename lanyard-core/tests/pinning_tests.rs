//! Tests for certificate pinning validation

use lanyard_core::pinning::*;

#[test]
fn test_accepts_exact_der_match() {
    let cert = b"-DER- relay leaf certificate".to_vec();
    let set = CertificateSet::from_der_certificates(vec![cert.clone()]);

    assert!(validate(&cert, &set));
}

#[test]
fn test_rejects_when_no_entry_matches() {
    let set = CertificateSet::from_der_certificates(vec![
        b"-DER- relay leaf certificate".to_vec(),
        b"-DER- backup certificate".to_vec(),
    ]);

    assert!(!validate(b"-DER- mitm certificate", &set));
}

#[test]
fn test_rejects_near_miss() {
    // One flipped byte must not match.
    let cert = b"-DER- relay leaf certificate".to_vec();
    let mut near = cert.clone();
    near[0] ^= 0x01;
    let set = CertificateSet::from_der_certificates(vec![cert]);

    assert!(!validate(&near, &set));
}

#[test]
fn test_empty_set_matches_nothing() {
    assert!(!validate(b"-DER- any certificate", &CertificateSet::new()));
}

#[test]
fn test_order_is_preserved_and_any_entry_accepts() {
    let mut set = CertificateSet::new();
    set.add_der(b"first");
    set.add_der(b"second");
    set.add_der(b"third");

    assert_eq!(set.len(), 3);
    assert!(validate(b"second", &set));
    assert!(validate(b"third", &set));
}

#[test]
fn test_fingerprint_matches_manual_digest() {
    let der = b"synthetic certificate bytes";
    let pin = PinnedCertificate::from_der(der);
    let again = PinnedCertificate::from_der(der);

    assert_eq!(pin, again);
    assert_eq!(pin.to_hex().len(), 64);
}
