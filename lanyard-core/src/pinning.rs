//! Certificate Pinning
//!
//! Core pin check shared by the HTTP and WebSocket paths. Pins are SHA-256
//! fingerprints of DER-encoded certificates; comparing fingerprints of the
//! full DER bytes is byte-exact certificate equality. This module depends
//! only on its inputs and is testable with synthetic byte arrays; the TLS
//! plumbing that extracts the server's leaf certificate lives in [`crate::tls`].

use ring::digest;

/// A pinned certificate fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedCertificate {
    /// SHA-256 fingerprint of the DER-encoded certificate.
    pub sha256_fingerprint: [u8; 32],
}

impl PinnedCertificate {
    /// Creates a pinned certificate from a known SHA-256 fingerprint.
    pub fn new(sha256_fingerprint: [u8; 32]) -> Self {
        PinnedCertificate { sha256_fingerprint }
    }

    /// Computes the SHA-256 hash of DER-encoded certificate bytes.
    pub fn from_der(cert_der: &[u8]) -> Self {
        let hash = digest::digest(&digest::SHA256, cert_der);
        let mut fingerprint = [0u8; 32];
        fingerprint.copy_from_slice(hash.as_ref());
        PinnedCertificate {
            sha256_fingerprint: fingerprint,
        }
    }

    /// Fingerprint as lowercase hex, for logs.
    pub fn to_hex(&self) -> String {
        hex::encode(self.sha256_fingerprint)
    }
}

/// Ordered collection of trusted DER-encoded certificates.
///
/// Loaded once at configuration time and read-only afterwards, so it can be
/// shared safely across both transports.
#[derive(Debug, Clone, Default)]
pub struct CertificateSet {
    entries: Vec<Vec<u8>>,
    pins: Vec<PinnedCertificate>,
}

impl CertificateSet {
    /// Creates an empty set. An empty set matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from raw DER certificate bytes, preserving order.
    pub fn from_der_certificates(certificates: Vec<Vec<u8>>) -> Self {
        let pins = certificates
            .iter()
            .map(|der| PinnedCertificate::from_der(der))
            .collect();
        CertificateSet {
            entries: certificates,
            pins,
        }
    }

    /// Adds one DER certificate to the set.
    pub fn add_der(&mut self, cert_der: &[u8]) {
        self.pins.push(PinnedCertificate::from_der(cert_der));
        self.entries.push(cert_der.to_vec());
    }

    /// Number of pinned certificates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no certificates are pinned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pinned fingerprints, in insertion order.
    pub fn pins(&self) -> &[PinnedCertificate] {
        &self.pins
    }
}

/// Decides whether a server's leaf certificate matches the pinned set.
///
/// Computes the SHA-256 fingerprint of the presented DER bytes and compares
/// it against every entry; accepts on first match. Returns `false` for an
/// empty set. Default chain-of-trust evaluation is NOT performed here; the
/// caller must have already established it (see [`crate::tls`]).
pub fn validate(server_cert_der: &[u8], pins: &CertificateSet) -> bool {
    if pins.is_empty() {
        return false;
    }

    let presented = PinnedCertificate::from_der(server_cert_der);
    pins.pins().iter().any(|pin| pin == &presented)
}
