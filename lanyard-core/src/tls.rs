//! TLS Configuration
//!
//! Builds the single `rustls::ClientConfig` consumed by both the HTTP
//! transport and the WebSocket connector. When a [`CertificateSet`] is
//! supplied, server identities are checked in two stages: default WebPKI
//! chain-of-trust evaluation first (reject immediately on failure), then the
//! leaf certificate's DER bytes against the pinned set. A pin miss cancels
//! the handshake as a generic certificate error, so callers cannot tell a
//! pinning rejection apart from any other trust failure.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::error::ClientError;
use crate::pinning::{validate, CertificateSet, PinnedCertificate};

fn provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

fn webpki_roots_store() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

/// Server-certificate verifier that pins the leaf after default trust.
#[derive(Debug)]
struct PinnedServerVerifier {
    inner: Arc<WebPkiServerVerifier>,
    pins: CertificateSet,
}

impl ServerCertVerifier for PinnedServerVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        // Default trust evaluation first; a broken chain never reaches the pin check.
        let verified = self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        )?;

        if validate(end_entity.as_ref(), &self.pins) {
            Ok(verified)
        } else {
            tracing::warn!(
                fingerprint = %PinnedCertificate::from_der(end_entity.as_ref()).to_hex(),
                "server certificate not in pinned set"
            );
            Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            ))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

/// Builds the shared TLS client configuration.
///
/// With `pins = None` (pinning disabled) the config defers entirely to
/// default WebPKI trust evaluation. With a certificate set, the
/// [`PinnedServerVerifier`] is installed.
pub fn client_config(pins: Option<CertificateSet>) -> Result<Arc<rustls::ClientConfig>, ClientError> {
    let provider = provider();
    let roots = Arc::new(webpki_roots_store());

    let builder = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::Tls(e.to_string()))?;

    let config = match pins {
        Some(pins) if !pins.is_empty() => {
            let inner = WebPkiServerVerifier::builder_with_provider(roots, provider)
                .build()
                .map_err(|e| ClientError::Tls(e.to_string()))?;
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(PinnedServerVerifier { inner, pins }))
                .with_no_client_auth()
        }
        _ => builder
            .with_root_certificates(Arc::unwrap_or_clone(roots))
            .with_no_client_auth(),
    };

    Ok(Arc::new(config))
}
