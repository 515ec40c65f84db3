// Connection driver - performs one version-pinned TLS handshake
//
// TLS 1.0-1.2 handshakes go through OpenSSL, which allows pinning min and
// max protocol version to the same value. TLS 1.3 goes through rustls,
// which only implements TLS 1.2/1.3; restricting the builder to the TLS13
// version slice is therefore a true single-version offer, not a min/max
// range that a peer could negotiate below.

use super::{ConnectionFailure, NegotiatedHandshake, ProtocolVersion};
use crate::utils::network::{self, Target};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Performs a single capability-constrained handshake against a target.
///
/// No retry logic lives here; retry policy belongs to the caller.
pub struct VersionProbe {
    target: Target,
    connect_timeout: Duration,
}

impl VersionProbe {
    pub fn new(target: Target) -> Self {
        let connect_timeout = target.timeout;
        Self {
            target,
            connect_timeout,
        }
    }

    /// Attempt a handshake advertising only `version`.
    ///
    /// A peer that completes the handshake on a different version than the
    /// one requested is reported as `ProtocolMismatch`, never as success:
    /// a silent upgrade must not be recorded as support for the requested
    /// version.
    pub async fn probe_version(
        &self,
        version: ProtocolVersion,
    ) -> Result<NegotiatedHandshake, ConnectionFailure> {
        let addr = match self.target.primary_addr() {
            Some(addr) => addr,
            None => return Err(ConnectionFailure::Unreachable),
        };

        let stream = match network::connect_with_timeout(addr, self.connect_timeout).await {
            Ok(stream) => stream,
            Err(e) => {
                let kind = classify_io_error(&e);
                debug!("{} connect to {} failed: {} ({})", version, addr, e, kind);
                return Err(kind);
            }
        };

        let start = Instant::now();
        let outcome = match version {
            ProtocolVersion::Tls13 => self.handshake_rustls(stream).await,
            _ => self.handshake_openssl(version, stream),
        };

        match outcome {
            Ok(cipher_name) => {
                let handshake_time_ms = start.elapsed().as_millis() as u64;
                debug!(
                    "{} negotiated {} with {} in {}ms",
                    self.target.endpoint(),
                    version,
                    cipher_name,
                    handshake_time_ms
                );
                Ok(NegotiatedHandshake {
                    version,
                    cipher_name,
                    handshake_time_ms,
                })
            }
            Err(kind) => Err(kind),
        }
    }

    /// Handshake for TLS 1.0-1.2, pinned via OpenSSL min/max version
    fn handshake_openssl(
        &self,
        version: ProtocolVersion,
        stream: TcpStream,
    ) -> Result<String, ConnectionFailure> {
        use openssl::ssl::{HandshakeError, SslVersion};

        let std_stream = stream.into_std().map_err(|e| classify_io_error(&e))?;
        std_stream
            .set_nonblocking(false)
            .map_err(|e| classify_io_error(&e))?;
        // The TCP connect already succeeded; from here on a stalled peer is
        // a handshake timeout, not unreachability.
        let _ = std_stream.set_read_timeout(Some(self.connect_timeout));
        let _ = std_stream.set_write_timeout(Some(self.connect_timeout));

        let ssl_version = match version {
            ProtocolVersion::Tls10 => SslVersion::TLS1,
            ProtocolVersion::Tls11 => SslVersion::TLS1_1,
            ProtocolVersion::Tls12 => SslVersion::TLS1_2,
            ProtocolVersion::Tls13 => return Err(ConnectionFailure::Rejected),
        };

        let connector = build_pinned_connector(ssl_version).map_err(|e| {
            warn!("OpenSSL connector setup failed for {}: {}", version, e);
            ConnectionFailure::Rejected
        })?;

        match connector.connect(&self.target.hostname, std_stream) {
            Ok(tls_stream) => {
                let ssl = tls_stream.ssl();
                if ssl.version_str() != version.openssl_name() {
                    warn!(
                        "{} answered a {} probe with {}",
                        self.target.endpoint(),
                        version,
                        ssl.version_str()
                    );
                    return Err(ConnectionFailure::ProtocolMismatch);
                }
                ssl.current_cipher()
                    .map(|c| c.name().to_string())
                    .ok_or(ConnectionFailure::Rejected)
            }
            Err(HandshakeError::Failure(mid)) => {
                let timed_out = mid
                    .error()
                    .io_error()
                    .map(|e| {
                        matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
                    })
                    .unwrap_or(false);
                if timed_out {
                    Err(ConnectionFailure::Timeout)
                } else {
                    // Alert or handshake-failure class: the expected answer
                    // from a server with this version disabled
                    Err(ConnectionFailure::Rejected)
                }
            }
            Err(_) => Err(ConnectionFailure::Rejected),
        }
    }

    /// Handshake for TLS 1.3 via rustls
    async fn handshake_rustls(&self, stream: TcpStream) -> Result<String, ConnectionFailure> {
        use rustls::ClientConfig;
        use rustls_pki_types::ServerName;
        use tokio_rustls::TlsConnector;

        let config = ClientConfig::builder_with_protocol_versions(&[&rustls::version::TLS13])
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(CapabilityProbeVerifier))
            .with_no_client_auth();

        let connector = TlsConnector::from(Arc::new(config));

        // An IP-literal target gets probed without SNI rather than failing
        let server_name = match ServerName::try_from(self.target.hostname.clone()) {
            Ok(name) => name,
            Err(_) => match self.target.primary_addr() {
                Some(addr) => ServerName::from(addr.ip()),
                None => return Err(ConnectionFailure::Unreachable),
            },
        };

        match timeout(self.connect_timeout, connector.connect(server_name, stream)).await {
            Ok(Ok(tls_stream)) => {
                let (_, conn) = tls_stream.get_ref();
                if conn.protocol_version() != Some(rustls::ProtocolVersion::TLSv1_3) {
                    warn!(
                        "{} answered a TLS 1.3 probe with {:?}",
                        self.target.endpoint(),
                        conn.protocol_version()
                    );
                    return Err(ConnectionFailure::ProtocolMismatch);
                }
                conn.negotiated_cipher_suite()
                    .map(|suite| format!("{:?}", suite.suite()))
                    .ok_or(ConnectionFailure::Rejected)
            }
            Ok(Err(e)) => {
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) {
                    Err(ConnectionFailure::Timeout)
                } else {
                    Err(ConnectionFailure::Rejected)
                }
            }
            Err(_) => Err(ConnectionFailure::Timeout),
        }
    }
}

/// Build an OpenSSL connector pinned to exactly one protocol version
fn build_pinned_connector(
    version: openssl::ssl::SslVersion,
) -> Result<openssl::ssl::SslConnector, openssl::error::ErrorStack> {
    use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};

    let mut builder = SslConnector::builder(SslMethod::tls())?;

    // Capability probing must not fail on untrusted or expired certificates;
    // chain validation is out of scope for the posture probe
    builder.set_verify(SslVerifyMode::NONE);

    builder.set_min_proto_version(Some(version))?;
    builder.set_max_proto_version(Some(version))?;

    Ok(builder.build())
}

/// Map a transport-level io error to a probe failure class
fn classify_io_error(e: &io::Error) -> ConnectionFailure {
    match e.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::NotFound => ConnectionFailure::Unreachable,
        io::ErrorKind::TimedOut
        | io::ErrorKind::WouldBlock
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => ConnectionFailure::Timeout,
        _ => ConnectionFailure::Unreachable,
    }
}

/// No-op certificate verifier for capability probing
#[derive(Debug)]
struct CapabilityProbeVerifier;

impl rustls::client::danger::ServerCertVerifier for CapabilityProbeVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls_pki_types::CertificateDer<'_>,
        _intermediates: &[rustls_pki_types::CertificateDer<'_>],
        _server_name: &rustls_pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls_pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls_pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls_pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
