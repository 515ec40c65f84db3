// Network utilities - target parsing, DNS resolution, socket helpers

use crate::error::ProbeError;
use hickory_resolver::config::*;
use hickory_resolver::TokioAsyncResolver;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default per-probe timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default TLS port
pub const DEFAULT_PORT: u16 = 443;

/// Probe target: hostname, port and the per-probe deadline.
///
/// Parsing is synchronous and offline; DNS resolution is a separate async
/// step so that callers can distinguish malformed input (a hard error) from
/// an unreachable host (a valid, scoreable outcome).
#[derive(Debug, Clone)]
pub struct Target {
    pub hostname: String,
    pub port: u16,
    pub timeout: Duration,
    pub ip_addresses: Vec<IpAddr>,
}

impl Target {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
            ip_addresses: Vec::new(),
        }
    }

    /// Override the per-probe timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse target from string (host, host:port, or URL)
    pub fn parse(input: &str, default_port: u16) -> Result<Self, ProbeError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ProbeError::InvalidTarget {
                target: input.to_string(),
                reason: "empty target".to_string(),
            });
        }

        let (hostname, port) = if input.contains("://") {
            // URL format (https://example.com:443)
            let url = url::Url::parse(input).map_err(|e| ProbeError::InvalidTarget {
                target: input.to_string(),
                reason: e.to_string(),
            })?;
            let host = url
                .host_str()
                .ok_or_else(|| ProbeError::InvalidTarget {
                    target: input.to_string(),
                    reason: "no hostname in URL".to_string(),
                })?
                .to_string();
            (host, url.port().unwrap_or(default_port))
        } else if let Some((host, port_str)) = input.rsplit_once(':') {
            // host:port format; bare IPv6 addresses are not split
            match port_str.parse::<u16>() {
                Ok(port) => (host.to_string(), port),
                Err(_) if input.parse::<IpAddr>().is_ok() => {
                    (input.to_string(), default_port)
                }
                Err(e) => {
                    return Err(ProbeError::InvalidTarget {
                        target: input.to_string(),
                        reason: format!("invalid port number: {}", e),
                    })
                }
            }
        } else {
            (input.to_string(), default_port)
        };

        Ok(Self::new(hostname, port))
    }

    /// Resolve the hostname, populating `ip_addresses`
    pub async fn resolve(&mut self) -> Result<(), ProbeError> {
        self.ip_addresses = resolve_hostname(&self.hostname).await?;
        Ok(())
    }

    /// Get all socket addresses
    pub fn socket_addrs(&self) -> Vec<SocketAddr> {
        self.ip_addresses
            .iter()
            .map(|ip| SocketAddr::new(*ip, self.port))
            .collect()
    }

    /// Get primary socket address (first resolved IP)
    pub fn primary_addr(&self) -> Option<SocketAddr> {
        self.ip_addresses
            .first()
            .map(|ip| SocketAddr::new(*ip, self.port))
    }

    /// Display form, "host:port"
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

/// Resolve hostname to IP addresses
pub async fn resolve_hostname(hostname: &str) -> Result<Vec<IpAddr>, ProbeError> {
    // Already an IP address, nothing to resolve
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let response = resolver.lookup_ip(hostname).await.map_err(|e| {
        ProbeError::DnsResolutionFailed {
            hostname: hostname.to_string(),
            source: e,
        }
    })?;

    let ips: Vec<IpAddr> = response.iter().collect();

    if ips.is_empty() {
        return Err(ProbeError::EmptyResolution {
            hostname: hostname.to_string(),
        });
    }

    Ok(ips)
}

/// Connect to target with timeout. An elapsed deadline surfaces as an
/// io error of kind `TimedOut` so callers classify every failure the
/// same way.
pub async fn connect_with_timeout(
    addr: SocketAddr,
    connect_timeout: Duration,
) -> io::Result<TcpStream> {
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connection to {} timed out", addr),
        )),
    }
}
