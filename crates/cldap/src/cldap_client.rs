//! CLDAP ping client
//!
//! Sends one SearchRequest datagram to a domain controller and waits for the
//! single SearchResultEntry that answers it. There are no retransmissions:
//! a lost datagram surfaces as a timeout.

use crate::cldap::{decode_response, encode_ping};
use crate::error::{CldapError, Result};
use crate::ping_response::PingResponse;
use crate::udp_transport::{UdpTransport, DEFAULT_MAX_UDP_SIZE};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Well-known CLDAP port
pub const CLDAP_PORT: u16 = 389;

/// Default time to wait for a ping response
pub const DEFAULT_CLDAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Client bound to one domain controller
pub struct CldapClient {
    transport: UdpTransport,
    server_addr: SocketAddr,
    timeout: Duration,
}

impl CldapClient {
    /// Bind an ephemeral local socket and connect it to `server_addr`
    pub async fn connect(server_addr: SocketAddr) -> Result<Self> {
        Self::connect_with(server_addr, DEFAULT_MAX_UDP_SIZE).await
    }

    async fn connect_with(server_addr: SocketAddr, max_message_size: usize) -> Result<Self> {
        let unspecified = match server_addr {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        let socket = UdpSocket::bind(SocketAddr::new(unspecified, 0)).await?;
        let transport = UdpTransport::with_max_size(socket, max_message_size);
        transport.connect(server_addr).await?;
        debug!(
            "CLDAP client {} connected to {}",
            transport.local_addr()?,
            server_addr
        );

        Ok(Self {
            transport,
            server_addr,
            timeout: DEFAULT_CLDAP_TIMEOUT,
        })
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Ping the server for the naming context `dns_name`
    ///
    /// `None` sends an empty `Host` assertion, which the server answers for
    /// its default domain.
    pub async fn ping(&mut self, dns_name: Option<&str>) -> Result<PingResponse> {
        let request = encode_ping(dns_name);
        let max = self.transport.max_message_size();
        if request.len() > max {
            return Err(CldapError::Encoding(format!(
                "request of {} bytes exceeds maximum datagram size of {} bytes",
                request.len(),
                max
            )));
        }

        debug!(
            "Sending CLDAP ping to {}: dns_name={:?}, {} bytes",
            self.server_addr,
            dns_name.unwrap_or_default(),
            request.len()
        );
        let sent = self.transport.send(&request).await?;
        if sent != request.len() {
            return Err(CldapError::ShortSend {
                sent,
                size: request.len(),
            });
        }

        let datagram = match timeout(self.timeout, self.transport.recv()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "Timeout after {:?} waiting for CLDAP ping response from {}",
                    self.timeout, self.server_addr
                );
                return Err(CldapError::Timeout(self.timeout));
            }
        };
        debug!(
            "Received CLDAP ping response from {}: {} bytes",
            self.server_addr,
            datagram.len()
        );

        Ok(decode_response(&datagram)?)
    }
}

/// Builder for [`CldapClient`]
pub struct CldapClientBuilder {
    server_addr: SocketAddr,
    timeout: Duration,
    max_message_size: usize,
}

impl CldapClientBuilder {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self {
            server_addr,
            timeout: DEFAULT_CLDAP_TIMEOUT,
            max_message_size: DEFAULT_MAX_UDP_SIZE,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Largest datagram sent or accepted
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    pub async fn build(self) -> Result<CldapClient> {
        let mut client = CldapClient::connect_with(self.server_addr, self.max_message_size).await?;
        client.set_timeout(self.timeout);
        Ok(client)
    }
}

/// Ping the domain controller at `ip:port` with the default timeout
pub async fn ping(dns_name: Option<&str>, ip: IpAddr, port: u16) -> Result<PingResponse> {
    let mut client = CldapClient::connect(SocketAddr::new(ip, port)).await?;
    client.ping(dns_name).await
}
