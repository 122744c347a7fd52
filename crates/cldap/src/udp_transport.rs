//! UDP transport for CLDAP
//!
//! Each request and each response is exactly one datagram; there is no
//! framing or reassembly.

use crate::error::{CldapError, Result};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Default receive buffer size (domain controller responses are a few hundred bytes)
pub const DEFAULT_MAX_UDP_SIZE: usize = 8 * 1024;

/// Maximum theoretical UDP payload size
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// One UDP socket with a reusable receive buffer
pub struct UdpTransport {
    socket: UdpSocket,
    max_message_size: usize,
    recv_buf: BytesMut,
}

impl UdpTransport {
    pub fn new(socket: UdpSocket) -> Self {
        Self::with_max_size(socket, DEFAULT_MAX_UDP_SIZE)
    }

    /// Wrap `socket`, capping datagrams at `max_message_size`
    pub fn with_max_size(socket: UdpSocket, max_message_size: usize) -> Self {
        let max_size = max_message_size.min(MAX_UDP_PAYLOAD);
        Self {
            socket,
            max_message_size: max_size,
            recv_buf: BytesMut::with_capacity(max_size),
        }
    }

    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::new(socket))
    }

    /// Restrict the socket to datagrams from `addr`
    pub async fn connect(&self, addr: SocketAddr) -> Result<()> {
        self.socket.connect(addr).await?;
        Ok(())
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    fn check_size(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.max_message_size {
            return Err(CldapError::Encoding(format!(
                "request of {} bytes exceeds maximum datagram size of {} bytes",
                data.len(),
                self.max_message_size
            )));
        }
        Ok(())
    }

    /// Send one datagram on a connected socket, returning the bytes sent
    pub async fn send(&self, data: &[u8]) -> Result<usize> {
        self.check_size(data)?;
        Ok(self.socket.send(data).await?)
    }

    /// Send one datagram to `addr`, returning the bytes sent
    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<usize> {
        self.check_size(data)?;
        Ok(self.socket.send_to(data, addr).await?)
    }

    /// Receive one datagram on a connected socket
    pub async fn recv(&mut self) -> Result<Bytes> {
        self.recv_buf.clear();
        self.recv_buf.resize(self.max_message_size, 0);

        let len = self.socket.recv(&mut self.recv_buf).await?;
        self.recv_buf.truncate(len);

        Ok(self.recv_buf.split().freeze())
    }

    /// Receive one datagram and its sender
    pub async fn recv_from(&mut self) -> Result<(Bytes, SocketAddr)> {
        self.recv_buf.clear();
        self.recv_buf.resize(self.max_message_size, 0);

        let (len, addr) = self.socket.recv_from(&mut self.recv_buf).await?;
        self.recv_buf.truncate(len);

        Ok((self.recv_buf.split().freeze(), addr))
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }
}
