//! CLDAP ping client and NETLOGON response decoder
//!
//! A CLDAP ping ([MS-ADTS] 6.3.3) is an LDAP search of the root DSE sent in a
//! single UDP datagram to port 389 of a domain controller. The request asks
//! for the `Netlogon` attribute; the answer carries a
//! NETLOGON_SAM_LOGON_RESPONSE_EX structure describing the controller: its
//! domain GUID, DNS and NetBIOS names, sites and capability flags.
//!
//! The codec ([`encode_ping`], [`decode_response`]) is synchronous and
//! stateless. [`CldapClient`] adds the tokio UDP exchange.
//!
//! # Example
//!
//! ```no_run
//! use cldap::CldapClientBuilder;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> cldap::Result<()> {
//!     let mut client = CldapClientBuilder::new("192.0.2.10:389".parse().unwrap())
//!         .timeout(Duration::from_secs(5))
//!         .build()
//!         .await?;
//!
//!     let response = client.ping(Some("corp.example.com")).await?;
//!     if response.flags().is_global_catalog() {
//!         println!("{} is a global catalog", response.dns_host_name());
//!     }
//!     print!("{}", response);
//!     Ok(())
//! }
//! ```
//!
//! Decoding a captured datagram needs no runtime:
//!
//! ```
//! let request = cldap::encode_ping(None);
//! assert_eq!(request.len(), 63);
//! assert!(cldap::decode_response(b"not a response").is_err());
//! ```

pub mod ber;
pub mod error;
pub mod guid;
pub mod rfc1035;
pub mod wire;

// NETLOGON payload
pub mod ds_flags;
pub mod netlogon;
pub mod ping_response;

// CLDAP message and transport
pub mod cldap;
pub mod cldap_client;
pub mod udp_transport;

pub use error::{CldapError, DecodeError, Result};

pub use cldap::{decode_envelope, decode_response, encode_ping, PingRequest};
pub use cldap_client::{ping, CldapClient, CldapClientBuilder, CLDAP_PORT, DEFAULT_CLDAP_TIMEOUT};
pub use ds_flags::DsFlags;
pub use guid::Guid;
pub use netlogon::{NetlogonFooter, NetlogonHeader, Opcode};
pub use ping_response::PingResponse;
pub use udp_transport::{UdpTransport, DEFAULT_MAX_UDP_SIZE, MAX_UDP_PAYLOAD};
