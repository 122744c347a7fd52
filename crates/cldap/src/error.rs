//! Error types for CLDAP pings

use std::time::Duration;
use thiserror::Error;

/// Failures decoding a CLDAP response or the NETLOGON payload it carries
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The BER envelope did not parse or did not yield exactly one octet-string value
    #[error("failed to decode CLDAP ping response envelope: {0}")]
    Envelope(String),

    /// A fixed-size structure was cut short
    #[error("{structure} truncated: needed {needed} bytes, have {have}")]
    Truncated {
        structure: &'static str,
        needed: usize,
        have: usize,
    },

    /// Bad label or compression pointer in the RFC 1035 name region
    #[error("bad encoding of RFC 1035 string at offset {offset}: {reason}")]
    NameDecompression { offset: usize, reason: String },

    #[error("CLDAP ping response contained {count} RFC 1035 encoded strings instead of expected {expected}")]
    InsufficientNames { count: usize, expected: usize },

    #[error(
        "CLDAP ping response contained unexpected final values \
         nt_version=0x{nt_version:08x}, lm_nt_token=0x{lm_nt_token:04x}, lm20_token=0x{lm20_token:04x}"
    )]
    UnexpectedFooter {
        nt_version: u32,
        lm_nt_token: u16,
        lm20_token: u16,
    },
}

impl DecodeError {
    pub(crate) fn envelope(reason: impl Into<String>) -> Self {
        DecodeError::Envelope(reason.into())
    }

    pub(crate) fn name(offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::NameDecompression {
            offset,
            reason: reason.into(),
        }
    }
}

/// CLDAP ping errors
#[derive(Debug, Error)]
pub enum CldapError {
    #[error("failed to encode CLDAP ping request: {0}")]
    Encoding(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timeout after {0:?} waiting for CLDAP ping response")]
    Timeout(Duration),

    #[error("unable to send entire CLDAP ping request: sent {sent} of {size} bytes")]
    ShortSend { sent: usize, size: usize },
}

impl CldapError {
    /// True for socket-level failures, false for request or response codec failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CldapError::Io(_) | CldapError::Timeout(_) | CldapError::ShortSend { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CldapError>;
