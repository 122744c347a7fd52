//! NETLOGON_SAM_LOGON_RESPONSE_EX decoding ([MS-ADTS] 6.3.1.9)
//!
//! The payload of a CLDAP ping response:
//!
//! ```text
//! Offset  Size  Field
//! 0       2     Opcode (LOGON_SAM_LOGON_RESPONSE_EX = 23)
//! 2       2     Sbz
//! 4       4     Flags (DS_FLAG bits)
//! 8       16    DomainGuid
//! 24      var   RFC 1035 compressed names:
//!                 DnsForestName, DnsDomainName, DnsHostName,
//!                 NetbiosDomainName, NetbiosComputerName, UserName,
//!                 DcSiteName, ClientSiteName
//!                 [, NextClosestSiteName]
//! len-8   4     NtVersion
//! len-4   2     LmNtToken (0xFFFF)
//! len-2   2     Lm20Token (0xFFFF)
//! ```
//!
//! All integers are little-endian. Compression pointers address offsets
//! from the start of the payload.

use crate::error::DecodeError;
use crate::guid::Guid;
use crate::ping_response::PingResponse;
use crate::rfc1035::decompress_names;
use crate::wire::WireStruct;
use bytes::Buf;
use tracing::{debug, warn};

/// Header size (opcode + sbz + flags + GUID)
pub const NETLOGON_HEADER_SIZE: usize = 24;

/// Footer size (NtVersion + LmNtToken + Lm20Token)
pub const NETLOGON_FOOTER_SIZE: usize = 8;

/// Number of names in a LOGON_SAM_LOGON_RESPONSE_EX body
pub const NETLOGON_EX_NAME_COUNT: usize = 8;

/// Expected value of both trailing tokens
pub const NETLOGON_TOKEN: u16 = 0xffff;

/// NETLOGON_NT_VERSION bits ([MS-ADTS] 6.3.1.1)
pub mod nt_version {
    pub const NETLOGON_NT_VERSION_1: u32 = 0x0000_0001;
    pub const NETLOGON_NT_VERSION_5: u32 = 0x0000_0002;
    pub const NETLOGON_NT_VERSION_5EX: u32 = 0x0000_0004;
    pub const NETLOGON_NT_VERSION_5EX_WITH_IP: u32 = 0x0000_0008;
    pub const NETLOGON_NT_VERSION_WITH_CLOSEST_SITE: u32 = 0x0000_0010;
    pub const NETLOGON_NT_VERSION_AVOID_NT4EMUL: u32 = 0x0100_0000;
    pub const NETLOGON_NT_VERSION_PDC: u32 = 0x1000_0000;
    pub const NETLOGON_NT_VERSION_IP: u32 = 0x2000_0000;
    pub const NETLOGON_NT_VERSION_LOCAL: u32 = 0x4000_0000;
    pub const NETLOGON_NT_VERSION_GC: u32 = 0x8000_0000;
}

/// NETLOGON operation codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Opcode {
    /// Mailslot query for the primary
    LogonPrimaryQuery = 7,
    /// Mailslot response from the primary
    LogonPrimaryResponse = 12,
    /// Mailslot ping request
    LogonSamLogonRequest = 18,
    /// Mailslot ping response
    LogonSamLogonResponse = 19,
    /// Netlogon service is paused
    LogonSamPauseResponse = 20,
    /// Unknown user
    LogonSamUserUnknown = 21,
    /// Extended ping response
    LogonSamLogonResponseEx = 23,
    /// Netlogon service is paused (extended)
    LogonSamPauseResponseEx = 24,
    /// Unknown user (extended)
    LogonSamUserUnknownEx = 25,
}

impl Opcode {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            7 => Some(Self::LogonPrimaryQuery),
            12 => Some(Self::LogonPrimaryResponse),
            18 => Some(Self::LogonSamLogonRequest),
            19 => Some(Self::LogonSamLogonResponse),
            20 => Some(Self::LogonSamPauseResponse),
            21 => Some(Self::LogonSamUserUnknown),
            23 => Some(Self::LogonSamLogonResponseEx),
            24 => Some(Self::LogonSamPauseResponseEx),
            25 => Some(Self::LogonSamUserUnknownEx),
            _ => None,
        }
    }
}

/// Fixed leading part of the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetlogonHeader {
    /// Raw opcode; see [`Opcode::from_u16`]
    pub opcode: u16,
    pub sbz: u16,
    pub flags: u32,
    pub domain_guid: Guid,
}

impl WireStruct for NetlogonHeader {
    const NAME: &'static str = "NETLOGON_SAM_LOGON_RESPONSE_EX header";
    const SIZE: usize = NETLOGON_HEADER_SIZE;

    fn read_fields(buf: &mut &[u8]) -> Self {
        let opcode = buf.get_u16_le();
        let sbz = buf.get_u16_le();
        let flags = buf.get_u32_le();
        let domain_guid = Guid::read_fields(buf);
        Self {
            opcode,
            sbz,
            flags,
            domain_guid,
        }
    }
}

/// Fixed trailing part of the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetlogonFooter {
    pub nt_version: u32,
    pub lm_nt_token: u16,
    pub lm20_token: u16,
}

impl NetlogonFooter {
    /// Whether this footer belongs to a response shape we can decode
    pub fn is_supported(&self) -> bool {
        self.nt_version & nt_version::NETLOGON_NT_VERSION_5EX != 0
            && self.lm_nt_token == NETLOGON_TOKEN
            && self.lm20_token == NETLOGON_TOKEN
    }
}

impl WireStruct for NetlogonFooter {
    const NAME: &'static str = "NETLOGON_SAM_LOGON_RESPONSE_EX footer";
    const SIZE: usize = NETLOGON_FOOTER_SIZE;

    fn read_fields(buf: &mut &[u8]) -> Self {
        Self {
            nt_version: buf.get_u32_le(),
            lm_nt_token: buf.get_u16_le(),
            lm20_token: buf.get_u16_le(),
        }
    }
}

/// Decode a NETLOGON_SAM_LOGON_RESPONSE_EX payload
pub fn decode(payload: &[u8]) -> Result<PingResponse, DecodeError> {
    let header = NetlogonHeader::decode(payload)?;
    match Opcode::from_u16(header.opcode) {
        Some(Opcode::LogonSamLogonResponseEx) => {}
        other => warn!(
            "unexpected NETLOGON opcode {} ({:?}), decoding as LOGON_SAM_LOGON_RESPONSE_EX",
            header.opcode, other
        ),
    }

    let names_end = payload
        .len()
        .saturating_sub(NETLOGON_FOOTER_SIZE)
        .max(NETLOGON_HEADER_SIZE);
    let region = &payload[NETLOGON_HEADER_SIZE..names_end];
    let names = decompress_names(region, NETLOGON_HEADER_SIZE)?;
    debug!("decoded {} names from {} byte name region", names.len(), region.len());
    if names.len() < NETLOGON_EX_NAME_COUNT {
        return Err(DecodeError::InsufficientNames {
            count: names.len(),
            expected: NETLOGON_EX_NAME_COUNT,
        });
    }

    // Anchored to the end of the payload, wherever the names stopped
    let footer_start = payload.len() - NETLOGON_FOOTER_SIZE;
    let footer = NetlogonFooter::decode(&payload[footer_start..])?;
    if !footer.is_supported() {
        return Err(DecodeError::UnexpectedFooter {
            nt_version: footer.nt_version,
            lm_nt_token: footer.lm_nt_token,
            lm20_token: footer.lm20_token,
        });
    }

    Ok(PingResponse::from_names(
        header.domain_guid,
        header.flags.into(),
        names,
    ))
}
