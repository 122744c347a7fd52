//! CLDAP ping messages ([MS-ADTS] 6.3.3, RFC 4511)
//!
//! The ping is an LDAP SearchRequest against the root DSE carried in a
//! single UDP datagram:
//!
//! ```text
//! CLDAPMessage ::= SEQUENCE {
//!   messageID  INTEGER (1),
//!   protocolOp [APPLICATION 3] SearchRequest {
//!     baseObject "", scope baseObject, derefAliases never,
//!     sizeLimit 0, timeLimit 0, typesOnly FALSE,
//!     filter (&(Host=<dns name>)(NtVer=\06\00\00\00)),
//!     attributes { "Netlogon" } } }
//! ```
//!
//! The answer is a SearchResultEntry whose single `Netlogon` attribute value
//! is the NETLOGON_SAM_LOGON_RESPONSE_EX payload.

use crate::ber::{BerReader, BerWriter, CONSTRUCTED};
use crate::error::DecodeError;
use crate::netlogon;
use crate::ping_response::PingResponse;
use bytes::Bytes;

/// Message ID used for every ping
pub const CLDAP_MESSAGE_ID: i64 = 1;

/// [APPLICATION 3] SearchRequest
pub const TAG_SEARCH_REQUEST: u8 = 0x63;
/// [APPLICATION 4] SearchResultEntry
pub const TAG_SEARCH_RESULT_ENTRY: u8 = 0x64;
/// [0] and filter
pub const TAG_FILTER_AND: u8 = 0xa0;
/// [3] equalityMatch filter
pub const TAG_FILTER_EQUALITY: u8 = 0xa3;

/// LDAP search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    BaseObject = 0,
    SingleLevel = 1,
    WholeSubtree = 2,
}

/// LDAP alias dereferencing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerefAliases {
    NeverDerefAliases = 0,
    DerefInSearching = 1,
    DerefFindingBaseObj = 2,
    DerefAlways = 3,
}

/// NtVer assertion value: NETLOGON_NT_VERSION_5 | NETLOGON_NT_VERSION_5EX, as a little-endian DWORD
pub const NT_VERSION_ASSERTION: [u8; 4] = 0x0000_0006u32.to_le_bytes();

/// Attribute requested from the root DSE
pub const NETLOGON_ATTRIBUTE: &str = "Netlogon";

/// Parameters of one CLDAP ping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PingRequest {
    dns_name: String,
}

impl PingRequest {
    /// Ping for `dns_name`; `None` sends an empty `Host` assertion
    pub fn new(dns_name: Option<&str>) -> Self {
        Self {
            dns_name: dns_name.unwrap_or_default().to_string(),
        }
    }

    pub fn dns_name(&self) -> &str {
        &self.dns_name
    }

    /// BER-encode the request as a CLDAPMessage
    pub fn encode(&self) -> Bytes {
        let mut w = BerWriter::new();
        w.write_sequence(|message| {
            message.write_integer(CLDAP_MESSAGE_ID);
            message.write_constructed(TAG_SEARCH_REQUEST, |search| {
                search
                    .write_octet_string(b"")
                    .write_enumerated(SearchScope::BaseObject as i64)
                    .write_enumerated(DerefAliases::NeverDerefAliases as i64)
                    .write_integer(0)
                    .write_integer(0)
                    .write_boolean(false);
                search.write_constructed(TAG_FILTER_AND, |and| {
                    and.write_constructed(TAG_FILTER_EQUALITY, |eq| {
                        eq.write_octet_string(b"Host")
                            .write_octet_string(self.dns_name.as_bytes());
                    });
                    and.write_constructed(TAG_FILTER_EQUALITY, |eq| {
                        eq.write_octet_string(b"NtVer")
                            .write_octet_string(&NT_VERSION_ASSERTION);
                    });
                });
                search.write_sequence(|attributes| {
                    attributes.write_octet_string(NETLOGON_ATTRIBUTE.as_bytes());
                });
            });
        });
        w.freeze()
    }
}

/// Encode a CLDAP ping for `dns_name`
pub fn encode_ping(dns_name: Option<&str>) -> Bytes {
    PingRequest::new(dns_name).encode()
}

/// Extract the NETLOGON payload from a CLDAP SearchResultEntry
///
/// The first attribute must carry exactly one OCTET STRING value. Anything
/// after the first message in the datagram (normally a SearchResultDone) is
/// ignored.
pub fn decode_envelope(envelope: &[u8]) -> Result<Bytes, DecodeError> {
    let mut datagram = BerReader::new(envelope);
    let (_, mut message) = datagram.enter()?;
    message.skip()?;

    let (op_tag, mut entry) = message.enter()?;
    if op_tag != TAG_SEARCH_RESULT_ENTRY {
        return Err(DecodeError::envelope(format!(
            "expected SearchResultEntry (0x{:02x}), found protocolOp tag 0x{:02x}",
            TAG_SEARCH_RESULT_ENTRY, op_tag
        )));
    }
    entry.skip()?;

    let (_, mut attributes) = entry.enter()?;
    if attributes.is_empty() {
        return Err(DecodeError::envelope("SearchResultEntry has no attributes"));
    }
    let (_, mut attribute) = attributes.enter()?;
    attribute.skip()?;

    let (values_tag, mut values) = attribute.enter()?;
    if values_tag & CONSTRUCTED == 0 {
        return Err(DecodeError::envelope("attribute values are not a SET"));
    }
    if values.is_empty() {
        return Err(DecodeError::envelope("attribute has no values"));
    }
    let payload = values.read_octet_string()?;
    if !values.is_empty() {
        return Err(DecodeError::envelope("attribute has more than one value"));
    }
    Ok(Bytes::copy_from_slice(payload))
}

/// Decode a CLDAP ping response datagram
pub fn decode_response(envelope: &[u8]) -> Result<PingResponse, DecodeError> {
    let payload = decode_envelope(envelope)?;
    netlogon::decode(&payload)
}

/// Wrap `payload` in a SearchResultEntry as a domain controller would
///
/// Used to build responses for tests and fake servers.
pub fn encode_search_result_entry(message_id: i64, payload: &[u8]) -> Bytes {
    let mut w = BerWriter::new();
    w.write_sequence(|message| {
        message.write_integer(message_id);
        message.write_constructed(TAG_SEARCH_RESULT_ENTRY, |entry| {
            entry.write_octet_string(b"");
            entry.write_sequence(|attributes| {
                attributes.write_sequence(|attribute| {
                    attribute.write_octet_string(NETLOGON_ATTRIBUTE.as_bytes());
                    attribute.write_constructed(crate::ber::TAG_SET, |values| {
                        values.write_octet_string(payload);
                    });
                });
            });
        });
    });
    w.freeze()
}
