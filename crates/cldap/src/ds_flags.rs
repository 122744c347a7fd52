//! Directory service capability flags ([MS-ADTS] 6.3.1.2, DS_FLAG)

use std::fmt;

/// DS_FLAG bitmask from a NETLOGON response
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DsFlags(u32);

impl DsFlags {
    /// The server holds the PDC FSMO role (PdcEmulationMasterRole)
    pub const PDC: u32 = 0x0000_0001;
    /// The server is a global catalog and accepts GC messages
    pub const GC: u32 = 0x0000_0004;
    /// The server is an LDAP server
    pub const LDAP: u32 = 0x0000_0008;
    /// The server is a domain controller
    pub const DS: u32 = 0x0000_0010;
    /// The server runs the Kerberos Key Distribution Center service
    pub const KDC: u32 = 0x0000_0020;
    /// The Win32 Time Service is present on the server
    pub const TIMESERV: u32 = 0x0000_0040;
    /// The server is in the same site as the client
    pub const CLOSEST: u32 = 0x0000_0080;
    /// The server is not a read-only domain controller
    pub const WRITABLE: u32 = 0x0000_0100;
    /// The server is a reliable time server
    pub const GOOD_TIMESERV: u32 = 0x0000_0200;
    /// The naming context is an application naming context
    pub const NDNC: u32 = 0x0000_0400;
    /// The server is a read-only domain controller
    pub const SELECT_SECRET_DOMAIN_6: u32 = 0x0000_0800;
    /// Writable DC not running Windows 2000 Server or Windows Server 2003
    pub const FULL_SECRET_DOMAIN_6: u32 = 0x0000_1000;
    /// The Active Directory Web Service is present on the server
    pub const WS: u32 = 0x0000_2000;
    /// Windows Server 2012 or later
    pub const DS_8: u32 = 0x0000_4000;
    /// Windows Server 2012 R2 or later
    pub const DS_9: u32 = 0x0000_8000;
    /// The server has a DNS name
    pub const DNS_CONTROLLER: u32 = 0x2000_0000;
    /// The naming context is a default naming context
    pub const DNS_DOMAIN: u32 = 0x4000_0000;
    /// The naming context is the forest root
    pub const DNS_FOREST: u32 = 0x8000_0000;

    /// Every named bit with its DS_FLAG name
    pub const NAMED: [(u32, &'static str); 18] = [
        (Self::PDC, "DS_PDC_FLAG"),
        (Self::GC, "DS_GC_FLAG"),
        (Self::LDAP, "DS_LDAP_FLAG"),
        (Self::DS, "DS_DS_FLAG"),
        (Self::KDC, "DS_KDC_FLAG"),
        (Self::TIMESERV, "DS_TIMESERV_FLAG"),
        (Self::CLOSEST, "DS_CLOSEST_FLAG"),
        (Self::WRITABLE, "DS_WRITABLE_FLAG"),
        (Self::GOOD_TIMESERV, "DS_GOOD_TIMESERV_FLAG"),
        (Self::NDNC, "DS_NDNC_FLAG"),
        (Self::SELECT_SECRET_DOMAIN_6, "DS_SELECT_SECRET_DOMAIN_6_FLAG"),
        (Self::FULL_SECRET_DOMAIN_6, "DS_FULL_SECRET_DOMAIN_6_FLAG"),
        (Self::WS, "DS_WS_FLAG"),
        (Self::DS_8, "DS_DS_8_FLAG"),
        (Self::DS_9, "DS_DS_9_FLAG"),
        (Self::DNS_CONTROLLER, "DS_DNS_CONTROLLER_FLAG"),
        (Self::DNS_DOMAIN, "DS_DNS_DOMAIN_FLAG"),
        (Self::DNS_FOREST, "DS_DNS_FOREST_FLAG"),
    ];

    /// Tokens of the summary string, in output order
    const SUMMARY: [(u32, &'static str); 11] = [
        (Self::PDC, "PDC"),
        (Self::GC, "GC"),
        (Self::DS, "DC"),
        (Self::LDAP, "LDAP"),
        (Self::KDC, "KDC"),
        (Self::CLOSEST, "IN_SITE"),
        (Self::WRITABLE, "WRITABLE"),
        (Self::SELECT_SECRET_DOMAIN_6, "READ_ONLY"),
        (Self::TIMESERV, "TIME_SERV"),
        (Self::GOOD_TIMESERV, "GOOD_TIME_SRV"),
        (Self::WS, "WEB_SERVICE"),
    ];

    pub fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, mask: u32) -> bool {
        (self.0 & mask) != 0
    }

    pub fn is_primary_domain_controller(&self) -> bool {
        self.contains(Self::PDC)
    }

    pub fn is_global_catalog(&self) -> bool {
        self.contains(Self::GC)
    }

    pub fn is_ldap_server(&self) -> bool {
        self.contains(Self::LDAP)
    }

    pub fn is_domain_controller(&self) -> bool {
        self.contains(Self::DS)
    }

    pub fn is_key_distribution_center(&self) -> bool {
        self.contains(Self::KDC)
    }

    pub fn is_time_server(&self) -> bool {
        self.contains(Self::TIMESERV)
    }

    pub fn is_in_client_site(&self) -> bool {
        self.contains(Self::CLOSEST)
    }

    pub fn is_writable(&self) -> bool {
        self.contains(Self::WRITABLE)
    }

    pub fn is_good_time_server(&self) -> bool {
        self.contains(Self::GOOD_TIMESERV)
    }

    pub fn is_application_naming_context(&self) -> bool {
        self.contains(Self::NDNC)
    }

    pub fn is_read_only(&self) -> bool {
        self.contains(Self::SELECT_SECRET_DOMAIN_6)
    }

    pub fn is_windows_2003_r2_or_above(&self) -> bool {
        self.contains(Self::FULL_SECRET_DOMAIN_6)
    }

    pub fn has_active_directory_web_service(&self) -> bool {
        self.contains(Self::WS)
    }

    pub fn is_windows_2008_r2_or_above(&self) -> bool {
        self.contains(Self::DS_8)
    }

    pub fn is_windows_2012_r2_or_above(&self) -> bool {
        self.contains(Self::DS_9)
    }

    pub fn has_dns_name(&self) -> bool {
        self.contains(Self::DNS_CONTROLLER)
    }

    pub fn is_default_naming_context(&self) -> bool {
        self.contains(Self::DNS_DOMAIN)
    }

    pub fn is_forest_naming_context(&self) -> bool {
        self.contains(Self::DNS_FOREST)
    }

    /// Names of the set bits, in bit order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Self::NAMED
            .iter()
            .filter(move |(mask, _)| self.contains(*mask))
            .map(|(_, name)| *name)
    }

    /// Space-separated short tokens, e.g. "PDC GC DC LDAP KDC"
    pub fn summary(&self) -> String {
        Self::SUMMARY
            .iter()
            .filter(|(mask, _)| self.contains(*mask))
            .map(|(_, token)| *token)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DsFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl fmt::Debug for DsFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DsFlags(0x{:08x}", self.0)?;
        for name in self.names() {
            write!(f, " {}", name)?;
        }
        f.write_str(")")
    }
}

impl From<u32> for DsFlags {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
