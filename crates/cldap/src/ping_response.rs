//! Decoded CLDAP ping response

use crate::ds_flags::DsFlags;
use crate::guid::Guid;
use std::fmt;

/// Domain controller identity and capabilities from a CLDAP ping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResponse {
    domain_guid: Guid,
    flags: DsFlags,
    dns_forest_name: String,
    dns_domain_name: String,
    dns_host_name: String,
    netbios_domain_name: String,
    netbios_computer_name: String,
    dc_site_name: String,
    client_site_name: String,
}

impl PingResponse {
    /// Build from the names of a LOGON_SAM_LOGON_RESPONSE_EX body, in wire order
    ///
    /// Callers guarantee at least eight names. The sixth (user name) is not
    /// requested by the ping and is dropped; names past the eighth are ignored.
    pub(crate) fn from_names(domain_guid: Guid, flags: DsFlags, names: Vec<String>) -> Self {
        let mut names = names.into_iter();
        let mut next = || names.next().unwrap_or_default();
        let dns_forest_name = next();
        let dns_domain_name = next();
        let dns_host_name = next();
        let netbios_domain_name = next();
        let netbios_computer_name = next();
        let _user_name = next();
        let dc_site_name = next();
        let client_site_name = next();

        Self {
            domain_guid,
            flags,
            dns_forest_name,
            dns_domain_name,
            dns_host_name,
            netbios_domain_name,
            netbios_computer_name,
            dc_site_name,
            client_site_name,
        }
    }

    pub fn domain_guid(&self) -> Guid {
        self.domain_guid
    }

    /// Raw DS_FLAG bits with named accessors
    pub fn flags(&self) -> DsFlags {
        self.flags
    }

    pub fn dns_forest_name(&self) -> &str {
        &self.dns_forest_name
    }

    pub fn dns_domain_name(&self) -> &str {
        &self.dns_domain_name
    }

    /// DNS name of the responding server
    pub fn dns_host_name(&self) -> &str {
        &self.dns_host_name
    }

    pub fn netbios_domain_name(&self) -> &str {
        &self.netbios_domain_name
    }

    pub fn netbios_computer_name(&self) -> &str {
        &self.netbios_computer_name
    }

    /// Site of the responding server
    pub fn dc_site_name(&self) -> &str {
        &self.dc_site_name
    }

    /// Site the server places the client in
    pub fn client_site_name(&self) -> &str {
        &self.client_site_name
    }
}

/// Renders `True` / `False` for the OS tier lines
fn yes_no(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for PingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Domain GUID:          {}", self.domain_guid)?;
        writeln!(f, "Forest DNS Name:      {}", self.dns_forest_name)?;
        writeln!(f, "Domain DNS Name:      {}", self.dns_domain_name)?;
        writeln!(f, "NetBIOS Domain Name:  {}", self.netbios_domain_name)?;
        writeln!(f, "NetBIOS Server Name:  {}", self.netbios_computer_name)?;
        writeln!(f, "Server Site Name:     {}", self.dc_site_name)?;
        writeln!(f, "Client Site Name:     {}", self.client_site_name)?;
        writeln!(f, "Server Flags:         {}", self.flags)?;
        writeln!(f, "WS2003R2+:            {}", yes_no(self.flags.is_windows_2003_r2_or_above()))?;
        writeln!(f, "WS2008R2+:            {}", yes_no(self.flags.is_windows_2008_r2_or_above()))?;
        writeln!(f, "WS2012R2+:            {}", yes_no(self.flags.is_windows_2012_r2_or_above()))
    }
}
