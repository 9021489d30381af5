//! Email address model and RFC 5322 mailbox grammar.

use std::fmt;

use mailparse::MailAddr;

use crate::error::{Error, Result};

/// A single mailbox: optional display name plus addr-spec.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Display name, if the mailbox carried one.
    pub name: Option<String>,
    /// The addr-spec (`local@domain`).
    pub address: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

impl From<&mailparse::SingleInfo> for Address {
    fn from(info: &mailparse::SingleInfo) -> Self {
        Self {
            name: info.display_name.clone(),
            address: info.addr.clone(),
        }
    }
}

/// Parses a header value holding exactly one mailbox.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] when the value fails the address
/// grammar or holds anything other than a single mailbox.
pub(crate) fn parse_address(value: &str) -> Result<Address> {
    let list = mailparse::addrparse(value).map_err(|e| Error::InvalidHeader(e.to_string()))?;
    match list.as_slice() {
        [MailAddr::Single(info)] => Ok(Address::from(info)),
        _ => Err(Error::InvalidHeader(format!(
            "expected a single address: {value}"
        ))),
    }
}

/// Parses a header value holding a mailbox list.
///
/// Group syntax is flattened to the group's member mailboxes.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] when the value fails the address-list
/// grammar.
pub(crate) fn parse_address_list(value: &str) -> Result<Vec<Address>> {
    let list = mailparse::addrparse(value).map_err(|e| Error::InvalidHeader(e.to_string()))?;
    let mut out = Vec::new();
    for addr in list.iter() {
        match addr {
            MailAddr::Single(info) => out.push(Address::from(info)),
            MailAddr::Group(group) => out.extend(group.addrs.iter().map(Address::from)),
        }
    }
    Ok(out)
}
