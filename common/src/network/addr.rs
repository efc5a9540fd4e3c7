//! # Address Codec
//!
//! Conversions between dotted-decimal IPv4 text and the 32-bit integer form
//! the engine iterates and sorts on. Sorting goes through the integer value;
//! sorting the text would put "10.0.0.1" before "2.0.0.1".

use std::net::Ipv4Addr;

use crate::error::ScanError;

/// Parses dotted-decimal IPv4 text into its 32-bit integer form.
///
/// Anything that is not IPv4 (including IPv6 literals) is rejected with
/// [`ScanError::InvalidAddress`].
pub fn encode(text: &str) -> Result<u32, ScanError> {
    let addr: Ipv4Addr = text
        .parse()
        .map_err(|_| ScanError::InvalidAddress(text.to_string()))?;
    Ok(u32::from(addr))
}

/// Renders the canonical dotted-decimal form of a 32-bit address value.
pub fn decode(value: u32) -> String {
    Ipv4Addr::from(value).to_string()
}

/// Sorts addresses ascending by their 32-bit integer value.
pub fn sort_numeric(hosts: &mut [Ipv4Addr]) {
    hosts.sort_unstable_by_key(|host| u32::from(*host));
}
