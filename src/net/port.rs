//! Port allocation for concurrently running variants.

use std::net::{Ipv4Addr, SocketAddr};

/// `start_port + offset`. `None` when the sum leaves the port range.
pub fn bind_port(start_port: u16, offset: u16) -> Option<u16> {
    start_port.checked_add(offset)
}

/// Wildcard IPv4 address on the variant's port.
pub fn bind_address(start_port: u16, offset: u16) -> Option<SocketAddr> {
    bind_port(start_port, offset).map(|port| SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
}
