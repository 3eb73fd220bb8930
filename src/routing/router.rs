//! Route table and the registration seam frameworks implement.
//!
//! # Responsibilities
//! - Enumerate every route the server exposes
//! - Hand each one to a framework adapter exactly once

use crate::routing::identity::ImageIdentity;

pub const HEALTH_PATH: &str = "/health";

/// What a route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Local(ImageIdentity),
    Proxy(ImageIdentity),
    Health,
}

impl Endpoint {
    /// Request path for this endpoint.
    pub fn path(self) -> String {
        match self {
            Endpoint::Local(id) => format!("/local/{}", id.slug()),
            Endpoint::Proxy(id) => format!("/proxy/{}", id.slug()),
            Endpoint::Health => HEALTH_PATH.to_string(),
        }
    }
}

/// Framework adapter: attach a GET route for `endpoint` at `path`.
pub trait RouteRegistrar: Sized {
    fn register(self, path: &str, endpoint: Endpoint) -> Self;
}

/// Every endpoint, local routes first, health last.
pub fn endpoints() -> Vec<Endpoint> {
    let local = ImageIdentity::ALL.into_iter().map(Endpoint::Local);
    let proxy = ImageIdentity::ALL.into_iter().map(Endpoint::Proxy);
    local
        .chain(proxy)
        .chain(std::iter::once(Endpoint::Health))
        .collect()
}

/// Register the full route table on `registrar`.
pub fn register_image_routes<R: RouteRegistrar>(registrar: R) -> R {
    endpoints()
        .into_iter()
        .fold(registrar, |r, endpoint| r.register(&endpoint.path(), endpoint))
}
