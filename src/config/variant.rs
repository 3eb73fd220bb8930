//! Benchmark server variants and their fixed port offsets.

use clap::ValueEnum;

use crate::net::port;

/// One framework-backed server in the benchmark harness.
///
/// Offsets are fixed so every variant can run on the same host at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ServerVariant {
    Fastify,
    Hono,
    Elysia,
    Fiber,
    Gin,
    Echo,
    Actix,
    Axum,
    Rocket,
}

impl ServerVariant {
    pub const ALL: [ServerVariant; 9] = [
        ServerVariant::Fastify,
        ServerVariant::Hono,
        ServerVariant::Elysia,
        ServerVariant::Fiber,
        ServerVariant::Gin,
        ServerVariant::Echo,
        ServerVariant::Actix,
        ServerVariant::Axum,
        ServerVariant::Rocket,
    ];

    /// Name reported by the liveness endpoint.
    pub fn name(self) -> &'static str {
        match self {
            ServerVariant::Fastify => "fastify",
            ServerVariant::Hono => "hono",
            ServerVariant::Elysia => "elysia",
            ServerVariant::Fiber => "fiber",
            ServerVariant::Gin => "gin",
            ServerVariant::Echo => "echo",
            ServerVariant::Actix => "actix",
            ServerVariant::Axum => "axum",
            ServerVariant::Rocket => "rocket",
        }
    }

    pub fn language(self) -> &'static str {
        match self {
            ServerVariant::Fastify | ServerVariant::Hono | ServerVariant::Elysia => "TypeScript",
            ServerVariant::Fiber | ServerVariant::Gin | ServerVariant::Echo => "Go",
            ServerVariant::Actix | ServerVariant::Axum | ServerVariant::Rocket => "Rust",
        }
    }

    pub fn offset(self) -> u16 {
        match self {
            ServerVariant::Fastify => 0,
            ServerVariant::Hono => 1,
            ServerVariant::Elysia => 2,
            ServerVariant::Fiber => 3,
            ServerVariant::Gin => 4,
            ServerVariant::Echo => 5,
            ServerVariant::Actix => 6,
            ServerVariant::Axum => 7,
            ServerVariant::Rocket => 8,
        }
    }

    /// `start_port + offset`, or `None` past the end of the port range.
    pub fn port(self, start_port: u16) -> Option<u16> {
        port::bind_port(start_port, self.offset())
    }
}

impl std::fmt::Display for ServerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn offsets_are_distinct() {
        let offsets: HashSet<u16> = ServerVariant::ALL.iter().map(|v| v.offset()).collect();
        assert_eq!(offsets.len(), ServerVariant::ALL.len());
    }

    #[test]
    fn names_round_trip_through_clap() {
        for variant in ServerVariant::ALL {
            let parsed = ServerVariant::from_str(variant.name(), true).unwrap();
            assert_eq!(parsed, variant);
        }
    }

    #[test]
    fn ports_follow_start_port() {
        assert_eq!(ServerVariant::Fiber.port(4000), Some(4003));
        assert_eq!(ServerVariant::Axum.port(3001), Some(3008));
        assert_eq!(ServerVariant::Rocket.port(u16::MAX), None);
    }
}
