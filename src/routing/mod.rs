//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! ImageIdentity::ALL (small, medium, large)
//!     → router.rs (one Endpoint per path)
//!     → RouteRegistrar (framework adapter)
//!     → frozen, immutable router
//! ```
//!
//! # Design Decisions
//! - The route table is fixed: three local, three proxy, one health route
//! - Local and proxy routes share one identity → filename mapping
//! - Frameworks plug in through `RouteRegistrar`; handlers stay framework-neutral

pub mod identity;
pub mod router;

pub use identity::ImageIdentity;
pub use router::{register_image_routes, Endpoint, RouteRegistrar};
