//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: generic JSON-over-HTTP request client (reqwest)
//! - **backend**: backend route table and port implementations over `http`
//! - **cache**: local settings caches (cap-std directory, in-memory)
//!
//! Adapters are thin translators between domain types and wire or storage
//! representations. They contain no business logic.

pub mod backend;
pub mod cache;
pub mod http;
