//! Shared helpers for client integration tests.
#![allow(dead_code, reason = "each test crate uses a different subset")]

pub mod stub_backend;
