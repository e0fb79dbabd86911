//! Purpose: Library crate behind the `querystate` CLI and its tests.
//! Exports: `api` (stable surface) and `core` (codec, value model, errors).
//! Role: Round-trips UI control state through a URL query string.
//! Invariants: Every operation takes explicit inputs; there is no global state.
//! Invariants: Network access is confined to `api::HttpShortener`.
pub mod api;
pub mod core;
