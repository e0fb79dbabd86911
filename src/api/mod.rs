//! Purpose: Define the stable public Rust API boundary for querystate.
//! Exports: Codec operations, value model, errors, and the shortening seam.
//! Role: Public, additive-only surface over `core`.
//! Invariants: Callers outside the crate should not need `core` paths directly.

mod shorten;

pub use crate::core::apply::{ComponentParams, apply_stored_values, construct_with_stored_values};
pub use crate::core::encode::{encode, encode_snapshot};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::literal::parse_list_literal;
pub use crate::core::parse::{infer_value, parse};
pub use crate::core::snapshot::{ComponentState, StateSnapshot};
pub use crate::core::value::{FieldRef, FieldValue};
pub use shorten::{
    DEFAULT_SHORTENER_ENDPOINT, DEFAULT_SHORTENER_TIMEOUT, DEFAULT_SHORTENER_TIMEOUT_MS,
    HttpShortener, NOTHING_TO_SHORTEN, ShortenOutcome, Shortener, ShortenerConfig, shorten_search,
};
