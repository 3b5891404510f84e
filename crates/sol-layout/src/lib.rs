//! Fixed-width binary layouts and compact-length prefixes.
//!
//! This crate knows nothing about addresses or transactions. It turns an
//! ordered list of typed fields into bytes and back, and provides the
//! variable-length integer used to prefix every list on the ledger wire
//! format.

pub mod error;
pub mod layout;
pub mod short_vec;

pub use error::LayoutError;
pub use layout::{Field, FieldKind, Layout, Record, Value};
pub use short_vec::{decode_length, encode_length, encode_length_into, MAX_ENCODING_LENGTH};
