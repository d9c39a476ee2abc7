//! Purpose: Weak-typed structure decoding from JSON, YAML, or generic mappings.
//! Exports: `api` (re-exported at the root) and the `record!` macro.
//! Role: Library backing the `weakdecode` CLI; usable directly by applications.
//! Invariants: Decoding is synchronous and keeps no state beyond the descriptor cache.
//! Invariants: Errors are returned to callers and never logged by the library.
pub mod api;
mod core;
mod parse;

pub use api::*;

#[doc(hidden)]
pub mod __macro_support {
    pub use crate::core::decode::decode_record;
    pub use crate::core::native::serde_fields;
    pub use crate::core::project::record_map;
    pub use crate::core::record::{coerce, coerce_into, fields_aligned, is_zero, project};
}
