// Core modules implementing the value tree, coercion, field resolution, and errors.
pub mod coerce;
pub mod config;
pub mod decode;
pub mod detect;
pub mod error;
pub(crate) mod native;
pub mod project;
pub mod record;
pub mod resolve;
pub mod tag;
pub(crate) mod timestamp;
pub mod value;
