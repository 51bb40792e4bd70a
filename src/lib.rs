//! Root crate: compiles to both a `cdylib` (the stable C ABI consumed
//! by the GUI frontend) and an `rlib` (so `tapctl` and tests can link
//! against the ABI module directly without going through FFI).

pub mod abi;

pub use abi::*;
