//! API implementation submodules.
//!
//! Each submodule contains `impl MicroscopeApi` blocks for one group of
//! operations. The struct definition remains in `lib.rs`.

mod builder;
mod scanning;
mod session;

pub use builder::MicroscopeApiBuilder;
