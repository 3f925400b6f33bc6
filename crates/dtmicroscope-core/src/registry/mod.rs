//! Single-slot registry for the live instrument session.
//!
//! The registry is an explicit context object rather than process-global
//! state: whoever owns it decides its lifetime, and every control operation
//! receives it by reference. It starts empty, is filled by the first
//! successful initialize and is never cleared afterwards.

mod session_registry;

pub use session_registry::SessionRegistry;
