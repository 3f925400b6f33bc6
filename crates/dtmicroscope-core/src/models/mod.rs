//! Data models for the microscope control surface.
//!
//! Scan parameters are validated into these types at the boundary so the
//! instrument never sees a raw direction string or an empty channel list.

mod responses;
mod scan;

pub use responses::*;
pub use scan::*;
