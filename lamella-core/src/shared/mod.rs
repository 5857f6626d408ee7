//! State shared between interrupt, control and background contexts
//!
//! Everything crossing a context boundary lives in one [`ControlContext`]
//! behind a single blocking mutex. Writers outside the control task only
//! set request flags; the control task drains them once per iteration.

mod context;

pub use context::{ControlContext, InputSnapshot, RemoteAction};
