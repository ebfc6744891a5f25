//! Optional hooks layered on top of the chart loop.
//!
//! Keep extensions out of the core render path; they only see events.

pub mod plugins;

pub use plugins::{ChartPlugin, FrameControl, PluginContext, PluginEvent, StopOnSkip};
