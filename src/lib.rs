//! stream-chart: real-time scrolling line charts.
//!
//! Timestamped series stream into a [`StreamingChart`], which repaints them
//! on every paint opportunity of its host with the newest samples at the
//! leading edge. Drawing goes through the [`render::DrawingSurface`] trait so
//! the same loop drives headless recordings and the optional cairo backend.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{ChartConfig, FrameOutcome, StreamingChart};
pub use core::{DataPoint, SeriesHandle, TimeSeries};
pub use error::{ChartError, ChartResult};
