mod engine;
mod engine_config;
mod frame_report;
mod frame_scheduler;
mod interval_scheduler;
mod label_layout;
mod plugin_dispatch;
mod plugin_registry;
mod render_pass;
mod series_registry;

pub use engine::StreamingChart;
pub use engine_config::{
    ChartConfig, GridOptions, LabelOptions, PartialChartConfig, PartialGridOptions,
    PartialLabelOptions,
};
pub use frame_report::{FrameOutcome, FrameReport, FrameSkipReason, FrameState};
pub use frame_scheduler::{
    Clock, FrameScheduler, FrameThrottle, ManualClock, ManualTickSource, NonRealtimeAlignment,
    SchedulerState, SystemClock, TickHandle, TickSource,
};
pub use interval_scheduler::{
    IntervalScheduler, IntervalTask, ManualIntervalScheduler, ThreadIntervalScheduler, TimerHandle,
};
pub use label_layout::{LabelPlacement, format_value, layout_value_labels};
pub use series_registry::SeriesRegistry;
