pub mod coordinate_mapper;
pub mod path;
pub mod primitives;
pub mod time_series;
pub mod types;
pub mod value_scale;

pub use coordinate_mapper::{CoordinateMapper, FrameGeometry, MIN_VALUE_RANGE};
pub use path::{Interpolation, PathOp, PixelPoint, SeriesPath, segment_ops};
pub use primitives::pixel_snap;
pub use time_series::{
    AppendMode, SeriesBounds, SeriesDisplayOptions, SeriesHandle, SeriesId, SeriesStyle,
    TimeSeries, TimeSeriesOptions,
};
pub use types::{DataPoint, Viewport};
pub use value_scale::{
    SCALE_ANIMATION_THRESHOLD, ScaleController, ScaleSettings, ScaleState, ScaleUpdate, ValueRange,
};
