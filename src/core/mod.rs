pub mod display_context;
pub mod frame_pipeline;
pub mod png_codec;
pub mod render_device;
pub mod software_context;
pub mod triangle_intersection;

pub use display_context::{Region, Viewport};
pub use frame_pipeline::{FramePipeline, PipelineStats, TickOutcome, DEFAULT_TICK_INTERVAL};
pub use png_codec::PngCodec;
pub use render_device::{DeviceProvider, RenderDevice};
pub use software_context::{RenderSettings, SoftwareContext};
