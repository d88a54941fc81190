#![forbid(unsafe_code)]

pub mod animator;
pub mod blur;
pub mod blur_engine;
pub mod config;
pub mod core;
pub mod ease;
pub mod effect;
pub mod engine;
pub mod error;
pub mod overlay;
pub mod raster;
pub mod shape;
pub mod target;

pub use animator::{ProgressAnimator, RepeatMode};
pub use blur::{BlurKernel, box_blur, box_blur_rgba8_premul};
pub use blur_engine::{BlurPipeline, CaptureSource, EdgeInsets, Rotation};
pub use config::{BlurConfig, SpotlightConfig};
pub use core::{Blend, Paint, Point, Rect, Rgba8Premul, SurfaceSize};
pub use ease::Ease;
pub use effect::Effect;
pub use engine::{OnComplete, Phase, SpotlightEngine};
pub use error::{SpotlightError, SpotlightResult};
pub use overlay::{Gravity, Overlay, OverlayPlacement};
pub use raster::Raster;
pub use shape::Shape;
pub use target::Target;
