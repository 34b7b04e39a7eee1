// crates/gifer-core/src/lib.rs
//
// Pure data for GIFer - no egui, no ffmpeg, no threads.
//
//   params      - ClipParameters, the user-editable clip settings
//   helpers     - geometry (letterbox fit) and time formatting
//   commands    - GiferCommand, emitted by UI panels and applied by app.rs
//   media_types - plain structs that cross the gifer-media ↔ gifer-ui channel
//   error       - ParamError

pub mod commands;
pub mod error;
pub mod helpers;
pub mod media_types;
pub mod params;

pub use error::ParamError;
pub use params::{Axis, ClipParameters, RenderPlan, SourceInfo};
