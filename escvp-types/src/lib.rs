//! Type definitions for escvp

pub mod error;
pub mod input;
pub mod power;
pub mod projector_info;
pub mod volume;

pub use error::{Error, Result};
pub use input::{Key, Source};
pub use power::PowerStatus;
pub use projector_info::ProjectorInfo;
pub use volume::VolumeLevel;
