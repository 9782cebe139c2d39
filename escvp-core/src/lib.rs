//! # escvp-core
//!
//! Core protocol implementation for ESC/VP.net projector control.
//!
//! This crate provides the low-level protocol primitives:
//! - Command catalog
//! - Line framing
//! - Reply classification and status decoding
//! - Session state machine
//! - Connection targets

pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod response;
pub mod session;
pub mod target;

pub use command::{Command, CommandId, StatusTable};
pub use error::{Error, Result};
pub use response::{Classification, Response, Status};
pub use session::{Session, SessionState};
pub use target::Target;
