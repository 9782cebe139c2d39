//! # escvp
//!
//! Rust client for the ESC/VP.net projector control protocol.
//!
//! ## Features
//!
//! - TCP (port 3629) and RS-232 transports
//! - Async/await API using Tokio
//! - One command in flight per connection, enforced by the client
//! - Typed errors separating recoverable outcomes from broken connections
//!
//! ## Quick Start
//!
//! ```no_run
//! use escvp::{Projector, Source};
//!
//! #[tokio::main]
//! async fn main() -> escvp::Result<()> {
//!     // Connect to projector
//!     let projector = Projector::tcp("192.168.0.150", 3629);
//!     projector.connect().await?;
//!
//!     // Switch input
//!     projector.select_source(Source::Hdmi1).await?;
//!
//!     // Disconnect
//!     projector.close().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod projector;
pub mod queue;

#[cfg(test)]
mod testing;

// Re-exports
pub use error::{Error, Result};
pub use projector::Projector;
pub use queue::{CommandQueue, Ticket};

// Re-export types
pub use escvp_core::{Command, CommandId, Response, SessionState, Status, Target};
pub use escvp_transport::{SerialSettings, SerialTransport, TcpTransport, Transport};
pub use escvp_types::{Key, PowerStatus, ProjectorInfo, Source, VolumeLevel};
