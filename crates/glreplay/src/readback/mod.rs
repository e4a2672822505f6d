//! Texture readback from live replay sessions.
//!
//! A [`ReadbackKey`] names the contents of one texture image as of one command. The
//! [`ReadbackResolver`] turns keys into bytes by replaying the capture up to the command, staging
//! the image into a temporary framebuffer and reading it back into scratch memory. Results are
//! stored content-addressed, cached by key, and concurrent requests for the same key share a
//! single device round trip.

mod error;
mod key;
mod resolver;
mod stage;
mod stats;

pub use error::ReadbackError;
pub use key::{ReadbackKey, ResolvedTexture};
pub use resolver::{ReadbackResolver, SessionRegistry, SharedSession};
pub use stats::{ReadbackStats, ReadbackStatsSnapshot};
