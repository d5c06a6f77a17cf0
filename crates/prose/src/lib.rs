//! Text generation for stride recommendation cards.
//!
//! [`MessagesWriter`] implements the matcher's [`stride_matching::BulletWriter`]
//! seam over HTTP. Any failure it reports is replaced by deterministic
//! fallback bullets upstream.

#![deny(unsafe_code)]

pub mod config;
pub mod messages;

pub use config::{parse_base_url, ProseConfig, ENV_PREFIX};
pub use messages::{parse_bullets, MessagesWriter};
