//! Core infrastructure shared across vericache's crates.
//!
//! - [`clock`]: an injectable time source (`Clock`, `SystemClock`, `TestClock`)
//! - [`serializer`]: the uniform encode/decode layer with optional compression
//! - [`events`]: the observability event system every component emits through
//! - [`observer`]: the seam the performance monitor wires into post-construction
//! - [`error`]: the error type the serializer raises

pub mod clock;
pub mod error;
pub mod events;
pub mod observer;
pub mod serializer;

pub use clock::{Clock, SystemClock, TestClock};
pub use error::CoreError;
pub use events::{CacheEvent, EventListener, EventListeners, FnListener};
pub use observer::CacheObserver;
pub use serializer::{decode, decode_opaque, encode, encode_opaque, EncodedPayload, Form};
