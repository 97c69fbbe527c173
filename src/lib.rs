//! CEA-608 closed caption decoder for ATSC A/53 user data.
//!
//! The pipeline has three layers:
//! - [`packet`]: validates ATSC user-data blocks and unpacks the raw
//!   caption byte triplets
//! - [`channel`]: per-channel state machines covering the captioning
//!   modes, the pen, the cursor and the two caption buffers
//! - [`decoder`]: the public [`Decoder`] that routes triplets to
//!   channels and collects timed, styled cues
//!
//! ```no_run
//! use cea608::Decoder;
//!
//! let mut decoder = Decoder::new();
//! # let (user_data, pts) = (Vec::new(), 0.0);
//! decoder.extract(&user_data, pts);
//! for caption in decoder.decode() {
//!     println!("[{}] {}", caption.stream, caption.cue.text());
//! }
//! ```

pub mod channel;
pub mod cue;
pub mod decoder;
pub mod packet;

pub use channel::{CaptionColor, CaptionStyle};
pub use cue::{Channel, Cue, DecodedCaption, NestedCue, TextRun};
pub use decoder::Decoder;
