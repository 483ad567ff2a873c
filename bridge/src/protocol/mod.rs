//! Wire format of the browser channel.
//!
//! Each message is a 4-byte little-endian length followed by that many
//! bytes of UTF-8 JSON, in both directions.

pub mod framing;
pub mod messages;

pub use framing::{read_frame, write_frame, FrameError, MAX_FRAME_LEN};
pub use messages::{decode_command, Command, DecodeError, Response};
