//! Host Serial Protocol
//!
//! This crate defines the point-to-point serial protocol between the
//! stimulator and the host configuration GUI. Frames are byte-stuffed and
//! delimited, so the receiver can resynchronize at any frame boundary.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────┬─────────────────────────────┬──────┐
//! │ 0x7E │ PAYLOAD (0x7E/0x7D escaped) │ 0x7E │
//! │ 1B   │ 1 or 9 bytes when decoded   │ 1B   │
//! └──────┴─────────────────────────────┴──────┘
//! ```
//!
//! The device never initiates a conversation other than echoing its
//! configuration after a change; there is no acknowledgement channel.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;

pub use frame::{
    decode, encode, encode_to_vec, FrameAssembler, FrameError, ESCAPE, FRAME_DELIMITER,
    MAX_FRAME_SIZE,
};
pub use messages::{
    ConfigPayload, HostMessage, MessageError, BIAS_WIRE_OFFSET, CONFIG_PAYLOAD_LEN, QUERY_CONFIG,
};
