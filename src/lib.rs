//! # Repeating alarm face
//! The alarm face of a low-power watch: a fixed registry of alarms, each of which can be set to repeat every
//! five minutes until the user acknowledges it.
//!
//! The face is a pure state machine. External events (ticks, buttons, activation, background wake-ups) go in
//! through [`face::transition`] or [`face::AlarmFace::handle`], and a short list of [`event::FaceRequest`]s comes
//! out, telling the caller what to render, what to play and which tick rate the face needs. Nothing in here
//! touches hardware, so the whole crate runs on the host for testing; the firmware in `src/main.rs` is one
//! caller of it.
//!
//! Only one alarm can await acknowledgment at a time. When a second repeating alarm fires while one is pending,
//! it takes over the pending slot and the first alarm stops repeating without notice.
#![cfg_attr(not(test), no_std)]

// must come first, the other modules use its macros
mod fmt;

pub mod acknowledge;
pub mod alarm;
pub mod clock;
pub mod config;
pub mod display;
pub mod edit;
pub mod event;
pub mod face;
pub mod fire;
pub mod repeat;
pub mod snapshot;
pub mod state;
