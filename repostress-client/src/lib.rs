//! The repository client.
//!
//! This crate talks HTTP to the artifact repository under test. Objects are
//! uploaded with `PUT` and fetched with `GET`, authenticated via HTTP basic
//! auth. The client deliberately does *not* interpret response statuses;
//! callers classify them.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod client;

pub use client::*;
