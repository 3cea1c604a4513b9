//! Load generation for a binary-object repository.
//!
//! This crate continuously uploads randomly generated artifacts to a remote
//! repository and downloads previously uploaded ones, classifying and
//! logging every attempt until the process is interrupted.
//!
//! The interesting part is the worker-pool engine: upload workers publish
//! the paths of successful uploads to a bounded [`Distributor`] queue, and
//! download workers prefer fresh paths from that queue, falling back to
//! replaying paths from their private history when nothing new is pending.
//! The whole pool drains in two phases on shutdown: producers stop first,
//! then the queue is closed and the download side finishes the remainder.
//!
//! The remote is only ever accessed through the [`Endpoint`] contract, so
//! the engine runs equally against the real HTTP client from
//! `repostress-client` or the fault-injecting simulator in [`fake`].
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod artifact;
pub mod config;
pub mod distributor;
pub mod endpoint;
pub mod fake;
pub mod pool;
mod worker;

pub use crate::config::Config;
pub use crate::distributor::Distributor;
pub use crate::endpoint::{Endpoint, Outcome};
pub use crate::pool::{Pool, run};
