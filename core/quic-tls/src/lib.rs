// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Pull-style TLS 1.3 handshake driver backed by `rustls`.
//!
//! The public shape of this crate (`process_data`/
//! `process_data_complete` returning a `ResultFlags` bitset, a
//! `ProcessState` output buffer with absolute epoch offsets) mirrors a
//! C TLS shim's pull-style contract rather than the `poll`-based
//! `Future`-shaped driver idiom; that's deliberate; it's the contract
//! the rest of this workspace's handshake state machine is written
//! against.

pub mod alpn;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod hello;
pub mod result;
pub mod state;

pub use config::{Config, Credentials, TRANSPORT_PARAMETERS_EXTENSION_TYPE};
pub use driver::{DataType, TlsDriver};
pub use error::Error;
pub use event::Event;
pub use result::ResultFlags;
pub use state::{EarlyDataState, Epoch, InstalledKey, ProcessState};
