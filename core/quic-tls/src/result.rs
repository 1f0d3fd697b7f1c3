// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! `process_data`/`process_data_complete` return flags (`spec.md`
//! §4.4: "Returned flags are a bitset drawn from: `Continue, Pending,
//! Data, ReadKeyUpdated, WriteKeyUpdated, EarlyDataAccept,
//! EarlyDataReject, Complete, Ticket, Error`. ... `Pending` and
//! `Error` are mutually exclusive.").

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ResultFlags: u16 {
        /// Needs an immediate re-call with no new input (internal
        /// continuation, e.g. to drain buffered messages the record
        /// layer already had on hand).
        const CONTINUE = 0x0001;
        /// The call is pending; the caller must wait for the
        /// process-complete callback and then call
        /// `process_data_complete`.
        const PENDING = 0x0002;
        /// Data is ready to be read from `ProcessState.Buffer`.
        const DATA = 0x0004;
        const READ_KEY_UPDATED = 0x0008;
        const WRITE_KEY_UPDATED = 0x0010;
        const EARLY_DATA_ACCEPT = 0x0020;
        const EARLY_DATA_REJECT = 0x0040;
        const COMPLETE = 0x0080;
        const TICKET = 0x0100;
        const ERROR = 0x8000;
    }
}

impl ResultFlags {
    /// `Pending` and `Error` are mutually exclusive; this is asserted
    /// at every flag-construction call site inside `driver.rs` rather
    /// than enforced structurally, matching the way the bitset is
    /// actually produced incrementally as the driver processes input.
    pub fn is_well_formed(self) -> bool {
        !(self.contains(Self::PENDING) && self.contains(Self::ERROR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_and_error_together_is_malformed() {
        let flags = ResultFlags::PENDING | ResultFlags::ERROR;
        assert!(!flags.is_well_formed());
    }

    #[test]
    fn data_and_complete_can_coexist() {
        let flags = ResultFlags::DATA | ResultFlags::COMPLETE;
        assert!(flags.is_well_formed());
        assert!(flags.contains(ResultFlags::DATA));
        assert!(flags.contains(ResultFlags::COMPLETE));
    }
}
