// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! Replaces the `ReceiveResumptionCallback`-style function pointer with
//! a sealed enum and a single dispatch point (`spec.md` §9: "Callback
//! pointers → a sealed `Event` enum with one dispatch point"). The
//! caller drains events with [`TlsDriver::take_events`] and matches on
//! them instead of registering a callback at `initialize` time.

/// One notification `TlsDriver` has buffered for the caller to collect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// A `NewSessionTicket` payload arrived (client side only, post
    /// handshake). Whether to act on it for 0-RTT resumption is the
    /// caller's policy decision, not this driver's; `quic-tls` only
    /// reports that the ticket showed up, matching the `TICKET` result
    /// flag already raised for the same `process_data` call.
    SessionTicketReceived(Vec<u8>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ticket_event_carries_its_payload() {
        let event = Event::SessionTicketReceived(b"ticket-bytes".to_vec());
        match event {
            Event::SessionTicketReceived(bytes) => assert_eq!(bytes, b"ticket-bytes"),
        }
    }
}
