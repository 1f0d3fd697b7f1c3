// Copyright held by the respective authors.
// SPDX-License-Identifier: Apache-2.0

//! The `RdmaConnection` state machine (`spec.md` §4.5's
//! `Uninitialized`→...→`Closed` diagram). Transitions are monotone
//! except for a reset path from any state to `Closed` (invariant I6),
//! expressed here the same way the rest of this workspace expresses
//! state machines: named states plus `quic_core::state`'s
//! `event!`/`is!` macros instead of a coroutine.

use quic_core::state;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum State {
    Uninitialized,
    RingBufferRegistered,
    Connecting,
    CompleteConnect,
    Connected,
    WaitingForGetConnRequest,
    WaitingForAccept,
    TokenExchangeInitiated,
    TokenExchangeComplete,
    Ready,
    ReceivedDisconnect,
    Closing,
    Closed,
}

impl State {
    state::event!(
        /// MR registered over `[SendRing|RecvRing|OffsetBuf|RemoteOffsetBuf]`.
        register_ring_buffers(Uninitialized => RingBufferRegistered);

        /// Client path: `Connect` issued.
        start_connect(RingBufferRegistered => Connecting);

        /// Client path: peer acked the connect request.
        complete_connect(Connecting => CompleteConnect);

        /// Both sides: `IND2Connect` completion observed.
        confirm_connected(CompleteConnect => Connected);

        /// Server listener path.
        wait_for_conn_request(RingBufferRegistered => WaitingForGetConnRequest);

        /// Server: `GetConnectionRequest` satisfied.
        satisfy_conn_request(WaitingForGetConnRequest => WaitingForAccept);

        /// Server: `Accept` completion observed.
        accept_connected(WaitingForAccept => Connected);

        /// Memory-window mode: MW bound, first receive posted.
        /// No-memory-window mode: private-data already carried the
        /// tokens, so this is skipped in favor of `skip_token_exchange`.
        start_token_exchange(Connected => TokenExchangeInitiated);

        /// No-memory-window mode transitions directly from `Connected`
        /// to `Ready` (`spec.md` §4.5: "No runtime exchange is needed").
        skip_token_exchange(Connected => Ready);

        /// Both directions' tokens have been exchanged.
        complete_token_exchange(TokenExchangeInitiated => TokenExchangeComplete);

        enter_ready(TokenExchangeComplete => Ready);

        /// The peer's connector surfaced a `NotifyDisconnect` completion.
        receive_disconnect(Ready | TokenExchangeInitiated | TokenExchangeComplete => ReceivedDisconnect);

        start_closing(ReceivedDisconnect => Closing);

        finish_closing(Closing => Closed);

        /// Invariant I6: a reset is valid from any state.
        reset(
            Uninitialized
            | RingBufferRegistered
            | Connecting
            | CompleteConnect
            | Connected
            | WaitingForGetConnRequest
            | WaitingForAccept
            | TokenExchangeInitiated
            | TokenExchangeComplete
            | Ready
            | ReceivedDisconnect
            | Closing => Closed
        );
    );

    state::is!(is_ready, Ready);
    state::is!(is_closed, Closed);
    state::is!(
        /// Either token-exchange mode has finished and sends/receives
        /// may run.
        accepts_data,
        Ready
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_client_reaches_ready() {
        let mut state = State::Uninitialized;
        state.register_ring_buffers().unwrap();
        state.start_connect().unwrap();
        state.complete_connect().unwrap();
        state.confirm_connected().unwrap();
        state.skip_token_exchange().unwrap();
        assert!(state.is_ready());
    }

    #[test]
    fn memory_window_mode_passes_through_token_exchange() {
        let mut state = State::Uninitialized;
        state.register_ring_buffers().unwrap();
        state.wait_for_conn_request().unwrap();
        state.satisfy_conn_request().unwrap();
        state.accept_connected().unwrap();
        state.start_token_exchange().unwrap();
        state.complete_token_exchange().unwrap();
        state.enter_ready().unwrap();
        assert!(state.is_ready());
    }

    #[test]
    fn reset_is_valid_from_any_state() {
        let mut state = State::Uninitialized;
        state.register_ring_buffers().unwrap();
        state.start_connect().unwrap();
        state.reset().unwrap();
        assert!(state.is_closed());
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let mut state = State::Uninitialized;
        assert!(state.confirm_connected().is_err());
    }

    #[test]
    fn disconnect_path_reaches_closed() {
        let mut state = State::Ready;
        state.receive_disconnect().unwrap();
        state.start_closing().unwrap();
        state.finish_closing().unwrap();
        assert!(state.is_closed());
    }
}
