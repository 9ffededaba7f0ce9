use std::time::Duration;

use crypto_transport::{FrameSink, FrameSource};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::CryptoClient;
use crate::io::{receive_loop, send_loop};
use crate::multiplexer::{Multiplexer, MultiplexerInitArgs};

pub const COMMAND_QUEUE_SIZE: usize = 1000;
pub const INBOUND_QUEUE_SIZE: usize = 1000;

/// Starts the transport loops and returns the multiplexer (not yet running) with a handle to it.
pub fn create_multiplexer<S, R>(
    sink: S,
    source: R,
    request_timeout: Duration,
    cancellation_token: CancellationToken,
) -> (Multiplexer, CryptoClient)
where
    S: FrameSink + 'static,
    R: FrameSource + 'static,
{
    let (command_sender, command_receiver) = mpsc::channel(COMMAND_QUEUE_SIZE);
    let (inbound_sender, inbound_receiver) = mpsc::channel(INBOUND_QUEUE_SIZE);
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel();
    let (failure_sender, failure_receiver) = mpsc::unbounded_channel();

    tokio::spawn(receive_loop(source, inbound_sender, cancellation_token.clone()));
    tokio::spawn(send_loop(
        sink,
        outbound_receiver,
        failure_sender,
        cancellation_token.clone(),
    ));

    let multiplexer = Multiplexer::new(MultiplexerInitArgs {
        commands: command_receiver,
        inbound: inbound_receiver,
        failures: failure_receiver,
        outbound: outbound_sender,
        cancellation_token: cancellation_token.clone(),
    });
    let client = CryptoClient::new(command_sender, request_timeout, cancellation_token);
    (multiplexer, client)
}
