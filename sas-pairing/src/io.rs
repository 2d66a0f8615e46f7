//! Message I/O.
//!
//! The protocol is generic over any sink and stream of messages that report
//! failures as [`std::io::Error`], so callers can plug in their own framing.
//! [`duplex`] provides an in-memory pair for running both parties in one
//! process.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{
    channel::mpsc::{channel, Receiver, Sender},
    Sink, SinkExt, Stream, StreamExt,
};

/// A sink of messages.
pub trait IoSink<T>: Sink<T, Error = io::Error> {}

impl<T, U: ?Sized> IoSink<T> for U where U: Sink<T, Error = io::Error> {}

/// A stream of messages.
pub trait IoStream<T>: Stream<Item = Result<T, io::Error>> {}

impl<T, U: ?Sized> IoStream<T> for U where U: Stream<Item = Result<T, io::Error>> {}

/// A bidirectional message channel.
pub trait Duplex<T>: IoSink<T> + IoStream<T> + Send + Unpin {}

impl<T, U: ?Sized> Duplex<T> for U where U: IoSink<T> + IoStream<T> + Send + Unpin {}

/// Sends a message.
pub(crate) async fn send<T, Io: IoSink<T> + Unpin>(io: &mut Io, msg: T) -> io::Result<()> {
    io.send(msg).await
}

/// Receives the next message, failing if the stream has ended.
pub(crate) async fn expect_next<T, Io: IoStream<T> + Unpin>(io: &mut Io) -> io::Result<T> {
    match io.next().await {
        Some(msg) => msg,
        None => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stream closed before the expected message",
        )),
    }
}

/// One end of an in-memory duplex channel.
#[derive(Debug)]
pub struct MemoryDuplex<T> {
    sink: Sender<T>,
    stream: Receiver<T>,
}

/// Creates a connected pair of in-memory duplex channels, each buffering up
/// to `buffer` messages per direction.
pub fn duplex<T>(buffer: usize) -> (MemoryDuplex<T>, MemoryDuplex<T>) {
    let (sink_0, stream_1) = channel(buffer);
    let (sink_1, stream_0) = channel(buffer);

    (
        MemoryDuplex {
            sink: sink_0,
            stream: stream_0,
        },
        MemoryDuplex {
            sink: sink_1,
            stream: stream_1,
        },
    )
}

fn broken_pipe(err: futures::channel::mpsc::SendError) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, err)
}

impl<T> Sink<T> for MemoryDuplex<T> {
    type Error = io::Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.sink.poll_ready_unpin(cx).map_err(broken_pipe)
    }

    fn start_send(mut self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        self.sink.start_send_unpin(item).map_err(broken_pipe)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.sink.poll_flush_unpin(cx).map_err(broken_pipe)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.sink.poll_close_unpin(cx).map_err(broken_pipe)
    }
}

impl<T> Stream for MemoryDuplex<T> {
    type Item = Result<T, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx).map(|msg| msg.map(Ok))
    }
}
