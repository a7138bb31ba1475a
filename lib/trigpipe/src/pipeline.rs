//! Bounded hand-off queues between the stages.

use crate::error::{Stage, TriGParseError};
use crossbeam_channel::{Receiver, Sender, TryRecvError, select};
use tracing::{debug, debug_span};

/// What travels on a queue.
///
/// A stage sends exactly one `Failed` or `End` before closing its queue.
/// A queue closed without one of them means the producer died.
pub(crate) enum Message<T> {
    Item(T),
    Failed(TriGParseError),
    End,
}

/// Reads the queue written by the `upstream` stage as an iterator.
///
/// The iterator is fused after the end marker or an error.
pub(crate) struct QueueSource<T> {
    receiver: Receiver<Message<T>>,
    upstream: Stage,
    is_ending: bool,
}

impl<T> QueueSource<T> {
    pub(crate) fn new(receiver: Receiver<Message<T>>, upstream: Stage) -> Self {
        Self {
            receiver,
            upstream,
            is_ending: false,
        }
    }

    /// Stops reading. The queue is closed when `self` is dropped.
    pub(crate) fn close(&mut self) {
        self.is_ending = true;
    }
}

impl<T> Iterator for QueueSource<T> {
    type Item = Result<T, TriGParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_ending {
            return None;
        }
        match self.receiver.recv() {
            Ok(Message::Item(item)) => Some(Ok(item)),
            Ok(Message::Failed(error)) => {
                self.is_ending = true;
                Some(Err(error))
            }
            Ok(Message::End) => {
                self.is_ending = true;
                None
            }
            Err(_) => {
                self.is_ending = true;
                Some(Err(TriGParseError::Interrupted(self.upstream)))
            }
        }
    }
}

/// Drives `items` into `output` until the end of the input, the first error, a cancellation or the closure of `output`.
///
/// `cancel` never receives anything: the stage is cancelled when all its senders are dropped.
pub(crate) fn run_stage<T>(
    stage: Stage,
    items: impl Iterator<Item = Result<T, TriGParseError>>,
    output: &Sender<Message<T>>,
    cancel: &Receiver<()>,
) {
    let span = debug_span!("stage", %stage);
    let _enter = span.enter();
    debug!("started");
    let mut count = 0_u64;
    for item in items {
        match item {
            Ok(item) => {
                if !send(output, cancel, Message::Item(item)) {
                    return;
                }
                count += 1;
            }
            Err(error) => {
                debug!(count, %error, "failed");
                send(output, cancel, Message::Failed(error));
                return;
            }
        }
    }
    if send(output, cancel, Message::End) {
        debug!(count, "finished");
    }
}

/// Blocks until the message is queued. Returns `false` if the run is over.
fn send<T>(output: &Sender<Message<T>>, cancel: &Receiver<()>, message: Message<T>) -> bool {
    if matches!(cancel.try_recv(), Err(TryRecvError::Disconnected)) {
        debug!("cancelled");
        return false;
    }
    select! {
        send(output, message) -> result => {
            if result.is_err() {
                debug!("downstream closed");
            }
            result.is_ok()
        }
        recv(cancel) -> _ => {
            debug!("cancelled");
            false
        }
    }
}
