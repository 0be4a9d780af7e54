//! Async drivers for a [`TsRemuxer`].
//!
//! The remuxer itself is synchronous; these helpers pump messages into it
//! from a `futures` stream or from a tokio task fed through a channel.

use futures::{Stream, StreamExt};
use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::format::rtmp::RtmpMsg;
use crate::remux::{RemuxObserver, TsRemuxer};

/// Feeds every message of `messages` through the startup filter and calls
/// [`TsRemuxer::finish`] once the stream ends. Returns the number of
/// messages consumed.
pub async fn run<S, O>(mut messages: S, remuxer: &mut TsRemuxer, observer: &mut O) -> usize
where
    S: Stream<Item = RtmpMsg> + Unpin,
    O: RemuxObserver + ?Sized,
{
    let mut count = 0;
    while let Some(msg) = messages.next().await {
        remuxer.feed_rtmp_message(&msg, observer);
        count += 1;
    }

    remuxer.finish(observer);
    debug!("[{}] pipeline done. messages={}", remuxer.unique_key(), count);
    count
}

/// Moves `remuxer` and `observer` onto a tokio task.
///
/// Messages sent on the returned channel are remuxed in order. Dropping
/// every sender ends the stream; the task then finishes the remuxer and
/// yields the observer back through the join handle.
pub fn spawn<O>(
    remuxer: TsRemuxer,
    observer: O,
    buffer: usize,
) -> (mpsc::Sender<RtmpMsg>, JoinHandle<O>)
where
    O: RemuxObserver + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<RtmpMsg>(buffer.max(1));

    let handle = tokio::spawn(async move {
        let mut remuxer = remuxer;
        let mut observer = observer;

        while let Some(msg) = rx.recv().await {
            remuxer.feed_rtmp_message(&msg, &mut observer);
        }

        remuxer.finish(&mut observer);
        debug!("[{}] remux task done", remuxer.unique_key());
        observer
    });

    (tx, handle)
}
