//! Background worker: the single consumer of the line queue
//!
//! The worker runs on its own OS thread inside a current-thread tokio
//! runtime, so producers never need a runtime of their own and never touch
//! the console or the sink.
//!
//! ```text
//! Starting --sink opened--> Running --queue closed--> Draining --empty--> Stopped
//!     |                        |                          |
//!     +--open failed-----------+-------cancelled----------+--------------> Stopped
//! ```

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    log_entry::FormattedLine,
    metrics::LoggerMetrics,
    queue::LineReceiver,
};
use crate::appenders::FileAppender;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Name given to the worker thread
pub const WORKER_THREAD_NAME: &str = "spectral-logger";

/// Lifecycle of the worker loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Running,
    Draining,
    Stopped,
}

/// Where the worker gets its sink from while `Starting`
pub enum SinkSource {
    /// Open a [`FileAppender`] at this path
    Path(PathBuf),
    /// Use an already constructed appender
    Appender(Box<dyn Appender>),
}

impl SinkSource {
    async fn open(self) -> Result<Box<dyn Appender>> {
        match self {
            SinkSource::Appender(appender) => Ok(appender),
            SinkSource::Path(path) => match FileAppender::open(&path).await {
                Ok(appender) => Ok(Box::new(appender)),
                Err(e @ LoggerError::InitializationFailed { .. }) => Err(e),
                Err(e) => Err(LoggerError::initialization(
                    path.display().to_string(),
                    e.to_string(),
                )),
            },
        }
    }
}

/// Handles the facade keeps after a successful start
pub struct WorkerHandle {
    pub thread: thread::JoinHandle<()>,
    pub state: watch::Receiver<WorkerState>,
    pub cancel: CancellationToken,
}

/// Start the worker and wait until its sink is open.
///
/// Returns the startup error (sink or runtime) instead of a handle when the
/// worker could not reach `Running`; the thread has exited by then.
pub fn spawn(
    sink: SinkSource,
    console: Option<Box<dyn Appender>>,
    receiver: LineReceiver,
    metrics: Arc<LoggerMetrics>,
) -> Result<WorkerHandle> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| LoggerError::WorkerStartError(e.to_string()))?;

    let (state_tx, state_rx) = watch::channel(WorkerState::Starting);
    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<()>>(1);
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();

    let thread = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            runtime.block_on(async move {
                let sink = match sink.open().await {
                    Ok(sink) => sink,
                    Err(e) => {
                        eprintln!("[LOGGER CRITICAL] Failed to initialize log sink: {}", e);
                        state_tx.send_replace(WorkerState::Stopped);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                state_tx.send_replace(WorkerState::Running);
                let _ = ready_tx.send(Ok(()));

                let mut worker = Worker {
                    sink,
                    console,
                    receiver,
                    state: state_tx,
                    metrics,
                };
                worker.run(worker_cancel).await;
            });
        })
        .map_err(|e| LoggerError::WorkerStartError(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(WorkerHandle {
            thread,
            state: state_rx,
            cancel,
        }),
        Ok(Err(e)) => {
            let _ = thread.join();
            Err(e)
        }
        Err(_) => {
            let _ = thread.join();
            Err(LoggerError::WorkerStartError(
                "log worker exited before opening its sink".to_string(),
            ))
        }
    }
}

struct Worker {
    sink: Box<dyn Appender>,
    console: Option<Box<dyn Appender>>,
    receiver: LineReceiver,
    state: watch::Sender<WorkerState>,
    metrics: Arc<LoggerMetrics>,
}

impl Worker {
    async fn run(&mut self, cancel: CancellationToken) {
        let closed = self.receiver.close_signal();
        let mut draining = false;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,

                () = closed.cancelled(), if !draining => {
                    draining = true;
                    self.receiver.seal();
                    self.state.send_replace(WorkerState::Draining);
                }

                next = self.receiver.recv() => match next {
                    Some(line) => self.process(&line).await,
                    None => {
                        self.finish().await;
                        break;
                    }
                },
            }
        }

        self.state.send_replace(WorkerState::Stopped);
    }

    async fn process(&mut self, line: &FormattedLine) {
        if let Some(console) = self.console.as_mut() {
            // Console output is informational only.
            let _ = console.append(line).await;
        }
        self.write_with_recovery(line).await;
    }

    /// One write; on failure one reopen and one retry, then drop the line.
    async fn write_with_recovery(&mut self, line: &FormattedLine) {
        let first_err = match self.sink.append(line).await {
            Ok(()) => {
                self.metrics.record_written();
                return;
            }
            Err(e) => e,
        };

        eprintln!(
            "[LOGGER ERROR] Appender '{}' failed: {}. Reopening and retrying once",
            self.sink.name(),
            first_err
        );

        let retried = match self.sink.reopen().await {
            Ok(()) => self.sink.append(line).await,
            Err(e) => Err(e),
        };

        match retried {
            Ok(()) => {
                self.metrics.record_written();
                self.metrics.record_recovered();
            }
            Err(e) => {
                self.metrics.record_dropped();
                eprintln!(
                    "[LOGGER ERROR] Appender '{}' retry failed: {}. Log entry dropped",
                    self.sink.name(),
                    e
                );
            }
        }
    }

    async fn finish(&mut self) {
        if let Err(e) = self.sink.flush().await {
            eprintln!(
                "[LOGGER ERROR] Appender '{}' flush failed: {}",
                self.sink.name(),
                e
            );
        }
        if let Some(console) = self.console.as_mut() {
            let _ = console.flush().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{format_entry, LineQueue, LogLevel, TimestampFormat};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Collected(Arc<Mutex<Vec<String>>>);

    struct CollectingAppender {
        lines: Collected,
        fail_on: Option<String>,
        reopens: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl Appender for CollectingAppender {
        async fn append(&mut self, line: &FormattedLine) -> Result<()> {
            if let Some(ref needle) = self.fail_on {
                if line.as_str().ends_with(needle.as_str()) {
                    return Err(LoggerError::writer("simulated write failure"));
                }
            }
            self.lines.0.lock().push(line.to_string());
            Ok(())
        }

        async fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        async fn reopen(&mut self) -> Result<()> {
            *self.reopens.lock() += 1;
            Ok(())
        }

        fn name(&self) -> &str {
            "collecting"
        }
    }

    fn line(message: &str) -> FormattedLine {
        format_entry(LogLevel::Info, message, None, &TimestampFormat::Millis)
    }

    type Started = (
        LineQueue,
        WorkerHandle,
        Collected,
        Arc<Mutex<usize>>,
        Arc<LoggerMetrics>,
    );

    fn start(fail_on: Option<&str>) -> Started {
        let (queue, receiver) = LineQueue::unbounded();
        let collected = Collected::default();
        let reopens = Arc::new(Mutex::new(0));
        let metrics = Arc::new(LoggerMetrics::new());
        let appender = CollectingAppender {
            lines: collected.clone(),
            fail_on: fail_on.map(String::from),
            reopens: Arc::clone(&reopens),
        };
        let handle = spawn(
            SinkSource::Appender(Box::new(appender)),
            None,
            receiver,
            Arc::clone(&metrics),
        )
        .expect("worker should start");
        (queue, handle, collected, reopens, metrics)
    }

    #[test]
    fn test_drains_in_order_then_stops() {
        let (queue, handle, collected, _, metrics) = start(None);
        assert_eq!(*handle.state.borrow(), WorkerState::Running);

        for i in 0..20 {
            queue.enqueue(line(&format!("Message {}", i))).unwrap();
        }
        queue.close();
        handle.thread.join().expect("worker panicked");

        assert_eq!(*handle.state.borrow(), WorkerState::Stopped);
        let lines = collected.0.lock();
        assert_eq!(lines.len(), 20);
        for (i, text) in lines.iter().enumerate() {
            assert!(text.ends_with(&format!("Message {}", i)));
        }
        assert_eq!(metrics.total_written(), 20);
    }

    #[test]
    fn test_failed_line_is_dropped_after_one_retry() {
        let (queue, handle, collected, reopens, metrics) = start(Some("poison"));

        queue.enqueue(line("before")).unwrap();
        queue.enqueue(line("poison")).unwrap();
        queue.enqueue(line("after")).unwrap();
        queue.close();
        handle.thread.join().expect("worker panicked");

        let lines = collected.0.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("before"));
        assert!(lines[1].ends_with("after"));
        assert_eq!(*reopens.lock(), 1);
        assert_eq!(metrics.dropped_count(), 1);
        assert_eq!(metrics.total_written(), 2);
    }

    #[test]
    fn test_cancel_stops_without_draining() {
        let (queue, handle, _collected, _, _) = start(None);
        handle.cancel.cancel();
        handle.thread.join().expect("worker panicked");

        assert_eq!(*handle.state.borrow(), WorkerState::Stopped);
        // The receiver is gone with the worker; nothing more is accepted.
        assert!(queue.enqueue(line("too late")).is_err());
    }

    #[test]
    fn test_startup_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file_not_dir");
        std::fs::write(&blocker, "x").unwrap();

        let (_queue, receiver) = LineQueue::unbounded();
        let result = spawn(
            SinkSource::Path(blocker.join("app.log")),
            None,
            receiver,
            Arc::new(LoggerMetrics::new()),
        );

        assert!(matches!(
            result,
            Err(LoggerError::InitializationFailed { .. })
        ));
    }
}
