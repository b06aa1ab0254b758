//! Record sink shared by every handle derived from one logger
//!
//! In synchronous mode each record is written under a lock over the
//! appenders. In async mode records go through a bounded channel to a
//! single worker thread, and `flush` round-trips a command through the same
//! channel so it observes every record sent before it.

use super::{
    appender::Appender,
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy},
    sampling::LogSampler,
};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How long dropping the backend waits for the async worker to drain
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const BATCH_SIZE: usize = 50;

type Appenders = Arc<Mutex<Vec<Box<dyn Appender>>>>;

enum Command {
    Record(LogRecord),
    Flush(Sender<Result<()>>),
}

pub(crate) struct Backend {
    appenders: Appenders,
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    metrics: Arc<LoggerMetrics>,
    sampler: Option<LogSampler>,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Write one record to every appender, isolating failures per appender.
/// Returns whether every appender succeeded.
fn write_record(appenders: &mut [Box<dyn Appender>], record: &LogRecord, metrics: &LoggerMetrics) -> bool {
    let mut ok = true;

    for (idx, appender) in appenders.iter_mut().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| appender.append(record))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Appender '{}' (#{}) failed: {}", appender.name(), idx, e);
                ok = false;
            }
            Err(panic) => {
                eprintln!(
                    "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                     Other appenders continue to function.",
                    idx,
                    panic_message(panic.as_ref())
                );
                ok = false;
            }
        }
    }

    if ok {
        metrics.record_logged();
    } else {
        metrics.record_dropped();
    }
    ok
}

/// Flush every appender, returning the first failure after trying them all
fn flush_appenders(appenders: &mut [Box<dyn Appender>]) -> Result<()> {
    let mut first_error = None;

    for (idx, appender) in appenders.iter_mut().enumerate() {
        let result = match catch_unwind(AssertUnwindSafe(|| appender.flush())) {
            Ok(result) => result,
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                eprintln!(
                    "[LOGGER CRITICAL] Appender #{} panicked during flush: {}. \
                     Other appenders continue to function.",
                    idx, msg
                );
                Err(LoggerError::other(format!("appender #{} panicked during flush: {}", idx, msg)))
            }
        };
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

impl Backend {
    pub(crate) fn new(
        appenders: Vec<Box<dyn Appender>>,
        async_buffer: Option<usize>,
        overflow_policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
        sampler: Option<LogSampler>,
    ) -> Self {
        let appenders: Appenders = Arc::new(Mutex::new(appenders));
        let metrics = Arc::new(LoggerMetrics::new());

        let (sender, worker) = match async_buffer {
            Some(size) => {
                let (sender, worker) = Self::spawn_worker(size, &appenders, &metrics);
                (Some(sender), Some(worker))
            }
            None => (None, None),
        };

        Self {
            appenders,
            sender,
            worker,
            metrics,
            sampler,
            overflow_policy,
            on_overflow,
        }
    }

    fn spawn_worker(
        buffer_size: usize,
        appenders: &Appenders,
        metrics: &Arc<LoggerMetrics>,
    ) -> (Sender<Command>, thread::JoinHandle<()>) {
        let (sender, receiver) = bounded::<Command>(buffer_size);
        let appenders = Arc::clone(appenders);
        let metrics = Arc::clone(metrics);

        let handle = thread::spawn(move || {
            let mut batch = Vec::with_capacity(BATCH_SIZE);

            // Blocks for the first command, then drains whatever is already
            // queued up to BATCH_SIZE records before taking the lock.
            while let Ok(command) = receiver.recv() {
                let mut pending_flush = None;
                match command {
                    Command::Record(record) => batch.push(record),
                    Command::Flush(ack) => pending_flush = Some(ack),
                }

                while pending_flush.is_none() && batch.len() < BATCH_SIZE {
                    match receiver.try_recv() {
                        Ok(Command::Record(record)) => batch.push(record),
                        Ok(Command::Flush(ack)) => pending_flush = Some(ack),
                        Err(_) => break,
                    }
                }

                let mut guard = appenders.lock();
                for record in batch.drain(..) {
                    write_record(&mut guard, &record, &metrics);
                }
                let flushed = flush_appenders(&mut guard);
                drop(guard);

                match pending_flush {
                    Some(ack) => {
                        // The caller may have given up waiting.
                        let _ = ack.send(flushed);
                    }
                    None => {
                        if let Err(e) = flushed {
                            eprintln!("[LOGGER ERROR] Batch flush failed: {}", e);
                        }
                    }
                }
            }
        });

        (sender, handle)
    }

    /// Consult the sampler, counting suppressed records
    pub(crate) fn should_sample(&self, level: LogLevel, message: &str) -> bool {
        match self.sampler {
            Some(ref sampler) => {
                let keep = sampler.should_sample(level, message);
                if !keep {
                    self.metrics.record_sampled_out();
                }
                keep
            }
            None => true,
        }
    }

    pub(crate) fn write(&self, record: LogRecord) {
        let Some(ref sender) = self.sender else {
            let mut appenders = self.appenders.lock();
            write_record(&mut appenders, &record, &self.metrics);
            return;
        };

        let priority = record.level.priority();
        match sender.try_send(Command::Record(record)) {
            Ok(()) => {}
            Err(TrySendError::Full(Command::Record(record))) => {
                self.handle_overflow(record, priority);
            }
            Err(TrySendError::Full(Command::Flush(_))) => {}
            Err(TrySendError::Disconnected(_)) => {
                // Shutting down.
            }
        }
    }

    fn handle_overflow(&self, record: LogRecord, priority: LogPriority) {
        self.metrics.record_queue_full();

        if priority == LogPriority::Critical {
            self.metrics.record_critical_preserved();
            let mut appenders = self.appenders.lock();
            write_record(&mut appenders, &record, &self.metrics);
            return;
        }

        let Some(ref sender) = self.sender else {
            return;
        };

        match &self.overflow_policy {
            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
            }
            OverflowPolicy::Block => {
                self.metrics.record_block();
                let _ = sender.send(Command::Record(record));
            }
            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                if let Err(crossbeam_channel::SendTimeoutError::Timeout(_)) =
                    sender.send_timeout(Command::Record(record), *timeout)
                {
                    self.alert_and_drop();
                }
            }
            OverflowPolicy::AlertAndDrop => self.alert_and_drop(),
        }
    }

    fn alert_and_drop(&self) {
        let dropped = self.metrics.record_dropped() + 1;

        // Alert on the first drop and every thousandth after it.
        if dropped == 1 || dropped % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} logs dropped. \
                 Consider increasing buffer size or using a different overflow policy.",
                dropped
            );
            if let Some(ref callback) = self.on_overflow {
                callback(dropped);
            }
        }
    }

    /// Write out everything emitted so far and flush every appender
    pub(crate) fn flush(&self) -> Result<()> {
        let Some(ref sender) = self.sender else {
            let mut appenders = self.appenders.lock();
            return flush_appenders(&mut appenders);
        };

        let (ack, done) = bounded(1);
        sender
            .send(Command::Flush(ack))
            .map_err(|_| LoggerError::ChannelSendError)?;
        match done.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT) {
            Ok(result) => result,
            Err(_) => Err(LoggerError::LoggerStopped),
        }
    }

    pub(crate) fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub(crate) fn sampler(&self) -> Option<&LogSampler> {
        self.sampler.as_ref()
    }

    pub(crate) fn is_async(&self) -> bool {
        self.sender.is_some()
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        drop(self.sender.take());

        if let Some(handle) = self.worker.take() {
            let start = Instant::now();
            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!(
                            "[LOGGER ERROR] Async worker thread panicked during shutdown: {}",
                            panic_message(e.as_ref())
                        );
                    }
                    break;
                }

                if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                    eprintln!(
                        "[LOGGER WARNING] Async worker thread did not finish within {:?} timeout. \
                         Some logs may be lost.",
                        DEFAULT_SHUTDOWN_TIMEOUT
                    );
                    break;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }

        let mut appenders = self.appenders.lock();
        if let Err(e) = flush_appenders(&mut appenders) {
            if !e.is_invalid_descriptor() {
                eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            }
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}
