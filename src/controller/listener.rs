// src/controller/listener.rs

//! Line reader and dispatcher shared by every waiter on one channel.
//!
//! One background thread pulls bytes from the transport, cuts them into
//! lines and offers each line to every registered filter. A filter that
//! matches keeps the line until its [`Waiter`] takes it. Nothing is queued
//! for a filter before it is registered, so a request must register the
//! filters it depends on before its frame is written.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use parking_lot::{Condvar, Mutex};

use crate::common::frame::{LINE_FEED, LINE_TERMINATOR, PONG};
use crate::common::hal_traits::SerialReader;

/// Lines longer than this are discarded; the controller never sends them.
pub const MAX_LINE_LEN: usize = 256;

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

// --- Predicates ---

/// Matches a line equal to `text`.
pub fn exactly(text: impl Into<String>) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let text = text.into();
    move |line: &str| line == text
}

/// Matches a line beginning with `prefix`.
pub fn starts_with(prefix: impl Into<String>) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let prefix = prefix.into();
    move |line: &str| line.starts_with(prefix.as_str())
}

/// Matches a line equal to any of `texts`.
pub fn any_of<const N: usize>(texts: [&str; N]) -> impl Fn(&str) -> bool + Send + Sync + 'static {
    let texts = texts.map(str::to_owned);
    move |line: &str| texts.iter().any(|text| text == line)
}

// --- Filters & Waiters ---

struct Filter {
    predicate: Predicate,
    matches: Mutex<VecDeque<String>>,
    ready: Condvar,
}

impl Filter {
    fn offer(&self, line: &str) -> bool {
        if !(self.predicate)(line) {
            return false;
        }
        self.matches.lock().push_back(line.to_owned());
        self.ready.notify_all();
        true
    }
}

/// Handle on a registered filter.
///
/// Buffers every matching line seen since registration, oldest first.
/// Dropping the waiter unregisters its filter without disturbing others.
pub struct Waiter {
    filter: Arc<Filter>,
}

impl Waiter {
    /// Takes the oldest buffered match, waiting up to `timeout` for one.
    ///
    /// A zero timeout still returns a match that is already buffered.
    pub fn wait(&self, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        let mut matches = self.filter.matches.lock();
        loop {
            if let Some(line) = matches.pop_front() {
                return Some(line);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            self.filter.ready.wait_for(&mut matches, remaining);
        }
    }

    /// Takes the oldest buffered match without waiting.
    pub fn try_take(&self) -> Option<String> {
        self.filter.matches.lock().pop_front()
    }

    /// Drops every buffered match, returning how many there were.
    pub fn clear(&self) -> usize {
        let mut matches = self.filter.matches.lock();
        let dropped = matches.len();
        matches.clear();
        dropped
    }

    /// Number of buffered matches.
    pub fn pending(&self) -> usize {
        self.filter.matches.lock().len()
    }
}

impl fmt::Debug for Waiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waiter").field("pending", &self.pending()).finish()
    }
}

/// The set of live filters on one channel.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: Arc<Mutex<Vec<Weak<Filter>>>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a filter; only lines dispatched after this call can match it.
    pub fn register<P>(&self, predicate: P) -> Waiter
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let filter = Arc::new(Filter {
            predicate: Box::new(predicate),
            matches: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
        });
        self.filters.lock().push(Arc::downgrade(&filter));
        Waiter { filter }
    }

    /// Offers a line to every live filter, returning how many matched.
    pub fn dispatch(&self, line: &str) -> usize {
        // Predicates run outside the registry lock so a slow one never
        // blocks registration.
        let live: Vec<Arc<Filter>> = {
            let mut filters = self.filters.lock();
            filters.retain(|filter| filter.strong_count() > 0);
            filters.iter().filter_map(Weak::upgrade).collect()
        };
        let matched = live.iter().filter(|filter| filter.offer(line)).count();
        trace!("line {:?} matched {} of {} filters", line, matched, live.len());
        matched
    }

    /// Number of live filters.
    pub fn len(&self) -> usize {
        let mut filters = self.filters.lock();
        filters.retain(|filter| filter.strong_count() > 0);
        filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry").field("filters", &self.len()).finish()
    }
}

// --- Line Assembly ---

/// Cuts the incoming byte stream into lines.
///
/// Lines end at `\r`; a `\n` is ignored. The presence reply `0x06` is never
/// terminated, so it is emitted on its own as soon as it arrives. A line
/// that outgrows [`MAX_LINE_LEN`] is dropped up to and including its `\r`.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buffer: String,
    discarding: bool,
}

impl LineAssembler {
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            PONG => Some(char::from(PONG).to_string()),
            LINE_TERMINATOR => {
                if std::mem::take(&mut self.discarding) || self.buffer.is_empty() {
                    None
                } else {
                    Some(std::mem::take(&mut self.buffer))
                }
            }
            LINE_FEED => None,
            _ if self.discarding => None,
            other => {
                if self.buffer.len() >= MAX_LINE_LEN {
                    warn!("discarding line longer than {} bytes", MAX_LINE_LEN);
                    self.buffer.clear();
                    self.discarding = true;
                } else {
                    self.buffer.push(char::from(other));
                }
                None
            }
        }
    }
}

// --- Listener ---

/// Owns the reader thread of one open channel.
#[derive(Debug)]
pub struct LineListener {
    registry: FilterRegistry,
    running: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
}

impl LineListener {
    /// Spawns the reader thread.
    ///
    /// `poll_interval` is how long the thread sleeps when the transport has
    /// no byte ready.
    pub fn start<R>(reader: R, poll_interval: Duration) -> std::io::Result<Self>
    where
        R: SerialReader + Send + 'static,
    {
        let registry = FilterRegistry::new();
        let running = Arc::new(AtomicBool::new(true));
        let reader_thread = thread::Builder::new()
            .name("mdc2250-listener".to_string())
            .spawn({
                let registry = registry.clone();
                let running = Arc::clone(&running);
                move || listen(reader, registry, running, poll_interval)
            })?;

        debug!("line listener started");
        Ok(Self {
            registry,
            running,
            reader_thread: Some(reader_thread),
        })
    }

    pub fn register<P>(&self, predicate: P) -> Waiter
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.registry.register(predicate)
    }

    /// Shared handle on this channel's filters, usable from other threads.
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn is_running(&self) -> bool {
        self.reader_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops and joins the reader thread. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.reader_thread.take() {
            if handle.join().is_err() {
                warn!("line listener thread panicked");
            }
        }
    }
}

impl Drop for LineListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen<R: SerialReader>(
    mut reader: R,
    registry: FilterRegistry,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    let mut assembler = LineAssembler::default();
    while running.load(Ordering::Acquire) {
        match reader.read_byte() {
            Ok(byte) => {
                if let Some(line) = assembler.push(byte) {
                    registry.dispatch(&line);
                }
            }
            Err(nb::Error::WouldBlock) => thread::sleep(poll_interval),
            Err(nb::Error::Other(e)) => {
                warn!("serial read failed: {:?}", e);
                thread::sleep(poll_interval);
            }
        }
    }
    debug!("line listener stopped");
}
