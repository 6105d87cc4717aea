use crate::core::node::{LogSummary, NodeInfo};
use crate::error::{BridgeError, BridgeResult};
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default queue depth for a topic
pub const DEFAULT_CAPACITY: usize = 1024;

/// Process-wide topic registry: topic name -> type-erased `Topic<T>`
static TOPICS: Lazy<Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Bounded MPMC queue shared by every hub on the same topic name
struct Topic<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    metrics: AtomicHubMetrics,
}

/// Lock-free atomic metrics for Hub monitoring
#[derive(Debug, Default)]
pub struct AtomicHubMetrics {
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub send_failures: AtomicU64,
}

impl AtomicHubMetrics {
    pub fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot for a topic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub send_failures: u64,
}

/// Pub/sub endpoint on a named in-process topic
///
/// Every `Hub` created with the same topic name shares one bounded queue.
/// `recv` consumes: a message is delivered to exactly one receiver, in FIFO
/// order. A full queue rejects the message and hands it back to the caller.
pub struct Hub<T> {
    topic: Arc<Topic<T>>,
    topic_name: String,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            topic_name: self.topic_name.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("pending", &self.topic.rx.len())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Hub<T> {
    /// Create a new Hub
    pub fn new(topic_name: &str) -> BridgeResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_CAPACITY)
    }

    /// Create a new Hub with custom capacity
    ///
    /// The capacity only applies when this call creates the topic; later hubs
    /// on the same name join the existing queue.
    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> BridgeResult<Self> {
        if topic_name.is_empty() {
            return Err(BridgeError::Communication(
                "topic name must not be empty".to_string(),
            ));
        }

        let mut topics = TOPICS.lock();
        let erased = topics
            .entry(topic_name.to_string())
            .or_insert_with(|| {
                let (tx, rx) = channel::bounded::<T>(capacity.max(1));
                Arc::new(Topic {
                    tx,
                    rx,
                    metrics: AtomicHubMetrics::default(),
                }) as Arc<dyn Any + Send + Sync>
            })
            .clone();

        let topic = erased.downcast::<Topic<T>>().map_err(|_| {
            BridgeError::Communication(format!(
                "topic '{}' is already registered with a different message type",
                topic_name
            ))
        })?;

        Ok(Hub {
            topic,
            topic_name: topic_name.to_string(),
        })
    }

    /// Publish a message; gives it back if the topic queue is full
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>) -> Result<(), T>
    where
        T: LogSummary,
    {
        let summary = ctx.as_ref().map(|_| msg.log_summary());
        match self.topic.tx.try_send(msg) {
            Ok(()) => {
                self.topic.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
                if let (Some(ctx), Some(summary)) = (ctx, summary) {
                    ctx.log_pub_summary(&self.topic_name, &summary);
                }
                Ok(())
            }
            Err(TrySendError::Full(msg)) | Err(TrySendError::Disconnected(msg)) => {
                self.topic.metrics.send_failures.fetch_add(1, Ordering::Relaxed);
                Err(msg)
            }
        }
    }

    /// Receive the oldest pending message, if any
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let msg = self.topic.rx.try_recv().ok()?;
        self.topic
            .metrics
            .messages_received
            .fetch_add(1, Ordering::Relaxed);
        if let Some(ctx) = ctx {
            ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
        }
        Some(msg)
    }

    /// Number of messages waiting on the topic
    pub fn pending(&self) -> usize {
        self.topic.rx.len()
    }

    /// Get current metrics snapshot for the whole topic
    pub fn get_metrics(&self) -> HubMetrics {
        self.topic.metrics.snapshot()
    }

    /// Get the topic name for this Hub
    pub fn get_topic_name(&self) -> &str {
        &self.topic_name
    }
}
