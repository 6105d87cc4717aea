use crate::error::BridgeResult;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types
///
/// Large payloads (compressed frames) only report metadata so that
/// pub/sub logging never formats the whole buffer.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeState {
    Uninitialized,
    Running,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Performance metrics for node execution
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
}

/// Runtime context handed to a node on every tick
pub struct NodeInfo {
    name: String,
    instance_id: String,
    state: NodeState,
    logging_enabled: bool,

    metrics: NodeMetrics,
    creation_time: Instant,
    tick_start_time: Option<Instant>,

    // topic -> message count
    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,
}

impl NodeInfo {
    pub fn new(node_name: String, logging_enabled: bool) -> Self {
        Self {
            name: node_name,
            instance_id: uuid::Uuid::new_v4().to_string(),
            state: NodeState::Uninitialized,
            logging_enabled,
            metrics: NodeMetrics::default(),
            creation_time: Instant::now(),
            tick_start_time: None,
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
        }
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            log::debug!("[{}] {} -> {}", self.name, self.state, new_state);
            self.state = new_state;
        }
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    pub fn record_tick(&mut self) {
        let Some(start_time) = self.tick_start_time.take() else {
            return;
        };
        let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        self.metrics.total_ticks += 1;
        self.metrics.last_tick_duration_ms = duration_ms;
        if duration_ms > self.metrics.max_tick_duration_ms {
            self.metrics.max_tick_duration_ms = duration_ms;
        }

        let previous = self.metrics.avg_tick_duration_ms * (self.metrics.total_ticks - 1) as f64;
        self.metrics.avg_tick_duration_ms =
            (previous + duration_ms) / self.metrics.total_ticks as f64;
    }

    /// Record an outgoing message. Used by `Hub::send` after the message moved.
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        if self.logging_enabled {
            log::debug!("{} --PUB--> '{}' = {}", self.name, topic, summary);
        }
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
    }

    /// Record an incoming message. Used by `Hub::recv`.
    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        if self.logging_enabled {
            log::debug!("{} <--SUB-- '{}' = {}", self.name, topic, summary);
        }
        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_received += 1;
    }

    pub fn log_info(&self, message: &str) {
        log::info!("[{}] {}", self.name, message);
    }

    pub fn log_warning(&mut self, message: &str) {
        log::warn!("[{}] {}", self.name, message);
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        log::error!("[{}] {}", self.name, message);
        self.metrics.errors_count += 1;
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }
    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }
    pub fn uptime(&self) -> Duration {
        self.creation_time.elapsed()
    }
}

/// Trait for fbridge nodes
///
/// The scheduler calls `init` once, `tick` on every dispatch cycle and
/// `shutdown` once on exit. All calls for all nodes happen on one thread.
pub trait Node: Send {
    /// Get the node's name (must be unique)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once at startup)
    fn init(&mut self, ctx: &mut NodeInfo) -> BridgeResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Main execution step (called repeatedly)
    fn tick(&mut self, ctx: Option<&mut NodeInfo>);

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> BridgeResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }
}

impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}
