use crate::core::{Node, NodeInfo, NodeState};
use crate::error::{BridgeError, BridgeResult};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Default dispatch rate when none is configured
pub const DEFAULT_RATE_HZ: f64 = 100.0;

/// Node registration info with lifecycle tracking
struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
}

/// Central orchestrator: holds nodes, drives the tick loop.
///
/// Dispatch is strictly serialized: every node's `tick` runs to completion,
/// in priority order, on the scheduler's thread before the next one starts.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    scheduler_name: String,
    rate_hz: f64,
    handle_signals: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            scheduler_name: "DefaultScheduler".to_string(),
            rate_hz: DEFAULT_RATE_HZ,
            handle_signals: true,
        }
    }

    /// Set the scheduler name (chainable)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Set the global tick rate in Hz (chainable)
    pub fn with_rate(mut self, rate_hz: f64) -> Self {
        if rate_hz.is_finite() && rate_hz > 0.0 {
            self.rate_hz = rate_hz;
        } else {
            log::warn!(
                "Ignoring invalid scheduler rate {}, keeping {} Hz",
                rate_hz,
                self.rate_hz
            );
        }
        self
    }

    /// Do not install a Ctrl+C handler when running
    pub fn without_signal_handler(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Add a node. Lower priority values tick first; equal priorities keep
    /// insertion order.
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context = NodeInfo::new(node_name.clone(), logging_enabled);

        let index = self
            .nodes
            .iter()
            .position(|registered| registered.priority > priority)
            .unwrap_or(self.nodes.len());
        self.nodes.insert(
            index,
            RegisteredNode {
                node,
                priority,
                initialized: false,
                context,
            },
        );

        log::info!(
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );
        self
    }

    /// Names of registered nodes in dispatch order
    pub fn node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|r| r.node.name()).collect()
    }

    /// Shared flag; storing `false` stops a running scheduler
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Initialize every node that has not been initialized yet
    pub fn init_nodes(&mut self) -> BridgeResult<()> {
        for registered in self.nodes.iter_mut().filter(|r| !r.initialized) {
            let node_name = registered.node.name();
            match registered.node.init(&mut registered.context) {
                Ok(()) => {
                    registered.initialized = true;
                    registered.context.set_state(NodeState::Running);
                    log::info!("Initialized node '{}'", node_name);
                }
                Err(e) => {
                    registered
                        .context
                        .transition_to_error(format!("Initialization failed: {}", e));
                    return Err(BridgeError::InitializationFailed(format!(
                        "node '{}': {}",
                        node_name, e
                    )));
                }
            }
        }
        Ok(())
    }

    /// Run one dispatch cycle over all initialized nodes
    pub fn tick_once(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| r.initialized) {
            let ctx = &mut registered.context;
            ctx.start_tick();
            registered.node.tick(Some(&mut *ctx));
            ctx.record_tick();
        }
    }

    /// Main loop with signal handling and cleanup
    pub fn run(&mut self) -> BridgeResult<()> {
        self.run_with_limit(None)
    }

    /// Run all nodes for a specified duration, then shutdown gracefully
    pub fn run_for(&mut self, duration: Duration) -> BridgeResult<()> {
        self.run_with_limit(Some(duration))
    }

    fn run_with_limit(&mut self, duration: Option<Duration>) -> BridgeResult<()> {
        // One thread: node dispatch must never interleave
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| BridgeError::Internal(format!("Failed to create tokio runtime: {}", e)))?;

        if self.handle_signals {
            let running = self.running.clone();
            if let Err(e) = ctrlc::set_handler(move || {
                eprintln!("{}", "\nCtrl+C received! Shutting down fbridge...".red());
                running.store(false, Ordering::SeqCst);
            }) {
                log::warn!("Failed to set signal handler: {}", e);
            }
        }

        self.init_nodes()?;

        let period = Duration::from_secs_f64(1.0 / self.rate_hz);
        log::info!(
            "Scheduler '{}' running {} node(s) at {:.1} Hz",
            self.scheduler_name,
            self.nodes.len(),
            self.rate_hz
        );

        rt.block_on(async {
            let start_time = Instant::now();
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            while self.is_running() {
                interval.tick().await;

                if let Some(max_duration) = duration {
                    if start_time.elapsed() >= max_duration {
                        log::info!("Scheduler reached time limit of {:?}", max_duration);
                        break;
                    }
                }

                self.tick_once();
            }
        });

        self.shutdown_nodes();
        Ok(())
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut().filter(|r| r.initialized) {
            let node_name = registered.node.name();
            match registered.node.shutdown(&mut registered.context) {
                Ok(()) => log::info!(
                    "Shutdown node '{}' successfully after {:?}",
                    node_name,
                    registered.context.uptime()
                ),
                Err(e) => log::error!("Error shutting down node '{}': {}", node_name, e),
            }
            if let Ok(metrics) = serde_json::to_string(registered.context.metrics()) {
                log::debug!("Node '{}' final metrics: {}", node_name, metrics);
            }
            registered.context.set_state(NodeState::Stopped);
            registered.initialized = false;
        }
    }
}
