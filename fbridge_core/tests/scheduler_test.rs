// Scheduler dispatch order and lifecycle
use fbridge_core::core::{Node, NodeInfo};
use fbridge_core::error::{BridgeError, BridgeResult as Result};
use fbridge_core::{Hub, Scheduler};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Test node that appends its name to a shared trace on every tick
struct TraceNode {
    name: &'static str,
    trace: Arc<Mutex<Vec<&'static str>>>,
    fail_init: bool,
}

impl TraceNode {
    fn new(name: &'static str, trace: Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            name,
            trace,
            fail_init: false,
        }
    }
}

impl Node for TraceNode {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> Result<()> {
        if self.fail_init {
            return Err(BridgeError::InitializationFailed("sprite missing".into()));
        }
        ctx.log_info(&format!("{} initialized", self.name));
        Ok(())
    }

    fn tick(&mut self, _ctx: Option<&mut NodeInfo>) {
        self.trace.lock().unwrap().push(self.name);
    }
}

#[test]
fn test_priority_order() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::new().without_signal_handler();

    scheduler
        .add(Box::new(TraceNode::new("sink", trace.clone())), 10, None)
        .add(Box::new(TraceNode::new("bridge", trace.clone())), 0, None)
        .add(Box::new(TraceNode::new("recorder", trace.clone())), 10, None);

    assert_eq!(scheduler.node_names(), vec!["bridge", "sink", "recorder"]);

    scheduler.init_nodes().unwrap();
    scheduler.tick_once();
    scheduler.tick_once();

    assert_eq!(
        *trace.lock().unwrap(),
        vec!["bridge", "sink", "recorder", "bridge", "sink", "recorder"]
    );
}

#[test]
fn test_init_failure_is_reported() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut node = TraceNode::new("broken", trace.clone());
    node.fail_init = true;

    let mut scheduler = Scheduler::new().without_signal_handler();
    scheduler.add(Box::new(node), 0, None);

    let result = scheduler.run_for(Duration::from_millis(20));
    assert!(matches!(result, Err(BridgeError::InitializationFailed(_))));
    assert!(trace.lock().unwrap().is_empty());
}

#[test]
fn test_run_for_ticks_and_stops() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::new()
        .name("TestScheduler")
        .with_rate(200.0)
        .without_signal_handler();
    scheduler.add(Box::new(TraceNode::new("ticker", trace.clone())), 0, Some(true));

    scheduler.run_for(Duration::from_millis(100)).unwrap();

    let ticks = trace.lock().unwrap().len();
    assert!(ticks >= 2, "expected several ticks, got {}", ticks);
}

#[test]
fn test_stop_flag_ends_run() {
    struct StopAfter {
        remaining: u32,
        flag: Hub<bool>,
    }

    impl Node for StopAfter {
        fn name(&self) -> &'static str {
            "stop_after"
        }

        fn tick(&mut self, ctx: Option<&mut NodeInfo>) {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                let _ = self.flag.send(true, ctx);
            }
        }
    }

    let flag: Hub<bool> = Hub::new("scheduler_test/stop").unwrap();
    let mut scheduler = Scheduler::new().with_rate(500.0).without_signal_handler();
    scheduler.add(
        Box::new(StopAfter {
            remaining: 3,
            flag: flag.clone(),
        }),
        0,
        None,
    );

    let running = scheduler.running_flag();
    let watcher = std::thread::spawn(move || loop {
        if flag.recv(None).is_some() {
            running.store(false, std::sync::atomic::Ordering::SeqCst);
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    });

    scheduler.run_for(Duration::from_secs(5)).unwrap();
    watcher.join().unwrap();
    assert!(!scheduler.is_running());
}
