//! stdin ingress thread

use fbridge_library::messages::inbound::InboundRouter;
use std::io::BufRead;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Read newline-delimited JSON from stdin and publish it onto the inbound
/// topics. The thread ends at EOF; the bridge keeps running.
pub fn spawn_stdin_ingress(router: InboundRouter) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("fbridge-ingress".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut accepted = 0u64;
            let mut rejected = 0u64;

            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                if router.handle_line(&line) {
                    accepted += 1;
                } else {
                    rejected += 1;
                }
                debug!("ingress: {} accepted, {} rejected", accepted, rejected);
            }

            info!(
                "stdin closed ({} messages accepted, {} rejected)",
                accepted, rejected
            );
        })
}
