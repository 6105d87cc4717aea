/// Pose-update decimation
///
/// Counts every update and lets through the ones whose count is a multiple of
/// `stride`, starting with the very first.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    stride: u64,
    counter: u64,
}

impl FrameThrottle {
    /// `stride` of 0 is treated as 1 (no decimation)
    pub fn new(stride: u64) -> Self {
        Self {
            stride: stride.max(1),
            counter: 0,
        }
    }

    /// Register one update and report whether it should be processed
    pub fn accept(&mut self) -> bool {
        let accepted = self.counter % self.stride == 0;
        self.counter = self.counter.wrapping_add(1);
        accepted
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Updates seen so far
    pub fn seen(&self) -> u64 {
        self.counter
    }
}
