use serde::Serialize;

/// Counters of a submission run, handed to the caller after every settled
/// item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    /// Items handed to the backend so far (settled or still in flight).
    pub launched: usize,
    pub done: usize,
    pub ok: usize,
    pub fail: usize,
    /// 1-based index of the batch being processed.
    pub batch: usize,
    pub batches: usize,
}

impl Progress {
    pub fn new(total: usize, batches: usize) -> Self {
        Self {
            total,
            batches,
            ..Self::default()
        }
    }

    pub fn in_flight(&self) -> usize {
        self.launched - self.done
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total) as u8
    }

    pub(crate) fn record_launch(&mut self) {
        self.launched += 1;
    }

    pub(crate) fn record_settled(&mut self, success: bool) {
        self.done += 1;
        if success {
            self.ok += 1;
        } else {
            self.fail += 1;
        }
    }
}
