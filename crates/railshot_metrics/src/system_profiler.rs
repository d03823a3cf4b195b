//! Per-system timing over a rolling window of ticks

use super::ring_buffer::RingBuffer;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

const WINDOW: usize = 120;

pub struct SystemProfiler {
    timings: BTreeMap<&'static str, RingBuffer<Duration>>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
        }
    }

    pub fn time_system<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings
            .entry(name)
            .or_insert_with(|| RingBuffer::new(WINDOW))
            .push(elapsed);
        result
    }

    /// Average cost of `name` over the window.
    pub fn get_timing(&self, name: &str) -> Duration {
        self.timings
            .get(name)
            .map(RingBuffer::average)
            .unwrap_or(Duration::ZERO)
    }

    /// Systems sorted by average cost, most expensive first.
    pub fn hottest(&self) -> Vec<(&'static str, Duration)> {
        let mut out: Vec<_> = self
            .timings
            .iter()
            .map(|(&name, window)| (name, window.average()))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out
    }

}

impl Default for SystemProfiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_closure_result_and_records_name() {
        let mut profiler = SystemProfiler::new();
        let value = profiler.time_system("movement", || 41 + 1);
        assert_eq!(value, 42);
        profiler.time_system("spawn", || ());

        let names: Vec<_> = profiler.hottest().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"movement"));
        assert_eq!(profiler.get_timing("unknown"), Duration::ZERO);
    }
}
