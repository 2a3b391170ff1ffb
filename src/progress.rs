// Shared progress counter and its polling reporter.
//
// Workers bump the counter; one reporter task polls it on a fixed interval
// and redraws a textual bar on stderr until the counter reaches the total.
// Purely observational, never gates correctness. The halt flag lets the run
// driver stop the reporter when a worker failed and the total will never be
// reached.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

const BAR_WIDTH: usize = 70;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ProgressTracker {
    counter: AtomicUsize,
    total: usize,
    halted: AtomicBool,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            total,
            halted: AtomicBool::new(false),
        }
    }

    /// Record `n` finished work units. Naive workers advance by chunk size,
    /// the other strategies by 1 per gene.
    pub fn advance(&self, n: usize) {
        self.counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn current(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.current() >= self.total
    }

    pub fn halt(&self) {
        self.halted.store(true, Ordering::Relaxed);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Relaxed)
    }
}

/// Poll `tracker` until complete or halted, redrawing the bar in place.
/// Runs as its own task next to the workers.
pub fn report(tracker: &ProgressTracker) {
    while !tracker.is_complete() && !tracker.is_halted() {
        draw(tracker.current(), tracker.total());
        thread::sleep(POLL_INTERVAL);
    }
    if tracker.is_complete() {
        draw(tracker.total(), tracker.total());
        eprintln!();
    }
}

fn draw(current: usize, total: usize) {
    let ratio = if total == 0 {
        1.0
    } else {
        current as f64 / total as f64
    };
    let filled = (BAR_WIDTH as f64 * ratio) as usize;
    let mut bar = String::with_capacity(BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        bar.push(match i.cmp(&filled) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '>',
            std::cmp::Ordering::Greater => ' ',
        });
    }
    eprint!("\r[{}] {} %", bar, (ratio * 100.0) as usize);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_monotonically_to_total() {
        let tracker = ProgressTracker::new(5);
        assert!(!tracker.is_complete());
        tracker.advance(2);
        tracker.advance(3);
        assert_eq!(tracker.current(), 5);
        assert!(tracker.is_complete());
    }

    #[test]
    fn zero_total_is_immediately_complete() {
        let tracker = ProgressTracker::new(0);
        assert!(tracker.is_complete());
    }

    #[test]
    fn reporter_exits_on_halt() {
        let tracker = ProgressTracker::new(10);
        thread::scope(|s| {
            let handle = s.spawn(|| report(&tracker));
            tracker.halt();
            handle.join().unwrap();
        });
        assert!(!tracker.is_complete());
    }

    #[test]
    fn concurrent_advances_never_double_count() {
        let tracker = ProgressTracker::new(400);
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        tracker.advance(1);
                    }
                });
            }
        });
        assert_eq!(tracker.current(), 400);
    }
}
