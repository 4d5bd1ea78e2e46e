//! Server-side timestamp source.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Wall-clock time at microsecond precision that never repeats and never runs
/// backwards within one process.
///
/// Two stamps taken back to back always differ, so `updatedAt` is strictly
/// later than `createdAt` and `createdAt` alone totally orders a partition.
#[derive(Debug, Default)]
pub struct MonotonicClock {
  last_micros: AtomicI64,
}

impl MonotonicClock {
  pub fn new() -> Self { Self::default() }

  pub fn now(&self) -> DateTime<Utc> {
    let wall = Utc::now().timestamp_micros();
    let mut prev = self.last_micros.load(Ordering::Acquire);
    loop {
      let next = wall.max(prev.saturating_add(1));
      match self.last_micros.compare_exchange_weak(
        prev,
        next,
        Ordering::AcqRel,
        Ordering::Acquire,
      ) {
        Ok(_) => {
          return DateTime::from_timestamp_micros(next)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        }
        Err(actual) => prev = actual,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, thread};

  use super::*;

  #[test]
  fn stamps_strictly_increase() {
    let clock = MonotonicClock::new();
    let mut prev = clock.now();
    for _ in 0..10_000 {
      let next = clock.now();
      assert!(next > prev);
      prev = next;
    }
  }

  #[test]
  fn stamps_are_unique_across_threads() {
    let clock = Arc::new(MonotonicClock::new());
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let clock = clock.clone();
        thread::spawn(move || (0..1_000).map(|_| clock.now()).collect::<Vec<_>>())
      })
      .collect();

    let mut all: Vec<_> = handles
      .into_iter()
      .flat_map(|h| h.join().unwrap())
      .collect();
    let count = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), count);
  }

  #[test]
  fn stamps_track_wall_clock() {
    let before = Utc::now();
    let stamp = MonotonicClock::new().now();
    let drift = (stamp - before).num_seconds().abs();
    assert!(drift < 5, "stamp {stamp} drifted from {before}");
  }
}
