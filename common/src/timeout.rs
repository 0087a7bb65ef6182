use std::time::{Duration, Instant};

/// A deadline that is polled rather than slept on.
///
/// There is no scheduler to hand the CPU to while a USB controller is being driven, so
/// callers spin on [`Timeout::run`] and do a unit of work on every iteration.
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    instant: Instant,
    duration: Duration,
}

impl Timeout {
    #[inline]
    pub fn new(duration: Duration) -> Self {
        Self {
            instant: Instant::now(),
            duration,
        }
    }

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        Self::new(Duration::from_micros(micros))
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    #[inline]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Returns `Err(())` once the deadline has passed.
    #[inline]
    pub fn run(&self) -> Result<(), ()> {
        if self.instant.elapsed() < self.duration {
            std::hint::spin_loop();
            Ok(())
        } else {
            Err(())
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.run().is_err()
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.instant.elapsed())
    }
}

/// Busy-waits for `duration`.
///
/// Used after printing a failure so that someone watching the console can read it before
/// boot continues.
pub fn stall(duration: Duration) {
    let timeout = Timeout::new(duration);
    while timeout.run().is_ok() {}
}
