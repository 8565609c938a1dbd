use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(any(test, not(target_has_atomic = "64")))]
use core::sync::atomic::{fence, AtomicU32};
#[cfg(target_has_atomic = "64")]
use core::sync::atomic::AtomicU64;

#[cfg(target_has_atomic = "64")]
type Timestamp = WideTimestamp;
#[cfg(not(target_has_atomic = "64"))]
type Timestamp = SplitTimestamp;

/// 64-bit timestamp in a single atomic word.
#[cfg(target_has_atomic = "64")]
#[derive(Debug)]
struct WideTimestamp(AtomicU64);

#[cfg(target_has_atomic = "64")]
impl WideTimestamp {
    const fn new(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    fn store(&self, value: u64) {
        self.0.store(value, Ordering::Release);
    }

    fn load(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// 64-bit timestamp as two 32-bit halves behind a sequence counter, for
/// targets without 64-bit atomics. The single writer never waits; a reader
/// retries while a write is in flight or has slipped in between its loads.
#[cfg(any(test, not(target_has_atomic = "64")))]
#[derive(Debug)]
struct SplitTimestamp {
    seq: AtomicU32,
    lo: AtomicU32,
    hi: AtomicU32,
}

#[cfg(any(test, not(target_has_atomic = "64")))]
impl SplitTimestamp {
    const fn new(value: u64) -> Self {
        Self {
            seq: AtomicU32::new(0),
            lo: AtomicU32::new(value as u32),
            hi: AtomicU32::new((value >> 32) as u32),
        }
    }

    fn store(&self, value: u64) {
        let seq = self.seq.load(Ordering::Relaxed);
        // Odd while the halves disagree.
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        self.lo.store(value as u32, Ordering::Relaxed);
        self.hi.store((value >> 32) as u32, Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    fn load(&self) -> u64 {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 0 {
                let lo = self.lo.load(Ordering::Relaxed);
                let hi = self.hi.load(Ordering::Relaxed);
                fence(Ordering::Acquire);
                if self.seq.load(Ordering::Relaxed) == before {
                    return (hi as u64) << 32 | lo as u64;
                }
            }
            core::hint::spin_loop();
        }
    }
}

/// Process-wide diagnostics written from trap context.
///
/// Every field has exactly one writer, the trap path that owns it, and any
/// number of readers in normal context. Writers therefore never need a
/// read-modify-write: a plain load followed by a release store cannot lose an
/// update. A cold restart reinitializes the value from the static image.
#[derive(Debug)]
pub struct TrapStats {
    timestamp: Timestamp,
    calls: AtomicUsize,
}

impl TrapStats {
    pub const fn new() -> Self {
        Self {
            timestamp: Timestamp::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Writer: timer interrupt.
    pub fn record_timestamp(&self, now: u64) {
        self.timestamp.store(now);
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp.load()
    }

    /// Writer: own-mode environment call. Wraps silently on overflow.
    pub fn count_call(&self) -> usize {
        let next = self.calls.load(Ordering::Relaxed).wrapping_add(1);
        self.calls.store(next, Ordering::Release);
        next
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Acquire)
    }
}

impl Default for TrapStats {
    fn default() -> Self {
        Self::new()
    }
}
