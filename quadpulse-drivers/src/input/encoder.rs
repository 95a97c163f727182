//! Rotary encoder decoding
//!
//! A full-step transition table turns the two quadrature lines into one
//! event per detent and ignores contact bounce in between. Decoding runs
//! on every edge; detents accumulate in a `RotationCounter` that the
//! control loop drains one step at a time.

use portable_atomic::{AtomicI32, Ordering};

/// One encoder detent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

const START: u8 = 0x0;
const CW_FINAL: u8 = 0x1;
const CW_BEGIN: u8 = 0x2;
const CW_NEXT: u8 = 0x3;
const CCW_BEGIN: u8 = 0x4;
const CCW_FINAL: u8 = 0x5;
const CCW_NEXT: u8 = 0x6;

const EMIT_CW: u8 = 0x10;
const EMIT_CCW: u8 = 0x20;
const STATE_MASK: u8 = 0x0F;

/// Next state indexed by `[state][pins]`, pins = `(a << 1) | b`
const TRANSITIONS: [[u8; 4]; 7] = [
    // START
    [START, CW_BEGIN, CCW_BEGIN, START],
    // CW_FINAL
    [CW_NEXT, START, CW_FINAL, START | EMIT_CW],
    // CW_BEGIN
    [CW_NEXT, CW_BEGIN, START, START],
    // CW_NEXT
    [CW_NEXT, CW_BEGIN, CW_FINAL, START],
    // CCW_BEGIN
    [CCW_NEXT, START, CCW_BEGIN, START],
    // CCW_FINAL
    [CCW_NEXT, CCW_FINAL, START, START | EMIT_CCW],
    // CCW_NEXT
    [CCW_NEXT, CCW_FINAL, CCW_BEGIN, START],
];

/// Quadrature state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuadratureDecoder {
    state: u8,
}

impl QuadratureDecoder {
    /// Decoder at rest
    pub const fn new() -> Self {
        Self { state: START }
    }

    /// Feed the current level of both lines
    ///
    /// Returns a rotation when a full detent completes.
    pub fn update(&mut self, a: bool, b: bool) -> Option<Rotation> {
        let pins = ((a as usize) << 1) | b as usize;
        let row = (self.state & STATE_MASK) as usize;
        // Unknown states restart rather than index out of bounds
        self.state = TRANSITIONS.get(row).map_or(START, |r| r[pins]);

        match self.state & !STATE_MASK {
            EMIT_CW => Some(Rotation::Clockwise),
            EMIT_CCW => Some(Rotation::CounterClockwise),
            _ => None,
        }
    }
}

/// Detents not yet consumed by the control loop
///
/// Positive counts are clockwise. Each side touches the counter with a
/// single atomic read-modify-write, so it is safe to share between the
/// edge handler and the poller.
pub struct RotationCounter {
    pending: AtomicI32,
}

impl RotationCounter {
    /// Counter with nothing pending
    pub const fn new() -> Self {
        Self {
            pending: AtomicI32::new(0),
        }
    }

    /// Record one detent
    pub fn record(&self, rotation: Rotation) {
        let delta = match rotation {
            Rotation::Clockwise => 1,
            Rotation::CounterClockwise => -1,
        };
        self.pending.fetch_add(delta, Ordering::AcqRel);
    }

    /// Consume at most one detent, moving the count toward zero
    pub fn take_step(&self) -> Option<Rotation> {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| match n {
                0 => None,
                n if n > 0 => Some(n - 1),
                n => Some(n + 1),
            })
            .ok()?;

        if previous > 0 {
            Some(Rotation::Clockwise)
        } else {
            Some(Rotation::CounterClockwise)
        }
    }

    /// Net detents not yet taken
    pub fn pending(&self) -> i32 {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for RotationCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gray-code sequence for one clockwise detent, starting and ending at rest
    const CW_DETENT: [(bool, bool); 4] = [(false, true), (false, false), (true, false), (true, true)];
    const CCW_DETENT: [(bool, bool); 4] = [(true, false), (false, false), (false, true), (true, true)];

    fn feed(decoder: &mut QuadratureDecoder, steps: &[(bool, bool)]) -> Option<Rotation> {
        let mut out = None;
        for &(a, b) in steps {
            if let Some(r) = decoder.update(a, b) {
                assert!(out.is_none(), "more than one event per detent");
                out = Some(r);
            }
        }
        out
    }

    #[test]
    fn test_clockwise_detent() {
        let mut decoder = QuadratureDecoder::new();
        decoder.update(true, true);
        assert_eq!(feed(&mut decoder, &CW_DETENT), Some(Rotation::Clockwise));
    }

    #[test]
    fn test_counter_clockwise_detent() {
        let mut decoder = QuadratureDecoder::new();
        decoder.update(true, true);
        assert_eq!(
            feed(&mut decoder, &CCW_DETENT),
            Some(Rotation::CounterClockwise)
        );
    }

    #[test]
    fn test_bounce_is_ignored() {
        let mut decoder = QuadratureDecoder::new();
        decoder.update(true, true);
        // Line B chatters before the detent completes
        let bouncy = [
            (false, true),
            (true, true),
            (false, true),
            (false, false),
            (true, false),
            (true, true),
        ];
        assert_eq!(feed(&mut decoder, &bouncy), Some(Rotation::Clockwise));
    }

    #[test]
    fn test_partial_turn_emits_nothing() {
        let mut decoder = QuadratureDecoder::new();
        decoder.update(true, true);
        assert_eq!(
            feed(&mut decoder, &[(false, true), (false, false), (false, true), (true, true)]),
            None
        );
    }

    #[test]
    fn test_counter_drains_one_step_at_a_time() {
        let counter = RotationCounter::new();
        counter.record(Rotation::Clockwise);
        counter.record(Rotation::Clockwise);
        counter.record(Rotation::CounterClockwise);
        assert_eq!(counter.pending(), 1);

        assert_eq!(counter.take_step(), Some(Rotation::Clockwise));
        assert_eq!(counter.take_step(), None);

        counter.record(Rotation::CounterClockwise);
        counter.record(Rotation::CounterClockwise);
        assert_eq!(counter.take_step(), Some(Rotation::CounterClockwise));
        assert_eq!(counter.pending(), -1);
        assert_eq!(counter.take_step(), Some(Rotation::CounterClockwise));
        assert_eq!(counter.take_step(), None);
    }
}
