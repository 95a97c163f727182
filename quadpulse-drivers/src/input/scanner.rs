//! Input polling

use embedded_hal::digital::InputPin;
use quadpulse_core::state::InputEvents;

use super::button::Button;
use super::encoder::{Rotation, RotationCounter};

/// Front panel buttons
pub struct Buttons<P> {
    pub back: Button<P>,
    pub select: Button<P>,
    pub mode: Button<P>,
    pub enable: Button<P>,
}

impl<P: InputPin> Buttons<P> {
    /// Group the four front panel buttons
    pub fn new(back: P, select: P, mode: P, enable: P) -> Self {
        Self {
            back: Button::new(back),
            select: Button::new(select),
            mode: Button::new(mode),
            enable: Button::new(enable),
        }
    }
}

/// Collects one `InputEvents` batch per control cycle
pub struct InputScanner<'a, P> {
    buttons: Buttons<P>,
    rotation: &'a RotationCounter,
}

impl<'a, P: InputPin> InputScanner<'a, P> {
    /// Create a scanner draining `rotation`
    pub fn new(buttons: Buttons<P>, rotation: &'a RotationCounter) -> Self {
        Self { buttons, rotation }
    }

    /// Sample every button and take at most one encoder detent
    pub fn poll(&mut self) -> InputEvents {
        let step = self.rotation.take_step();
        InputEvents {
            rotate_left: step == Some(Rotation::CounterClockwise),
            rotate_right: step == Some(Rotation::Clockwise),
            select: self.buttons.select.poll(),
            back: self.buttons.back.poll(),
            mode: self.buttons.mode.poll(),
            enable: self.buttons.enable.poll(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::button::tests::MockPin;

    #[test]
    fn test_scan() {
        let pins: [MockPin; 4] = Default::default();
        let buttons = Buttons::new(
            pins[0].clone(),
            pins[1].clone(),
            pins[2].clone(),
            pins[3].clone(),
        );
        let counter = RotationCounter::new();
        let mut scanner = InputScanner::new(buttons, &counter);

        assert!(scanner.poll().is_empty());

        counter.record(Rotation::Clockwise);
        counter.record(Rotation::Clockwise);
        pins[2].low.set(true);

        let events = scanner.poll();
        assert!(events.rotate_right);
        assert!(!events.rotate_left);
        assert!(events.mode);
        assert!(!events.back);

        // Second detent arrives on the next cycle; mode is still held
        let events = scanner.poll();
        assert!(events.rotate_right);
        assert!(!events.mode);

        assert!(scanner.poll().is_empty());
    }
}
