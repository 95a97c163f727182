//! Push button edge detection

use embedded_hal::digital::InputPin;

/// Reports only the released-to-pressed edge of an active-low button
///
/// Holding the button does not repeat. A pin read error counts as
/// released.
pub struct Button<P> {
    pin: P,
    pressed: bool,
}

impl<P: InputPin> Button<P> {
    /// Wrap an active-low input pin
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pressed: false,
        }
    }

    /// Sample the pin; true on the pressing edge only
    pub fn poll(&mut self) -> bool {
        let down = self.pin.is_low().unwrap_or(false);
        let edge = down && !self.pressed;
        self.pressed = down;
        edge
    }

    /// Level seen by the last poll
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    /// Pin whose level is shared with the test
    #[derive(Clone, Default)]
    pub(crate) struct MockPin {
        pub(crate) low: Rc<Cell<bool>>,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low.get())
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low.get())
        }
    }

    #[test]
    fn test_press_edge_only() {
        let pin = MockPin::default();
        let mut button = Button::new(pin.clone());

        assert!(!button.poll());
        pin.low.set(true);
        assert!(button.poll());
        // Held
        assert!(!button.poll());
        assert!(button.is_pressed());

        pin.low.set(false);
        assert!(!button.poll());
        pin.low.set(true);
        assert!(button.poll());
    }
}
