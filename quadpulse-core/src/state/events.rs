//! Input events collected during one polling cycle

/// Edges seen since the previous poll
///
/// Each flag is set at most once per cycle; the control loop consumes the
/// whole batch and starts the next cycle from `InputEvents::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputEvents {
    /// Encoder moved one detent counter-clockwise
    pub rotate_left: bool,
    /// Encoder moved one detent clockwise
    pub rotate_right: bool,
    /// Encoder shaft clicked
    pub select: bool,
    /// Back button pressed
    pub back: bool,
    /// Output voltage mode button pressed
    pub mode: bool,
    /// Output enable button pressed
    pub enable: bool,
}

impl InputEvents {
    /// Check if nothing happened this cycle
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check if the encoder moved in either direction
    pub fn rotated(&self) -> bool {
        self.rotate_left || self.rotate_right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(InputEvents::default().is_empty());
        let events = InputEvents {
            back: true,
            ..Default::default()
        };
        assert!(!events.is_empty());
        assert!(!events.rotated());
    }

    #[test]
    fn test_rotated() {
        let events = InputEvents {
            rotate_right: true,
            ..Default::default()
        };
        assert!(events.rotated());
    }
}
