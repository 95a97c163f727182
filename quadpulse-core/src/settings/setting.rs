//! A single user-adjustable setting
//!
//! Settings are either continuous fixed-point numbers edited one decimal
//! digit at a time, or two-way toggles.

/// Errors returned when writing a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Value outside the setting's bounds
    OutOfRange,
    /// Operation does not apply to this kind of setting
    WrongKind,
    /// Slot index does not exist
    InvalidSlot,
}

/// Fixed-point number with inclusive bounds
///
/// The real-world magnitude is `value / 10^decimal_loc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Continuous {
    value: i32,
    min: i32,
    max: i32,
    decimal_loc: u8,
    num_digits: u8,
    current_digit: u8,
}

impl Continuous {
    /// Create a continuous value
    ///
    /// `value` is clamped into `[min, max]` and `num_digits` is raised to
    /// at least one so digit editing always has a target.
    pub const fn new(value: i32, min: i32, max: i32, num_digits: u8, decimal_loc: u8) -> Self {
        let value = if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        };
        Self {
            value,
            min,
            max,
            decimal_loc,
            num_digits: if num_digits == 0 { 1 } else { num_digits },
            current_digit: 0,
        }
    }

    /// Stored fixed-point value
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Lower bound (inclusive)
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Upper bound (inclusive)
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Position of the decimal point counted from the right
    pub fn decimal_loc(&self) -> u8 {
        self.decimal_loc
    }

    /// Number of editable digits
    pub fn num_digits(&self) -> u8 {
        self.num_digits
    }

    /// Digit currently being edited (0 = least significant)
    pub fn current_digit(&self) -> u8 {
        self.current_digit
    }

    /// Size of one step at the current digit
    pub fn step_size(&self) -> i32 {
        10i32.saturating_pow(self.current_digit as u32)
    }

    /// Move editing to the next more significant digit, wrapping to 0
    pub fn advance_digit(&mut self) {
        self.current_digit = (self.current_digit + 1) % self.num_digits;
    }

    /// Add one step at the current digit, pinning at `max`
    pub fn increment(&mut self) {
        self.value = self.value.saturating_add(self.step_size()).min(self.max);
    }

    /// Subtract one step at the current digit, pinning at `min`
    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(self.step_size()).max(self.min);
    }

    /// Write a value, rejecting anything outside the bounds
    pub fn set(&mut self, value: i32) -> Result<(), SettingsError> {
        if !self.contains(value) {
            return Err(SettingsError::OutOfRange);
        }
        self.value = value;
        Ok(())
    }

    /// Check a value against the bounds
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Boolean with a label for each position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Toggle {
    value: bool,
    labels: [&'static str; 2],
}

impl Toggle {
    /// Create a toggle; `off_label` is shown for `false`, `on_label` for `true`
    pub const fn new(value: bool, off_label: &'static str, on_label: &'static str) -> Self {
        Self {
            value,
            labels: [off_label, on_label],
        }
    }

    /// Current position
    pub fn value(&self) -> bool {
        self.value
    }

    /// Move to a position
    pub fn set(&mut self, value: bool) {
        self.value = value;
    }

    /// Switch to the other position
    pub fn flip(&mut self) {
        self.value = !self.value;
    }

    /// Labels in (false, true) order
    pub fn labels(&self) -> [&'static str; 2] {
        self.labels
    }

    /// Label of the active position
    pub fn active_label(&self) -> &'static str {
        self.labels[self.value as usize]
    }
}

/// Kind-specific part of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingKind {
    Continuous(Continuous),
    Toggle(Toggle),
}

/// One adjustable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Setting {
    name: &'static str,
    kind: SettingKind,
}

impl Setting {
    /// Create a continuous setting
    pub const fn continuous(name: &'static str, value: Continuous) -> Self {
        Self {
            name,
            kind: SettingKind::Continuous(value),
        }
    }

    /// Create a toggle setting
    pub const fn toggle(name: &'static str, value: Toggle) -> Self {
        Self {
            name,
            kind: SettingKind::Toggle(value),
        }
    }

    /// Display label
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get access to the underlying value
    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    /// Get mutable access to the underlying value
    pub fn kind_mut(&mut self) -> &mut SettingKind {
        &mut self.kind
    }

    /// The continuous value, if this is one
    pub fn as_continuous(&self) -> Option<&Continuous> {
        match &self.kind {
            SettingKind::Continuous(c) => Some(c),
            SettingKind::Toggle(_) => None,
        }
    }

    /// The continuous value for editing, if this is one
    pub fn as_continuous_mut(&mut self) -> Option<&mut Continuous> {
        match &mut self.kind {
            SettingKind::Continuous(c) => Some(c),
            SettingKind::Toggle(_) => None,
        }
    }

    /// The toggle, if this is one
    pub fn as_toggle(&self) -> Option<&Toggle> {
        match &self.kind {
            SettingKind::Toggle(t) => Some(t),
            SettingKind::Continuous(_) => None,
        }
    }

    /// The toggle for editing, if this is one
    pub fn as_toggle_mut(&mut self) -> Option<&mut Toggle> {
        match &mut self.kind {
            SettingKind::Toggle(t) => Some(t),
            SettingKind::Continuous(_) => None,
        }
    }
}
