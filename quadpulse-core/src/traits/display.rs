//! Status display trait

use crate::display::Span;

/// Errors that can occur while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer to the panel failed
    Bus,
    /// Row index past the bottom of the panel
    OutOfBounds,
}

/// Row-oriented text display
///
/// The panel shows one menu row per setting. Rows are drawn into a frame
/// buffer and sent on `flush`.
pub trait StatusDisplay {
    /// Draw one row of styled spans
    fn draw_row(&mut self, row: usize, spans: &[Span]) -> Result<(), DisplayError>;

    /// Push the frame to the panel
    fn flush(&mut self) -> Result<(), DisplayError>;
}
