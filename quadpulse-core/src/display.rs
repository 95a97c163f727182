//! Menu row layout
//!
//! Each setting occupies one text row of fixed width. A row is a short
//! list of styled spans so the renderer only has to draw text, invert it,
//! or frame it.

use heapless::{String, Vec};

use crate::settings::{Continuous, Setting, SettingKind, Toggle};
use crate::state::DeviceState;
use crate::traits::{DisplayError, StatusDisplay};

/// Characters per row in the 7x10 font
pub const CHARS_PER_ROW: usize = 18;

/// Capacity of one span's text
pub const SPAN_CAPACITY: usize = 24;

/// Maximum spans per row
pub const MAX_SPANS: usize = 8;

/// Text drawing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpanStyle {
    /// Drawn dark on light
    pub inverted: bool,
    /// Framed with a rectangle
    pub boxed: bool,
}

/// Run of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String<SPAN_CAPACITY>,
    pub style: SpanStyle,
}

/// One laid-out menu row
pub type Row = Vec<Span, MAX_SPANS>;

#[derive(Default)]
struct RowBuilder {
    row: Row,
}

impl RowBuilder {
    fn push_char(&mut self, c: char, style: SpanStyle) {
        if let Some(last) = self.row.last_mut() {
            if last.style == style && last.text.push(c).is_ok() {
                return;
            }
        }
        let mut text = String::new();
        // A fresh span always has room for one char
        let _ = text.push(c);
        // Rows are bounded by CHARS_PER_ROW; extra spans are dropped
        let _ = self.row.push(Span { text, style });
    }

    fn push_str(&mut self, s: &str, style: SpanStyle) {
        for c in s.chars() {
            self.push_char(c, style);
        }
    }

    fn pad(&mut self, count: usize) {
        for _ in 0..count {
            self.push_char(' ', SpanStyle::default());
        }
    }
}

/// Lay out the row for one setting
///
/// `highlighted` marks the cursor row; `editing` marks that the cursor
/// row is in edit mode.
pub fn layout_row(setting: &Setting, highlighted: bool, editing: bool) -> Row {
    let mut builder = RowBuilder::default();
    let name_style = SpanStyle {
        inverted: highlighted && !editing,
        boxed: false,
    };
    builder.push_str(setting.name(), name_style);
    builder.push_char(':', SpanStyle::default());

    let name_len = setting.name().chars().count();
    match setting.kind() {
        SettingKind::Continuous(value) => {
            layout_continuous(&mut builder, value, name_len, highlighted && editing)
        }
        SettingKind::Toggle(toggle) => {
            layout_toggle(&mut builder, toggle, name_len, highlighted && editing)
        }
    }

    builder.row
}

fn layout_continuous(builder: &mut RowBuilder, value: &Continuous, name_len: usize, editing: bool) {
    let digits = value.num_digits() as usize;
    let has_point = value.decimal_loc() != 0;
    builder.pad(CHARS_PER_ROW.saturating_sub(name_len + digits + 2 + has_point as usize));

    // Sign column, then zero-padded magnitude
    let sign = if value.value() < 0 { '-' } else { ' ' };
    let mut magnitude: String<12> = String::new();
    let _ = core::fmt::write(
        &mut magnitude,
        format_args!("{:0width$}", value.value().unsigned_abs(), width = digits),
    );

    builder.push_char(sign, SpanStyle::default());
    let total = magnitude.len();
    for (i, c) in magnitude.chars().enumerate() {
        // Position counted from the least significant digit
        let position = total - 1 - i;
        let style = SpanStyle {
            inverted: editing && position == value.current_digit() as usize,
            boxed: false,
        };
        builder.push_char(c, style);
        if position == value.decimal_loc() as usize && position != 0 {
            builder.push_char('.', SpanStyle::default());
        }
    }
}

fn layout_toggle(builder: &mut RowBuilder, toggle: &Toggle, name_len: usize, editing: bool) {
    let [off, on] = toggle.labels();
    builder.pad(
        CHARS_PER_ROW.saturating_sub(name_len + off.chars().count() + on.chars().count() + 2),
    );

    builder.push_str(
        off,
        SpanStyle {
            inverted: editing && !toggle.value(),
            boxed: !toggle.value(),
        },
    );
    builder.push_char(' ', SpanStyle::default());
    builder.push_str(
        on,
        SpanStyle {
            inverted: editing && toggle.value(),
            boxed: toggle.value(),
        },
    );
}

/// Draw every setting row and flush
pub fn render<D: StatusDisplay>(display: &mut D, state: &DeviceState) -> Result<(), DisplayError> {
    let cursor = state.cursor;
    for (index, setting) in state.settings.iter().enumerate() {
        let highlighted = index == cursor.slot();
        let row = layout_row(setting, highlighted, cursor.is_editing());
        display.draw_row(index, &row)?;
    }
    display.flush()
}
