//! Caption Channel Module
//!
//! Per-channel CEA-608 state: the captioning mode, the pen, the cursor,
//! the two caption buffers (displayed and non-displayed) and the control
//! code handlers that drive them. This module contains:
//! - Cell representation with caption styling
//! - Fixed-geometry caption memory grids
//! - CEA-608 character set tables
//! - The channel state machine itself

pub mod cell;
pub mod charset;
pub mod memory;

pub use cell::{CaptionColor, CaptionStyle, Cell};
pub use memory::{CaptionMemory, CAPTION_COLS, CAPTION_ROWS};

use crate::cue::{self, Channel, Cue, DecodedCaption};

/// The active captioning mode of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionMode {
    /// Captions are composed off-screen and revealed atomically by EOC
    PopOn,
    /// Captions appear character by character as they arrive
    PaintOn,
    /// A fixed-height scrolling window of text lines
    RollUp(usize),
    /// Text service; content is consumed but never emitted as cues
    Text,
}

/// PAC row table indexed by `((byte1 << 1) & 0x0E) | ((byte2 >> 5) & 1)`.
///
/// The encoding has no code for index 1, so it falls back to row 11 like
/// index 0.
const PAC_ROWS: [usize; 16] = [10, 10, 0, 1, 2, 3, 11, 12, 13, 14, 4, 5, 6, 7, 8, 9];

/// State machine for one logical caption channel (CC1-CC4)
#[derive(Debug, Clone)]
pub(crate) struct Cea608Channel {
    channel: Channel,
    mode: CaptionMode,
    /// The two caption buffers; `displayed` indexes the visible one
    buffers: [CaptionMemory; 2],
    displayed: usize,
    row: usize,
    col: usize,
    /// Current pen style applied to subsequently written characters
    pen: CaptionStyle,
    /// Base (bottom) row of the roll-up window
    base_row: usize,
    /// Start time of the cue currently on screen, if one is open
    open_time: Option<f64>,
    /// Last applied control pair, for doubled-code suppression
    last_control: Option<(u8, u8)>,
    /// Cell the last character was written to; extended characters
    /// overwrite it
    last_print: Option<(usize, usize)>,
}

impl Cea608Channel {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            mode: CaptionMode::PopOn,
            buffers: [CaptionMemory::new(), CaptionMemory::new()],
            displayed: 0,
            row: CAPTION_ROWS - 1,
            col: 0,
            pen: CaptionStyle::default(),
            base_row: CAPTION_ROWS - 1,
            open_time: None,
            last_control: None,
            last_print: None,
        }
    }

    /// Revert the channel to its freshly constructed state
    pub fn reset(&mut self) {
        *self = Self::new(self.channel);
    }

    pub fn displayed(&self) -> &CaptionMemory {
        &self.buffers[self.displayed]
    }

    fn displayed_mut(&mut self) -> &mut CaptionMemory {
        &mut self.buffers[self.displayed]
    }

    fn non_displayed_mut(&mut self) -> &mut CaptionMemory {
        &mut self.buffers[1 - self.displayed]
    }

    /// The buffer characters and erase operations act on in the current
    /// mode, or `None` while in text mode.
    fn write_target_mut(&mut self) -> Option<&mut CaptionMemory> {
        match self.mode {
            CaptionMode::PopOn => Some(&mut self.buffers[1 - self.displayed]),
            CaptionMode::PaintOn | CaptionMode::RollUp(_) => {
                Some(&mut self.buffers[self.displayed])
            }
            CaptionMode::Text => None,
        }
    }

    /// Pure classification of a control pair (byte1 with the
    /// channel-select bit stripped). The categories mirror `control`;
    /// doubling suppression applies only to pairs this recognizes.
    pub fn recognizes(byte1: u8, byte2: u8) -> bool {
        matches!(
            (byte1, byte2),
            (0x10..=0x17, 0x40..=0x7F)
                | (0x10..=0x11, 0x20..=0x2F)
                | (0x11, 0x30..=0x3F)
                | (0x12..=0x13, 0x20..=0x3F)
                | (0x14 | 0x15, 0x20..=0x2F)
                | (0x17, 0x21..=0x23)
                | (0x17, 0x2D..=0x2F)
        )
    }

    /// Doubled control pairs are deliberate redundancy: the second
    /// occurrence of a byte-identical pair is a no-op, a third applies
    /// again.
    pub fn is_duplicate_control(&mut self, byte1: u8, byte2: u8) -> bool {
        if self.last_control == Some((byte1, byte2)) {
            self.last_control = None;
            true
        } else {
            self.last_control = Some((byte1, byte2));
            false
        }
    }

    /// Printable data ends any pending doubled-control match
    pub fn clear_last_control(&mut self) {
        self.last_control = None;
    }

    /// Write a displayable character at the cursor with the current pen.
    ///
    /// The cursor advances one column, clamped at the right edge of the
    /// row. A write that becomes visible while no cue is open opens one
    /// at this character's PTS.
    pub fn print(&mut self, c: char, pts: f64) {
        let (row, col, pen) = (self.row, self.col, self.pen);
        let visible = matches!(self.mode, CaptionMode::PaintOn | CaptionMode::RollUp(_));
        let Some(target) = self.write_target_mut() else {
            return;
        };
        target.write(row, col, c, pen);
        self.last_print = Some((row, col));
        if self.col < CAPTION_COLS - 1 {
            self.col += 1;
        }
        if visible && self.open_time.is_none() {
            self.open_time = Some(pts);
        }
    }

    /// Apply a control pair. `byte1` has the channel-select bit already
    /// stripped (0x10-0x17); both bytes have parity stripped. Returns
    /// false if the pair is unrecognized.
    pub fn control(
        &mut self,
        byte1: u8,
        byte2: u8,
        pts: f64,
        out: &mut Vec<DecodedCaption>,
    ) -> bool {
        match (byte1, byte2) {
            (0x10..=0x17, 0x40..=0x7F) => {
                self.control_pac(byte1, byte2);
                true
            }
            (0x10, 0x20..=0x2F) => {
                self.control_background(byte2);
                true
            }
            (0x11, 0x20..=0x2F) => {
                self.control_midrow(byte2);
                true
            }
            (0x11, 0x30..=0x3F) => match charset::special(byte2) {
                Some(c) => {
                    self.print(c, pts);
                    true
                }
                None => false,
            },
            (0x12, 0x20..=0x3F) => self.write_extended(charset::extended_spanish_french(byte2), pts),
            (0x13, 0x20..=0x3F) => {
                self.write_extended(charset::extended_portuguese_german(byte2), pts)
            }
            (0x14 | 0x15, 0x20..=0x2F) => self.control_misc(byte2, pts, out),
            (0x17, 0x21..=0x23) => {
                // Tab offset: cursor right by 1-3 columns
                let offset = (byte2 - 0x20) as usize;
                self.col = (self.col + offset).min(CAPTION_COLS - 1);
                true
            }
            (0x17, 0x2D) => {
                self.pen.background = CaptionColor::Transparent;
                true
            }
            (0x17, 0x2E) => {
                self.pen.color = CaptionColor::Black;
                true
            }
            (0x17, 0x2F) => {
                self.pen.color = CaptionColor::Black;
                self.pen.underline = true;
                true
            }
            _ => false,
        }
    }

    /// Preamble Address Code: cursor to an explicit row plus either a
    /// color/underline preamble or an indent. In roll-up mode the window
    /// base moves instead, carrying the visible rows along.
    fn control_pac(&mut self, byte1: u8, byte2: u8) {
        let idx = (((byte1 << 1) & 0x0E) | ((byte2 >> 5) & 1)) as usize;
        let row = PAC_ROWS[idx];

        let underline = byte2 & 0x01 != 0;
        let code = (byte2 >> 1) & 0x0F;
        let mut style = CaptionStyle {
            underline,
            background: self.pen.background,
            ..Default::default()
        };
        let mut col = 0;
        if code & 0x08 != 0 {
            // Indent PAC: white text at a multiple of four columns
            col = ((code & 0x07) as usize) * 4;
        } else if code == 0x07 {
            style.italic = true;
        } else {
            style.color = CaptionColor::from_code(code);
        }

        if let CaptionMode::RollUp(window) = self.mode {
            // The window must fit above the new base row
            let new_base = row.max(window - 1);
            if new_base != self.base_row {
                let old_base = self.base_row;
                self.displayed_mut().relocate_window(old_base, new_base, window);
                self.base_row = new_base;
            }
            self.row = self.base_row;
        } else {
            self.row = row;
        }
        self.col = col;
        self.pen = style;
    }

    /// Mid-row code: restyle the pen without moving the cursor or
    /// writing a character. A color assignment cancels italics.
    fn control_midrow(&mut self, byte2: u8) {
        let code = (byte2 >> 1) & 0x07;
        self.pen.underline = byte2 & 0x01 != 0;
        if code == 0x07 {
            self.pen.italic = true;
        } else {
            self.pen.color = CaptionColor::from_code(code);
            self.pen.italic = false;
        }
    }

    /// Background attribute code: color slot 7 is black; the
    /// semi-transparency bit maps to the flat color.
    fn control_background(&mut self, byte2: u8) {
        let code = (byte2 >> 1) & 0x07;
        self.pen.background = if code == 0x07 {
            CaptionColor::Black
        } else {
            CaptionColor::from_code(code)
        };
    }

    fn control_misc(&mut self, byte2: u8, pts: f64, out: &mut Vec<DecodedCaption>) -> bool {
        match byte2 {
            0x20 => self.enter_mode(CaptionMode::PopOn, pts, out), // RCL
            0x21 => self.control_backspace(),
            0x22 | 0x23 => {} // AOF/AON: no display effect
            0x24 => {
                // DER: erase from the cursor to the end of the row
                let (row, col) = (self.row, self.col);
                if let Some(target) = self.write_target_mut() {
                    target.erase_to_end_of_row(row, col);
                }
            }
            0x25 => self.control_rollup(2, pts, out),
            0x26 => self.control_rollup(3, pts, out),
            0x27 => self.control_rollup(4, pts, out),
            0x28 => {} // FON: flash is not a supported style
            0x29 => self.enter_mode(CaptionMode::PaintOn, pts, out), // RDC
            0x2A | 0x2B => self.enter_mode(CaptionMode::Text, pts, out), // TR/RTD
            0x2C => self.control_edm(pts, out),
            0x2D => self.control_cr(pts, out),
            0x2E => self.non_displayed_mut().erase(), // ENM
            0x2F => self.control_eoc(pts, out),
            _ => return false,
        }
        true
    }

    /// Backspace: cursor left one column, erasing the cell it lands on
    fn control_backspace(&mut self) {
        if self.col == 0 {
            return;
        }
        self.col -= 1;
        let (row, col) = (self.row, self.col);
        if let Some(target) = self.write_target_mut() {
            target.erase_cell(row, col);
        }
    }

    /// Extended characters arrive after a standard-space fallback; the
    /// mapped glyph overwrites the fallback cell. The fallback sits one
    /// column behind the cursor, unless the cursor was already clamped
    /// at the right edge when it was written.
    fn write_extended(&mut self, glyph: Option<char>, pts: f64) -> bool {
        let Some(c) = glyph else {
            return false;
        };
        let fallback = self.last_print.filter(|&(row, col)| {
            row == self.row && (col + 1 == self.col || (col == self.col && col == CAPTION_COLS - 1))
        });
        match fallback {
            Some((_, col)) => self.col = col,
            None if self.col > 0 => self.col -= 1,
            None => {}
        }
        self.print(c, pts);
        true
    }

    /// Erase Displayed Memory: close the open cue, then blank the screen
    fn control_edm(&mut self, pts: f64, out: &mut Vec<DecodedCaption>) {
        self.emit(pts, out);
        self.displayed_mut().erase();
        self.open_time = None;
    }

    /// End Of Caption: reveal the composed buffer by swapping, and open
    /// a new cue at this PTS. EOC also forces pop-on mode.
    fn control_eoc(&mut self, pts: f64, out: &mut Vec<DecodedCaption>) {
        self.emit(pts, out);
        self.displayed = 1 - self.displayed;
        self.mode = CaptionMode::PopOn;
        self.reopen_if_visible(pts);
    }

    /// Carriage return: only meaningful in roll-up mode, where it scrolls
    /// the window and cuts a cue boundary.
    fn control_cr(&mut self, pts: f64, out: &mut Vec<DecodedCaption>) {
        let CaptionMode::RollUp(window) = self.mode else {
            return;
        };
        self.emit(pts, out);
        let base = self.base_row;
        self.displayed_mut().shift_window_up(base, window);
        self.row = self.base_row;
        self.col = 0;
        self.reopen_if_visible(pts);
    }

    /// Roll-Up-N: entering roll-up from another mode is a cue boundary;
    /// repeated RU codes just resize the window.
    fn control_rollup(&mut self, window: usize, pts: f64, out: &mut Vec<DecodedCaption>) {
        if matches!(self.mode, CaptionMode::RollUp(_)) {
            self.mode = CaptionMode::RollUp(window);
            return;
        }
        self.emit(pts, out);
        self.mode = CaptionMode::RollUp(window);
        self.base_row = CAPTION_ROWS - 1;
        self.row = self.base_row;
        self.col = 0;
        self.reopen_if_visible(pts);
    }

    /// Mode switch with visible content is a cue boundary; the display
    /// itself is left intact (only EDM clears it).
    fn enter_mode(&mut self, mode: CaptionMode, pts: f64, out: &mut Vec<DecodedCaption>) {
        if self.mode == mode {
            return;
        }
        self.emit(pts, out);
        self.mode = mode;
        if mode == CaptionMode::Text {
            self.open_time = None;
        } else {
            self.reopen_if_visible(pts);
        }
    }

    /// Close the open cue at `end`, emitting it if the display holds
    /// content. The nested runs are computed now, before any mutation the
    /// boundary event applies.
    fn emit(&mut self, end: f64, out: &mut Vec<DecodedCaption>) {
        let Some(start) = self.open_time.take() else {
            return;
        };
        let nested = cue::nested_from_memory(self.displayed());
        if nested.is_empty() {
            return;
        }
        out.push(DecodedCaption {
            stream: self.channel,
            cue: Cue {
                start_time: start,
                end_time: end.max(start),
                nested,
            },
        });
    }

    fn reopen_if_visible(&mut self, pts: f64) {
        self.open_time = if self.displayed().is_empty() {
            None
        } else {
            Some(pts)
        };
    }
}
