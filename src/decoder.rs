//! Caption Decoder
//!
//! Ties together the packet framer and the four channel state machines.
//! This is the public integration point: `extract` queues caption
//! triplets from ATSC user-data blocks, `decode` drains the queue
//! through the channel state machines and returns the captions emitted
//! since the previous call.
//!
//! The decoder is best effort and self healing: no byte input ever
//! produces a caller-visible error, and sustained corruption triggers an
//! internal full reset.

use tracing::{debug, trace};

use crate::channel::{charset, Cea608Channel};
use crate::cue::{Channel, DecodedCaption};
use crate::packet::{odd_parity, parse_user_data};

/// Accumulated invalid triplets that force a full internal reset
pub const RESET_THRESHOLD: u32 = 45;

/// A queued caption byte pair awaiting `decode`
#[derive(Debug, Clone, Copy)]
struct CcTriplet {
    cc_header: u8,
    byte1: u8,
    byte2: u8,
    pts: f64,
}

/// CEA-608 closed caption decoder for ATSC A/53 user data.
///
/// One instance per media track; all state (channel grids, counters,
/// pending triplets) is owned by the instance, so independent decoders
/// never interfere.
#[derive(Debug)]
pub struct Decoder {
    /// Triplets queued by `extract`, drained by `decode`
    queue: Vec<CcTriplet>,
    /// CC1-CC4 state machines
    channels: [Cea608Channel; 4],
    /// Latched channel (0 or 1) within each field's pair
    field_channel: [usize; 2],
    /// Invalid triplets accumulated toward the reset threshold
    invalid_count: u32,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            channels: [
                Cea608Channel::new(Channel::Cc1),
                Cea608Channel::new(Channel::Cc2),
                Cea608Channel::new(Channel::Cc3),
                Cea608Channel::new(Channel::Cc4),
            ],
            field_channel: [0, 0],
            invalid_count: 0,
        }
    }

    /// Queue one ATSC user-data block with its presentation timestamp
    /// (seconds).
    ///
    /// Blocks that fail structural validation are dropped whole; framing
    /// loss never halts the pipeline and is not counted toward the reset
    /// threshold.
    pub fn extract(&mut self, user_data: &[u8], pts: f64) {
        match parse_user_data(user_data) {
            Ok(triplets) => {
                self.queue.extend(triplets.into_iter().map(|t| CcTriplet {
                    cc_header: t.cc_header,
                    byte1: t.byte1,
                    byte2: t.byte2,
                    pts,
                }));
            }
            Err(err) => {
                debug!(error = %err, pts, "dropped user data block");
            }
        }
    }

    /// Drain the queued triplets through the channel state machines and
    /// return the captions emitted since the previous call.
    ///
    /// Calling `decode` again without an intervening `extract` returns an
    /// empty sequence.
    pub fn decode(&mut self) -> Vec<DecodedCaption> {
        let queue = std::mem::take(&mut self.queue);
        let mut out = Vec::new();
        for triplet in queue {
            self.process_triplet(triplet, &mut out);
        }
        out
    }

    /// Force all channel state back to initial, discarding any buffered
    /// but undecoded triplets.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.reset_channels();
    }

    fn process_triplet(&mut self, triplet: CcTriplet, out: &mut Vec<DecodedCaption>) {
        let header = triplet.cc_header;
        if header & 0xF8 != 0xF8 {
            self.record_invalid();
            return;
        }
        if header & 0x04 == 0 {
            // cc_valid clear: ordinary padding
            return;
        }
        let field = match header & 0x03 {
            0 => 0,
            1 => 1,
            // DTVCC (CEA-708) packet bytes: out of scope, skipped
            _ => return,
        };

        let c1 = triplet.byte1 & 0x7F;
        let c2 = triplet.byte2 & 0x7F;
        if c1 == 0 && c2 == 0 {
            return;
        }

        if (0x10..=0x1F).contains(&c1) {
            // Control pair: both bytes must carry odd parity
            if !odd_parity(triplet.byte1) || !odd_parity(triplet.byte2) {
                self.record_invalid();
                return;
            }
            // The channel-select bit latches the active channel for this
            // field; data bytes follow the latch.
            self.field_channel[field] = usize::from(c1 & 0x08 != 0);
            let idx = field * 2 + self.field_channel[field];
            let stripped = c1 & !0x08;
            // Unrecognized pairs are never eligible for doubled-code
            // suppression: every occurrence counts toward the threshold.
            if !Cea608Channel::recognizes(stripped, c2) {
                trace!(
                    byte1 = format_args!("{stripped:#04x}"),
                    byte2 = format_args!("{c2:#04x}"),
                    "unrecognized control pair"
                );
                self.record_invalid();
                return;
            }
            if self.channels[idx].is_duplicate_control(c1, c2) {
                return;
            }
            self.channels[idx].control(stripped, c2, triplet.pts, out);
        } else {
            let idx = field * 2 + self.field_channel[field];
            self.channels[idx].clear_last_control();
            for raw in [triplet.byte1, triplet.byte2] {
                let mut c = raw & 0x7F;
                if c == 0 {
                    continue;
                }
                if !odd_parity(raw) {
                    // Bad parity on a printable byte: substitute the
                    // solid block rather than dropping the cell
                    c = 0x7F;
                }
                if let Some(glyph) = charset::basic(c) {
                    self.channels[idx].print(glyph, triplet.pts);
                }
            }
        }
    }

    fn record_invalid(&mut self) {
        self.invalid_count += 1;
        if self.invalid_count >= RESET_THRESHOLD {
            debug!(
                threshold = RESET_THRESHOLD,
                "sustained corruption, resetting all caption channels"
            );
            self.reset_channels();
        }
    }

    fn reset_channels(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.field_channel = [0, 0];
        self.invalid_count = 0;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
