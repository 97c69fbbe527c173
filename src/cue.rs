//! Decoded Caption Cues
//!
//! Output types for the decoder: a `Cue` is a time interval plus an
//! ordered sequence of styled text runs and line breaks, and a
//! `DecodedCaption` tags a cue with the logical channel it came from.
//! Also contains the conversion from a displayed caption buffer to the
//! nested run sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::channel::cell::{CaptionColor, CaptionStyle};
use crate::channel::memory::CaptionMemory;

/// One of the four logical caption channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Cc1,
    Cc2,
    Cc3,
    Cc4,
}

impl Channel {
    /// Stable stream identifier for this channel
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Cc1 => "CC1",
            Channel::Cc2 => "CC2",
            Channel::Cc3 => "CC3",
            Channel::Cc4 => "CC4",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous run of identically styled text within a cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub color: CaptionColor,
    pub background: CaptionColor,
    pub underline: bool,
    pub italic: bool,
}

impl TextRun {
    pub fn new(text: String, style: CaptionStyle) -> Self {
        Self {
            text,
            color: style.color,
            background: style.background,
            underline: style.underline,
            italic: style.italic,
        }
    }
}

/// A node nested inside a cue: a styled run or a line break between rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NestedCue {
    Run(TextRun),
    LineBreak,
}

/// A timed caption: interval `[start_time, end_time)` plus nested runs.
///
/// All nested nodes share the cue's interval. Concatenating the run
/// texts, with line breaks as `\n`, reproduces the visible caption text
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start of the display interval, in seconds
    pub start_time: f64,
    /// End of the display interval, in seconds
    pub end_time: f64,
    /// Ordered styled runs and line breaks
    pub nested: Vec<NestedCue>,
}

impl Cue {
    /// Flatten the nested runs into plain text, one `\n` per line break
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.nested {
            match node {
                NestedCue::Run(run) => out.push_str(&run.text),
                NestedCue::LineBreak => out.push('\n'),
            }
        }
        out
    }
}

/// The externally visible output unit: a cue tagged with its channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCaption {
    pub stream: Channel,
    pub cue: Cue,
}

/// Build the nested run sequence from a displayed caption buffer.
///
/// Each visible row is partitioned into maximal runs of cells sharing an
/// identical style; rows are joined by a line break. Leading and
/// trailing unwritten cells of a row are trimmed; interior unwritten
/// cells render as spaces in the surrounding style.
pub(crate) fn nested_from_memory(memory: &CaptionMemory) -> Vec<NestedCue> {
    let mut nested = Vec::new();

    for row in memory.rows() {
        let (Some(first), Some(last)) = (row.first_occupied(), row.last_occupied()) else {
            continue;
        };
        if !nested.is_empty() {
            nested.push(NestedCue::LineBreak);
        }

        let mut run_text = String::new();
        let mut run_style: Option<CaptionStyle> = None;
        for cell in &row.cells[first..=last] {
            // Interior gaps take the running style rather than opening a
            // default-styled run for a bare space.
            let style = if cell.is_empty() {
                run_style.unwrap_or(cell.style)
            } else {
                cell.style
            };
            match run_style {
                Some(current) if current == style => {}
                Some(current) => {
                    nested.push(NestedCue::Run(TextRun::new(
                        std::mem::take(&mut run_text),
                        current,
                    )));
                }
                None => {}
            }
            run_style = Some(style);
            run_text.push(cell.display_char());
        }
        if let Some(style) = run_style {
            nested.push(NestedCue::Run(TextRun::new(run_text, style)));
        }
    }

    nested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::memory::CaptionMemory;

    fn styled(color: CaptionColor, underline: bool) -> CaptionStyle {
        CaptionStyle {
            color,
            underline,
            ..Default::default()
        }
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::Cc1.as_str(), "CC1");
        assert_eq!(Channel::Cc4.to_string(), "CC4");
    }

    #[test]
    fn test_empty_memory_yields_no_nodes() {
        let mem = CaptionMemory::new();
        assert!(nested_from_memory(&mem).is_empty());
    }

    #[test]
    fn test_single_run() {
        let mut mem = CaptionMemory::new();
        for (i, c) in "hello".chars().enumerate() {
            mem.write(0, i, c, CaptionStyle::default());
        }
        let nested = nested_from_memory(&mem);
        assert_eq!(nested.len(), 1);
        match &nested[0] {
            NestedCue::Run(run) => {
                assert_eq!(run.text, "hello");
                assert_eq!(run.color, CaptionColor::White);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_style_change_splits_runs() {
        let mut mem = CaptionMemory::new();
        mem.write(0, 0, 'a', styled(CaptionColor::White, false));
        mem.write(0, 1, 'b', styled(CaptionColor::Green, false));
        mem.write(0, 2, 'c', styled(CaptionColor::Green, false));

        let nested = nested_from_memory(&mem);
        assert_eq!(nested.len(), 2);
        let NestedCue::Run(first) = &nested[0] else {
            panic!("expected run");
        };
        let NestedCue::Run(second) = &nested[1] else {
            panic!("expected run");
        };
        assert_eq!(first.text, "a");
        assert_eq!(second.text, "bc");
        assert_eq!(second.color, CaptionColor::Green);
    }

    #[test]
    fn test_rows_joined_with_line_break() {
        let mut mem = CaptionMemory::new();
        mem.write(1, 0, 'a', CaptionStyle::default());
        mem.write(4, 0, 'b', CaptionStyle::default());

        let cue = Cue {
            start_time: 0.0,
            end_time: 1.0,
            nested: nested_from_memory(&mem),
        };
        assert_eq!(cue.text(), "a\nb");
    }

    #[test]
    fn test_leading_cells_trimmed_interior_gap_kept() {
        let mut mem = CaptionMemory::new();
        // Indented "hi x": columns 4,5 then a gap then 7
        mem.write(0, 4, 'h', CaptionStyle::default());
        mem.write(0, 5, 'i', CaptionStyle::default());
        mem.write(0, 7, 'x', CaptionStyle::default());

        let nested = nested_from_memory(&mem);
        assert_eq!(nested.len(), 1);
        let NestedCue::Run(run) = &nested[0] else {
            panic!("expected run");
        };
        assert_eq!(run.text, "hi x");
    }

    #[test]
    fn test_interior_gap_keeps_running_style() {
        let mut mem = CaptionMemory::new();
        let green = styled(CaptionColor::Green, false);
        mem.write(0, 0, 'a', green);
        mem.write(0, 2, 'b', green);

        let nested = nested_from_memory(&mem);
        // Gap adopts the green style: still one run
        assert_eq!(nested.len(), 1);
        let NestedCue::Run(run) = &nested[0] else {
            panic!("expected run");
        };
        assert_eq!(run.text, "a b");
        assert_eq!(run.color, CaptionColor::Green);
    }

    #[test]
    fn test_concatenated_runs_reproduce_text() {
        let mut mem = CaptionMemory::new();
        mem.write(0, 0, 'a', styled(CaptionColor::White, true));
        mem.write(0, 1, 'b', styled(CaptionColor::Red, false));
        mem.write(2, 0, 'c', CaptionStyle::default());

        let cue = Cue {
            start_time: 0.0,
            end_time: 0.5,
            nested: nested_from_memory(&mem),
        };
        assert_eq!(cue.text(), "ab\nc");
    }
}
