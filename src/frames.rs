//! Animation frame sets for counters and spinners.
//!
//! The following predefined sets are available:
//! - `LINE`: ASCII line rotation (-, \, |, /), the default
//! - `DOT`: Braille dot pattern
//! - `MINI_DOT`: Smaller braille dot pattern
//! - `PULSE`: Block fade (█, ▓, ▒, ░)
//! - `POINTS`: Three dot bounce
//! - `METER`: Filling and draining meter
//!
//! ```rust
//! use pulse_widgets::frames::{Frames, LINE};
//!
//! assert_eq!(LINE.get(0), "-");
//! assert_eq!(LINE.get(5), "\\"); // wraps around
//!
//! let custom = Frames::new(["◐", "◓", "◑", "◒"]);
//! assert_eq!(custom.len(), 4);
//! ```

use once_cell::sync::Lazy;

/// An ordered, cyclic list of glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frames {
    glyphs: Vec<String>,
}

impl Frames {
    /// Creates a frame set from any list of glyphs.
    pub fn new<I, S>(glyphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            glyphs: glyphs.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of frames in the cycle.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// True when the set has no frames; widgets reject such sets.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Frame at `index`, wrapping modulo the set size.
    ///
    /// Returns an empty string for an empty set.
    pub fn get(&self, index: usize) -> &str {
        if self.glyphs.is_empty() {
            return "";
        }
        &self.glyphs[index % self.glyphs.len()]
    }
}

impl Default for Frames {
    fn default() -> Self {
        LINE.clone()
    }
}

/// ASCII line rotation.
pub static LINE: Lazy<Frames> = Lazy::new(|| Frames::new(["-", "\\", "|", "/"]));

/// Braille dot rotation.
pub static DOT: Lazy<Frames> =
    Lazy::new(|| Frames::new(["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]));

/// Compact braille rotation.
pub static MINI_DOT: Lazy<Frames> =
    Lazy::new(|| Frames::new(["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));

/// Block fade.
pub static PULSE: Lazy<Frames> = Lazy::new(|| Frames::new(["█", "▓", "▒", "░"]));

/// Bouncing point.
pub static POINTS: Lazy<Frames> = Lazy::new(|| Frames::new(["∙∙∙", "●∙∙", "∙●∙", "∙∙●"]));

/// Meter filling then draining.
pub static METER: Lazy<Frames> = Lazy::new(|| {
    Frames::new(["▱▱▱", "▰▱▱", "▰▰▱", "▰▰▰", "▰▰▱", "▰▱▱", "▱▱▱"])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_set_sizes() {
        assert_eq!(LINE.len(), 4);
        assert_eq!(DOT.len(), 8);
        assert_eq!(MINI_DOT.len(), 10);
        assert_eq!(PULSE.len(), 4);
        assert_eq!(POINTS.len(), 4);
        assert_eq!(METER.len(), 7);
    }

    #[test]
    fn test_line_order() {
        let frames: Vec<&str> = (0..4).map(|i| LINE.get(i)).collect();
        assert_eq!(frames, vec!["-", "\\", "|", "/"]);
    }

    #[test]
    fn test_get_wraps() {
        assert_eq!(PULSE.get(4), PULSE.get(0));
        assert_eq!(PULSE.get(7), "░");
    }

    #[test]
    fn test_empty_set() {
        let empty = Frames::new(Vec::<String>::new());
        assert!(empty.is_empty());
        assert_eq!(empty.get(3), "");
    }

    #[test]
    fn test_default_is_line() {
        assert_eq!(Frames::default(), *LINE);
    }
}
