//! Typed numeric values overriding the mouse.

use crate::event::Key;
use config::constants::NUM_INPUT_MAX_CHARS;

/// Per-axis numeric entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericInput {
    /// Highest axis index the mode uses
    pub idx_max: usize,
    /// Axis being typed
    pub idx: usize,
    /// Unedited axes read as 1 instead of 0
    pub null_one: [bool; 3],
    /// Negative values clamp to 0
    pub no_negative: [bool; 3],
    /// A single typed value applies to every axis
    pub affect_all: bool,
    /// Values are typed in degrees and applied in radians
    pub unit_rotation: bool,
    text: [String; 3],
    negate: [bool; 3],
    edited: [bool; 3],
}

impl NumericInput {
    /// Entry for `idx_max + 1` axes.
    pub fn new(idx_max: usize) -> Self {
        Self {
            idx_max: idx_max.min(2),
            ..Self::default()
        }
    }

    /// True once any axis was typed.
    pub fn is_active(&self) -> bool {
        self.edited.iter().any(|e| *e)
    }

    /// Discards everything typed.
    pub fn clear(&mut self) {
        self.idx = 0;
        self.text = Default::default();
        self.negate = [false; 3];
        self.edited = [false; 3];
    }

    /// Feeds a key; returns true when it was consumed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        let i = self.idx;
        match key {
            Key::Digit(d) if d <= 9 => self.push_char(char::from(b'0' + d)),
            Key::Period => {
                if self.text[i].contains('.') {
                    return false;
                }
                self.push_char('.')
            }
            Key::Minus => {
                self.negate[i] = !self.negate[i];
                self.edited[i] = true;
                true
            }
            Key::Backspace => {
                if !self.edited[i] {
                    return false;
                }
                if self.text[i].pop().is_none() {
                    self.negate[i] = false;
                }
                if self.text[i].is_empty() && !self.negate[i] {
                    self.edited[i] = false;
                }
                true
            }
            Key::Tab => {
                if self.idx_max == 0 || !self.is_active() {
                    return false;
                }
                self.idx = (self.idx + 1) % (self.idx_max + 1);
                true
            }
            _ => false,
        }
    }

    fn push_char(&mut self, c: char) -> bool {
        let i = self.idx;
        if self.text[i].len() >= NUM_INPUT_MAX_CHARS {
            return false;
        }
        self.text[i].push(c);
        self.edited[i] = true;
        true
    }

    fn value(&self, i: usize) -> f64 {
        let magnitude = match self.text[i].as_str() {
            "" | "." => {
                if self.null_one[i] {
                    1.0
                } else {
                    0.0
                }
            }
            text => text.parse::<f64>().unwrap_or(0.0),
        };
        if self.negate[i] {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Overwrites `values` with the typed numbers; returns false (leaving
    /// `values` untouched) while nothing is typed.
    pub fn apply(&self, values: &mut [f64]) -> bool {
        if !self.is_active() {
            return false;
        }
        let spread = self.affect_all && self.idx_max > 0 && self.edited[0] && !self.edited[1..].iter().any(|e| *e);
        for (i, out) in values.iter_mut().enumerate().take(self.idx_max + 1) {
            let src = if spread { 0 } else { i };
            let mut v = if self.edited[src] {
                self.value(src)
            } else if self.null_one[i] {
                1.0
            } else {
                0.0
            };
            if self.no_negative[i] && v < 0.0 {
                v = 0.0;
            }
            if self.unit_rotation {
                v = v.to_radians();
            }
            *out = v;
        }
        true
    }

    /// Typed text of every axis for header display.
    pub fn text(&self) -> String {
        (0..=self.idx_max)
            .map(|i| {
                let sign = if self.negate[i] { "-" } else { "" };
                let body = if self.text[i].is_empty() { "0" } else { &self.text[i] };
                let cursor = if i == self.idx { "|" } else { "" };
                format!("{sign}{body}{cursor}")
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
