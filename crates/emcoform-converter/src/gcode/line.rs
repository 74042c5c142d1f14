//! Source lines and the parsed field view the pipeline stages work against

use std::fmt;

use super::token::{self, Token};

/// Motion group command of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionCode {
    /// G0 rapid traverse
    Rapid,
    /// G1 linear feed
    Linear,
    /// G2 clockwise arc
    ArcClockwise,
    /// G3 counter-clockwise arc
    ArcCounterClockwise,
}

impl MotionCode {
    /// Map a G code number to a motion code
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Rapid),
            1 => Some(Self::Linear),
            2 => Some(Self::ArcClockwise),
            3 => Some(Self::ArcCounterClockwise),
            _ => None,
        }
    }

    /// G code number of this motion
    pub fn code(&self) -> u8 {
        match self {
            Self::Rapid => 0,
            Self::Linear => 1,
            Self::ArcClockwise => 2,
            Self::ArcCounterClockwise => 3,
        }
    }

    /// Whether this is circular interpolation
    pub fn is_arc(&self) -> bool {
        matches!(self, Self::ArcClockwise | Self::ArcCounterClockwise)
    }
}

impl fmt::Display for MotionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.code())
    }
}

/// Structured view of a line's words
///
/// Fields are extracted independently; any of them may be absent. A line may
/// carry axis values without a motion code of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFields {
    pub motion: Option<MotionCode>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub i: Option<f64>,
    pub j: Option<f64>,
    pub feed: Option<f64>,
    pub tool: Option<u32>,
    pub sequence_number: Option<u32>,
    /// Any G word at all, motion or not
    pub has_g_word: bool,
    /// An `M6` tool change word is present
    pub tool_change: bool,
}

impl ParsedFields {
    /// Extract fields from a token list; the first occurrence of each address wins
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut fields = Self::default();

        for (index, token) in tokens.iter().enumerate() {
            let Some(address) = token.address() else {
                continue;
            };
            let value = token.number();
            match address {
                "G" => {
                    fields.has_g_word = true;
                    if fields.motion.is_none() {
                        fields.motion = token.code().and_then(MotionCode::from_code);
                    }
                }
                "M" if token.code() == Some(6) => fields.tool_change = true,
                "X" => fields.x = fields.x.or(value),
                "Y" => fields.y = fields.y.or(value),
                "Z" => fields.z = fields.z.or(value),
                "I" => fields.i = fields.i.or(value),
                "J" => fields.j = fields.j.or(value),
                "F" => fields.feed = fields.feed.or(value),
                "T" => fields.tool = fields.tool.or(token.code()),
                "N" if index == 0 => fields.sequence_number = token.code(),
                _ => {}
            }
        }

        fields
    }

    /// Whether the line moves in the XY plane
    pub fn has_xy(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// One input line travelling through the pipeline
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// 1-based line number in the source program
    pub line_number: usize,
    /// Text exactly as read
    pub original: String,
    /// Code text before tokenizing (comments removed by the stripper)
    pub code: String,
    /// Comment bodies removed from the line
    pub comments: Vec<String>,
    /// Current tokens
    pub tokens: Vec<Token>,
    /// A rapid move on this line was turned into a feed move
    pub reclassified: bool,
    /// Arc parameters on this line were rewritten
    pub arc_converted: bool,
}

impl SourceLine {
    /// Wrap a raw input line
    pub fn new(line_number: usize, raw: impl Into<String>) -> Self {
        let original = raw.into();
        Self {
            line_number,
            code: original.trim().to_string(),
            original,
            comments: Vec::new(),
            tokens: Vec::new(),
            reclassified: false,
            arc_converted: false,
        }
    }

    /// Parsed view of the current tokens
    pub fn fields(&self) -> ParsedFields {
        ParsedFields::from_tokens(&self.tokens)
    }

    /// Current tokens as a single-spaced line
    pub fn render(&self) -> String {
        token::render(&self.tokens)
    }

    /// Index of the first word with the given address
    pub fn position(&self, address: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t.is_word(address))
    }

    /// Whether any word with the given address is present
    pub fn has_word(&self, address: &str) -> bool {
        self.position(address).is_some()
    }

    /// Remove every word with the given address, returning how many were removed
    pub fn remove_words(&mut self, address: &str) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|t| !t.is_word(address));
        before - self.tokens.len()
    }

    /// Append a word at the end of the line
    pub fn push_word(&mut self, address: &str, value: impl Into<String>) {
        self.tokens.push(Token::word(address, value));
    }

    /// Index of the word selecting the motion code
    pub fn motion_position(&self) -> Option<usize> {
        self.tokens.iter().position(|t| {
            t.is_word("G") && t.code().and_then(MotionCode::from_code).is_some()
        })
    }

    /// Replace the motion code, keeping the source's zero padding (`G00` → `G01`)
    pub fn set_motion(&mut self, motion: MotionCode) -> bool {
        let Some(index) = self.motion_position() else {
            return false;
        };
        if let Token::Word { value, .. } = &mut self.tokens[index] {
            let width = value.len().max(1);
            *value = format!("{:0width$}", motion.code(), width = width);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::token::tokenize;

    fn line(text: &str) -> SourceLine {
        let mut line = SourceLine::new(1, text);
        line.tokens = tokenize(text);
        line
    }

    #[test]
    fn test_fields_extracted_independently() {
        let fields = line("N40 G02 X10 Y-5 I2.5 J0 F300").fields();
        assert_eq!(fields.sequence_number, Some(40));
        assert_eq!(fields.motion, Some(MotionCode::ArcClockwise));
        assert_eq!(fields.x, Some(10.0));
        assert_eq!(fields.y, Some(-5.0));
        assert_eq!(fields.z, None);
        assert_eq!(fields.i, Some(2.5));
        assert_eq!(fields.j, Some(0.0));
        assert_eq!(fields.feed, Some(300.0));
    }

    #[test]
    fn test_axis_values_without_motion_code() {
        let fields = line("X1 Y2").fields();
        assert_eq!(fields.motion, None);
        assert!(fields.has_xy());
        assert!(!fields.has_g_word);
    }

    #[test]
    fn test_non_motion_g_word() {
        let fields = line("G17 G0 X1").fields();
        assert!(fields.has_g_word);
        assert_eq!(fields.motion, Some(MotionCode::Rapid));
    }

    #[test]
    fn test_tool_change_detection() {
        let fields = line("M06 T3").fields();
        assert!(fields.tool_change);
        assert_eq!(fields.tool, Some(3));
        assert!(!line("M03 S1000").fields().tool_change);
    }

    #[test]
    fn test_set_motion_keeps_padding() {
        let mut l = line("G00 Z-1");
        assert!(l.set_motion(MotionCode::Linear));
        assert_eq!(l.render(), "G01 Z-1");

        let mut l = line("G0 X1");
        l.set_motion(MotionCode::Linear);
        assert_eq!(l.render(), "G1 X1");

        let mut l = line("X1");
        assert!(!l.set_motion(MotionCode::Linear));
    }

    #[test]
    fn test_remove_and_push_words() {
        let mut l = line("G1 X1 F100 F200");
        assert_eq!(l.remove_words("F"), 2);
        l.push_word("F", "50");
        assert_eq!(l.render(), "G1 X1 F50");
    }
}
