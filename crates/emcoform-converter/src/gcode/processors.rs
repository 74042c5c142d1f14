//! Line processor implementations

use emcoform_core::{ConversionError, ConversionParameters, ConversionResult};

use super::line::MotionCode;
use super::profile::{ArcStrategy, CommentSyntax, DialectProfile};
use super::token::{pad_decimal, tokenize, Token};
use super::{ConversionState, LineDisposition, LineProcessor, SourceLine};

// ============================================================================
// Lexical stages
// ============================================================================

/// Removes G-code comments from a line
///
/// Comments can be:
/// - Parentheses: (this is a comment)
/// - Semicolon: G01 X10 ; move to X10
///
/// The removed text is kept on the line so the dialect filter can screen it.
#[derive(Debug, Clone)]
pub struct CommentStripper {
    syntax: CommentSyntax,
}

impl CommentStripper {
    /// Create a new comment stripper
    pub fn new(syntax: CommentSyntax) -> Self {
        Self { syntax }
    }

    /// Split a line into its code and the bodies of its comments
    pub fn strip(&self, text: &str) -> (String, Vec<String>) {
        let mut code = String::with_capacity(text.len());
        let mut comments = Vec::new();
        let mut rest = text;

        loop {
            let paren = if self.syntax.parentheses {
                rest.find('(')
            } else {
                None
            };
            let semicolon = if self.syntax.semicolon {
                rest.find(';')
            } else {
                None
            };

            match (paren, semicolon) {
                (Some(start), semi) if semi.map_or(true, |s| start < s) => {
                    code.push_str(&rest[..start]);
                    code.push(' ');
                    match rest[start..].find(')') {
                        Some(len) => {
                            comments.push(rest[start + 1..start + len].to_string());
                            rest = &rest[start + len + 1..];
                        }
                        None => {
                            // Unmatched parenthesis - comment runs to end of line
                            comments.push(rest[start + 1..].to_string());
                            break;
                        }
                    }
                }
                (_, Some(start)) => {
                    code.push_str(&rest[..start]);
                    comments.push(rest[start + 1..].to_string());
                    break;
                }
                _ => {
                    code.push_str(rest);
                    break;
                }
            }
        }

        (code.trim().to_string(), comments)
    }
}

impl LineProcessor for CommentStripper {
    fn name(&self) -> &str {
        "comment_stripper"
    }

    fn description(&self) -> &str {
        "Removes G-code comments (parentheses and semicolon style)"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        let (code, comments) = self.strip(&line.code);
        line.code = code;
        line.comments.extend(comments);
        Ok(LineDisposition::Keep)
    }
}

/// Splits the comment-free code into tokens
#[derive(Debug, Clone, Default)]
pub struct LineTokenizer;

impl LineProcessor for LineTokenizer {
    fn name(&self) -> &str {
        "tokenizer"
    }

    fn description(&self) -> &str {
        "Splits a line into address words, bare numbers and symbols"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        line.tokens = tokenize(&line.code);
        Ok(LineDisposition::Keep)
    }
}

/// Drops the source program's own `N` block number
#[derive(Debug, Clone, Default)]
pub struct SequenceNumberStripper;

impl LineProcessor for SequenceNumberStripper {
    fn name(&self) -> &str {
        "sequence_stripper"
    }

    fn description(&self) -> &str {
        "Removes leading N sequence numbers"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        if line.fields().sequence_number.is_some() {
            line.tokens.remove(0);
        }
        Ok(LineDisposition::Keep)
    }
}

/// Rewrites tool changes into the canonical `M6 T<n>` form
///
/// Handles both `M06T1` and `T1 M06`; the pair lands where its first word was.
#[derive(Debug, Clone, Default)]
pub struct ToolChangeNormalizer;

impl LineProcessor for ToolChangeNormalizer {
    fn name(&self) -> &str {
        "tool_change_normalizer"
    }

    fn description(&self) -> &str {
        "Normalizes tool change syntax to M6 T<n>"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        let change = line.tokens.iter().position(|t| t.is_code("M", 6));
        let tool = line.tokens.iter().enumerate().find_map(|(index, t)| match t {
            Token::Word { address, value } if address == "T" => Some((index, value.clone())),
            _ => None,
        });

        if let (Some(change), Some((tool, tool_value))) = (change, tool) {
            let at = change.min(tool);
            let (first, second) = if change > tool {
                (change, tool)
            } else {
                (tool, change)
            };
            line.tokens.remove(first);
            line.tokens.remove(second);
            line.tokens.insert(at, Token::word("T", tool_value));
            line.tokens.insert(at, Token::word("M", "6"));
        }
        Ok(LineDisposition::Keep)
    }
}

// ============================================================================
// Filtering and validation
// ============================================================================

/// Rejects lines carrying directives the target controller must not see
///
/// Matching is case-insensitive substring containment. When rapid-line
/// salvage is on, a rejected rapid move gets its header tokens (`G90`, `G54`,
/// `A0`, `S<n>`, `M3`) removed and is tested once more.
#[derive(Debug, Clone)]
pub struct DialectFilter {
    reject_codes: Vec<String>,
    screen_comments: bool,
    salvage_rapid_lines: bool,
}

impl DialectFilter {
    /// Create a filter from a profile's rules
    pub fn from_profile(profile: &DialectProfile) -> Self {
        Self {
            reject_codes: profile.reject_codes.clone(),
            screen_comments: profile.screen_comments,
            salvage_rapid_lines: profile.salvage_rapid_lines,
        }
    }

    /// Whether the line, as it stands, must be dropped
    pub fn is_rejected(&self, line: &SourceLine) -> bool {
        let mut text = line.render().to_uppercase();
        if self.screen_comments {
            for comment in &line.comments {
                text.push(' ');
                text.push_str(&comment.to_uppercase());
            }
        }
        self.reject_codes
            .iter()
            .any(|code| text.contains(code.as_str()))
    }

    fn is_salvage_token(token: &Token) -> bool {
        token.is_code("G", 90)
            || token.is_code("G", 54)
            || token.is_code("M", 3)
            || token.is_word("S")
            || (token.is_word("A") && token.number() == Some(0.0))
    }
}

impl LineProcessor for DialectFilter {
    fn name(&self) -> &str {
        "dialect_filter"
    }

    fn description(&self) -> &str {
        "Drops lines containing codes the target controller does not accept"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        if !self.is_rejected(line) {
            return Ok(LineDisposition::Keep);
        }

        if self.salvage_rapid_lines && line.fields().motion == Some(MotionCode::Rapid) {
            line.tokens.retain(|t| !Self::is_salvage_token(t));
            if !self.is_rejected(line) {
                tracing::debug!(
                    "Salvaged rapid line {} as '{}'",
                    line.line_number,
                    line.render()
                );
                return Ok(LineDisposition::Keep);
            }
        }

        Ok(LineDisposition::Reject)
    }
}

/// Fails the run on any word that should hold a number but does not
#[derive(Debug, Clone, Default)]
pub struct NumericValidator;

impl NumericValidator {
    const NUMERIC_ADDRESSES: [&'static str; 9] = ["X", "Y", "Z", "I", "J", "K", "R", "F", "S"];

    fn is_malformed(token: &Token) -> bool {
        match token {
            Token::Word { address, value } if value.is_empty() => {
                Self::NUMERIC_ADDRESSES.contains(&address.as_str())
            }
            Token::Word { .. } | Token::Number(_) => token.number().is_none(),
            Token::Other(_) => false,
        }
    }
}

impl LineProcessor for NumericValidator {
    fn name(&self) -> &str {
        "numeric_validator"
    }

    fn description(&self) -> &str {
        "Rejects the program when a numeric word does not parse"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        if let Some(token) = line.tokens.iter().find(|t| Self::is_malformed(t)) {
            return Err(ConversionError::MalformedNumericToken {
                line_number: line.line_number,
                line: line.original.clone(),
                token: token.to_string(),
            });
        }
        Ok(LineDisposition::Keep)
    }
}

// ============================================================================
// Motion handling
// ============================================================================

/// Gives motion-less lines the previously active motion code
///
/// A line without any G word but with coordinates, arc parameters or a feed
/// is prefixed with `G<last motion>`.
#[derive(Debug, Clone, Default)]
pub struct MotionCodeInheritor;

impl LineProcessor for MotionCodeInheritor {
    fn name(&self) -> &str {
        "motion_inheritor"
    }

    fn description(&self) -> &str {
        "Prefixes modal lines with the last active motion code"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        let Some(code) = state.last_motion_code else {
            return Ok(LineDisposition::Keep);
        };
        if line.fields().has_g_word {
            return Ok(LineDisposition::Keep);
        }

        let moves = ["X", "Y", "Z", "I", "J", "R", "F"]
            .iter()
            .any(|address| line.has_word(address));
        if moves {
            line.tokens.insert(0, Token::word("G", code.to_string()));
        }
        Ok(LineDisposition::Keep)
    }
}

/// Turns rapid moves into feed moves while the tool is engaged
///
/// A descending Z sets `z_milling` and rewrites a rapid on the same line; a
/// rising Z clears it. A rapid with X or Y is rewritten while `z_milling` is
/// set or the previous line moved in XY, and its feed word is dropped so the
/// normalizer can add the configured one.
#[derive(Debug, Clone, Default)]
pub struct MotionReclassifier;

impl LineProcessor for MotionReclassifier {
    fn name(&self) -> &str {
        "motion_reclassifier"
    }

    fn description(&self) -> &str {
        "Converts rapid moves made while cutting into linear feed moves"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        let fields = line.fields();
        let carries_xy = fields.has_xy();

        if let Some(z) = fields.z {
            if let Some(last_z) = state.last_z {
                if z < last_z {
                    state.z_milling = true;
                    if fields.motion == Some(MotionCode::Rapid) {
                        line.set_motion(MotionCode::Linear);
                        line.reclassified = true;
                    }
                } else if z > last_z {
                    state.z_milling = false;
                }
            }
            state.last_z = Some(z);
        }

        let still_rapid = line.fields().motion == Some(MotionCode::Rapid);
        if still_rapid && carries_xy && (state.z_milling || state.xy_milling) {
            line.set_motion(MotionCode::Linear);
            line.remove_words("F");
            line.reclassified = true;
        }

        if line.reclassified {
            tracing::debug!("Line {}: rapid move cuts material, now '{}'", line.line_number, line.render());
        }

        state.xy_milling = carries_xy;
        Ok(LineDisposition::Keep)
    }
}

// ============================================================================
// Arc notation
// ============================================================================

/// Rewrites circular interpolation parameters for the target controller
#[derive(Debug, Clone)]
pub struct ArcNotationConverter {
    strategy: ArcStrategy,
    radius_prefix: String,
    precision: usize,
}

impl ArcNotationConverter {
    /// Create a converter from a profile's arc settings
    pub fn from_profile(profile: &DialectProfile) -> Self {
        Self {
            strategy: profile.arc_strategy,
            radius_prefix: profile.radius_prefix.clone(),
            precision: profile.radius_precision,
        }
    }

    /// Rename `R` words to the target radius prefix, value untouched
    fn rename_radius(&self, line: &mut SourceLine) -> bool {
        let mut renamed = false;
        for token in &mut line.tokens {
            if let Token::Word { address, .. } = token {
                if address == "R" {
                    *address = self.radius_prefix.clone();
                    renamed = true;
                }
            }
        }
        renamed
    }

    fn offset_to_radius(&self, line: &mut SourceLine) -> bool {
        let fields = line.fields();
        match (fields.i, fields.j) {
            (Some(i), Some(j)) => {
                let radius = i.hypot(j);
                line.remove_words("I");
                line.remove_words("J");
                line.push_word(
                    &self.radius_prefix,
                    format!("{:.*}", self.precision, radius),
                );
                true
            }
            _ => self.rename_radius(line),
        }
    }

    fn pad_offsets(line: &mut SourceLine) -> bool {
        let mut padded = false;
        for token in &mut line.tokens {
            if let Token::Word { address, value } = token {
                if address == "I" || address == "J" {
                    let canonical = pad_decimal(value);
                    if canonical != *value {
                        *value = canonical;
                        padded = true;
                    }
                }
            }
        }
        padded
    }

    fn heuristic_reorder(&self, line: &mut SourceLine) -> bool {
        let start = line.motion_position().map_or(0, |p| p + 1);
        let found = line.tokens[start..].windows(3).position(|w| {
            (w[0].is_word("X") || w[0].is_word("Y")) && w[1].is_number() && w[2].is_number()
        });

        let mut converted = false;
        match found {
            Some(offset) => {
                let at = start + offset + 1;
                for (index, address) in [(at, "I"), (at + 1, "J")] {
                    let text = line.tokens[index].to_string();
                    line.tokens[index] = Token::word(address, pad_decimal(&text));
                }
                converted = true;
            }
            None if line.tokens.iter().any(Token::is_number) => {
                tracing::warn!(
                    "Line {}: bare numbers on arc do not follow an X/Y value, left as is",
                    line.line_number
                );
            }
            None => {}
        }

        self.rename_radius(line) || converted
    }
}

impl LineProcessor for ArcNotationConverter {
    fn name(&self) -> &str {
        "arc_notation"
    }

    fn description(&self) -> &str {
        "Converts arc parameters between center-offset and radius notation"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        if !line.fields().motion.is_some_and(|m| m.is_arc()) {
            return Ok(LineDisposition::Keep);
        }

        let converted = match self.strategy {
            ArcStrategy::OffsetToRadius => self.offset_to_radius(line),
            ArcStrategy::OffsetPassthrough => {
                let padded = Self::pad_offsets(line);
                self.rename_radius(line) || padded
            }
            ArcStrategy::HeuristicReorder => self.heuristic_reorder(line),
        };

        if converted {
            line.arc_converted = true;
            tracing::debug!("Line {}: arc rewritten as '{}'", line.line_number, line.render());
        }
        Ok(LineDisposition::Keep)
    }
}

// ============================================================================
// Feed and speed
// ============================================================================

/// Forces the configured feed rate (and optionally spindle speed) onto a line
///
/// An existing feed word takes the configured value, extra feed words are
/// dropped; a motion line without one gets it appended, unless it is a rapid
/// move and the profile keeps feeds off rapids.
#[derive(Debug, Clone)]
pub struct FeedSpeedNormalizer {
    feed: String,
    spindle: String,
    feed_on_rapids: bool,
    normalize_spindle_speed: bool,
}

impl FeedSpeedNormalizer {
    /// Create a normalizer for a profile and the run's parameters
    pub fn new(profile: &DialectProfile, params: &ConversionParameters) -> Self {
        Self {
            feed: params.feed_text(),
            spindle: params.spindle_speed.to_string(),
            feed_on_rapids: profile.feed_on_rapids,
            normalize_spindle_speed: profile.normalize_spindle_speed,
        }
    }

    fn force_first(line: &mut SourceLine, address: &str, forced: &str) -> bool {
        let Some(first) = line.position(address) else {
            return false;
        };
        line.tokens[first] = Token::word(address, forced);
        let mut index = 0;
        line.tokens.retain(|t| {
            let keep = index == first || !t.is_word(address);
            index += 1;
            keep
        });
        true
    }
}

impl LineProcessor for FeedSpeedNormalizer {
    fn name(&self) -> &str {
        "feed_speed"
    }

    fn description(&self) -> &str {
        "Overrides feed rate and spindle speed with configured values"
    }

    fn process(
        &self,
        line: &mut SourceLine,
        _state: &mut ConversionState,
    ) -> ConversionResult<LineDisposition> {
        if self.normalize_spindle_speed {
            Self::force_first(line, "S", &self.spindle);
        }

        if !Self::force_first(line, "F", &self.feed) {
            let wants_feed = match line.fields().motion {
                Some(MotionCode::Rapid) => self.feed_on_rapids,
                Some(_) => true,
                None => false,
            };
            if wants_feed {
                line.push_word("F", self.feed.as_str());
            }
        }
        Ok(LineDisposition::Keep)
    }
}
