//! Dialect profiles
//!
//! Everything that differs between the supported CAM outputs lives here as
//! data. The pipeline skeleton is shared; a profile only switches stages on or
//! off and feeds them their rule tables.

use emcoform_core::Dialect;

/// Radius word understood by the target controller
pub const RADIUS_PREFIX: &str = "CR";

/// Fractional digits of a computed radius
pub const RADIUS_PRECISION: usize = 4;

const ASPIRE_REJECT_CODES: &[&str] = &[
    "G54", "G90", "G91", "G20", "G21", "G70", "G71", "G4", "G04", "M03", "M3", "G28", "M05",
    "M30", "G43", "G40", "G49", "G80", "G17", ";", "%", "L100", "G451", "L2", "G17D1", "MSG",
    "G53", "G64", "TRANS", "M0",
];

const MASTERCAM_REJECT_CODES: &[&str] = &[
    "G54", "G90", "G91", "G20", "G21", "G70", "G71", "G4", "G04", "M03", "G28", "M05", "M30",
    "G43", "G40", "G49", "G80", "G17", "O0000", "%",
];

const KIRIMOTO_REJECT_CODES: &[&str] = &[
    "G54", "G90", "G91", "G20", "G21", "G70", "G71", "G4", "G04", "M03", "M05", "M30",
];

/// How circular interpolation parameters are rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcStrategy {
    /// Replace I/J with a radius word computed from their magnitude
    OffsetToRadius,
    /// Keep I/J, pad their decimals
    OffsetPassthrough,
    /// Label the two bare numbers following an X/Y value as I/J
    HeuristicReorder,
}

/// Spindle handling around a tool change block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChangePolicy {
    /// Stop the spindle before the change
    StopOnly,
    /// Stop before, restart at the configured speed after
    StopAndRestart,
}

/// Comment syntaxes removed by the comment stripper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    /// `( ... )`
    pub parentheses: bool,
    /// `; ...` to end of line
    pub semicolon: bool,
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self {
            parentheses: true,
            semicolon: true,
        }
    }
}

/// Immutable rule set for one source dialect
#[derive(Debug, Clone, PartialEq)]
pub struct DialectProfile {
    pub dialect: Dialect,
    /// Substrings that reject a line (case-insensitive)
    pub reject_codes: Vec<String>,
    /// Comment text takes part in the reject test
    pub screen_comments: bool,
    pub comment_syntax: CommentSyntax,
    /// Drop a leading `N` word
    pub strip_sequence_numbers: bool,
    /// Rewrite `M06T1` / `T1 M06` into `M6 T1`
    pub normalize_tool_change: bool,
    /// Retry the reject test on rapid lines after removing header tokens
    pub salvage_rapid_lines: bool,
    /// Prefix motion-less lines with the last motion code
    pub inherit_motion_code: bool,
    /// Turn rapids into feeds while the tool is engaged
    pub reclassify_motion: bool,
    pub arc_strategy: ArcStrategy,
    pub radius_prefix: String,
    pub radius_precision: usize,
    /// Rapid moves receive a feed word too
    pub feed_on_rapids: bool,
    /// Existing `S` words are forced to the configured spindle speed
    pub normalize_spindle_speed: bool,
    pub tool_change: ToolChangePolicy,
}

impl DialectProfile {
    /// Profile for a dialect
    pub fn for_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Aspire => Self::aspire(),
            Dialect::Mastercam => Self::mastercam(),
            Dialect::KiriMoto => Self::kirimoto(),
        }
    }

    /// Vectric Aspire style output
    pub fn aspire() -> Self {
        Self {
            dialect: Dialect::Aspire,
            reject_codes: codes(ASPIRE_REJECT_CODES),
            screen_comments: false,
            comment_syntax: CommentSyntax::default(),
            strip_sequence_numbers: true,
            normalize_tool_change: true,
            salvage_rapid_lines: false,
            inherit_motion_code: false,
            reclassify_motion: false,
            arc_strategy: ArcStrategy::HeuristicReorder,
            radius_prefix: RADIUS_PREFIX.to_string(),
            radius_precision: RADIUS_PRECISION,
            feed_on_rapids: true,
            normalize_spindle_speed: false,
            tool_change: ToolChangePolicy::StopOnly,
        }
    }

    /// Mastercam style output
    pub fn mastercam() -> Self {
        Self {
            dialect: Dialect::Mastercam,
            reject_codes: codes(MASTERCAM_REJECT_CODES),
            screen_comments: true,
            salvage_rapid_lines: true,
            inherit_motion_code: true,
            arc_strategy: ArcStrategy::OffsetPassthrough,
            ..Self::aspire()
        }
    }

    /// Kiri:Moto slicer output
    pub fn kirimoto() -> Self {
        Self {
            dialect: Dialect::KiriMoto,
            reject_codes: codes(KIRIMOTO_REJECT_CODES),
            screen_comments: true,
            comment_syntax: CommentSyntax::default(),
            strip_sequence_numbers: false,
            normalize_tool_change: false,
            salvage_rapid_lines: false,
            inherit_motion_code: false,
            reclassify_motion: true,
            arc_strategy: ArcStrategy::OffsetToRadius,
            radius_prefix: RADIUS_PREFIX.to_string(),
            radius_precision: RADIUS_PRECISION,
            feed_on_rapids: false,
            normalize_spindle_speed: true,
            tool_change: ToolChangePolicy::StopAndRestart,
        }
    }
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|code| code.to_uppercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_dialects() {
        for dialect in Dialect::ALL {
            assert_eq!(DialectProfile::for_dialect(dialect).dialect, dialect);
        }
    }

    #[test]
    fn test_only_slicer_reclassifies() {
        assert!(DialectProfile::kirimoto().reclassify_motion);
        assert!(!DialectProfile::aspire().reclassify_motion);
        assert!(!DialectProfile::mastercam().reclassify_motion);
    }

    #[test]
    fn test_arc_strategies() {
        assert_eq!(DialectProfile::aspire().arc_strategy, ArcStrategy::HeuristicReorder);
        assert_eq!(DialectProfile::mastercam().arc_strategy, ArcStrategy::OffsetPassthrough);
        assert_eq!(DialectProfile::kirimoto().arc_strategy, ArcStrategy::OffsetToRadius);
    }

    #[test]
    fn test_mastercam_inherits_aspire_defaults() {
        let profile = DialectProfile::mastercam();
        assert!(profile.strip_sequence_numbers);
        assert!(profile.normalize_tool_change);
        assert_eq!(profile.tool_change, ToolChangePolicy::StopOnly);
        assert!(profile.reject_codes.iter().any(|c| c == "O0000"));
        assert!(!profile.reject_codes.iter().any(|c| c == "MSG"));
    }
}
