//! Line tokenizer
//!
//! Splits the code part of a line (comments already removed) into address
//! words, unlabeled numbers and stray symbols. Tokenizing never fails; numeric
//! validity is checked later, once the line is known to survive filtering.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One lexical element of a G-code line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address word such as `G0`, `X-1.5`, `CR5.0000` or `MSG`
    Word {
        /// Upper-cased address letters
        address: String,
        /// Numeric text exactly as written (may be empty)
        value: String,
    },
    /// Number without an address letter
    Number(String),
    /// Anything else (`%`, `=`), kept verbatim
    Other(String),
}

impl Token {
    /// Build an address word
    pub fn word(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Word {
            address: address.into(),
            value: value.into(),
        }
    }

    /// Address letters of a word
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Word { address, .. } => Some(address),
            _ => None,
        }
    }

    /// Whether this is a word with the given address
    pub fn is_word(&self, letter: &str) -> bool {
        self.address() == Some(letter)
    }

    /// Numeric value of a word or bare number
    pub fn number(&self) -> Option<f64> {
        match self {
            Self::Word { value, .. } | Self::Number(value) => value.parse().ok(),
            Self::Other(_) => None,
        }
    }

    /// Integer code of a word such as `G01` or `M6`
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Word { value, .. } => value.parse().ok(),
            _ => None,
        }
    }

    /// Whether this is a word `<letter><code>` (`M06` matches `("M", 6)`)
    pub fn is_code(&self, letter: &str, code: u32) -> bool {
        self.is_word(letter) && self.code() == Some(code)
    }

    /// Whether this is a bare number
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word { address, value } => write!(f, "{}{}", address, value),
            Self::Number(text) | Self::Other(text) => write!(f, "{}", text),
        }
    }
}

/// Split a line of code into tokens
pub fn tokenize(code: &str) -> Vec<Token> {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = TOKEN_REGEX.get_or_init(|| {
        Regex::new(
            r"(?P<address>[A-Za-z]+)(?P<value>[+-]?[0-9.]*)|(?P<number>[+-]?[0-9.]+)|(?P<other>[^\sA-Za-z0-9.+-]+|\S)",
        )
        .expect("invalid regex pattern")
    });

    regex
        .captures_iter(code)
        .filter_map(|caps| {
            if let Some(address) = caps.name("address") {
                let value = caps.name("value").map_or("", |m| m.as_str());
                Some(Token::word(address.as_str().to_uppercase(), value))
            } else if let Some(number) = caps.name("number") {
                Some(Token::Number(number.as_str().to_string()))
            } else {
                caps.name("other")
                    .map(|other| Token::Other(other.as_str().to_string()))
            }
        })
        .collect()
}

/// Join tokens back into a single-spaced line
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Add the zero a decimal point is missing (`.5` → `0.5`, `-.5` → `-0.5`, `3.` → `3.0`)
pub fn pad_decimal(text: &str) -> String {
    let (sign, body) = if let Some(rest) = text.strip_prefix('-') {
        ("-", rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        ("+", rest)
    } else {
        ("", text)
    };

    let mut padded = String::with_capacity(text.len() + 2);
    padded.push_str(sign);
    if body.starts_with('.') {
        padded.push('0');
    }
    padded.push_str(body);
    if body.ends_with('.') {
        padded.push('0');
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_spaced_line() {
        let tokens = tokenize("G1 X10.5 Y-2 F300");
        assert_eq!(
            tokens,
            vec![
                Token::word("G", "1"),
                Token::word("X", "10.5"),
                Token::word("Y", "-2"),
                Token::word("F", "300"),
            ]
        );
    }

    #[test]
    fn test_tokenize_compact_line() {
        let tokens = tokenize("m06t2");
        assert_eq!(tokens, vec![Token::word("M", "06"), Token::word("T", "2")]);
        assert!(tokens[0].is_code("M", 6));
    }

    #[test]
    fn test_tokenize_bare_numbers_and_symbols() {
        let tokens = tokenize("G2 X1 .5 -0.25 %");
        assert_eq!(tokens[2], Token::Number(".5".to_string()));
        assert_eq!(tokens[3], Token::Number("-0.25".to_string()));
        assert_eq!(tokens[4], Token::Other("%".to_string()));
        assert_eq!(tokens[2].number(), Some(0.5));
    }

    #[test]
    fn test_tokenize_keeps_malformed_text() {
        let tokens = tokenize("X1.2.3 Z");
        assert_eq!(tokens[0], Token::word("X", "1.2.3"));
        assert_eq!(tokens[0].number(), None);
        assert_eq!(tokens[1], Token::word("Z", ""));
    }

    #[test]
    fn test_multi_letter_addresses() {
        let tokens = tokenize("MSG TRANS CR5.0");
        assert_eq!(tokens[0], Token::word("MSG", ""));
        assert_eq!(tokens[2].address(), Some("CR"));
    }

    #[test]
    fn test_render_round_trip_normalizes_spacing() {
        assert_eq!(render(&tokenize("  G0   X1.  Y2 ")), "G0 X1. Y2");
        assert_eq!(render(&tokenize("G1X10Y20")), "G1 X10 Y20");
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_pad_decimal() {
        assert_eq!(pad_decimal(".5"), "0.5");
        assert_eq!(pad_decimal("-.5"), "-0.5");
        assert_eq!(pad_decimal("3."), "3.0");
        assert_eq!(pad_decimal("-3."), "-3.0");
        assert_eq!(pad_decimal("0.5"), "0.5");
        assert_eq!(pad_decimal("12"), "12");
    }
}
