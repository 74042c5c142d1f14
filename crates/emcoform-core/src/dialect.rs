//! Source dialect selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConversionError;

/// CAM tool whose G-code output is being rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Vectric Aspire style post-processor output
    Aspire,
    /// Mastercam style post output
    Mastercam,
    /// Kiri:Moto slicer style output
    KiriMoto,
}

impl Dialect {
    /// All supported dialects
    pub const ALL: [Dialect; 3] = [Dialect::Aspire, Dialect::Mastercam, Dialect::KiriMoto];

    /// Stable identifier used in settings files and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Self::Aspire => "aspire",
            Self::Mastercam => "mastercam",
            Self::KiriMoto => "kirimoto",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aspire => write!(f, "Aspire"),
            Self::Mastercam => write!(f, "Mastercam"),
            Self::KiriMoto => write!(f, "Kiri:Moto"),
        }
    }
}

impl FromStr for Dialect {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aspire" | "dialect-a" => Ok(Self::Aspire),
            "mastercam" | "dialect-b" => Ok(Self::Mastercam),
            "kirimoto" | "kiri:moto" | "kiri-moto" | "dialect-c" => Ok(Self::KiriMoto),
            _ => Err(ConversionError::UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("Aspire".parse::<Dialect>().unwrap(), Dialect::Aspire);
        assert_eq!("dialect-b".parse::<Dialect>().unwrap(), Dialect::Mastercam);
        assert_eq!("Kiri:Moto".parse::<Dialect>().unwrap(), Dialect::KiriMoto);
        for dialect in Dialect::ALL {
            assert_eq!(dialect.id().parse::<Dialect>().unwrap(), dialect);
        }
    }

    #[test]
    fn test_unknown_dialect() {
        let err = "Fusion 360".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, ConversionError::UnknownDialect(ref name) if name == "Fusion 360"));
    }
}
