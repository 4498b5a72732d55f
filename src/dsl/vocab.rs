//! Default vocabularies for trim commands.
//!
//! Each vocabulary is a closed enum with a fixed textual form. Documents may
//! narrow the allowed members (see `INITIALIZE_TRIM`), never extend them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a token is not a member of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{word}' is not a known {vocabulary}")]
pub struct UnknownWord {
    pub vocabulary: &'static str,
    pub word: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member, in canonical order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Human-readable name of this vocabulary.
            pub const LABEL: &'static str = $label;

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownWord;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownWord {
                        vocabulary: Self::LABEL,
                        word: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Interaction point.
    Ip, "IP" { Ip1 => "IP1", Ip2 => "IP2", Ip5 => "IP5", Ip8 => "IP8" }
}

vocabulary! {
    Beam, "beam" { Beam1 => "BEAM1", Beam2 => "BEAM2" }
}

vocabulary! {
    /// Transverse plane a trim acts on.
    Plane, "plane" { Separation => "SEPARATION", Crossing => "CROSSING" }
}

vocabulary! {
    /// Unit of a trim amount.
    Unit, "unit" { Sigma => "SIGMA", Mm => "MM" }
}

vocabulary! {
    /// Fit model requested by `START_FIT`.
    FitType, "fit type" { Gaussian => "GAUSSIAN", GaussianPlusConstant => "GAUSSIAN_PLUS_CONSTANT" }
}
