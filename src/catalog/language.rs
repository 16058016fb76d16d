//! The catalog's language vocabulary.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

macro_rules! languages {
    ($($(#[$attr:meta])* $variant:ident => $slug:literal,)+) => {
        /// Subtitle language, identified by the catalog's URL slug.
        ///
        /// Slugs outside the known set are kept verbatim in [`Language::Other`]
        /// so listing rows are never dropped for an unfamiliar language.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub enum Language {
            $(
                #[doc = concat!("`", $slug, "`")]
                $(#[$attr])*
                $variant,
            )+
            /// A slug outside the known set, lowercased.
            Other(String),
        }

        impl Language {
            /// Every known language, in catalog order.
            pub const KNOWN: &'static [Language] = &[$(Language::$variant,)+];

            /// Returns the catalog slug.
            #[must_use]
            pub fn slug(&self) -> &str {
                match self {
                    $(Self::$variant => $slug,)+
                    Self::Other(slug) => slug,
                }
            }

            fn from_slug(slug: &str) -> Self {
                match slug {
                    $($slug => Self::$variant,)+
                    other => Self::Other(other.to_string()),
                }
            }
        }
    };
}

languages! {
    #[default]
    English => "english",
    Dutch => "dutch",
    Arabic => "arabic",
    Bengali => "bengali",
    Big5Code => "big_5_code",
    Brazillian => "brazillian",
    Burmese => "burmese",
    Chinese => "chinese",
    Croatian => "croatian",
    Danish => "danish",
    Estonian => "estonian",
    FarsiPersian => "farsi_persian",
    Finnish => "finnish",
    French => "french",
    German => "german",
    Greek => "greek",
    Hebrew => "hebrew",
    Indonesian => "indonesian",
    Italian => "italian",
    Japanese => "japanese",
    Korean => "korean",
    Latvian => "latvian",
    Lithuanian => "lithuanian",
    Malay => "malay",
    Malayalam => "malayalam",
    Norwegian => "norwegian",
    Polish => "polish",
    Portuguese => "portuguese",
    Russian => "russian",
    Serbian => "serbian",
    Sinhala => "sinhala",
    Slovenian => "slovenian",
    Spanish => "spanish",
    Swedish => "swedish",
    Thai => "thai",
    Turkish => "turkish",
    Vietnamese => "vietnamese",
}

impl Language {
    /// Returns `true` for languages in the known set.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl FromStr for Language {
    type Err = Infallible;

    /// Parses a slug case-insensitively; never fails.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_slug(&s.trim().to_ascii_lowercase()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}
