/// Enumerated attribute values for facial-feature annotation
///
/// Every enumerated field on a record draws from one of these lists. An unset
/// field is `None` in memory and `""` on disk.
use serde::{de, Deserialize, Deserializer, Serializer};
use std::fmt;

/// A closed set of label values with a fixed on-disk spelling
pub trait Label: Copy + Sized + 'static {
    /// Every value, in display order
    const ALL: &'static [Self];

    /// The exact text stored in the annotations file
    fn as_str(self) -> &'static str;

    /// Parse a label, ignoring surrounding whitespace and case
    fn parse(text: &str) -> Option<Self> {
        let wanted = text.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(wanted))
    }
}

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Label for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
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

// ========== Hair ==========

label_enum!(HairColor {
    Black => "black",
    Brown => "brown",
    Blonde => "blonde",
    Red => "red",
    Gray => "gray",
    Pink => "pink",
    Other => "other",
});

label_enum!(HairLength {
    Short => "short",
    Medium => "medium",
    Long => "long",
});

label_enum!(HairStyle {
    Straight => "straight",
    Wavy => "wavy",
    Curly => "curly",
    Bald => "bald",
});

// ========== Eyes ==========

label_enum!(EyeColor {
    Blue => "blue",
    Green => "green",
    Brown => "brown",
    Gray => "gray",
    Black => "black",
    Other => "other",
});

// ========== Accessories ==========

label_enum!(GlassesType {
    Reading => "reading glasses",
    Sunglasses => "sunglasses",
    Other => "other",
});

label_enum!(HatType {
    Cap => "cap",
    Beanie => "beanie",
    Fedora => "fedora",
    Other => "other",
});

// ========== Facial structure ==========

label_enum!(FaceShape {
    Round => "round",
    Oval => "oval",
    Square => "square",
    Heart => "heart",
});

label_enum!(Ethnicity {
    Asian => "asian",
    Black => "black",
    Caucasian => "caucasian",
    Hispanic => "hispanic",
    Indian => "indian",
    Other => "other",
});

// ========== Additional ==========

label_enum!(
    /// Age bucket, stored under the `age` key
    AgeRange {
        UpTo10 => "0-10",
        From11To20 => "11-20",
        From21To30 => "21-30",
        From31To40 => "31-40",
        From41To50 => "41-50",
        From51To60 => "51-60",
        From61To70 => "61-70",
        Over70 => "71+",
    }
);

label_enum!(Gender {
    Male => "male",
    Female => "female",
});

label_enum!(Expression {
    Happy => "happy",
    Sad => "sad",
    Neutral => "neutral",
    Angry => "angry",
    Surprised => "surprised",
    Confused => "confused",
    Disgusted => "disgusted",
    Fearful => "fearful",
});

/// Serde adapter for `Option<L: Label>` fields: `None` <-> `""`
///
/// Anything else that is not in `L::ALL` fails deserialization, which the
/// store surfaces as `InvalidFormat`.
pub(crate) mod unset_as_empty {
    use super::*;

    pub fn serialize<L: Label, S: Serializer>(
        value: &Option<L>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str((*value).map_or("", Label::as_str))
    }

    pub fn deserialize<'de, L: Label, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<L>, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(None);
        }
        match L::parse(&text) {
            Some(label) => Ok(Some(label)),
            None => Err(de::Error::invalid_value(
                de::Unexpected::Str(&text),
                &"a known label or an empty string",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case_and_whitespace() {
        assert_eq!(HairColor::parse("  Black "), Some(HairColor::Black));
        assert_eq!(GlassesType::parse("Reading Glasses"), Some(GlassesType::Reading));
        assert_eq!(AgeRange::parse("71+"), Some(AgeRange::Over70));
        assert_eq!(HairColor::parse("teal"), None);
    }

    #[test]
    fn test_display_matches_file_spelling() {
        assert_eq!(AgeRange::UpTo10.to_string(), "0-10");
        assert_eq!(Expression::Fearful.to_string(), "fearful");
    }

    #[test]
    fn test_all_lists_are_complete() {
        assert_eq!(HairColor::ALL.len(), 7);
        assert_eq!(EyeColor::ALL.len(), 6);
        assert_eq!(AgeRange::ALL.len(), 8);
        assert_eq!(Expression::ALL.len(), 8);
    }
}
