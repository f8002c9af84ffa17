/// Facial-attribute annotation records
///
/// `FaceAttributes` holds the fields a curator edits. `AnnotationRecord` adds the
/// display metadata written alongside them in the annotations file.
use serde::{Deserialize, Serialize};

use super::labels::{
    unset_as_empty, AgeRange, Ethnicity, Expression, EyeColor, FaceShape, GlassesType, Gender,
    HairColor, HairLength, HairStyle, HatType, Label,
};
use crate::error::{AnnotatorError, Result};

/// All editable attributes for one image
///
/// Keys on disk are the snake_case field names, except `age_range` which is
/// stored as `age`. Missing keys load as unset.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FaceAttributes {
    // ========== Hair ==========
    #[serde(with = "unset_as_empty")]
    pub hair_color: Option<HairColor>,

    #[serde(with = "unset_as_empty")]
    pub hair_length: Option<HairLength>,

    #[serde(with = "unset_as_empty")]
    pub hair_style: Option<HairStyle>,

    // ========== Eyes ==========
    #[serde(with = "unset_as_empty")]
    pub eye_color: Option<EyeColor>,

    // ========== Glasses ==========
    pub glasses: bool,

    #[serde(with = "unset_as_empty")]
    pub glasses_type: Option<GlassesType>,

    // ========== Hat ==========
    pub hat: bool,

    #[serde(with = "unset_as_empty")]
    pub hat_type: Option<HatType>,

    // ========== Facial structure ==========
    #[serde(with = "unset_as_empty")]
    pub face_shape: Option<FaceShape>,

    #[serde(with = "unset_as_empty")]
    pub ethnicity: Option<Ethnicity>,

    // ========== Additional ==========
    #[serde(rename = "age", with = "unset_as_empty")]
    pub age_range: Option<AgeRange>,

    #[serde(with = "unset_as_empty")]
    pub gender: Option<Gender>,

    #[serde(with = "unset_as_empty")]
    pub expression: Option<Expression>,

    pub beard: bool,

    pub mustache: bool,
}

impl FaceAttributes {
    /// Field keys in file order
    pub const FIELDS: &'static [&'static str] = &[
        "hair_color",
        "hair_length",
        "hair_style",
        "eye_color",
        "glasses",
        "glasses_type",
        "hat",
        "hat_type",
        "face_shape",
        "ethnicity",
        "age",
        "gender",
        "expression",
        "beard",
        "mustache",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been labelled (every field unset or false)
    pub fn is_unannotated(&self) -> bool {
        *self == Self::default()
    }

    /// Clear every field
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set an enumerated field from widget text
    ///
    /// Whitespace and case are ignored and an empty value unsets the field.
    /// Values outside the field's enumeration are rejected.
    pub fn set_label(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "hair_color" => self.hair_color = parse_label(field, value)?,
            "hair_length" => self.hair_length = parse_label(field, value)?,
            "hair_style" => self.hair_style = parse_label(field, value)?,
            "eye_color" => self.eye_color = parse_label(field, value)?,
            "glasses_type" => self.glasses_type = parse_label(field, value)?,
            "hat_type" => self.hat_type = parse_label(field, value)?,
            "face_shape" => self.face_shape = parse_label(field, value)?,
            "ethnicity" => self.ethnicity = parse_label(field, value)?,
            "age" => self.age_range = parse_label(field, value)?,
            "gender" => self.gender = parse_label(field, value)?,
            "expression" => self.expression = parse_label(field, value)?,
            _ => return Err(AnnotatorError::UnknownField(field.to_string())),
        }
        Ok(())
    }

    /// Set one of the yes/no fields
    pub fn set_flag(&mut self, field: &str, value: bool) -> Result<()> {
        let flag = match field {
            "glasses" => &mut self.glasses,
            "hat" => &mut self.hat,
            "beard" => &mut self.beard,
            "mustache" => &mut self.mustache,
            _ => return Err(AnnotatorError::UnknownField(field.to_string())),
        };
        *flag = value;
        Ok(())
    }

    /// The value text of every field in file order, booleans as "yes"/"no"
    ///
    /// Unset enumerated fields are skipped.
    pub fn values(&self) -> Vec<&'static str> {
        fn flag(value: bool) -> Option<&'static str> {
            Some(if value { "yes" } else { "no" })
        }

        [
            self.hair_color.map(Label::as_str),
            self.hair_length.map(Label::as_str),
            self.hair_style.map(Label::as_str),
            self.eye_color.map(Label::as_str),
            flag(self.glasses),
            self.glasses_type.map(Label::as_str),
            flag(self.hat),
            self.hat_type.map(Label::as_str),
            self.face_shape.map(Label::as_str),
            self.ethnicity.map(Label::as_str),
            self.age_range.map(Label::as_str),
            self.gender.map(Label::as_str),
            self.expression.map(Label::as_str),
            flag(self.beard),
            flag(self.mustache),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn parse_label<L: Label>(field: &str, value: &str) -> Result<Option<L>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    L::parse(value)
        .map(Some)
        .ok_or_else(|| AnnotatorError::InvalidLabel {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// One stored annotation, keyed in the store by file name
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AnnotationRecord {
    /// 1-based catalog position when the record was saved. Display only.
    pub id: String,
    pub filename: String,
    /// "WxH" in pixels
    pub dimensions: String,
    #[serde(flatten)]
    pub attributes: FaceAttributes,
}

impl AnnotationRecord {
    /// Convert to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
