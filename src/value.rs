//! Conversions from decoded values to Rust types.
use crate::error::*;
use crate::types::{DataElement, Value};
use chrono::NaiveDate;
use nom::bytes::complete::take_while_m_n;
use nom::character::complete::one_of;
use nom::combinator::{all_consuming, map_res};
use nom::sequence::pair;
use nom::IResult;
use std::fmt::{self, Display};

/// Trait to convert a decoded element to the correct type.
///
/// ```rust
/// use dicom_codec::types::{DataElement, Value};
/// use dicom_codec::value::FromDicomValue;
/// use dicom_codec::{Tag, ValueRepresentation};
///
/// let rows = Tag::new(0x0028, 0x0010);
/// let element = DataElement::new(rows, ValueRepresentation::US, Value::U16(vec![512]));
/// let rows: u16 = FromDicomValue::from_element(&element).unwrap();
/// assert_eq!(rows, 512);
/// ```
pub trait FromDicomValue: Sized {
    fn from_element(el: &DataElement) -> DicomResult<Self>;
}

impl FromDicomValue for u16 {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        el.get_u16()
    }
}

impl FromDicomValue for u32 {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        match el.value {
            Value::U16(ref v) => v.first().map(|&n| n as u32),
            _ => Some(el.get_u32()?),
        }
        .ok_or(DicomError::EmptyValue(el.tag))
    }
}

/// Binary integers, or an Integer String (IS).
impl FromDicomValue for i32 {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        match el.value {
            Value::I32(ref v) => v.first().copied(),
            Value::I16(ref v) => v.first().map(|&n| n as i32),
            Value::U16(ref v) => v.first().map(|&n| n as i32),
            Value::Strs(_) => Some(el.get_string()?.parse()?),
            _ => {
                return Err(DicomError::ValueMismatch {
                    tag: el.tag,
                    vr: el.vr,
                    expected: "i32",
                })
            }
        }
        .ok_or(DicomError::EmptyValue(el.tag))
    }
}

/// Binary floats, or a Decimal String (DS).
impl FromDicomValue for f64 {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        match el.value {
            Value::F64(ref v) => v.first().copied(),
            Value::F32(ref v) => v.first().map(|&n| n as f64),
            Value::Strs(_) => Some(el.get_string()?.parse()?),
            _ => {
                return Err(DicomError::ValueMismatch {
                    tag: el.tag,
                    vr: el.vr,
                    expected: "f64",
                })
            }
        }
        .ok_or(DicomError::EmptyValue(el.tag))
    }
}

impl FromDicomValue for String {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        el.get_string().map(|s| s.to_string())
    }
}

impl FromDicomValue for Vec<String> {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        el.get_strings().map(|v| v.to_vec())
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum AgeFormat {
    Day,
    Week,
    Month,
    Year,
}

impl AgeFormat {
    pub fn parse_from_char(repr: char) -> DicomResult<Self> {
        match repr {
            'D' => Ok(AgeFormat::Day),
            'W' => Ok(AgeFormat::Week),
            'M' => Ok(AgeFormat::Month),
            'Y' => Ok(AgeFormat::Year),
            _ => Err(DicomError::ParseAS(format!(
                "Unknown age format = {}",
                repr
            ))),
        }
    }
}

impl Display for AgeFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AgeFormat::Day => write!(f, "D"),
            AgeFormat::Week => write!(f, "W"),
            AgeFormat::Month => write!(f, "M"),
            AgeFormat::Year => write!(f, "Y"),
        }
    }
}

/// Age formatted according to DCM protocol. It's always three digits followed by the unit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Age {
    pub age: u16,
    pub format: AgeFormat,
}

impl Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:03}{}", self.age, self.format)
    }
}

fn age_string(input: &str) -> IResult<&str, (u16, char)> {
    all_consuming(pair(
        map_res(take_while_m_n(3, 3, |c: char| c.is_ascii_digit()), |s: &str| {
            s.parse::<u16>()
        }),
        one_of("DWMY"),
    ))(input)
}

impl Age {
    pub fn parse_from_str(repr: &str) -> DicomResult<Age> {
        if repr.len() != 4 {
            return Err(DicomError::ParseAS(format!(
                "The length of the Age String should be 4 (got {})",
                repr.len()
            )));
        }
        match age_string(repr) {
            Ok((_, (age, unit))) => Ok(Age {
                age,
                format: AgeFormat::parse_from_char(unit)?,
            }),
            Err(_) => match (repr.get(..3), repr.get(3..)) {
                (Some(digits), Some(unit)) if digits.chars().all(|c| c.is_ascii_digit()) => Err(
                    DicomError::ParseAS(format!("Unknown age format = {}", unit)),
                ),
                _ => Err(DicomError::ParseAS(format!(
                    "Cannot get integer from {}",
                    repr
                ))),
            },
        }
    }
}

impl FromDicomValue for Age {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        Age::parse_from_str(el.get_string()?)
    }
}

impl FromDicomValue for NaiveDate {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        let dt = NaiveDate::parse_from_str(el.get_string()?, "%Y%m%d")?;
        Ok(dt)
    }
}

/// Components of a person name: family name, given name, middle name, prefix, suffix.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct PersonName(pub Vec<String>);

impl FromDicomValue for PersonName {
    fn from_element(el: &DataElement) -> Result<Self, DicomError> {
        let v = el
            .get_string()?
            .split('^')
            .map(|s| s.to_owned())
            .collect::<Vec<_>>();
        Ok(PersonName(v))
    }
}
