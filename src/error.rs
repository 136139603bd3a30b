use crate::tag::Tag;
use crate::types::DicomFile;
use crate::ValueRepresentation;
use std::convert::From;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DicomError {
    #[error("Keyword 'DICM' not found in the header")]
    BadMagic,

    #[error("MetaElementGroupLength not found; found {0} instead")]
    MissingMetaGroupLength(Tag),

    #[error("MetaElementGroupLength should hold a single UL value")]
    InvalidMetaGroupLength,

    #[error("Transfer syntax is not supported: {0}")]
    UnsupportedTransferSyntax(String),

    #[error("Unexpected end of data at offset {offset}: {wanted} bytes requested")]
    UnexpectedEof { offset: u64, wanted: u64 },

    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("Decoder found junk ({0} bytes remaining)")]
    TrailingBytes(u64),

    #[error("Length {length} at offset {offset} exceeds the {remaining} bytes left in its region")]
    LengthExceedsLimit {
        offset: u64,
        length: u64,
        remaining: u64,
    },

    #[error("Invalid VR {:?} for tag {1} at offset {2}", String::from_utf8_lossy(.0))]
    InvalidVr([u8; 2], Tag, u64),

    #[error("Undefined length is not allowed for {tag} with VR {vr} (offset {offset})")]
    UndefinedLength {
        tag: Tag,
        vr: ValueRepresentation,
        offset: u64,
    },

    #[error("Length {length} of {tag} is not a multiple of the {vr} value width (offset {offset})")]
    InvalidLength {
        tag: Tag,
        vr: ValueRepresentation,
        length: u32,
        offset: u64,
    },

    #[error("Expected {expected} but found {found} at offset {offset}")]
    UnexpectedTag {
        expected: Tag,
        found: Tag,
        offset: u64,
    },

    #[error("Unexpected delimiter {0} at offset {1}")]
    UnexpectedDelimiter(Tag, u64),

    #[error("Sequences nested deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("Parsing stopped after {} elements: {source}", .partial.len())]
    Incomplete {
        partial: Box<DicomFile>,
        #[source]
        source: Box<DicomError>,
    },

    #[error("Value of {tag} (VR {vr}) cannot be read as {expected}")]
    ValueMismatch {
        tag: Tag,
        vr: ValueRepresentation,
        expected: &'static str,
    },

    #[error("Element {0} has no value")]
    EmptyValue(Tag),

    #[error("No tag {0} in Dicom file")]
    NoSuchTag(Tag),

    #[error("Could not find element named '{0}' in dicom file")]
    NoSuchElement(String),

    #[error("Tag {0} is not in the dictionary")]
    UnknownTag(Tag),

    #[error("Name '{0}' is not in the dictionary")]
    UnknownName(String),

    #[error("Cannot parse tag from '{0}'")]
    InvalidTagString(String),

    #[error("Value of {tag} is {length} bytes long, too long for a {vr} element")]
    ValueTooLong {
        tag: Tag,
        vr: ValueRepresentation,
        length: usize,
    },

    #[error("Cannot encode {0}: {1}")]
    CannotEncode(Tag, &'static str),

    #[error("Cannot parse AS to Age = {0}")]
    ParseAS(String),

    #[error("Cannot convert VR DA to date = {0}")]
    ParseDA(chrono::format::ParseError),

    #[error(transparent)]
    ParseIS(#[from] std::num::ParseIntError),

    #[error(transparent)]
    ParseDS(#[from] std::num::ParseFloatError),
}

impl From<chrono::format::ParseError> for DicomError {
    fn from(err: chrono::format::ParseError) -> Self {
        DicomError::ParseDA(err)
    }
}

pub type DicomResult<T> = Result<T, DicomError>;
