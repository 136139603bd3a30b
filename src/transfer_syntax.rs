//! Transfer syntax defines the endianness and the presence of value representation.
//! It is necessary during parsing. The transfer syntax is defined in the tag (0x0002,0x010) which
//! is at the beginning of the file.
//!
//! Compressed transfer syntaxes are all Explicit VR Little Endian: only the pixel data is
//! compressed and it is carried as encapsulated fragments, which this crate does not decode.
use crate::error::{DicomError, DicomResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

/// Sometime DCM files contain the image as JPG...
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CompressionScheme {
    JpegBaseline,
    JpegExtended,
    JpegLossless,
    JpegLs,
    Jpeg2000Lossless,
    Jpeg2000,
    Mpeg2,
    Mpeg4,
    Hevc,
    Rle,
    HighThroughputJpeg2000,
    JpegXl,
    Deflate,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct TransferSyntax {
    pub uid: &'static str,
    endianness: Endianness,
    is_vr_explicit: bool,
    pub compression_scheme: Option<CompressionScheme>,
}

pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";

const ENCAPSULATED: &[(&str, CompressionScheme)] = &[
    ("1.2.840.10008.1.2.4.50", CompressionScheme::JpegBaseline),
    ("1.2.840.10008.1.2.4.51", CompressionScheme::JpegExtended),
    ("1.2.840.10008.1.2.4.57", CompressionScheme::JpegLossless),
    ("1.2.840.10008.1.2.4.70", CompressionScheme::JpegLossless),
    ("1.2.840.10008.1.2.4.80", CompressionScheme::JpegLs),
    ("1.2.840.10008.1.2.4.81", CompressionScheme::JpegLs),
    ("1.2.840.10008.1.2.4.90", CompressionScheme::Jpeg2000Lossless),
    ("1.2.840.10008.1.2.4.91", CompressionScheme::Jpeg2000),
    ("1.2.840.10008.1.2.4.92", CompressionScheme::Jpeg2000Lossless),
    ("1.2.840.10008.1.2.4.93", CompressionScheme::Jpeg2000),
    ("1.2.840.10008.1.2.4.100", CompressionScheme::Mpeg2),
    ("1.2.840.10008.1.2.4.101", CompressionScheme::Mpeg2),
    ("1.2.840.10008.1.2.4.102", CompressionScheme::Mpeg4),
    ("1.2.840.10008.1.2.4.103", CompressionScheme::Mpeg4),
    ("1.2.840.10008.1.2.4.104", CompressionScheme::Mpeg4),
    ("1.2.840.10008.1.2.4.105", CompressionScheme::Mpeg4),
    ("1.2.840.10008.1.2.4.106", CompressionScheme::Mpeg4),
    ("1.2.840.10008.1.2.4.107", CompressionScheme::Hevc),
    ("1.2.840.10008.1.2.4.108", CompressionScheme::Hevc),
    ("1.2.840.10008.1.2.4.110", CompressionScheme::JpegXl),
    ("1.2.840.10008.1.2.4.111", CompressionScheme::JpegXl),
    ("1.2.840.10008.1.2.4.112", CompressionScheme::JpegXl),
    ("1.2.840.10008.1.2.4.201", CompressionScheme::HighThroughputJpeg2000),
    ("1.2.840.10008.1.2.4.202", CompressionScheme::HighThroughputJpeg2000),
    ("1.2.840.10008.1.2.4.203", CompressionScheme::HighThroughputJpeg2000),
    ("1.2.840.10008.1.2.5", CompressionScheme::Rle),
    ("1.2.840.10008.1.2.8.1", CompressionScheme::Deflate),
];

impl TransferSyntax {
    pub fn with_compression_scheme(uid: &'static str, scheme: CompressionScheme) -> Self {
        Self {
            uid,
            endianness: Endianness::Little,
            is_vr_explicit: true,
            compression_scheme: Some(scheme),
        }
    }

    pub fn little_endian_explicit() -> Self {
        Self {
            uid: EXPLICIT_VR_LITTLE_ENDIAN,
            endianness: Endianness::Little,
            is_vr_explicit: true,
            compression_scheme: None,
        }
    }

    pub fn big_endian_explicit() -> Self {
        Self {
            uid: EXPLICIT_VR_BIG_ENDIAN,
            endianness: Endianness::Big,
            is_vr_explicit: true,
            compression_scheme: None,
        }
    }

    pub fn little_endian_implicit() -> Self {
        Self {
            uid: IMPLICIT_VR_LITTLE_ENDIAN,
            endianness: Endianness::Little,
            is_vr_explicit: false,
            compression_scheme: None,
        }
    }

    /// Resolve a transfer syntax UID, as found in (0002,0010).
    ///
    /// If a Value Field containing one or more UIDs is an odd number of bytes in length, the
    /// Value Field shall be padded with a single trailing NULL (00H) character, so padding is
    /// ignored here.
    pub fn from_uid(uid: &str) -> DicomResult<Self> {
        let uid = uid.trim_end_matches(|c: char| c == '\0' || c == ' ');
        match uid {
            IMPLICIT_VR_LITTLE_ENDIAN => Ok(TransferSyntax::little_endian_implicit()),
            EXPLICIT_VR_LITTLE_ENDIAN => Ok(TransferSyntax::little_endian_explicit()),
            EXPLICIT_VR_BIG_ENDIAN => Ok(TransferSyntax::big_endian_explicit()),
            _ => ENCAPSULATED
                .iter()
                .find(|(known, _)| *known == uid)
                .map(|(known, scheme)| TransferSyntax::with_compression_scheme(*known, *scheme))
                .ok_or_else(|| DicomError::UnsupportedTransferSyntax(uid.to_string())),
        }
    }

    /// Return the endianness in which the dicom data was encoded.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Return true if the value representation is explicit in data elements
    pub fn is_vr_explicit(&self) -> bool {
        self.is_vr_explicit
    }

    pub fn is_encapsulated(&self) -> bool {
        self.compression_scheme.is_some()
    }
}
