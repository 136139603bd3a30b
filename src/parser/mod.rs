//! All the functions to parse the DICOM.
//!
//! Parsing is done on a [`Decoder`](crate::cursor::Decoder). Functions here do not return
//! errors: they record them on the decoder and return nothing (or a default value), so a caller
//! checks the decoder once after a batch of reads.

use crate::cursor::Decoder;
use crate::error::DicomError;
use crate::{Tag, ValueRepresentation};
use std::io::Read;

mod element;
pub mod obj;
pub mod sq;

pub use element::{read_data_element, read_header, read_value, Header};
pub use obj::{parse, parse_bytes, parse_file_header, Parser};

/// A tag is made of two u16: the group and the element.
pub(crate) fn parse_tag<R: Read>(d: &mut Decoder<R>) -> Tag {
    let group = d.read_u16();
    let element = d.read_u16();
    Tag::new(group, element)
}

/// Value Representation is encoded as two characters (ascii).
pub(crate) fn parse_vr<R: Read>(d: &mut Decoder<R>, tag: Tag) -> Option<ValueRepresentation> {
    let offset = d.position();
    let code = [d.read_u8(), d.read_u8()];
    if d.has_error() {
        return None;
    }
    let vr = ValueRepresentation::from_bytes(code);
    if vr.is_none() {
        d.set_error(DicomError::InvalidVr(code, tag, offset));
    }
    vr
}

/// Depending on whether there is a VR, the length is parsed differently:
/// - No VR => 4 bytes
/// - VR => normal case, 2 bytes,
///         special case, 2 bytes padding + 4 bytes of length.
pub(crate) fn parse_length<R: Read>(d: &mut Decoder<R>, vr: Option<&ValueRepresentation>) -> u32 {
    match vr {
        Some(vr) => {
            if vr.has_special_length() {
                // in some VR cases, there is some padding before the actual length...
                let _reserved = d.read_u16();
                d.read_u32()
            } else {
                d.read_u16() as u32
            }
        }
        // If no VR, length is 4 bytes.
        None => d.read_u32(),
    }
}
