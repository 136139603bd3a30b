use super::sq::{parse_fragments, parse_seq};
use super::{parse_length, parse_tag, parse_vr};
use crate::cursor::Decoder;
use crate::dictionary;
use crate::error::DicomError;
use crate::types::{DataElement, Value, UNDEFINED_LENGTH};
use crate::vr::VrKind;
use crate::{Tag, TransferSyntax, ValueRepresentation};
use log::trace;
use std::io::Read;

/// Tag, VR and length of a data element, before its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    pub tag: Tag,
    /// `None` for items and delimiters, which never have a VR.
    pub vr: Option<ValueRepresentation>,
    pub length: u32,
    /// Position of the tag in the stream.
    pub offset: u64,
}

impl Header {
    /// Item or delimitation item.
    pub fn is_marker(&self) -> bool {
        self.vr.is_none()
    }

    pub fn is_undefined_length(&self) -> bool {
        self.length == UNDEFINED_LENGTH
    }
}

/// Result of reading where a data element may start.
pub(crate) enum Next {
    Element(DataElement),
    Marker(Header),
}

/// Read the header of the next data element.
///
/// With implicit VR, the VR comes from the dictionary (UN for unknown tags).
pub fn read_header<R: Read>(d: &mut Decoder<R>) -> Option<Header> {
    let offset = d.position();
    let tag = parse_tag(d);
    if d.has_error() {
        return None;
    }
    trace!("TAG = {:?}", tag);

    if tag.group == 0xFFFE {
        // Items and delimiters are encoded as implicit VR, whatever the transfer syntax.
        let length = d.read_u32();
        if d.has_error() {
            return None;
        }
        return Some(Header {
            tag,
            vr: None,
            length,
            offset,
        });
    }

    let (vr, length) = if d.transfer_syntax().is_vr_explicit() {
        let vr = parse_vr(d, tag)?;
        (vr, parse_length(d, Some(&vr)))
    } else {
        let vr = dictionary::lookup_by_tag(tag)
            .map(|entry| entry.implicit_vr())
            .unwrap_or(ValueRepresentation::UN);
        (vr, parse_length(d, None))
    };
    if d.has_error() {
        return None;
    }
    trace!("VR = {}, LENGTH = {}", vr, length);

    if length == UNDEFINED_LENGTH && !vr.allows_undefined_length() {
        d.set_error(DicomError::UndefinedLength { tag, vr, offset });
        return None;
    }

    Some(Header {
        tag,
        vr: Some(vr),
        length,
        offset,
    })
}

/// Read the value announced by `header` and build the element.
///
/// `depth` is the number of sequences the element is nested in.
pub fn read_value<R: Read>(
    d: &mut Decoder<R>,
    header: &Header,
    depth: usize,
) -> Option<DataElement> {
    let vr = match header.vr {
        Some(vr) => vr,
        None => {
            d.set_error(DicomError::UnexpectedDelimiter(header.tag, header.offset));
            return None;
        }
    };
    let value = parse_element_data(d, header.tag, vr, header.length, depth);
    if d.has_error() {
        return None;
    }
    Some(DataElement {
        tag: header.tag,
        vr,
        length: header.length,
        value,
    })
}

/// Read one data element of the top level data set.
///
/// Return `None` when something went wrong, the error is then available on the decoder.
pub fn read_data_element<R: Read>(d: &mut Decoder<R>) -> Option<DataElement> {
    match read_next(d, 0)? {
        Next::Element(element) => Some(element),
        Next::Marker(header) => {
            d.set_error(DicomError::UnexpectedDelimiter(header.tag, header.offset));
            None
        }
    }
}

pub(crate) fn read_next<R: Read>(d: &mut Decoder<R>, depth: usize) -> Option<Next> {
    let header = read_header(d)?;
    if header.is_marker() {
        return Some(Next::Marker(header));
    }
    read_value(d, &header, depth).map(Next::Element)
}

fn parse_element_data<R: Read>(
    d: &mut Decoder<R>,
    tag: Tag,
    vr: ValueRepresentation,
    length: u32,
    depth: usize,
) -> Value {
    if length == UNDEFINED_LENGTH {
        return match vr {
            ValueRepresentation::UN => {
                // Content of an unknown element of undefined length is a sequence in implicit VR.
                d.push_transfer_syntax(TransferSyntax::little_endian_implicit());
                let items = parse_seq(d, length, depth + 1);
                d.pop_transfer_syntax();
                Value::Sequence(items)
            }
            ValueRepresentation::OB | ValueRepresentation::OW => {
                Value::Fragments(parse_fragments(d, tag, vr))
            }
            _ => Value::Sequence(parse_seq(d, length, depth + 1)),
        };
    }

    if vr == ValueRepresentation::SQ {
        return Value::Sequence(parse_seq(d, length, depth + 1));
    }

    // A corrupt length must not make us allocate.
    if !d.check_available(length as u64) {
        return Value::Bytes(vec![]);
    }

    let kind = vr.kind();
    let count = match kind.width() {
        Some(width) if length as usize % width != 0 => {
            d.set_error(DicomError::InvalidLength {
                tag,
                vr,
                length,
                offset: d.position(),
            });
            return Value::Bytes(vec![]);
        }
        Some(width) => length as usize / width,
        None => 0,
    };

    let length = length as usize;
    match kind {
        VrKind::Text => Value::Strs(split_text(&d.read_string(length))),
        VrKind::SingleText => {
            let text = d.read_string(length);
            let text = text.trim_end_matches(|c: char| c == ' ' || c == '\0');
            if length == 0 {
                Value::Strs(vec![])
            } else {
                Value::Strs(vec![text.to_string()])
            }
        }
        VrKind::U16 => Value::U16((0..count).map(|_| d.read_u16()).collect()),
        VrKind::I16 => Value::I16((0..count).map(|_| d.read_i16()).collect()),
        VrKind::U32 => Value::U32((0..count).map(|_| d.read_u32()).collect()),
        VrKind::I32 => Value::I32((0..count).map(|_| d.read_i32()).collect()),
        VrKind::U64 => Value::U64((0..count).map(|_| d.read_u64()).collect()),
        VrKind::I64 => Value::I64((0..count).map(|_| d.read_i64()).collect()),
        VrKind::F32 => Value::F32((0..count).map(|_| d.read_f32()).collect()),
        VrKind::F64 => Value::F64((0..count).map(|_| d.read_f64()).collect()),
        VrKind::Tag => Value::Tags((0..count).map(|_| parse_tag(d)).collect()),
        VrKind::Bytes | VrKind::Sequence => Value::Bytes(d.read_bytes(length)),
    }
}

/// Multiple values are separated by a backslash. Padding is not part of the values.
fn split_text(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    text.split('\\')
        .map(|s| s.trim_matches(|c: char| c == ' ' || c == '\0').to_string())
        .collect()
}
