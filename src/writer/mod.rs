//! Encoding of data elements.
//!
//! Lengths are always defined: values, items and sequences are encoded in a separate buffer
//! first so that their length is known before the header is written.
use crate::cursor::Encoder;
use crate::error::DicomError;
use crate::types::{DataElement, Item, Value, UNDEFINED_LENGTH};
use crate::{Tag, TransferSyntax, ValueRepresentation};
use log::trace;

pub mod obj;

pub use obj::{write_file, write_file_header, write_meta_group, write_to};

fn write_tag(e: &mut Encoder, tag: Tag) {
    e.write_u16(tag.group);
    e.write_u16(tag.element);
}

/// Explicit VR: VR, then the length on 2 bytes, or 2 reserved bytes and the length on 4 bytes.
/// Implicit VR: the length on 4 bytes.
fn write_header(e: &mut Encoder, tag: Tag, vr: ValueRepresentation, length: usize) {
    let too_long = if e.transfer_syntax().is_vr_explicit() && !vr.has_special_length() {
        length > u16::MAX as usize
    } else {
        length >= UNDEFINED_LENGTH as usize
    };
    if too_long {
        e.set_error(DicomError::ValueTooLong { tag, vr, length });
        return;
    }

    write_tag(e, tag);
    if e.transfer_syntax().is_vr_explicit() {
        e.write_str(vr.code());
        if vr.has_special_length() {
            e.write_u16(0);
            e.write_u32(length as u32);
        } else {
            e.write_u16(length as u16);
        }
    } else {
        e.write_u32(length as u32);
    }
}

/// Encode a data element with the transfer syntax of the encoder.
///
/// The value must be of the variant the VR decodes to (see `Value::matches`).
pub fn write_data_element(e: &mut Encoder, element: &DataElement) {
    if e.has_error() {
        return;
    }
    trace!("write {:?} {}", element.tag, element.vr);
    if !element.value.matches(element.vr) {
        e.set_error(DicomError::ValueMismatch {
            tag: element.tag,
            vr: element.vr,
            expected: element.vr.description(),
        });
        return;
    }

    let mut value = Encoder::new(e.transfer_syntax());
    write_value(&mut value, element);
    match value.finish() {
        Ok(bytes) => {
            write_header(e, element.tag, element.vr, bytes.len());
            e.write_bytes(&bytes);
        }
        Err(err) => e.set_error(err),
    }
}

fn write_value(e: &mut Encoder, element: &DataElement) {
    match element.value {
        Value::Strs(ref v) => {
            let text = v.join("\\");
            e.write_str(&text);
            if text.len() % 2 == 1 {
                e.write_u8(element.vr.padding());
            }
        }
        Value::U16(ref v) => v.iter().for_each(|&n| e.write_u16(n)),
        Value::I16(ref v) => v.iter().for_each(|&n| e.write_i16(n)),
        Value::U32(ref v) => v.iter().for_each(|&n| e.write_u32(n)),
        Value::I32(ref v) => v.iter().for_each(|&n| e.write_i32(n)),
        Value::U64(ref v) => v.iter().for_each(|&n| e.write_u64(n)),
        Value::I64(ref v) => v.iter().for_each(|&n| e.write_i64(n)),
        Value::F32(ref v) => v.iter().for_each(|&n| e.write_f32(n)),
        Value::F64(ref v) => v.iter().for_each(|&n| e.write_f64(n)),
        Value::Tags(ref v) => v.iter().for_each(|&tag| write_tag(e, tag)),
        Value::Bytes(ref v) => {
            e.write_bytes(v);
            if v.len() % 2 == 1 {
                e.write_u8(0);
            }
        }
        Value::Fragments(_) => e.set_error(DicomError::CannotEncode(
            element.tag,
            "encapsulated fragments need an undefined length",
        )),
        Value::Sequence(ref items) => {
            // An unknown element holding a sequence keeps its content in implicit VR.
            let unknown = element.vr == ValueRepresentation::UN;
            if unknown {
                e.push_transfer_syntax(TransferSyntax::little_endian_implicit());
            }
            for item in items {
                write_item(e, item);
            }
            if unknown {
                e.pop_transfer_syntax();
            }
        }
    }
}

fn write_item(e: &mut Encoder, item: &Item) {
    let mut content = Encoder::new(e.transfer_syntax());
    for element in &item.elements {
        write_data_element(&mut content, element);
    }
    match content.finish() {
        Ok(bytes) if bytes.len() >= UNDEFINED_LENGTH as usize => {
            e.set_error(DicomError::ValueTooLong {
                tag: Tag::ITEM,
                vr: ValueRepresentation::SQ,
                length: bytes.len(),
            });
        }
        Ok(bytes) => {
            write_tag(e, Tag::ITEM);
            e.write_u32(bytes.len() as u32);
            e.write_bytes(&bytes);
        }
        Err(err) => e.set_error(err),
    }
}
