use super::write_data_element;
use crate::cursor::Encoder;
use crate::parser::obj::{MAGIC, PREAMBLE_LENGTH};
use crate::types::{DataElement, DicomFile, Value};
use crate::{DicomError, DicomResult, Tag, TransferSyntax, ValueRepresentation};
use log::debug;
use std::io::Write;

/// UID of this implementation, derived from a UUID.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.305828218466254227463217337281633858097";
pub const IMPLEMENTATION_VERSION_NAME: &str = "DICOM_CODEC_01";

fn text(tag: Tag, vr: ValueRepresentation, value: &str) -> DataElement {
    DataElement::new(tag, vr, Value::Strs(vec![value.to_string()]))
}

/// Write the preamble, the magic word and a meta group made of the given elements.
///
/// The group length is computed from the elements, a MetaElementGroupLength in `elements` is
/// ignored.
pub fn write_meta_group(e: &mut Encoder, elements: &[DataElement]) {
    e.push_transfer_syntax(TransferSyntax::little_endian_explicit());

    let mut meta = Encoder::new(TransferSyntax::little_endian_explicit());
    for element in elements
        .iter()
        .filter(|el| el.tag != Tag::META_ELEMENT_GROUP_LENGTH)
    {
        write_data_element(&mut meta, element);
    }
    match meta.finish() {
        Ok(bytes) => {
            e.write_zeros(PREAMBLE_LENGTH as usize);
            e.write_bytes(MAGIC);
            let group_length = DataElement::new(
                Tag::META_ELEMENT_GROUP_LENGTH,
                ValueRepresentation::UL,
                Value::U32(vec![bytes.len() as u32]),
            );
            write_data_element(e, &group_length);
            e.write_bytes(&bytes);
        }
        Err(err) => e.set_error(err),
    }

    e.pop_transfer_syntax();
}

/// Write the header of a file: preamble, magic word and meta group.
pub fn write_file_header(
    e: &mut Encoder,
    transfer_syntax_uid: &str,
    sop_class_uid: &str,
    sop_instance_uid: &str,
) {
    let elements = vec![
        DataElement::new(
            Tag::FILE_META_INFORMATION_VERSION,
            ValueRepresentation::OB,
            Value::Bytes(vec![0x00, 0x01]),
        ),
        text(Tag::MEDIA_STORAGE_SOP_CLASS_UID, ValueRepresentation::UI, sop_class_uid),
        text(
            Tag::MEDIA_STORAGE_SOP_INSTANCE_UID,
            ValueRepresentation::UI,
            sop_instance_uid,
        ),
        text(Tag::TRANSFER_SYNTAX_UID, ValueRepresentation::UI, transfer_syntax_uid),
        text(
            Tag::IMPLEMENTATION_CLASS_UID,
            ValueRepresentation::UI,
            IMPLEMENTATION_CLASS_UID,
        ),
        text(
            Tag::IMPLEMENTATION_VERSION_NAME,
            ValueRepresentation::SH,
            IMPLEMENTATION_VERSION_NAME,
        ),
    ];
    write_meta_group(e, &elements);
}

/// Encode a whole file. The data set is encoded with the transfer syntax found in its meta
/// group.
pub fn write_file(file: &DicomFile) -> DicomResult<Vec<u8>> {
    let transfer_syntax = file.transfer_syntax()?;
    debug!("Write file with transfer syntax {:?}", transfer_syntax);
    let mut e = Encoder::new(transfer_syntax);

    let meta = file.meta_elements().cloned().collect::<Vec<_>>();
    write_meta_group(&mut e, &meta);
    for element in file.dataset() {
        write_data_element(&mut e, element);
    }
    e.finish()
}

pub fn write_to<W: Write>(w: &mut W, file: &DicomFile) -> DicomResult<()> {
    let bytes = write_file(file)?;
    w.write_all(&bytes)
        .map_err(|source| DicomError::Io { offset: 0, source })
}
