//! SQ: Sequence of items, has its own special section in the DICOM specification.
//! It is a way to encode a sequence of multiple items... See
//! http://dicom.nema.org/dicom/2013/output/chtml/part05/sect_7.5.html
//! The length of a sequence is either defined as usual, or undefined and the SQ ends with a
//! Sequence delimitation item. The same goes for each item, which ends with an Item delimitation
//! item when its length is undefined.
//!
//! One item can contain multiple data elements.
//!
//! There are three special SQ related Data Elements that are not ruled by the VR encoding rules
//! conveyed by the Transfer Syntax. They shall be encoded as Implicit VR.
//! These special Data Elements are Item (FFFE,E000), Item Delimitation Item (FFFE,E00D),
//! and Sequence Delimitation Item (FFFE,E0DD). However, the Data Set within the Value Field of
//! the Data Element Item (FFFE,E000) shall be encoded according to the rules conveyed by the
//! Transfer Syntax.
//!
//! Encapsulated pixel data uses the same framing: fragments are items holding raw bytes.

use super::element::{read_header, read_next, Header, Next};
use crate::cursor::Decoder;
use crate::error::DicomError;
use crate::types::{Item, UNDEFINED_LENGTH};
use crate::{Tag, ValueRepresentation};
use log::{debug, warn};
use std::io::Read;

/// Delimitation items have no value, a length other than 0 is ignored.
fn check_delimiter(header: &Header) {
    if header.length != 0 {
        warn!(
            "Delimiter {} at offset {} has length {}, ignored",
            header.tag, header.offset, header.length
        );
    }
}

/// A sequence is a list of items. A sequence with undefined length is finished by the special
/// element xFFFExE0DD.
///
/// The decoder is positioned after the header of the SQ data element. `depth` is the nesting
/// level of the sequence, the top level data set being 0.
pub(crate) fn parse_seq<R: Read>(d: &mut Decoder<R>, length: u32, depth: usize) -> Vec<Item> {
    if depth > d.max_depth() {
        let max_depth = d.max_depth();
        d.set_error(DicomError::NestingTooDeep(max_depth));
        return vec![];
    }

    let mut items = vec![];
    if length == UNDEFINED_LENGTH {
        while let Some(header) = read_header(d) {
            match header.tag {
                Tag::ITEM => match parse_item(d, &header, depth) {
                    Some(item) => items.push(item),
                    None => break,
                },
                Tag::SEQUENCE_DELIMITATION => {
                    check_delimiter(&header);
                    break;
                }
                found => {
                    d.set_error(DicomError::UnexpectedTag {
                        expected: Tag::ITEM,
                        found,
                        offset: header.offset,
                    });
                    break;
                }
            }
        }
    } else {
        d.push_limit(length as u64);
        while d.remaining() > 0 && !d.has_error() {
            let header = match read_header(d) {
                Some(header) => header,
                None => break,
            };
            if header.tag != Tag::ITEM {
                d.set_error(DicomError::UnexpectedTag {
                    expected: Tag::ITEM,
                    found: header.tag,
                    offset: header.offset,
                });
                break;
            }
            match parse_item(d, &header, depth) {
                Some(item) => items.push(item),
                None => break,
            }
        }
        d.pop_limit();
    }

    items
}

/// An Item is just a sequence of data elements. The Item starts with tag xFFFExE000. It has no
/// VR but it can have a length. If length is `UNDEFINED_LENGTH`, then the Item will finish by the
/// Item delimitation tag xFFFExE00D
///
/// | TAG | LENGTH | DATA |
/// | 4   | 4      | n    |
///
pub(crate) fn parse_item<R: Read>(
    d: &mut Decoder<R>,
    header: &Header,
    depth: usize,
) -> Option<Item> {
    let mut elements = vec![];

    if header.is_undefined_length() {
        loop {
            match read_next(d, depth) {
                Some(Next::Element(element)) => elements.push(element),
                Some(Next::Marker(marker)) if marker.tag == Tag::ITEM_DELIMITATION => {
                    debug!("Found Item delimitation tag");
                    check_delimiter(&marker);
                    break;
                }
                Some(Next::Marker(marker)) => {
                    d.set_error(DicomError::UnexpectedDelimiter(marker.tag, marker.offset));
                    break;
                }
                None => break,
            }
        }
    } else {
        d.push_limit(header.length as u64);
        while d.remaining() > 0 && !d.has_error() {
            match read_next(d, depth) {
                Some(Next::Element(element)) => elements.push(element),
                Some(Next::Marker(marker)) => {
                    d.set_error(DicomError::UnexpectedDelimiter(marker.tag, marker.offset));
                }
                None => break,
            }
        }
        d.pop_limit();
    }

    if d.has_error() {
        return None;
    }
    Some(Item {
        length: header.length,
        elements,
    })
}

/// Encapsulated pixel data: items of raw bytes until the sequence delimitation item. The first
/// one is the basic offset table, often empty.
pub(crate) fn parse_fragments<R: Read>(
    d: &mut Decoder<R>,
    tag: Tag,
    vr: ValueRepresentation,
) -> Vec<Vec<u8>> {
    let mut fragments = vec![];
    while let Some(header) = read_header(d) {
        match header.tag {
            Tag::ITEM if header.is_undefined_length() => {
                d.set_error(DicomError::UndefinedLength {
                    tag,
                    vr,
                    offset: header.offset,
                });
                break;
            }
            Tag::ITEM => {
                if !d.check_available(header.length as u64) {
                    break;
                }
                fragments.push(d.read_bytes(header.length as usize));
            }
            Tag::SEQUENCE_DELIMITATION => {
                check_delimiter(&header);
                break;
            }
            found => {
                d.set_error(DicomError::UnexpectedTag {
                    expected: Tag::ITEM,
                    found,
                    offset: header.offset,
                });
                break;
            }
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_data_element;
    use crate::types::{DataElement, Value};
    use crate::TransferSyntax;

    fn item_content() -> Vec<u8> {
        vec![
            0x08, 0x00, 0x00, 0x00, 0x55, 0x4c, 0x04, 0x00, 0x30, 0x00, 0x00, 0x00, 0x08, 0x00,
            0x00, 0x01, 0x53, 0x48, 0x08, 0x00, 0x54, 0x2d, 0x31, 0x31, 0x35, 0x30, 0x33, 0x20,
            0x08, 0x00, 0x02, 0x01, 0x53, 0x48, 0x04, 0x00, 0x53, 0x4e, 0x4d, 0x33, 0x08, 0x00,
            0x04, 0x01, 0x4c, 0x4f, 0x0c, 0x00, 0x4c, 0x75, 0x6d, 0x62, 0x61, 0x72, 0x20, 0x73,
            0x70, 0x69, 0x6e, 0x65,
        ]
    }

    fn item_header(length: u32) -> Vec<u8> {
        let mut data = vec![0xFE, 0xFF, 0x00, 0xE0];
        data.extend_from_slice(&length.to_le_bytes());
        data
    }

    fn parse_one_item(data: &[u8]) -> Item {
        let mut d = Decoder::from_bytes(data, TransferSyntax::little_endian_explicit());
        let header = read_header(&mut d).unwrap();
        let item = parse_item(&mut d, &header, 1);
        assert_eq!(d.limit_depth(), 0);
        d.finish().unwrap();
        item.unwrap()
    }

    #[test]
    fn parse_item_implicitlength() {
        let mut data = item_header(UNDEFINED_LENGTH);
        data.extend(item_content());
        // item delimitation tag
        data.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        let item = parse_one_item(&data);
        assert_eq!(item.elements.len(), 4);
        assert_eq!(item.elements[0].tag, Tag::new(0x0008, 0x0000));
        assert_eq!(item.elements[0].get_u32().unwrap(), 48);
        assert_eq!(item.elements[1].get_string().unwrap(), "T-11503");
        assert_eq!(item.elements[2].get_string().unwrap(), "SNM3");
        assert_eq!(item.elements[3].get_string().unwrap(), "Lumbar spine");
    }

    #[test]
    fn parse_item_definedlength() {
        let content = item_content();
        let mut data = item_header(content.len() as u32);
        data.extend(content);

        let item = parse_one_item(&data);
        assert_eq!(item.length, 60);
        assert_eq!(item.elements.len(), 4);
        assert_eq!(item.elements[3].vr, ValueRepresentation::LO);
    }

    #[test]
    fn item_length_past_the_end() {
        let mut data = item_header(200);
        data.extend(item_content());
        let mut d = Decoder::from_bytes(&data, TransferSyntax::little_endian_explicit());
        let header = read_header(&mut d).unwrap();
        assert!(parse_item(&mut d, &header, 1).is_none());
        assert_eq!(d.limit_depth(), 0);
        assert!(matches!(
            d.error(),
            Some(DicomError::LengthExceedsLimit { length: 200, .. })
        ));
    }

    #[test]
    fn sequence_with_mixed_items() {
        let content = item_content();
        let mut data = vec![0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00];
        data.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
        data.extend(item_header(content.len() as u32));
        data.extend(content.clone());
        data.extend(item_header(UNDEFINED_LENGTH));
        data.extend(content);
        data.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00]);
        data.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        let mut d = Decoder::from_bytes(&data, TransferSyntax::little_endian_explicit());
        let element = read_data_element(&mut d).unwrap();
        assert_eq!(d.limit_depth(), 0);
        d.finish().unwrap();

        let items = element.get_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], items[1]);
        assert_eq!(items[0].length, 60);
        assert_eq!(items[1].length, UNDEFINED_LENGTH);
    }

    #[test]
    fn wrong_tag_in_sequence() {
        let mut data = vec![0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00];
        data.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
        data.extend_from_slice(&[0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x00, 0x00]);
        let mut d = Decoder::from_bytes(&data, TransferSyntax::little_endian_explicit());
        assert!(read_data_element(&mut d).is_none());
        assert!(matches!(
            d.error(),
            Some(DicomError::UnexpectedTag { offset: 12, .. })
        ));
    }

    #[test]
    fn nesting_is_capped() {
        // Sequences of undefined length, each holding one item of undefined length with the
        // next sequence inside.
        let nested = |levels: usize| {
            let mut data = vec![];
            for _ in 0..levels {
                data.extend_from_slice(&[0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00]);
                data.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
                data.extend(item_header(UNDEFINED_LENGTH));
            }
            for _ in 0..levels {
                data.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00]);
                data.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00]);
            }
            data
        };

        let data = nested(3);
        let mut d = Decoder::from_bytes(&data, TransferSyntax::little_endian_explicit());
        d.set_max_depth(3);
        assert!(read_data_element(&mut d).is_some());
        d.finish().unwrap();

        let data = nested(4);
        let mut d = Decoder::from_bytes(&data, TransferSyntax::little_endian_explicit());
        d.set_max_depth(3);
        assert!(read_data_element(&mut d).is_none());
        assert!(matches!(d.error(), Some(DicomError::NestingTooDeep(3))));
        assert_eq!(d.limit_depth(), 0);
    }

    #[test]
    fn encapsulated_fragments() {
        let mut data = vec![0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00];
        data.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
        // empty basic offset table
        data.extend(item_header(0));
        data.extend(item_header(4));
        data.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9]);
        data.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        let mut d = Decoder::from_bytes(&data, TransferSyntax::little_endian_explicit());
        let element = read_data_element(&mut d).unwrap();
        d.finish().unwrap();
        assert_eq!(
            element,
            DataElement::new(
                Tag::PIXEL_DATA,
                ValueRepresentation::OB,
                Value::Fragments(vec![vec![], vec![0xFF, 0xD8, 0xFF, 0xD9]])
            )
        );
    }

    #[test]
    fn delimiter_with_length_is_tolerated() {
        let mut data = item_header(UNDEFINED_LENGTH);
        data.extend_from_slice(&[0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x00, 0x00]);
        data.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x04, 0x00, 0x00, 0x00]);
        let item = parse_one_item(&data);
        assert_eq!(item.elements.len(), 1);
    }
}
