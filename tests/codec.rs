use dicom_codec::cursor::{Decoder, Encoder};
use dicom_codec::dictionary;
use dicom_codec::parser::{self, read_data_element};
use dicom_codec::types::{DataElement, DicomFile, Item, Value};
use dicom_codec::writer::{self, write_data_element};
use dicom_codec::{DicomError, Tag, TransferSyntax, ValueRepresentation};

const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

fn init() {
    let _ = pretty_env_logger::try_init();
}

fn strs(values: &[&str]) -> Value {
    Value::Strs(values.iter().map(|s| s.to_string()).collect())
}

fn header_only(transfer_syntax: &str) -> DicomFile {
    let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
    writer::write_file_header(
        &mut e,
        transfer_syntax,
        CT_IMAGE_STORAGE,
        "1.2.826.0.1.3680043.2.1125.1",
    );
    parser::parse_bytes(&e.finish().unwrap()).unwrap()
}

fn sample_file(transfer_syntax: &str) -> DicomFile {
    let mut file = header_only(transfer_syntax);
    file.push(DataElement::new(
        Tag::new(0x0008, 0x0008),
        ValueRepresentation::CS,
        strs(&["ORIGINAL", "PRIMARY", "AXIAL"]),
    ));
    file.push(DataElement::new(
        Tag::SOP_CLASS_UID,
        ValueRepresentation::UI,
        strs(&[CT_IMAGE_STORAGE]),
    ));
    file.push(DataElement::new(
        Tag::new(0x0008, 0x1140),
        ValueRepresentation::SQ,
        Value::Sequence(vec![Item::new(vec![
            DataElement::new(
                Tag::new(0x0008, 0x1150),
                ValueRepresentation::UI,
                strs(&[CT_IMAGE_STORAGE]),
            ),
            DataElement::new(Tag::new(0x0008, 0x1155), ValueRepresentation::UI, strs(&["1.2.3.4"])),
        ])]),
    ));
    file.push(DataElement::new(
        Tag::new(0x0010, 0x0010),
        ValueRepresentation::PN,
        strs(&["EUDIER^BENOIT"]),
    ));
    file.push(DataElement::new(Tag::new(0x0010, 0x1010), ValueRepresentation::AS, strs(&["031Y"])));
    file.push(DataElement::new(
        Tag::new(0x0018, 0x9755),
        ValueRepresentation::CS,
        strs(&["FooHah"]),
    ));
    file.push(DataElement::new(
        Tag::new(0x0020, 0x9057),
        ValueRepresentation::UL,
        Value::U32(vec![1234, 2345]),
    ));
    file.push(DataElement::new(
        Tag::new(0x0028, 0x0010),
        ValueRepresentation::US,
        Value::U16(vec![2]),
    ));
    file.push(DataElement::new(
        Tag::new(0x0028, 0x0011),
        ValueRepresentation::US,
        Value::U16(vec![2]),
    ));
    file.push(DataElement::new(
        Tag::new(0x0028, 0x1052),
        ValueRepresentation::DS,
        strs(&["-1024"]),
    ));
    file.push(DataElement::new(
        Tag::PIXEL_DATA,
        ValueRepresentation::OW,
        Value::Bytes(vec![0, 1, 2, 3, 4, 5, 6, 7]),
    ));
    file
}

#[test]
fn dictionary_entries() {
    init();
    let entry = dictionary::lookup_by_tag(Tag::new(0x0002, 0x0000)).unwrap();
    assert_eq!(entry.name, "MetaElementGroupLength");
    assert_eq!(entry.vr, "UL");

    let entry = dictionary::lookup_by_tag(Tag::new(32736, 16)).unwrap();
    assert_eq!(entry.name, "PixelData");
    assert_eq!(entry.vr, "OX");

    for entry in dictionary::entries() {
        assert_eq!(dictionary::lookup_by_name(entry.name).unwrap().tag, entry.tag);
    }
}

#[test]
fn text_element_explicit_little_endian() {
    init();
    let element = DataElement::new(
        Tag::new(0x0018, 0x9755),
        ValueRepresentation::CS,
        strs(&["FooHah"]),
    );
    let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
    write_data_element(&mut e, &element);
    let bytes = e.finish().unwrap();

    let mut d = Decoder::from_bytes(&bytes, TransferSyntax::little_endian_explicit());
    let decoded = read_data_element(&mut d).unwrap();
    d.finish().unwrap();
    assert_eq!(decoded.tag, Tag::new(0x0018, 0x9755));
    assert_eq!(decoded.get_strings().unwrap(), &["FooHah"]);
}

#[test]
fn u32_values_big_endian() {
    init();
    let element = DataElement::new(
        Tag::new(0x0020, 0x9057),
        ValueRepresentation::UL,
        Value::U32(vec![1234, 2345]),
    );
    let mut e = Encoder::new(TransferSyntax::big_endian_explicit());
    write_data_element(&mut e, &element);
    let bytes = e.finish().unwrap();
    assert_eq!(&bytes[8..12], &1234u32.to_be_bytes());

    let mut d = Decoder::from_bytes(&bytes, TransferSyntax::big_endian_explicit());
    let decoded = read_data_element(&mut d).unwrap();
    d.finish().unwrap();
    assert_eq!(decoded.get_u32s().unwrap(), &[1234, 2345]);
}

#[test]
fn missing_magic() {
    init();
    let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
    writer::write_file_header(&mut e, "1.2.840.10008.1.2.1", CT_IMAGE_STORAGE, "1.2.3");
    let mut bytes = e.finish().unwrap();
    bytes[128] = b'X';
    assert!(matches!(parser::parse_bytes(&bytes), Err(DicomError::BadMagic)));
}

/// Sequence with undefined length, first item with a defined length, second one delimited.
#[test]
fn mixed_items() {
    init();
    let content = |id: &str| {
        let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
        write_data_element(
            &mut e,
            &DataElement::new(Tag::new(0x0008, 0x1155), ValueRepresentation::UI, strs(&[id])),
        );
        e.finish().unwrap()
    };
    let first = content("1.2.3.4");
    let second = content("1.2.3.5");

    let mut delimited = vec![0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
    delimited.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
    delimited.extend_from_slice(&(first.len() as u32).to_le_bytes());
    delimited.extend_from_slice(&first);
    delimited.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF]);
    delimited.extend_from_slice(&second);
    delimited.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0, 0, 0, 0]);
    delimited.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0, 0, 0, 0]);

    let mut d = Decoder::from_bytes(&delimited, TransferSyntax::little_endian_explicit());
    let from_delimited = read_data_element(&mut d).unwrap();
    assert_eq!(d.context_depth(), 0);
    assert_eq!(d.limit_depth(), 0);
    d.finish().unwrap();

    let items = from_delimited.get_items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].elements[0].get_string().unwrap(), "1.2.3.4");
    assert_eq!(items[1].elements[0].get_string().unwrap(), "1.2.3.5");

    // same content, all lengths defined
    let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
    write_data_element(&mut e, &from_delimited);
    let defined = e.finish().unwrap();
    assert_ne!(defined, delimited);
    let mut d = Decoder::from_bytes(&defined, TransferSyntax::little_endian_explicit());
    let from_defined = read_data_element(&mut d).unwrap();
    d.finish().unwrap();

    assert!(from_delimited.is_undefined_length());
    assert!(!from_defined.is_undefined_length());
    assert_eq!(from_defined, from_delimited);
}

#[test]
fn whole_file_round_trip() {
    init();
    for ts in &["1.2.840.10008.1.2", "1.2.840.10008.1.2.1", "1.2.840.10008.1.2.2"] {
        let file = sample_file(ts);
        let bytes = writer::write_file(&file).unwrap();
        let parsed = parser::parse_bytes(&bytes).unwrap();
        assert_eq!(parsed, file, "{}", ts);
        assert_eq!(parsed.transfer_syntax().unwrap().uid, *ts);
        let age: dicom_codec::value::Age = parsed.try_get(Tag::new(0x0010, 0x1010)).unwrap();
        assert_eq!(age.age, 31);
    }
}

#[test]
fn stacks_are_balanced() {
    init();
    let file = sample_file("1.2.840.10008.1.2.2");
    let bytes = writer::write_file(&file).unwrap();

    let mut d = Decoder::from_bytes(&bytes, TransferSyntax::little_endian_explicit());
    let meta = parser::parse_file_header(&mut d).unwrap();
    assert_eq!(d.context_depth(), 0);
    assert_eq!(d.limit_depth(), 0);
    d.set_transfer_syntax(DicomFile::new(meta).transfer_syntax().unwrap());
    while d.remaining() > 0 {
        assert!(read_data_element(&mut d).is_some());
        assert_eq!(d.context_depth(), 0);
        assert_eq!(d.limit_depth(), 0);
    }
    d.finish().unwrap();
}

#[test]
fn truncated_at_element_boundaries() {
    init();
    let file = sample_file("1.2.840.10008.1.2.1");
    let bytes = writer::write_file(&file).unwrap();
    let meta_count = file.meta_elements().count();
    let header_len = writer::write_file(&DicomFile::new(file.meta_elements().cloned().collect()))
        .unwrap()
        .len();

    let mut boundary = header_len;
    for (count, element) in file.dataset().enumerate() {
        let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
        write_data_element(&mut e, element);
        let element_len = e.finish().unwrap().len();

        // the source ends here, but the declared length is the full file
        match parser::parse(&bytes[..boundary], bytes.len() as u64) {
            Err(DicomError::Incomplete { partial, source }) => {
                assert_eq!(partial.len(), meta_count + count);
                assert_eq!(&partial.elements[..], &file.elements[..meta_count + count]);
                assert!(matches!(*source, DicomError::UnexpectedEof { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }

        // cut in the middle of the element
        let cut = boundary + element_len / 2;
        match parser::parse_bytes(&bytes[..cut]) {
            Err(DicomError::Incomplete { partial, .. }) => {
                assert_eq!(partial.len(), meta_count + count)
            }
            other => panic!("unexpected {:?}", other),
        }

        boundary += element_len;
    }
    assert_eq!(boundary, bytes.len());
}

#[test]
fn truncated_header_is_not_partial() {
    init();
    let bytes = writer::write_file(&sample_file("1.2.840.10008.1.2.1")).unwrap();
    assert!(matches!(
        parser::parse_bytes(&bytes[..140]),
        Err(DicomError::UnexpectedEof { .. })
    ));
    // the meta group is longer than what is left
    assert!(matches!(
        parser::parse_bytes(&bytes[..150]),
        Err(DicomError::LengthExceedsLimit { .. })
    ));
}

#[test]
fn skip_pixel_data() {
    init();
    let bytes = writer::write_file(&sample_file("1.2.840.10008.1.2")).unwrap();
    let file = parser::Parser::new(false).parse_bytes(&bytes).unwrap();
    assert!(file.get_element(Tag::PIXEL_DATA).is_none());
    assert_eq!(file.try_get::<u16>(Tag::new(0x0028, 0x0011)).unwrap(), 2);
}

#[test]
fn deep_nesting_is_rejected() {
    init();
    let mut element = DataElement::new(
        Tag::new(0x0010, 0x0010),
        ValueRepresentation::PN,
        strs(&["A"]),
    );
    for _ in 0..10 {
        element = DataElement::new(
            Tag::new(0x0040, 0xA730),
            ValueRepresentation::SQ,
            Value::Sequence(vec![Item::new(vec![element])]),
        );
    }
    let mut file = header_only("1.2.840.10008.1.2.1");
    file.push(element);
    let bytes = writer::write_file(&file).unwrap();

    assert_eq!(parser::Parser::default().parse_bytes(&bytes).unwrap(), file);
    match parser::Parser::default().with_max_depth(5).parse_bytes(&bytes) {
        Err(DicomError::Incomplete { partial, source }) => {
            assert_eq!(partial.dataset().count(), 0);
            assert!(matches!(*source, DicomError::NestingTooDeep(5)));
        }
        other => panic!("unexpected {:?}", other),
    }
}
