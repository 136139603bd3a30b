//! Types specific to Dicom.
use crate::dictionary;
use crate::error::*;
use crate::transfer_syntax::TransferSyntax;
use crate::value::FromDicomValue;
use crate::vr::VrKind;
use crate::{Tag, ValueRepresentation};

/// Length of a value or item whose end is marked by a delimitation item.
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

/// Represent a DICOM file
///
/// Elements are kept in the order they were read: the meta information group first, then the
/// data set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DicomFile {
    pub elements: Vec<DataElement>,
}

impl DicomFile {
    pub fn new(elements: Vec<DataElement>) -> Self {
        Self { elements }
    }

    pub fn append(&mut self, mut elements: Vec<DataElement>) {
        self.elements.append(&mut elements);
    }

    pub fn push(&mut self, element: DataElement) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[DataElement] {
        &self.elements
    }

    /// Elements of the file meta information group (0002,xxxx).
    pub fn meta_elements(&self) -> impl Iterator<Item = &DataElement> {
        self.elements.iter().filter(|el| el.tag.is_meta())
    }

    /// Elements of the main data set.
    pub fn dataset(&self) -> impl Iterator<Item = &DataElement> {
        self.elements.iter().filter(|el| !el.tag.is_meta())
    }

    pub fn get_element(&self, tag: Tag) -> Option<&DataElement> {
        self.elements.iter().find(|el| el.tag == tag)
    }

    pub fn lookup_by_tag(&self, tag: Tag) -> DicomResult<&DataElement> {
        self.get_element(tag).ok_or(DicomError::NoSuchTag(tag))
    }

    /// Find an element from its dictionary keyword, e.g. "PatientName".
    pub fn lookup_by_name(&self, name: &str) -> DicomResult<&DataElement> {
        let entry = dictionary::lookup_by_name(name)?;
        self.get_element(entry.tag)
            .ok_or_else(|| DicomError::NoSuchElement(name.to_string()))
    }

    pub fn try_get<T: FromDicomValue>(&self, tag: Tag) -> DicomResult<T> {
        FromDicomValue::from_element(self.lookup_by_tag(tag)?)
    }

    /// Transfer syntax of the data set, from (0002,0010).
    pub fn transfer_syntax(&self) -> DicomResult<TransferSyntax> {
        let uid = self.lookup_by_name("TransferSyntaxUID")?.get_string()?;
        TransferSyntax::from_uid(uid)
    }
}

/// Data elements are the basic unit of a DICOM object.
///
/// They are made of:
/// - a Tag that indicates what the element is referring to
/// - the ValueRepresentation, read from the stream or resolved from the dictionary when the
///   transfer syntax has implicit VR
/// - the length of the value as found in the stream
/// - the decoded value
#[derive(Debug, Clone)]
pub struct DataElement {
    pub tag: Tag,
    pub vr: ValueRepresentation,
    pub length: u32,
    pub value: Value,
}

/// The length is how the element was encoded, not what it holds.
impl PartialEq for DataElement {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.vr == other.vr && self.value == other.value
    }
}

impl DataElement {
    /// Elements built in memory. Sequences get an undefined length until they are encoded.
    ///
    /// A single empty string is stored as no values, which is what a zero-length value decodes to.
    pub fn new(tag: Tag, vr: ValueRepresentation, value: Value) -> Self {
        let value = match value {
            Value::Strs(ref v) if v.len() == 1 && v[0].is_empty() => Value::Strs(vec![]),
            value => value,
        };
        let length = value.encoded_len().unwrap_or(UNDEFINED_LENGTH);
        Self {
            tag,
            vr,
            length,
            value,
        }
    }

    /// Same as `new`, with the VR of the dictionary.
    pub fn from_dictionary(tag: Tag, value: Value) -> DicomResult<Self> {
        let vr = dictionary::lookup_by_tag(tag)?.implicit_vr();
        Ok(Self::new(tag, vr, value))
    }

    pub fn is_undefined_length(&self) -> bool {
        self.length == UNDEFINED_LENGTH
    }

    pub fn name(&self) -> &'static str {
        self.tag.get_keyword()
    }

    fn mismatch(&self, expected: &'static str) -> DicomError {
        DicomError::ValueMismatch {
            tag: self.tag,
            vr: self.vr,
            expected,
        }
    }

    pub fn get_strings(&self) -> DicomResult<&[String]> {
        match self.value {
            Value::Strs(ref v) => Ok(v),
            _ => Err(self.mismatch("strings")),
        }
    }

    /// First text value.
    pub fn get_string(&self) -> DicomResult<&str> {
        self.get_strings()?
            .first()
            .map(|s| s.as_str())
            .ok_or(DicomError::EmptyValue(self.tag))
    }

    pub fn get_u16s(&self) -> DicomResult<&[u16]> {
        match self.value {
            Value::U16(ref v) => Ok(v),
            _ => Err(self.mismatch("u16")),
        }
    }

    pub fn get_u16(&self) -> DicomResult<u16> {
        self.get_u16s()?
            .first()
            .copied()
            .ok_or(DicomError::EmptyValue(self.tag))
    }

    pub fn get_u32s(&self) -> DicomResult<&[u32]> {
        match self.value {
            Value::U32(ref v) => Ok(v),
            _ => Err(self.mismatch("u32")),
        }
    }

    pub fn get_u32(&self) -> DicomResult<u32> {
        self.get_u32s()?
            .first()
            .copied()
            .ok_or(DicomError::EmptyValue(self.tag))
    }

    pub fn get_i32s(&self) -> DicomResult<&[i32]> {
        match self.value {
            Value::I32(ref v) => Ok(v),
            _ => Err(self.mismatch("i32")),
        }
    }

    pub fn get_f32s(&self) -> DicomResult<&[f32]> {
        match self.value {
            Value::F32(ref v) => Ok(v),
            _ => Err(self.mismatch("f32")),
        }
    }

    pub fn get_f64s(&self) -> DicomResult<&[f64]> {
        match self.value {
            Value::F64(ref v) => Ok(v),
            _ => Err(self.mismatch("f64")),
        }
    }

    pub fn get_bytes(&self) -> DicomResult<&[u8]> {
        match self.value {
            Value::Bytes(ref v) => Ok(v),
            _ => Err(self.mismatch("bytes")),
        }
    }

    pub fn get_items(&self) -> DicomResult<&[Item]> {
        match self.value {
            Value::Sequence(ref items) => Ok(items),
            _ => Err(self.mismatch("sequence")),
        }
    }
}

/// Decoded value of a data element. The variant follows the VR.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Strs(Vec<String>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    Tags(Vec<Tag>),
    Bytes(Vec<u8>),
    /// Encapsulated pixel data. The first fragment is the basic offset table.
    Fragments(Vec<Vec<u8>>),
    Sequence(Vec<Item>),
}

impl Value {
    /// Number of values.
    pub fn multiplicity(&self) -> usize {
        match self {
            Value::Strs(v) => v.len(),
            Value::U16(v) => v.len(),
            Value::I16(v) => v.len(),
            Value::U32(v) => v.len(),
            Value::I32(v) => v.len(),
            Value::U64(v) => v.len(),
            Value::I64(v) => v.len(),
            Value::F32(v) => v.len(),
            Value::F64(v) => v.len(),
            Value::Tags(v) => v.len(),
            Value::Bytes(_) => 1,
            Value::Fragments(v) => v.len(),
            Value::Sequence(v) => v.len(),
        }
    }

    /// Whether this variant is how values of the given VR are decoded.
    pub fn matches(&self, vr: ValueRepresentation) -> bool {
        match (vr.kind(), self) {
            (VrKind::Text, Value::Strs(_)) | (VrKind::SingleText, Value::Strs(_)) => true,
            (VrKind::U16, Value::U16(_)) | (VrKind::I16, Value::I16(_)) => true,
            (VrKind::U32, Value::U32(_)) | (VrKind::I32, Value::I32(_)) => true,
            (VrKind::U64, Value::U64(_)) | (VrKind::I64, Value::I64(_)) => true,
            (VrKind::F32, Value::F32(_)) | (VrKind::F64, Value::F64(_)) => true,
            (VrKind::Tag, Value::Tags(_)) => true,
            (VrKind::Bytes, Value::Bytes(_)) | (VrKind::Bytes, Value::Fragments(_)) => true,
            (VrKind::Sequence, Value::Sequence(_)) => true,
            // UN with undefined length hides a sequence
            (VrKind::Bytes, Value::Sequence(_)) => vr == ValueRepresentation::UN,
            _ => false,
        }
    }

    /// Length of the value once encoded, padding included. `None` for sequences and
    /// fragments, whose length depends on the encoding of their content.
    pub fn encoded_len(&self) -> Option<u32> {
        let len = match self {
            Value::Strs(v) => {
                let joined = v.iter().map(|s| s.len()).sum::<usize>() + v.len().saturating_sub(1);
                joined + joined % 2
            }
            Value::U16(v) => v.len() * 2,
            Value::I16(v) => v.len() * 2,
            Value::U32(v) => v.len() * 4,
            Value::I32(v) => v.len() * 4,
            Value::U64(v) => v.len() * 8,
            Value::I64(v) => v.len() * 8,
            Value::F32(v) => v.len() * 4,
            Value::F64(v) => v.len() * 8,
            Value::Tags(v) => v.len() * 4,
            Value::Bytes(v) => v.len() + v.len() % 2,
            Value::Fragments(_) | Value::Sequence(_) => return None,
        };
        if len >= UNDEFINED_LENGTH as usize {
            None
        } else {
            Some(len as u32)
        }
    }
}

/// An item is a list of data elements, one repetition of a sequence.
#[derive(Debug, Clone)]
pub struct Item {
    /// As found in the stream, `UNDEFINED_LENGTH` if the item ends with a delimitation item.
    pub length: u32,
    pub elements: Vec<DataElement>,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Item {
    pub fn new(elements: Vec<DataElement>) -> Self {
        Self {
            length: UNDEFINED_LENGTH,
            elements,
        }
    }

    pub fn get_element(&self, tag: Tag) -> Option<&DataElement> {
        self.elements.iter().find(|el| el.tag == tag)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn element(tag: Tag, vr: ValueRepresentation, value: Value) -> DataElement {
        DataElement::new(tag, vr, value)
    }

    #[test]
    fn accessors() {
        let el = element(
            Tag::new(0x0008, 0x0008),
            ValueRepresentation::CS,
            Value::Strs(vec!["ORIGINAL".to_string(), "PRIMARY".to_string()]),
        );
        assert_eq!(el.get_strings().unwrap().len(), 2);
        assert_eq!(el.get_string().unwrap(), "ORIGINAL");
        assert_eq!(el.length, 16);

        let el = element(Tag::new(0x0028, 0x0010), ValueRepresentation::US, Value::U16(vec![512]));
        assert_eq!(el.get_u16().unwrap(), 512);
        assert_eq!(el.length, 2);
    }

    #[test]
    fn accessor_mismatch_is_local() {
        let el = element(Tag::new(0x0028, 0x0010), ValueRepresentation::US, Value::U16(vec![512]));
        let err = el.get_string().unwrap_err();
        assert_eq!(
            format!("{}", err),
            "Value of (0028,0010) (VR US) cannot be read as strings"
        );
        // the element is still usable
        assert_eq!(el.get_u16s().unwrap(), &[512]);

        let empty = element(Tag::new(0x0010, 0x0010), ValueRepresentation::PN, Value::Strs(vec![]));
        match empty.get_string() {
            Err(DicomError::EmptyValue(tag)) => assert_eq!(tag, Tag::new(0x0010, 0x0010)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn from_dictionary() {
        let el = DataElement::from_dictionary(
            Tag::new(0x0020, 0x9057),
            Value::U32(vec![1234, 2345]),
        )
        .unwrap();
        assert_eq!(el.vr, ValueRepresentation::UL);
        assert_eq!(el.length, 8);
        assert_eq!(el.name(), "InStackPositionNumber");

        let el = DataElement::from_dictionary(Tag::PIXEL_DATA, Value::Bytes(vec![0; 3])).unwrap();
        assert_eq!(el.vr, ValueRepresentation::OW);
        assert_eq!(el.length, 4);

        let private = DataElement::from_dictionary(Tag::new(0x0009, 0x1001), Value::Bytes(vec![]));
        assert!(private.is_err());
    }

    #[test]
    fn equality_ignores_length() {
        let mut a = element(
            Tag::new(0x0008, 0x1140),
            ValueRepresentation::SQ,
            Value::Sequence(vec![Item::new(vec![])]),
        );
        let b = a.clone();
        a.length = 8;
        assert!(!a.is_undefined_length());
        assert!(b.is_undefined_length());
        assert_eq!(a, b);
    }

    #[test]
    fn value_matches_vr() {
        assert!(Value::Strs(vec![]).matches(ValueRepresentation::UT));
        assert!(Value::U32(vec![]).matches(ValueRepresentation::UL));
        assert!(!Value::U32(vec![]).matches(ValueRepresentation::US));
        assert!(Value::Bytes(vec![]).matches(ValueRepresentation::OW));
        assert!(Value::Sequence(vec![]).matches(ValueRepresentation::UN));
        assert!(!Value::Sequence(vec![]).matches(ValueRepresentation::OB));
    }

    #[test]
    fn lookup_in_file() {
        let file = DicomFile::new(vec![
            element(
                Tag::TRANSFER_SYNTAX_UID,
                ValueRepresentation::UI,
                Value::Strs(vec!["1.2.840.10008.1.2.1".to_string()]),
            ),
            element(
                Tag::new(0x0010, 0x0010),
                ValueRepresentation::PN,
                Value::Strs(vec!["BENOIT^EUDIER".to_string()]),
            ),
        ]);
        assert_eq!(file.meta_elements().count(), 1);
        assert_eq!(file.dataset().count(), 1);
        assert_eq!(
            file.lookup_by_name("PatientName").unwrap().get_string().unwrap(),
            "BENOIT^EUDIER"
        );
        assert!(file.lookup_by_name("PatientID").is_err());
        assert!(file.lookup_by_tag(Tag::new(0x0010, 0x0020)).is_err());
        assert_eq!(
            file.transfer_syntax().unwrap(),
            TransferSyntax::little_endian_explicit()
        );
    }
}
