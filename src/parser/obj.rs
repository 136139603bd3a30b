use super::element::{read_data_element, read_header, read_value};
use crate::cursor::{Decoder, DEFAULT_MAX_DEPTH};
use crate::types::{DataElement, DicomFile, Value};
use crate::{DicomError, DicomResult, Tag, TransferSyntax};
use log::debug;
use std::io::Read;

/// Bytes before the magic word. Their content is free.
pub const PREAMBLE_LENGTH: u64 = 128;
pub const MAGIC: &[u8; 4] = b"DICM";

/// Error recorded by the decoder after a read returned nothing.
fn latched_error<R: Read>(d: &mut Decoder<R>) -> DicomError {
    let offset = d.position();
    d.take_error()
        .unwrap_or(DicomError::UnexpectedEof { offset, wanted: 0 })
}

/// Parse the preamble, the magic word and the file meta information group.
///
/// The meta group is always encoded as explicit VR little endian, the transfer syntax of the
/// decoder is restored afterwards. Errors are returned directly rather than recorded, since
/// nothing can be parsed without the header.
pub fn parse_file_header<R: Read>(d: &mut Decoder<R>) -> DicomResult<Vec<DataElement>> {
    d.push_transfer_syntax(TransferSyntax::little_endian_explicit());
    let res = parse_group2(d);
    d.pop_transfer_syntax();
    res
}

fn parse_group2<R: Read>(d: &mut Decoder<R>) -> DicomResult<Vec<DataElement>> {
    debug!("Parse header");
    d.skip(PREAMBLE_LENGTH);
    let magic = d.read_bytes(MAGIC.len());
    if d.has_error() {
        return Err(latched_error(d));
    }
    if magic != MAGIC {
        return Err(DicomError::BadMagic);
    }

    debug!("Parse group 2");
    let group_length = match read_data_element(d) {
        Some(element) => element,
        None => return Err(latched_error(d)),
    };
    if group_length.tag != Tag::META_ELEMENT_GROUP_LENGTH {
        return Err(DicomError::MissingMetaGroupLength(group_length.tag));
    }
    let length = match group_length.value {
        Value::U32(ref v) if v.len() == 1 => v[0],
        _ => return Err(DicomError::InvalidMetaGroupLength),
    };

    let mut elements = vec![group_length];
    d.push_limit(length as u64);
    while d.remaining() > 0 && !d.has_error() {
        match read_data_element(d) {
            Some(element) => elements.push(element),
            None => break,
        }
    }
    d.pop_limit();

    if d.has_error() {
        return Err(latched_error(d));
    }
    Ok(elements)
}

/// High-level parser for dicom files.
///
/// ```rust,no_run
/// use dicom_codec::value::PersonName;
/// use dicom_codec::{DicomResult, Parser, Tag};
/// use std::fs::File;
///
/// let file = File::open("somefile.dcm").unwrap();
/// let length = file.metadata().unwrap().len();
///
/// // Parse everything but the pixel data.
/// let parser = Parser::new(false);
/// let dcm = parser.parse(file, length).unwrap();
///
/// // extract some tags (need to import `FromDicomValue` trait)
/// let name: DicomResult<PersonName> = dcm.try_get(Tag::new(0x0010, 0x0010));
/// let modality = dcm.lookup_by_name("Modality").and_then(|el| el.get_string().map(String::from));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    read_pixel_data: bool,
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            read_pixel_data: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Parser {
    /// Create a new parser. if `read_pixel_data` is true, the pixel data will be parsed and
    /// returned in the `DicomFile`. Otherwise, only the elements that are before the pixel data
    /// element will be parsed.
    pub fn new(read_pixel_data: bool) -> Self {
        Self {
            read_pixel_data,
            ..Default::default()
        }
    }

    /// How many sequences may be nested in each other.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse `length` bytes of `source` as a DICOM file.
    ///
    /// Errors found in the header are returned as they are. After the header, the error is
    /// wrapped in `DicomError::Incomplete` together with what was parsed before it.
    pub fn parse<R: Read>(&self, source: R, length: u64) -> DicomResult<DicomFile> {
        debug!("Start parsing object");
        let mut d = Decoder::new(source, length, TransferSyntax::little_endian_explicit());
        d.set_max_depth(self.max_depth);

        let mut file = DicomFile::new(parse_file_header(&mut d)?);
        let transfer_syntax = file.transfer_syntax()?;
        debug!("Transfer syntax is {:?}", transfer_syntax);
        d.set_transfer_syntax(transfer_syntax);

        debug!("Parse content");
        while d.remaining() > 0 && !d.has_error() {
            let header = match read_header(&mut d) {
                Some(header) => header,
                None => break,
            };
            if header.tag == Tag::PIXEL_DATA && !self.read_pixel_data {
                debug!("Stop before the pixel data");
                return Ok(file);
            }
            match read_value(&mut d, &header, 0) {
                Some(element) => file.push(element),
                None => break,
            }
        }

        match d.finish() {
            Ok(()) => {
                debug!("Parsed {} elements", file.len());
                Ok(file)
            }
            Err(source) => Err(DicomError::Incomplete {
                partial: Box::new(file),
                source: Box::new(source),
            }),
        }
    }

    pub fn parse_bytes(&self, data: &[u8]) -> DicomResult<DicomFile> {
        self.parse(data, data.len() as u64)
    }
}

/// Parse a whole DICOM file with the default options.
pub fn parse<R: Read>(source: R, length: u64) -> DicomResult<DicomFile> {
    Parser::default().parse(source, length)
}

pub fn parse_bytes(data: &[u8]) -> DicomResult<DicomFile> {
    Parser::default().parse_bytes(data)
}
