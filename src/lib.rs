//! Reading and writing of DICOM files.
//!
//! A file is parsed into a [`DicomFile`], a flat list of data elements where sequences hold
//! their items. The same list can be encoded back with [`writer::write_file`].
//!
//! ```rust
//! use dicom_codec::cursor::Encoder;
//! use dicom_codec::types::{DataElement, Value};
//! use dicom_codec::{parser, writer, Tag, TransferSyntax};
//!
//! let mut e = Encoder::new(TransferSyntax::little_endian_explicit());
//! writer::write_file_header(&mut e, "1.2.840.10008.1.2.1", "1.2.840.10008.5.1.4.1.1.2", "1.2.3");
//! let header = e.finish().unwrap();
//!
//! let mut dcm = parser::parse_bytes(&header).unwrap();
//! let name = Value::Strs(vec!["EUDIER^BENOIT".into()]);
//! dcm.push(DataElement::from_dictionary(Tag::new(0x0010, 0x0010), name).unwrap());
//! let bytes = writer::write_file(&dcm).unwrap();
//! assert_eq!(parser::parse_bytes(&bytes).unwrap(), dcm);
//! ```
pub mod cursor;
pub mod dictionary;
mod error;
pub mod parser;
mod tag;
pub mod transfer_syntax;
pub mod types;
pub mod value;
mod vr;
pub mod writer;

/*
    Crate exports.
*/
pub use cursor::{Decoder, Encoder};
pub use error::{DicomError, DicomResult};
pub use parser::Parser;
pub use tag::Tag;
pub use transfer_syntax::TransferSyntax;
pub use types::{DataElement, DicomFile, Item, Value};
pub use vr::{ValueRepresentation, VrKind};
