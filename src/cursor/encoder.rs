use crate::error::{DicomError, DicomResult};
use crate::transfer_syntax::{Endianness, TransferSyntax};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

macro_rules! write_number {
    ($(($name:ident, $ty:ty, $width:expr, $write:ident)),+) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                if self.has_error() {
                    return;
                }
                let mut buf = [0u8; $width];
                match self.transfer_syntax.endianness() {
                    Endianness::Little => LittleEndian::$write(&mut buf, value),
                    Endianness::Big => BigEndian::$write(&mut buf, value),
                }
                self.buf.extend_from_slice(&buf);
            }
        )+
    };
}

/// Writes DICOM primitives to memory, in the byte order of the current transfer syntax.
///
/// Same error model as the decoder: the first error is kept, and nothing is written after it.
pub struct Encoder {
    buf: Vec<u8>,
    transfer_syntax: TransferSyntax,
    old_syntaxes: Vec<TransferSyntax>,
    error: Option<DicomError>,
}

impl Encoder {
    pub fn new(transfer_syntax: TransferSyntax) -> Self {
        Self {
            buf: vec![],
            transfer_syntax,
            old_syntaxes: vec![],
            error: None,
        }
    }

    pub fn transfer_syntax(&self) -> TransferSyntax {
        self.transfer_syntax
    }

    pub fn push_transfer_syntax(&mut self, transfer_syntax: TransferSyntax) {
        self.old_syntaxes.push(self.transfer_syntax);
        self.transfer_syntax = transfer_syntax;
    }

    /// # Panics
    ///
    /// If there is no matching `push_transfer_syntax`.
    pub fn pop_transfer_syntax(&mut self) {
        self.transfer_syntax = self
            .old_syntaxes
            .pop()
            .expect("pop_transfer_syntax without push_transfer_syntax");
    }

    pub fn context_depth(&self) -> usize {
        self.old_syntaxes.len()
    }

    pub fn error(&self) -> Option<&DicomError> {
        self.error.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Record an error. Only the first one is kept.
    pub fn set_error(&mut self, err: DicomError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        if !self.has_error() {
            self.buf.push(value);
        }
    }

    write_number! {
        (write_u16, u16, 2, write_u16),
        (write_i16, i16, 2, write_i16),
        (write_u32, u32, 4, write_u32),
        (write_i32, i32, 4, write_i32),
        (write_u64, u64, 8, write_u64),
        (write_i64, i64, 8, write_i64),
        (write_f32, f32, 4, write_f32),
        (write_f64, f64, 8, write_f64)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if !self.has_error() {
            self.buf.extend_from_slice(bytes);
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub fn write_zeros(&mut self, count: usize) {
        if !self.has_error() {
            self.buf.resize(self.buf.len() + count, 0);
        }
    }

    /// The encoded bytes, or the first error.
    pub fn finish(self) -> DicomResult<Vec<u8>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.buf),
        }
    }
}
