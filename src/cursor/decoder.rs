use crate::error::{DicomError, DicomResult};
use crate::transfer_syntax::{Endianness, TransferSyntax};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::trace;
use std::io::{self, Read};

/// How deep sequences may be nested before the data is considered corrupt.
pub const DEFAULT_MAX_DEPTH: usize = 64;

macro_rules! read_number {
    ($(($name:ident, $ty:ty, $width:expr, $read:ident)),+) => {
        $(
            pub fn $name(&mut self) -> $ty {
                let mut buf = [0u8; $width];
                if !self.fill(&mut buf) {
                    return Default::default();
                }
                match self.transfer_syntax.endianness() {
                    Endianness::Little => LittleEndian::$read(&buf),
                    Endianness::Big => BigEndian::$read(&buf),
                }
            }
        )+
    };
}

/// Sequential reader of DICOM primitives.
///
/// The decoder never reads past its limit. `push_limit` narrows the readable region (meta
/// group, item of known length...) and `pop_limit` restores the enclosing one, the same goes for
/// the transfer syntax with `push_transfer_syntax` and `pop_transfer_syntax`.
///
/// Errors are sticky: the first failure is kept and every read after it returns a default
/// value without touching the source. Check `error()` after a batch of reads, and call
/// `finish()` at the end.
pub struct Decoder<R> {
    source: R,
    transfer_syntax: TransferSyntax,
    old_syntaxes: Vec<TransferSyntax>,
    pos: u64,
    limit: u64,
    old_limits: Vec<u64>,
    error: Option<DicomError>,
    max_depth: usize,
}

impl<'a> Decoder<&'a [u8]> {
    pub fn from_bytes(data: &'a [u8], transfer_syntax: TransferSyntax) -> Self {
        Decoder::new(data, data.len() as u64, transfer_syntax)
    }
}

impl<R: Read> Decoder<R> {
    /// `limit` must be the length of the data: the decoder relies on it to know where the data
    /// set ends.
    pub fn new(source: R, limit: u64, transfer_syntax: TransferSyntax) -> Self {
        Self {
            source,
            transfer_syntax,
            old_syntaxes: vec![],
            pos: 0,
            limit,
            old_limits: vec![],
            error: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn transfer_syntax(&self) -> TransferSyntax {
        self.transfer_syntax
    }

    /// Change the transfer syntax for the rest of the data, without saving the current one.
    pub fn set_transfer_syntax(&mut self, transfer_syntax: TransferSyntax) {
        self.transfer_syntax = transfer_syntax;
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

    /// Temporarily override the end of the data: only the next `length` bytes can be read.
    ///
    /// `length` should fit in what remains. If it does not, the error is recorded and the new
    /// limit is the current one, so that the matching `pop_limit` stays balanced.
    pub fn push_limit(&mut self, length: u64) {
        let remaining = self.remaining();
        let length = if length > remaining {
            self.set_error(DicomError::LengthExceedsLimit {
                offset: self.pos,
                length,
                remaining,
            });
            remaining
        } else {
            length
        };
        trace!("push limit {} at {}", length, self.pos);
        self.old_limits.push(self.limit);
        self.limit = self.pos + length;
    }

    /// Restore the limit overridden by `push_limit`.
    ///
    /// # Panics
    ///
    /// If there is no matching `push_limit`.
    pub fn pop_limit(&mut self) {
        self.limit = self
            .old_limits
            .pop()
            .expect("pop_limit without push_limit");
    }

    /// Number of nested transfer syntaxes.
    pub fn context_depth(&self) -> usize {
        self.old_syntaxes.len()
    }

    /// Number of nested limits.
    pub fn limit_depth(&self) -> usize {
        self.old_limits.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Bytes read so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Bytes left before the current limit.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.pos)
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
            trace!("decoder error at {}: {}", self.pos, err);
            self.error = Some(err);
        }
    }

    pub fn take_error(&mut self) -> Option<DicomError> {
        self.error.take()
    }

    /// Must be called once the data is decoded. Return the recorded error, if any, or an
    /// error if some data was not read.
    pub fn finish(self) -> DicomResult<()> {
        if let Some(err) = self.error {
            return Err(err);
        }
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(DicomError::TrailingBytes(remaining)),
        }
    }

    /// Check that `length` bytes can be read, recording an error otherwise.
    pub fn check_available(&mut self, length: u64) -> bool {
        if self.has_error() {
            return false;
        }
        if length > self.remaining() {
            self.set_error(DicomError::UnexpectedEof {
                offset: self.pos,
                wanted: length,
            });
            return false;
        }
        true
    }

    fn io_error(&mut self, err: io::Error, wanted: u64) {
        let offset = self.pos;
        if err.kind() == io::ErrorKind::UnexpectedEof {
            self.set_error(DicomError::UnexpectedEof { offset, wanted });
        } else {
            self.set_error(DicomError::Io {
                offset,
                source: err,
            });
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> bool {
        if !self.check_available(buf.len() as u64) {
            return false;
        }
        match self.source.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                true
            }
            Err(err) => {
                self.io_error(err, buf.len() as u64);
                false
            }
        }
    }

    pub fn read_u8(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        if self.fill(&mut buf) {
            buf[0]
        } else {
            0
        }
    }

    read_number! {
        (read_u16, u16, 2, read_u16),
        (read_i16, i16, 2, read_i16),
        (read_u32, u32, 4, read_u32),
        (read_i32, i32, 4, read_i32),
        (read_u64, u64, 8, read_u64),
        (read_i64, i64, 8, read_i64),
        (read_f32, f32, 4, read_f32),
        (read_f64, f64, 8, read_f64)
    }

    /// Read exactly `length` bytes, or nothing if they are not all there.
    pub fn read_bytes(&mut self, length: usize) -> Vec<u8> {
        if !self.check_available(length as u64) {
            return vec![];
        }
        let mut buf = Vec::new();
        match (&mut self.source).take(length as u64).read_to_end(&mut buf) {
            Ok(n) => {
                self.pos += n as u64;
                if n < length {
                    self.set_error(DicomError::UnexpectedEof {
                        offset: self.pos,
                        wanted: (length - n) as u64,
                    });
                    return vec![];
                }
                buf
            }
            Err(err) => {
                self.io_error(err, length as u64);
                vec![]
            }
        }
    }

    /// Read `length` bytes of text. Bytes that are not UTF-8 are replaced.
    pub fn read_string(&mut self, length: usize) -> String {
        let bytes = self.read_bytes(length);
        String::from_utf8(bytes)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
    }

    pub fn skip(&mut self, length: u64) {
        if !self.check_available(length) {
            return;
        }
        match io::copy(&mut (&mut self.source).take(length), &mut io::sink()) {
            Ok(n) => {
                self.pos += n;
                if n < length {
                    self.set_error(DicomError::UnexpectedEof {
                        offset: self.pos,
                        wanted: length - n,
                    });
                }
            }
            Err(err) => self.io_error(err, length),
        }
    }
}
