//! The first stage: bytes to Unicode code points.

use crate::error::{EncodingError, TextPosition, TriGParseError};
use std::io::{self, Read};

/// A Unicode code point and the position of its first byte.
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub struct Rune {
    pub value: char,
    pub position: TextPosition,
}

/// Incremental UTF-8 decoder over a [`Read`] implementation.
///
/// Bytes are read in chunks of a fixed size and decoded one at a time, so a code point may span two chunks.
/// The first malformed byte, or an end of input in the middle of a code point, is a fatal [`EncodingError`].
/// The iterator is fused after it returned an error.
pub struct RuneDecoder<R> {
    read: R,
    buffer: Box<[u8]>,
    buffer_start: usize,
    buffer_end: usize,
    partial: Option<PartialRune>,
    position: TextPosition,
    is_ending: bool,
}

struct PartialRune {
    code_point: u32,
    bytes_needed: u8,
    lower_boundary: u8,
    upper_boundary: u8,
    bytes: [u8; 4],
    len: u8,
}

impl PartialRune {
    fn new(first: u8, code_point: u32, bytes_needed: u8, lower: u8, upper: u8) -> Self {
        Self {
            code_point,
            bytes_needed,
            lower_boundary: lower,
            upper_boundary: upper,
            bytes: [first, 0, 0, 0],
            len: 1,
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl<R: Read> RuneDecoder<R> {
    pub fn new(read: R, buffer_size: usize) -> Self {
        Self {
            read,
            buffer: vec![0; buffer_size.max(1)].into_boxed_slice(),
            buffer_start: 0,
            buffer_end: 0,
            partial: None,
            position: TextPosition::default(),
            is_ending: false,
        }
    }

    fn fill_buffer(&mut self) -> io::Result<usize> {
        loop {
            match self.read.read(&mut self.buffer) {
                Ok(read) => {
                    self.buffer_start = 0;
                    self.buffer_end = read;
                    return Ok(read);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }
    }

    // Same boundaries as https://encoding.spec.whatwg.org/#utf-8-decoder
    fn push_byte(&mut self, byte: u8) -> Result<Option<char>, EncodingError> {
        let Some(partial) = &mut self.partial else {
            self.partial = Some(match byte {
                0x00..=0x7F => return Ok(Some(char::from(byte))),
                0xC2..=0xDF => PartialRune::new(byte, u32::from(byte) & 0x1F, 1, 0x80, 0xBF),
                0xE0 => PartialRune::new(byte, u32::from(byte) & 0xF, 2, 0xA0, 0xBF),
                0xED => PartialRune::new(byte, u32::from(byte) & 0xF, 2, 0x80, 0x9F),
                0xE1..=0xEF => PartialRune::new(byte, u32::from(byte) & 0xF, 2, 0x80, 0xBF),
                0xF0 => PartialRune::new(byte, u32::from(byte) & 0x7, 3, 0x90, 0xBF),
                0xF4 => PartialRune::new(byte, u32::from(byte) & 0x7, 3, 0x80, 0x8F),
                0xF1..=0xF3 => PartialRune::new(byte, u32::from(byte) & 0x7, 3, 0x80, 0xBF),
                _ => return Err(EncodingError::new(self.position, [byte])),
            });
            return Ok(None);
        };
        partial.bytes[usize::from(partial.len)] = byte;
        partial.len += 1;
        if byte < partial.lower_boundary || partial.upper_boundary < byte {
            return Err(EncodingError::new(self.position, partial.bytes()));
        }
        partial.lower_boundary = 0x80;
        partial.upper_boundary = 0xBF;
        partial.code_point = (partial.code_point << 6) | (u32::from(byte) & 0x3F);
        partial.bytes_needed -= 1;
        if partial.bytes_needed > 0 {
            return Ok(None);
        }
        let code_point = partial.code_point;
        let (bytes, len) = (partial.bytes, usize::from(partial.len));
        self.partial = None;
        char::from_u32(code_point)
            .map(Some)
            .ok_or_else(|| EncodingError::new(self.position, &bytes[..len]))
    }

    fn emit(&mut self, value: char) -> Rune {
        let rune = Rune {
            value,
            position: self.position,
        };
        self.position.offset += value.len_utf8() as u64;
        if value == '\n' {
            self.position.line += 1;
            self.position.column = 0;
        } else {
            self.position.column += 1;
        }
        rune
    }
}

impl<R: Read> Iterator for RuneDecoder<R> {
    type Item = Result<Rune, TriGParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.is_ending {
                return None;
            }
            if self.buffer_start == self.buffer_end {
                match self.fill_buffer() {
                    Ok(0) => {
                        self.is_ending = true;
                        let partial = self.partial.take()?;
                        return Some(Err(
                            EncodingError::new(self.position, partial.bytes()).into()
                        ));
                    }
                    Ok(_) => (),
                    Err(e) => {
                        self.is_ending = true;
                        return Some(Err(e.into()));
                    }
                }
            }
            let byte = self.buffer[self.buffer_start];
            self.buffer_start += 1;
            match self.push_byte(byte) {
                Ok(Some(value)) => return Some(Ok(self.emit(value))),
                Ok(None) => (),
                Err(e) => {
                    self.is_ending = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8], buffer_size: usize) -> Result<Vec<char>, TriGParseError> {
        RuneDecoder::new(bytes, buffer_size)
            .map(|rune| rune.map(|r| r.value))
            .collect()
    }

    #[test]
    fn round_trip() {
        let text = "a\u{0}é€𐍈\u{7F}\u{80}\u{7FF}\u{800}\u{FFFF}\u{10000}\u{10FFFF}\n\u{D7FF}\u{E000}";
        for buffer_size in [1, 2, 3, 4, 7, 4096] {
            assert_eq!(
                decode(text.as_bytes(), buffer_size).unwrap(),
                text.chars().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn every_scalar_value_round_trips() {
        let text = (0..=0x10FFFF_u32)
            .step_by(97)
            .filter_map(char::from_u32)
            .collect::<String>();
        assert_eq!(
            decode(text.as_bytes(), 5).unwrap(),
            text.chars().collect::<Vec<_>>()
        );
    }

    #[test]
    fn lone_continuation_byte() {
        let mut decoder = RuneDecoder::new(b"\x80".as_slice(), 16);
        let Some(Err(TriGParseError::Encoding(error))) = decoder.next() else {
            panic!("0x80 must be rejected")
        };
        assert_eq!(error.bytes(), [0x80]);
        assert_eq!(error.position().offset, 0);
        assert!(decoder.next().is_none());
    }

    #[test]
    fn invalid_sequences() {
        let cases: [&[u8]; 7] = [
            b"\xC0\x80", // overlong
            b"\xE0\x80\x80",
            b"\xED\xA0\x80", // surrogate
            b"\xF4\x90\x80\x80",
            b"\xF5",
            b"\xC3(",
            b"\xFF",
        ];
        for bytes in cases {
            assert!(
                matches!(decode(bytes, 4096), Err(TriGParseError::Encoding(_))),
                "{bytes:X?} must be rejected"
            );
        }
    }

    #[test]
    fn truncated_sequence() {
        let mut decoder = RuneDecoder::new(b"ab\xE2\x82".as_slice(), 1);
        assert_eq!(decoder.next().unwrap().unwrap().value, 'a');
        assert_eq!(decoder.next().unwrap().unwrap().value, 'b');
        let Some(Err(TriGParseError::Encoding(error))) = decoder.next() else {
            panic!("truncated sequence must be rejected")
        };
        assert_eq!(error.bytes(), [0xE2, 0x82]);
        assert_eq!(error.position().offset, 2);
        assert!(decoder.next().is_none());
    }

    #[test]
    fn positions() {
        let runes = RuneDecoder::new("é\nab".as_bytes(), 3)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let positions = runes
            .iter()
            .map(|r| (r.position.line, r.position.column, r.position.offset))
            .collect::<Vec<_>>();
        assert_eq!(positions, [(0, 0, 0), (0, 1, 2), (1, 0, 3), (1, 1, 4)]);
    }

    #[test]
    fn io_errors_are_reported() {
        struct Failing;

        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("boom"))
            }
        }

        let mut decoder = RuneDecoder::new(Failing, 16);
        assert!(matches!(decoder.next(), Some(Err(TriGParseError::Io(_)))));
        assert!(decoder.next().is_none());
    }
}
