//! Frame encoding and decoding for the host serial protocol.
//!
//! Frame format:
//! - DELIMITER (1 byte): 0x7E
//! - PAYLOAD (escaped): any byte equal to 0x7E or 0x7D is sent as
//!   0x7D followed by the byte XOR 0x20
//! - DELIMITER (1 byte): 0x7E
//!
//! There is no length field and no checksum. Consumers must length-check
//! decoded payloads.

use heapless::Vec;

/// Frame delimiter byte (start and end of every frame)
pub const FRAME_DELIMITER: u8 = 0x7E;

/// Escape marker byte
pub const ESCAPE: u8 = 0x7D;

/// Value XORed into an escaped byte
pub const ESCAPE_XOR: u8 = 0x20;

/// Capacity of the inbound frame buffer (escaped bytes between delimiters)
pub const MAX_FRAME_SIZE: usize = 250;

/// Largest payload that is guaranteed to fit an outbound frame
/// when every byte needs escaping
pub const MAX_PAYLOAD_SIZE: usize = (MAX_FRAME_SIZE - 2) / 2;

/// Errors that can occur during frame encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Output buffer ran out of space before the frame was complete
    BufferTooSmall,
}

/// Returns true if `byte` must be escaped inside a frame
#[inline]
pub fn needs_escape(byte: u8) -> bool {
    byte == FRAME_DELIMITER || byte == ESCAPE
}

/// Bounded writer that refuses to emit past the end of its buffer
struct Emitter<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> Emitter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, len: 0 }
    }

    fn emit(&mut self, byte: u8) -> Result<(), FrameError> {
        let slot = self
            .buffer
            .get_mut(self.len)
            .ok_or(FrameError::BufferTooSmall)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }
}

/// Encode `payload` into a delimited, escaped frame
///
/// Returns the number of bytes written. Fails with
/// [`FrameError::BufferTooSmall`] if the buffer runs out at any point;
/// no partial frame length is ever reported.
pub fn encode(payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    let mut out = Emitter::new(buffer);

    out.emit(FRAME_DELIMITER)?;
    for &byte in payload {
        if needs_escape(byte) {
            out.emit(ESCAPE)?;
            out.emit(byte ^ ESCAPE_XOR)?;
        } else {
            out.emit(byte)?;
        }
    }
    out.emit(FRAME_DELIMITER)?;

    Ok(out.len)
}

/// Encode `payload` into a heapless Vec
pub fn encode_to_vec(payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = encode(payload, &mut buffer)?;
    let mut vec = Vec::new();
    vec.extend_from_slice(&buffer[..len])
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(vec)
}

/// Decode the escaped bytes found between two delimiters
///
/// Delimiters must already be stripped. Returns the number of payload bytes
/// written; output beyond the capacity of `decoded` is dropped. A trailing
/// lone escape byte produces nothing.
pub fn decode(encoded: &[u8], decoded: &mut [u8]) -> usize {
    let mut escaped = false;
    let mut len = 0;

    for &byte in encoded {
        let value = if escaped {
            escaped = false;
            byte ^ ESCAPE_XOR
        } else if byte == ESCAPE {
            escaped = true;
            continue;
        } else {
            byte
        };

        if let Some(slot) = decoded.get_mut(len) {
            *slot = value;
            len += 1;
        }
    }

    len
}

/// Decode escaped bytes into a heapless Vec
pub fn decode_to_vec(encoded: &[u8]) -> Vec<u8, MAX_FRAME_SIZE> {
    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = decode(encoded, &mut buffer);
    let mut vec = Vec::new();
    // len never exceeds MAX_FRAME_SIZE
    let _ = vec.extend_from_slice(&buffer[..len]);
    vec
}

/// Reassembles frames from a raw byte stream
///
/// Bytes are accumulated until a delimiter closes a non-empty run, at which
/// point the run is decoded and returned. A delimiter seen with nothing
/// accumulated is treated as a start marker.
///
/// The accumulator is bounded by [`MAX_FRAME_SIZE`]. Bytes arriving once it
/// is full are dropped silently; the truncated run is still handed out on the
/// next delimiter (it will fail any payload length check) and the buffer
/// resets, so the stream recovers at the following frame.
#[derive(Debug, Clone)]
pub struct FrameAssembler {
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    overflowed: usize,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: 0,
        }
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = 0;
    }

    /// Number of escaped bytes accumulated for the in-flight frame
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True if no bytes of a frame have been accumulated
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes dropped from the in-flight frame because the buffer was full
    pub fn overflowed_bytes(&self) -> usize {
        self.overflowed
    }

    /// Feed a single byte
    ///
    /// Returns the decoded payload when this byte closes a frame.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8, MAX_FRAME_SIZE>> {
        if byte != FRAME_DELIMITER {
            if self.buffer.push(byte).is_err() {
                self.overflowed = self.overflowed.saturating_add(1);
            }
            return None;
        }

        if self.buffer.is_empty() {
            // Start marker
            return None;
        }

        let payload = decode_to_vec(&self.buffer);
        self.reset();
        Some(payload)
    }

    /// Feed multiple bytes
    ///
    /// Returns the first complete payload, together with the number of
    /// bytes consumed. Bytes after the closing delimiter are left for the
    /// next call.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, Option<Vec<u8, MAX_FRAME_SIZE>>) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(payload) = self.feed(byte) {
                return (i + 1, Some(payload));
            }
        }
        (bytes.len(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_plain_payload() {
        let mut buffer = [0u8; 16];
        let len = encode(&[0x01, 0x02, 0x03], &mut buffer).unwrap();

        assert_eq!(len, 5);
        assert_eq!(&buffer[..len], &[0x7E, 0x01, 0x02, 0x03, 0x7E]);
    }

    #[test]
    fn test_encode_escapes_delimiter() {
        let mut buffer = [0u8; 16];
        let len = encode(&[0x7E, 0x01], &mut buffer).unwrap();

        // 0x01 is not a reserved byte and goes out as-is
        assert_eq!(&buffer[..len], &[0x7E, 0x7D, 0x5E, 0x01, 0x7E]);
    }

    #[test]
    fn test_encode_escapes_escape() {
        let mut buffer = [0u8; 16];
        let len = encode(&[0x7D], &mut buffer).unwrap();

        assert_eq!(&buffer[..len], &[0x7E, 0x7D, 0x5D, 0x7E]);
    }

    #[test]
    fn test_encode_empty_payload() {
        let mut buffer = [0u8; 2];
        let len = encode(&[], &mut buffer).unwrap();

        assert_eq!(len, 2);
        assert_eq!(buffer, [0x7E, 0x7E]);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        // Every step of the frame must fit, including the closing delimiter
        let payload = [0x10, 0x20, 0x7E];
        for size in 0..6 {
            let mut buffer = [0u8; 8];
            let result = encode(&payload, &mut buffer[..size]);
            assert_eq!(result, Err(FrameError::BufferTooSmall), "size {}", size);
        }

        let mut buffer = [0u8; 6];
        assert_eq!(encode(&payload, &mut buffer), Ok(6));
    }

    #[test]
    fn test_decode_unescapes() {
        let mut out = [0u8; 8];
        let len = decode(&[0x7D, 0x5E, 0x01, 0x7D, 0x5D], &mut out);

        assert_eq!(&out[..len], &[0x7E, 0x01, 0x7D]);
    }

    #[test]
    fn test_decode_trailing_escape_is_dropped() {
        let mut out = [0u8; 8];
        let len = decode(&[0x05, 0x7D], &mut out);

        assert_eq!(&out[..len], &[0x05]);
    }

    #[test]
    fn test_decode_truncates_to_output_capacity() {
        let mut out = [0u8; 2];
        let len = decode(&[1, 2, 3, 4], &mut out);

        assert_eq!(len, 2);
        assert_eq!(out, [1, 2]);
    }

    #[test]
    fn test_assembler_single_frame() {
        let frame = encode_to_vec(&[0xAA]).unwrap();
        let mut assembler = FrameAssembler::new();

        let (consumed, payload) = assembler.feed_bytes(&frame);
        assert_eq!(consumed, frame.len());
        assert_eq!(payload.unwrap().as_slice(), &[0xAA]);
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_assembler_back_to_back_frames() {
        let mut stream = Vec::<u8, 32>::new();
        stream.extend_from_slice(&encode_to_vec(&[1, 2]).unwrap()).unwrap();
        stream.extend_from_slice(&encode_to_vec(&[0x7E]).unwrap()).unwrap();

        let mut assembler = FrameAssembler::new();
        let (consumed, first) = assembler.feed_bytes(&stream);
        assert_eq!(first.unwrap().as_slice(), &[1, 2]);

        let (_, second) = assembler.feed_bytes(&stream[consumed..]);
        assert_eq!(second.unwrap().as_slice(), &[0x7E]);
    }

    #[test]
    fn test_assembler_repeated_delimiters_are_start_markers() {
        let mut assembler = FrameAssembler::new();
        assert!(assembler.feed(0x7E).is_none());
        assert!(assembler.feed(0x7E).is_none());
        assert!(assembler.feed(0x7E).is_none());
        assert!(assembler.feed(0x42).is_none());

        assert_eq!(assembler.feed(0x7E).unwrap().as_slice(), &[0x42]);
    }

    #[test]
    fn test_assembler_garbage_without_start_marker() {
        // Bytes before the first delimiter are taken as frame content;
        // callers reject them on length.
        let mut assembler = FrameAssembler::new();
        let (_, payload) = assembler.feed_bytes(&[0x12, 0x34, 0x7E]);
        assert_eq!(payload.unwrap().as_slice(), &[0x12, 0x34]);
    }

    #[test]
    fn test_assembler_overflow_truncates_then_recovers() {
        let mut assembler = FrameAssembler::new();
        assembler.feed(FRAME_DELIMITER);
        for _ in 0..MAX_FRAME_SIZE + 10 {
            assert!(assembler.feed(0x01).is_none());
        }
        assert_eq!(assembler.len(), MAX_FRAME_SIZE);
        assert_eq!(assembler.overflowed_bytes(), 10);

        // The truncated run is dispatched on the delimiter
        let truncated = assembler.feed(FRAME_DELIMITER).unwrap();
        assert_eq!(truncated.len(), MAX_FRAME_SIZE);
        assert_eq!(assembler.overflowed_bytes(), 0);

        // Next frame is received intact
        let frame = encode_to_vec(&[0xAA]).unwrap();
        let (_, payload) = assembler.feed_bytes(&frame);
        assert_eq!(payload.unwrap().as_slice(), &[0xAA]);
    }

    #[test]
    fn test_all_escaped_payload_capacity() {
        // Every delimiter byte doubles, plus the two framing delimiters
        let fits = [FRAME_DELIMITER; MAX_PAYLOAD_SIZE];
        let frame = encode_to_vec(&fits).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_SIZE);

        let too_long = [FRAME_DELIMITER; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(encode_to_vec(&too_long), Err(FrameError::BufferTooSmall));

        // The escaped body of the largest frame fills the inbound buffer exactly
        let mut assembler = FrameAssembler::new();
        let (_, payload) = assembler.feed_bytes(&frame);
        assert_eq!(payload.unwrap().as_slice(), &fits[..]);
        assert_eq!(assembler.overflowed_bytes(), 0);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(payload in proptest::collection::vec(
            prop_oneof![Just(0x7Eu8), Just(0x7Du8), any::<u8>()],
            0..MAX_PAYLOAD_SIZE,
        )) {
            let frame = encode_to_vec(&payload).unwrap();
            prop_assert_eq!(frame[0], FRAME_DELIMITER);
            prop_assert_eq!(frame[frame.len() - 1], FRAME_DELIMITER);

            let decoded = decode_to_vec(&frame[1..frame.len() - 1]);
            prop_assert_eq!(decoded.as_slice(), payload.as_slice());

            let mut assembler = FrameAssembler::new();
            let (_, reassembled) = assembler.feed_bytes(&frame);
            // An empty payload produces back-to-back delimiters, which read as start markers
            if payload.is_empty() {
                prop_assert!(reassembled.is_none());
            } else {
                let reassembled = reassembled.unwrap();
                prop_assert_eq!(reassembled.as_slice(), payload.as_slice());
            }
        }

        #[test]
        fn prop_escaping_is_exact(payload in proptest::collection::vec(any::<u8>(), 0..64)) {
            let frame = encode_to_vec(&payload).unwrap();
            let body = &frame[1..frame.len() - 1];

            // No reserved byte appears unescaped in the body
            prop_assert!(!body.contains(&FRAME_DELIMITER));

            // Every escape is followed by an escaped reserved byte, and
            // every reserved payload byte is preceded by exactly one escape
            let mut i = 0;
            let mut source = payload.iter();
            while i < body.len() {
                let original = *source.next().unwrap();
                if body[i] == ESCAPE {
                    prop_assert!(needs_escape(original));
                    prop_assert_eq!(body[i + 1], original ^ ESCAPE_XOR);
                    i += 2;
                } else {
                    prop_assert!(!needs_escape(original));
                    prop_assert_eq!(body[i], original);
                    i += 1;
                }
            }
            prop_assert!(source.next().is_none());
        }
    }
}
