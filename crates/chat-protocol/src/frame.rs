//! The chat room's framed binary protocol.
//!
//! A frame on the wire is `STARTER ‖ type_code(4) ‖ length(6) ‖ "00" ‖ payload`,
//! where `payload` is itself a sequence of fields joined by `SEPARATOR`. Ported
//! from `ipico-core`'s positional, never-panicking field extraction style.

use crate::error::FrameFormatError;

/// ESC + TAB: marks the start of every frame.
pub const STARTER: [u8; 2] = [0x1B, 0x09];
/// Form feed: delimits payload fields.
pub const SEPARATOR: u8 = 0x0C;
/// Device Control 1 — reserved for nested payloads, not parsed at this layer.
pub const ELEMENT_START: u8 = 0x11;
/// Device Control 2 — reserved for nested payloads, not parsed at this layer.
pub const ELEMENT_END: u8 = 0x12;
/// ACK — reserved for nested payloads, not parsed at this layer.
pub const SPACE: u8 = 0x06;

/// `STARTER(2) + type_code(4) + length(6) + "00"(2)`.
const HEADER_LEN: usize = 14;

/// A single decoded (or about-to-be-encoded) protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub type_code: String,
    pub payload: Vec<u8>,
    pub segments: Vec<String>,
}

impl Frame {
    /// Decode a received message. Fails only when the header itself is
    /// malformed; segment extraction never fails (missing fields read as
    /// empty strings — see `segment`).
    pub fn decode(bytes: &[u8]) -> Result<Frame, FrameFormatError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameFormatError::TooShort {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0..2] != STARTER {
            return Err(FrameFormatError::MissingStarter);
        }
        let type_code = String::from_utf8_lossy(&bytes[2..6]).into_owned();
        let payload = bytes[HEADER_LEN..].to_vec();
        let segments = split_segments(&payload);
        Ok(Frame {
            type_code,
            payload,
            segments,
        })
    }

    /// Encode a frame for sending. `length` is the UTF-8 byte length of
    /// `payload`, zero-padded to 6 digits — never the character count.
    pub fn encode(type_code: &str, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&STARTER);
        out.extend_from_slice(type_code.as_bytes());
        out.extend_from_slice(format!("{:06}", payload.len()).as_bytes());
        out.extend_from_slice(b"00");
        out.extend_from_slice(payload);
        out
    }

    /// Positional segment access; an out-of-range index reads as `""`,
    /// matching the original client's `parts[i] if len(parts) > i else ""`.
    pub fn segment(&self, index: usize) -> &str {
        self.segments.get(index).map(String::as_str).unwrap_or("")
    }
}

fn split_segments(payload: &[u8]) -> Vec<String> {
    payload
        .split(|&b| b == SEPARATOR)
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// Outbound frame recipes
// ---------------------------------------------------------------------------

/// `SEP ‖ SEP ‖ SEP ‖ "16" ‖ SEP`, type `"0001"`.
pub fn encode_connect() -> Vec<u8> {
    let mut payload = vec![SEPARATOR, SEPARATOR, SEPARATOR];
    payload.extend_from_slice(b"16");
    payload.push(SEPARATOR);
    Frame::encode("0001", &payload)
}

/// `SEP ‖ room_id ‖ SEP ‖ SEP ‖ SEP ‖ SEP ‖ SEP`, type `"0002"`.
pub fn encode_join(room_id: &str) -> Vec<u8> {
    let mut payload = vec![SEPARATOR];
    payload.extend_from_slice(room_id.as_bytes());
    for _ in 0..5 {
        payload.push(SEPARATOR);
    }
    Frame::encode("0002", &payload)
}

/// `SEP`, type `"0000"`.
pub fn encode_ping() -> Vec<u8> {
    Frame::encode("0000", &[SEPARATOR])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_round_trips() {
        let bytes = encode_connect();
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.type_code, "0001");
        assert_eq!(frame.payload.len(), 6);
    }

    #[test]
    fn join_round_trips_with_room_id() {
        let bytes = encode_join("99");
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.type_code, "0002");
        // SEP + "99" + 5*SEP = 1 + 2 + 5 = 8 bytes
        assert_eq!(frame.payload.len(), 8);
        assert_eq!(frame.segment(1), "99");
    }

    #[test]
    fn ping_round_trips() {
        let bytes = encode_ping();
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.type_code, "0000");
        assert_eq!(frame.payload, vec![SEPARATOR]);
    }

    #[test]
    fn length_header_counts_bytes_not_chars() {
        // "café" is 4 chars but 5 UTF-8 bytes.
        let payload = "café".as_bytes();
        let bytes = Frame::encode("0005", payload);
        let length_field = std::str::from_utf8(&bytes[6..12]).unwrap();
        assert_eq!(length_field, "000005");
        assert_eq!(payload.len(), 5);
        assert_ne!(payload.len(), "café".chars().count());
    }

    #[test]
    fn decode_rejects_missing_starter() {
        let mut bytes = encode_ping();
        bytes[0] = 0x00;
        assert_eq!(Frame::decode(&bytes), Err(FrameFormatError::MissingStarter));
    }

    #[test]
    fn decode_rejects_short_messages() {
        let err = Frame::decode(&STARTER).unwrap_err();
        assert_eq!(
            err,
            FrameFormatError::TooShort {
                expected: HEADER_LEN,
                actual: 2
            }
        );
    }

    #[test]
    fn chat_frame_with_missing_segments_has_no_panics() {
        // Only 2 fields present (leading empty field + comment); user_id
        // (index 2) and username (index 6) are both missing.
        let payload = [&[SEPARATOR][..], b"X"].concat();
        let bytes = Frame::encode("0005", &payload);
        let frame = Frame::decode(&bytes).unwrap();
        assert_eq!(frame.segment(1), "X");
        assert_eq!(frame.segment(2), "");
        assert_eq!(frame.segment(6), "");
    }
}
