//! Decoded chat events and the inbound type-code → kind mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// The closed enumeration of event kinds a session ever emits.
///
/// A frame whose `type_code` is outside the known set is not a protocol
/// error — it is emitted as `Unknown` with its raw segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Raw,
    Connect,
    Disconnect,
    EnterChatRoom,
    EnterInfo,
    Chat,
    Notification,
    TextDonation,
    VideoDonation,
    AdBalloonDonation,
    Subscribe,
    Emoticon,
    Viewer,
    Exit,
    Unknown,
}

/// Fields shared by the three donation kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub recipient: String,
    pub sender_id: String,
    pub sender_name: String,
    /// Opaque string form — the mapping to a currency unit is
    /// platform-defined and left to consumers (see DESIGN.md).
    pub amount: String,
}

/// A decoded event, tagged by `kind()`. Each variant carries only the
/// fields the wire format actually defines positions for; kinds with no
/// documented field layout (`exit`, `subscribe`, `viewer`, `enter_info`)
/// carry their raw segments instead of named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    Raw {
        bytes: Vec<u8>,
        received_at: DateTime<Utc>,
    },
    Connect {
        username: String,
        syn: String,
        received_at: DateTime<Utc>,
    },
    EnterChatRoom {
        streamer_id: String,
        syn_ack: String,
        received_at: DateTime<Utc>,
    },
    EnterInfo {
        segments: Vec<String>,
        received_at: DateTime<Utc>,
    },
    Chat {
        comment: String,
        user_id: String,
        username: String,
        received_at: DateTime<Utc>,
    },
    Notification {
        text: String,
        received_at: DateTime<Utc>,
    },
    TextDonation {
        donation: Donation,
        received_at: DateTime<Utc>,
    },
    VideoDonation {
        donation: Donation,
        received_at: DateTime<Utc>,
    },
    AdBalloonDonation {
        donation: Donation,
        received_at: DateTime<Utc>,
    },
    Subscribe {
        segments: Vec<String>,
        received_at: DateTime<Utc>,
    },
    Emoticon {
        emoticon_id: String,
        user_id: String,
        username: String,
        received_at: DateTime<Utc>,
    },
    Viewer {
        segments: Vec<String>,
        received_at: DateTime<Utc>,
    },
    Exit {
        segments: Vec<String>,
        received_at: DateTime<Utc>,
    },
    Disconnect {
        reason: String,
        error_kind: Option<String>,
        received_at: DateTime<Utc>,
    },
    Unknown {
        type_code: String,
        segments: Vec<String>,
        received_at: DateTime<Utc>,
    },
}

impl ChatEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChatEvent::Raw { .. } => EventKind::Raw,
            ChatEvent::Connect { .. } => EventKind::Connect,
            ChatEvent::EnterChatRoom { .. } => EventKind::EnterChatRoom,
            ChatEvent::EnterInfo { .. } => EventKind::EnterInfo,
            ChatEvent::Chat { .. } => EventKind::Chat,
            ChatEvent::Notification { .. } => EventKind::Notification,
            ChatEvent::TextDonation { .. } => EventKind::TextDonation,
            ChatEvent::VideoDonation { .. } => EventKind::VideoDonation,
            ChatEvent::AdBalloonDonation { .. } => EventKind::AdBalloonDonation,
            ChatEvent::Subscribe { .. } => EventKind::Subscribe,
            ChatEvent::Emoticon { .. } => EventKind::Emoticon,
            ChatEvent::Viewer { .. } => EventKind::Viewer,
            ChatEvent::Exit { .. } => EventKind::Exit,
            ChatEvent::Disconnect { .. } => EventKind::Disconnect,
            ChatEvent::Unknown { .. } => EventKind::Unknown,
        }
    }

    /// Build the `raw` event every inbound frame emits before its decoded
    /// kind, carrying the original bytes untouched.
    pub fn raw(bytes: Vec<u8>, received_at: DateTime<Utc>) -> ChatEvent {
        ChatEvent::Raw { bytes, received_at }
    }

    /// Decode a frame's payload into its kind-specific event, per the
    /// inbound type-code table. Never fails: unmapped codes produce
    /// `Unknown`, and missing positional fields read as empty strings.
    pub fn decode(frame: &Frame, received_at: DateTime<Utc>) -> ChatEvent {
        match frame.type_code.as_str() {
            "0001" => ChatEvent::Connect {
                username: frame.segment(1).to_owned(),
                syn: frame.segment(2).to_owned(),
                received_at,
            },
            "0002" => ChatEvent::EnterChatRoom {
                streamer_id: frame.segment(2).to_owned(),
                syn_ack: frame.segment(7).to_owned(),
                received_at,
            },
            "0004" => ChatEvent::Exit {
                segments: frame.segments.clone(),
                received_at,
            },
            "0005" => ChatEvent::Chat {
                comment: frame.segment(1).to_owned(),
                user_id: frame.segment(2).to_owned(),
                username: frame.segment(6).to_owned(),
                received_at,
            },
            "0012" => ChatEvent::EnterInfo {
                segments: frame.segments.clone(),
                received_at,
            },
            "0018" => ChatEvent::TextDonation {
                donation: decode_donation(frame),
                received_at,
            },
            "0087" => ChatEvent::AdBalloonDonation {
                donation: decode_donation(frame),
                received_at,
            },
            "0093" => ChatEvent::Subscribe {
                segments: frame.segments.clone(),
                received_at,
            },
            "0104" => ChatEvent::Notification {
                text: frame.segment(4).to_owned(),
                received_at,
            },
            "0105" => ChatEvent::VideoDonation {
                donation: decode_donation(frame),
                received_at,
            },
            "0109" => ChatEvent::Emoticon {
                emoticon_id: frame.segment(3).to_owned(),
                user_id: frame.segment(6).to_owned(),
                username: frame.segment(7).to_owned(),
                received_at,
            },
            "0127" => ChatEvent::Viewer {
                segments: frame.segments.clone(),
                received_at,
            },
            other => ChatEvent::Unknown {
                type_code: other.to_owned(),
                segments: frame.segments.clone(),
                received_at,
            },
        }
    }
}

fn decode_donation(frame: &Frame) -> Donation {
    Donation {
        recipient: frame.segment(2).to_owned(),
        sender_id: frame.segment(3).to_owned(),
        sender_name: frame.segment(4).to_owned(),
        amount: frame.segment(5).to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SEPARATOR;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    fn frame_with(type_code: &str, payload: &[u8]) -> Frame {
        let bytes = Frame::encode(type_code, payload);
        Frame::decode(&bytes).unwrap()
    }

    #[test]
    fn chat_decode_extracts_documented_fields() {
        // indices: 0="" 1=comment 2=user_id 3.. 6=username
        let payload = [
            &[SEPARATOR][..],
            b"X",
            &[SEPARATOR],
            b"user7",
            &[SEPARATOR, SEPARATOR, SEPARATOR, SEPARATOR],
            b"Nick",
        ]
        .concat();
        let frame = frame_with("0005", &payload);
        let event = ChatEvent::decode(&frame, now());
        match event {
            ChatEvent::Chat {
                comment,
                user_id,
                username,
                ..
            } => {
                assert_eq!(comment, "X");
                assert_eq!(user_id, "user7");
                assert_eq!(username, "Nick");
            }
            other => panic!("expected Chat, got {:?}", other),
        }
    }

    #[test]
    fn donation_decode_extracts_amount() {
        let payload = [
            &[SEPARATOR, SEPARATOR][..],
            b"bjId",
            &[SEPARATOR],
            b"fromId",
            &[SEPARATOR],
            b"FromNick",
            &[SEPARATOR],
            b"1000",
        ]
        .concat();
        let frame = frame_with("0018", &payload);
        let event = ChatEvent::decode(&frame, now());
        match event {
            ChatEvent::TextDonation { donation, .. } => {
                assert_eq!(donation.amount, "1000");
                assert_eq!(donation.sender_name, "FromNick");
            }
            other => panic!("expected TextDonation, got {:?}", other),
        }
    }

    #[test]
    fn unknown_code_maps_to_unknown_kind() {
        let frame = frame_with("9999", &[SEPARATOR]);
        let event = ChatEvent::decode(&frame, now());
        assert_eq!(event.kind(), EventKind::Unknown);
    }

    #[test]
    fn every_known_code_maps_to_its_documented_kind() {
        let table: &[(&str, EventKind)] = &[
            ("0001", EventKind::Connect),
            ("0002", EventKind::EnterChatRoom),
            ("0004", EventKind::Exit),
            ("0005", EventKind::Chat),
            ("0012", EventKind::EnterInfo),
            ("0018", EventKind::TextDonation),
            ("0087", EventKind::AdBalloonDonation),
            ("0093", EventKind::Subscribe),
            ("0104", EventKind::Notification),
            ("0105", EventKind::VideoDonation),
            ("0109", EventKind::Emoticon),
            ("0127", EventKind::Viewer),
        ];
        for (code, expected_kind) in table {
            let frame = frame_with(code, &[SEPARATOR]);
            let event = ChatEvent::decode(&frame, now());
            assert_eq!(event.kind(), *expected_kind, "code {code}");
        }
    }
}
