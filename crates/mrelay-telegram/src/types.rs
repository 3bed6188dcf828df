//! Bot API wire records.
//!
//! Only the fields the relay reads are modelled; everything else in the
//! payloads is ignored by serde.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mrelay_core::domain::{ChatId, InboundMessage, InboundUpdate, MessageId};

/// `{ok, result, description}` envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct User {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<User>,
}

impl From<Message> for InboundMessage {
    fn from(m: Message) -> Self {
        Self {
            message_id: MessageId(m.message_id),
            chat_id: ChatId(m.chat.id),
            text: m.text,
            from_username: m.from.and_then(|u| u.username),
        }
    }
}

/// Minimal shape of a `sendMessage` result.
#[derive(Debug, Deserialize)]
pub(crate) struct SentMessage {
    pub message_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageBody<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub reply_to_message_id: i64,
}

/// Decode a `getUpdates` result array one entry at a time.
///
/// An entry whose `message` does not decode is kept with no message so the
/// cursor still moves past it. An entry without a usable `update_id` cannot
/// advance the cursor and is dropped.
pub(crate) fn decode_updates(raw: Vec<serde_json::Value>) -> Vec<InboundUpdate> {
    raw.into_iter().filter_map(decode_update).collect()
}

fn decode_update(mut raw: serde_json::Value) -> Option<InboundUpdate> {
    let Some(update_id) = raw.get("update_id").and_then(serde_json::Value::as_i64) else {
        warn!("dropping update without update_id");
        return None;
    };

    let message = match raw.get_mut("message").map(serde_json::Value::take) {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => match serde_json::from_value::<Message>(v) {
            Ok(m) => Some(InboundMessage::from(m)),
            Err(e) => {
                debug!(update_id, error = %e, "ignoring undecodable message");
                None
            }
        },
    };

    Some(InboundUpdate { update_id, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_text_and_textless_messages() {
        let updates = decode_updates(vec![
            json!({
                "update_id": 10,
                "message": {
                    "message_id": 100,
                    "date": 1_700_000_000,
                    "chat": {"id": -5, "type": "group", "title": "g"},
                    "from": {"id": 1, "is_bot": false, "first_name": "A", "username": "alice"},
                    "text": "@bob hi"
                }
            }),
            json!({
                "update_id": 11,
                "message": {
                    "message_id": 101,
                    "chat": {"id": -5},
                    "photo": [{"file_id": "x", "width": 1, "height": 1}]
                }
            }),
        ]);

        assert_eq!(
            updates,
            vec![
                InboundUpdate {
                    update_id: 10,
                    message: Some(InboundMessage {
                        message_id: MessageId(100),
                        chat_id: ChatId(-5),
                        text: Some("@bob hi".to_string()),
                        from_username: Some("alice".to_string()),
                    }),
                },
                InboundUpdate {
                    update_id: 11,
                    message: Some(InboundMessage {
                        message_id: MessageId(101),
                        chat_id: ChatId(-5),
                        text: None,
                        from_username: None,
                    }),
                },
            ]
        );
    }

    #[test]
    fn other_update_kinds_have_no_message() {
        let updates = decode_updates(vec![json!({
            "update_id": 12,
            "edited_message": {"message_id": 1, "chat": {"id": 1}, "text": "@bob edited"}
        })]);
        assert_eq!(
            updates,
            vec![InboundUpdate {
                update_id: 12,
                message: None
            }]
        );
    }

    #[test]
    fn malformed_entries_do_not_poison_the_batch() {
        let updates = decode_updates(vec![
            json!({"message": {"message_id": 1, "chat": {"id": 1}}}),
            json!({"update_id": 20, "message": {"chat": "not an object"}}),
            json!({"update_id": 21, "message": {"message_id": 3, "chat": {"id": 9}, "text": "ok"}}),
        ]);

        let ids: Vec<i64> = updates.iter().map(|u| u.update_id).collect();
        assert_eq!(ids, vec![20, 21]);
        assert!(updates[0].message.is_none());
        assert_eq!(
            updates[1].message.as_ref().and_then(|m| m.text.as_deref()),
            Some("ok")
        );
    }

    #[test]
    fn send_body_escapes_quotes_and_newlines() {
        let text = "he said \"hi\"\nthen \\left\t";
        let body = serde_json::to_string(&SendMessageBody {
            chat_id: 42,
            text,
            reply_to_message_id: 7,
        })
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["text"], text);
        assert_eq!(parsed["chat_id"], 42);
        assert_eq!(parsed["reply_to_message_id"], 7);
        assert!(!body.contains('\n'));
    }
}
