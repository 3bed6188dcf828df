/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The bot's own identity, fetched once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub handle: String,
}

/// One platform update, already decoded from the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message: Option<InboundMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    /// `None` for photos, stickers and other non-text content.
    pub text: Option<String>,
    pub from_username: Option<String>,
}

/// Last-seen update id.
///
/// Only moves forward. Acknowledgement to the platform is implicit: the next
/// fetch asks for `next_offset()`, so anything at or below `last_seen_id` is
/// never requested again by this process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    last_seen_id: i64,
}

impl Cursor {
    pub fn last_seen_id(self) -> i64 {
        self.last_seen_id
    }

    pub fn next_offset(self) -> i64 {
        self.last_seen_id.saturating_add(1)
    }

    pub fn observe(&mut self, update_id: i64) {
        self.last_seen_id = self.last_seen_id.max(update_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_starts_at_zero_and_requests_one() {
        let c = Cursor::default();
        assert_eq!(c.last_seen_id(), 0);
        assert_eq!(c.next_offset(), 1);
    }

    #[test]
    fn cursor_tracks_max_and_never_decreases() {
        let mut c = Cursor::default();
        let mut max_seen = 0;
        for id in [5, 3, 9, 9, 2, 12, 11] {
            c.observe(id);
            max_seen = max_seen.max(id);
            assert_eq!(c.last_seen_id(), max_seen);
        }
        assert_eq!(c.next_offset(), 13);
    }
}
