/// Core error type for the relay.
///
/// Adapter crates map their transport/decode failures into the variant that
/// matches the operation they were performing, so the relay loop can decide
/// what is fatal (startup) and what is reported and skipped (per update).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("identity fetch failed: {0}")]
    IdentityFetch(String),

    #[error("update fetch failed: {0}")]
    Fetch(String),

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let e = Error::Completion("missing field `choices`".into());
        assert_eq!(e.to_string(), "completion failed: missing field `choices`");
    }
}
