use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::frame::Frame;
use crate::store::Store;

/// Set `key` to hold `value` as a string, replacing whatever the key held
/// before. The key and value written are the literal tokens from the request
/// frame.
///
/// Ref: <https://redis.io/docs/latest/commands/set/>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: Bytes,
}

impl Executable for Set {
    async fn exec(self, store: Store) -> Frame {
        store.set(self.key, self.value).await;
        Frame::Simple("OK".to_string())
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 2 {
            return Err(CommandParserError::WrongArity { command: "set" });
        }

        let key = parser.next_string()?;
        let value = parser.next_bytes()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::Value;

    fn set_frame(key: &str, value: &str) -> Frame {
        Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from(key.to_string())),
            Frame::Bulk(Bytes::from(value.to_string())),
        ])
    }

    #[tokio::test]
    async fn writes_the_literal_key_and_value() {
        let cmd = Command::try_from(set_frame("foo", "bar")).unwrap();
        assert_eq!(
            cmd,
            Command::Set(Set {
                key: String::from("foo"),
                value: Bytes::from("bar")
            })
        );

        let store = Store::new();
        let reply = cmd.exec(store.clone()).await;

        assert_eq!(reply, Frame::Simple(String::from("OK")));
        assert_eq!(
            store.get("foo").await,
            Some(Value::String(Bytes::from("bar")))
        );
        // The arguments must land verbatim, not under some other key.
        assert_eq!(store.get("").await, None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = Store::new();

        let cmd = Command::try_from(set_frame("k", "v1")).unwrap();
        cmd.exec(store.clone()).await;

        let cmd = Command::try_from(set_frame("k", "v2")).unwrap();
        cmd.exec(store.clone()).await;

        assert_eq!(
            store.get("k").await,
            Some(Value::String(Bytes::from("v2")))
        );
    }

    #[test]
    fn missing_value_argument() {
        let frame = Frame::Array(vec![
            Frame::Bulk(Bytes::from("SET")),
            Frame::Bulk(Bytes::from("foo")),
        ]);
        let err = Command::try_from(frame).unwrap_err();

        assert_eq!(
            err,
            CommandParserError::WrongArity { command: "set" }
        );
    }
}
