use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError, WRONGTYPE};
use crate::frame::Frame;
use crate::store::{Store, Value};

/// Get the value of `key`. If the key does not exist the special value `nil`
/// is returned.
///
/// Ref: <https://redis.io/docs/latest/commands/get/>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    async fn exec(self, store: Store) -> Frame {
        match store.get(&self.key).await {
            Some(Value::String(data)) => Frame::Bulk(data),
            Some(
                Value::Hash
                | Value::List
                | Value::Set
                | Value::SortedSet
                | Value::HyperLogLog
                | Value::PubSub
                | Value::Transaction,
            ) => Frame::Error(WRONGTYPE.to_string()),
            None => Frame::Null,
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = CommandParserError;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        if parser.remaining() != 1 {
            return Err(CommandParserError::WrongArity { command: "get" });
        }

        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
