use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::word_count::constants::RECORD_FIELD_SEPARATOR;

/// A word together with how many times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }

    /// Parses a `<word> <count>` line. The count is taken after the last
    /// space, so the word itself may contain spaces.
    pub fn from_line(line: &str) -> Result<Self, String> {
        let (word, count) = line
            .rsplit_once(RECORD_FIELD_SEPARATOR)
            .ok_or_else(|| format!("missing separator in record {:?}", line))?;

        if word.is_empty() {
            return Err(format!("empty word in record {:?}", line));
        }

        let count: u64 = count
            .parse()
            .map_err(|e| format!("invalid count {:?}: {}", count, e))?;

        if count == 0 {
            return Err(format!("zero count for word {:?}", word));
        }

        Ok(Self::new(word, count))
    }

    pub fn to_line(&self) -> String {
        format!("{}{}{}", self.word, RECORD_FIELD_SEPARATOR, self.count)
    }

    /// Output order: highest count first, equal counts by word in ascending
    /// byte order.
    pub fn frequency_order(a: &Self, b: &Self) -> Ordering {
        b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word))
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.word, RECORD_FIELD_SEPARATOR, self.count)
    }
}
