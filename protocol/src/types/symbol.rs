use std::{fmt, ops::Deref};

use super::Str;

/// ASCII symbolic name, e.g. `amqp:unauthorized-access` or an annotation key.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(test, derive(fake::Dummy))]
pub struct Symbol(Str);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Symbol {
    type Target = Str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<Str> for Symbol {
    fn from(string: Str) -> Self {
        Symbol(string)
    }
}

impl From<&str> for Symbol {
    fn from(string: &str) -> Self {
        Symbol(string.to_string())
    }
}
