//! Ticker symbol validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_SYMBOL_LEN: usize = 12;

/// A validated, upper-cased ticker symbol (e.g. `AAPL`, `BRK.B`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("select a valid stock symbol")]
    Empty,

    #[error("symbol '{symbol}' is longer than {MAX_SYMBOL_LEN} characters")]
    TooLong { symbol: String },

    #[error("symbol '{symbol}' contains invalid character '{ch}'")]
    InvalidChar { symbol: String, ch: char },
}

impl Symbol {
    /// Trim, upper-case and validate user input.
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        let symbol = input.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(SymbolError::Empty);
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong { symbol });
        }
        if let Some(ch) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
        {
            return Err(SymbolError::InvalidChar { symbol, ch });
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(Symbol::parse("  aapl ").unwrap().as_str(), "AAPL");
        assert_eq!(Symbol::parse("brk.b").unwrap().as_str(), "BRK.B");
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(Symbol::parse("   "), Err(SymbolError::Empty));
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(matches!(
            Symbol::parse("AA PL"),
            Err(SymbolError::InvalidChar { ch: ' ', .. })
        ));
        assert!(matches!(
            Symbol::parse("IBM&apikey=x"),
            Err(SymbolError::InvalidChar { ch: '&', .. })
        ));
    }

    #[test]
    fn rejects_overlong_symbols() {
        assert!(matches!(
            Symbol::parse("ABCDEFGHIJKLM"),
            Err(SymbolError::TooLong { .. })
        ));
    }
}
