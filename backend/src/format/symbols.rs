//! Escape-letter to token table.

use serde::Serialize;

/// A date or time field that a format can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatSymbol {
    /// Four-digit year.
    Year4,
    /// Two-digit year.
    Year2,
    Month,
    Day,
    /// Hour of the day, 00-23.
    Hour24,
    Minute,
    Second,
    /// Milliseconds, three digits.
    Millisecond,
}

/// Source escape letter, symbol, and token spelling.
static TABLE: [(char, FormatSymbol, &str); 8] = [
    ('Y', FormatSymbol::Year4, "YYYY"),
    ('y', FormatSymbol::Year2, "YY"),
    ('m', FormatSymbol::Month, "MM"),
    ('d', FormatSymbol::Day, "DD"),
    ('H', FormatSymbol::Hour24, "HH"),
    ('M', FormatSymbol::Minute, "mm"),
    ('S', FormatSymbol::Second, "ss"),
    ('f', FormatSymbol::Millisecond, "SSS"),
];

impl FormatSymbol {
    pub const ALL: [FormatSymbol; 8] = [
        FormatSymbol::Year4,
        FormatSymbol::Year2,
        FormatSymbol::Month,
        FormatSymbol::Day,
        FormatSymbol::Hour24,
        FormatSymbol::Minute,
        FormatSymbol::Second,
        FormatSymbol::Millisecond,
    ];

    /// Look up the symbol a `%`-escape letter stands for.
    pub fn from_escape(letter: char) -> Option<Self> {
        TABLE
            .iter()
            .find(|(c, _, _)| *c == letter)
            .map(|(_, symbol, _)| *symbol)
    }

    /// The `%`-escape letter of this symbol.
    pub fn escape(self) -> char {
        self.entry().0
    }

    /// Token spelling in the target notation.
    pub fn token(self) -> &'static str {
        self.entry().2
    }

    /// Maximum number of digits the token reads.
    pub fn width(self) -> usize {
        match self {
            FormatSymbol::Year4 => 4,
            FormatSymbol::Millisecond => 3,
            _ => 2,
        }
    }

    fn entry(self) -> &'static (char, FormatSymbol, &'static str) {
        &TABLE[self as usize]
    }

    /// Symbols ordered by token length, longest first, for greedy matching.
    pub(crate) fn by_token_length() -> [FormatSymbol; 8] {
        let mut symbols = Self::ALL;
        symbols.sort_by_key(|s| std::cmp::Reverse(s.token().len()));
        symbols
    }
}
