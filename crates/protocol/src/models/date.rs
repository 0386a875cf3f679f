use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::{Date, Month};

/// The issue date of an item, taken from CSL `date-parts`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueDate {
    /// Only the parts that are known: `2020`, `2020-03` or `2020-03-07`.
    Text(String),
    /// A full calendar date, missing month and day defaulting to the first.
    Calendar(Date),
}

/// `[year, month?, day?]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateParts {
    year: i32,
    month: Option<u8>,
    day: Option<u8>,
}

impl DateParts {
    fn from_value(parts: &Value) -> Option<Self> {
        let parts = parts.as_array()?;
        let year = i32::try_from(number(parts.first()?)?).ok()?;
        let month = parts.get(1).and_then(number).and_then(|m| u8::try_from(m).ok());
        // A day without a month means nothing.
        let day = month.and(parts.get(2).and_then(number).and_then(|d| u8::try_from(d).ok()));
        Some(Self { year, month, day })
    }

    fn to_text(self) -> String {
        match (self.month, self.day) {
            (Some(month), Some(day)) => format!("{}-{month:02}-{day:02}", self.year),
            (Some(month), None) => format!("{}-{month:02}", self.year),
            _ => format!("{}", self.year),
        }
    }

    fn to_date(self) -> Option<Date> {
        let month = Month::try_from(self.month.unwrap_or(1)).ok()?;
        Date::from_calendar_date(self.year, month, self.day.unwrap_or(1)).ok()
    }
}

/// Date parts arrive as integers, but some translators emit numeric strings.
fn number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl IssueDate {
    /// The issue date of the first item in a CSL JSON export that has one.
    ///
    /// Only the first `date-parts` entry of `issued` is considered; a date
    /// range's end is ignored. Returns `None` when no item has a usable year,
    /// or when `as_string` is false and the parts don't form a real date.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use zotlink_protocol::models::IssueDate;
    ///
    /// let items = [json!({"issued": {"date-parts": [[2020, 3]]}})];
    /// assert_eq!(IssueDate::from_items(&items, true), Some(IssueDate::Text("2020-03".to_string())));
    /// ```
    pub fn from_items(items: &[Value], as_string: bool) -> Option<Self> {
        let parts = items.iter().find_map(|item| DateParts::from_value(item.pointer("/issued/date-parts/0")?))?;
        if as_string { Some(Self::Text(parts.to_text())) } else { parts.to_date().map(Self::Calendar) }
    }
}

impl Display for IssueDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Calendar(date) => {
                write!(f, "{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
            },
        }
    }
}

impl Serialize for IssueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
