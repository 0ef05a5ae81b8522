use base64::{engine::general_purpose::STANDARD, Engine};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{char, space0},
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::delimited,
    IResult,
};

const BYTE_ARRAY_PREFIX: &str = "@ByteArray(";
const EMPTY_LIST: &str = "@Invalid()";

/// A single value held by a [`super::SettingsStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(String),
    List(Vec<String>),
    Bytes(Vec<u8>),
}

impl SettingValue {
    /// Text view of the value. Lists are joined the way they are written to disk.
    pub fn to_text(&self) -> String {
        match self {
            SettingValue::Text(text) => text.clone(),
            SettingValue::List(items) => items.join(", "),
            SettingValue::Bytes(bytes) => String::from_utf8_lossy(bytes).to_string(),
        }
    }

    /// A single text value counts as a list of one, the same way it is written.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            SettingValue::Text(text) => vec![text.clone()],
            SettingValue::List(items) => items.clone(),
            SettingValue::Bytes(_) => vec![],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            SettingValue::Text(text) => text.as_bytes().to_vec(),
            SettingValue::List(items) => items.join(", ").into_bytes(),
            SettingValue::Bytes(bytes) => bytes.clone(),
        }
    }

    pub(crate) fn encode(&self) -> String {
        match self {
            SettingValue::Text(text) => encode_text(text),
            SettingValue::List(items) if items.is_empty() => EMPTY_LIST.to_string(),
            SettingValue::List(items) => items
                .iter()
                .map(|item| encode_text(item))
                .collect::<Vec<_>>()
                .join(", "),
            SettingValue::Bytes(bytes) => format!("{BYTE_ARRAY_PREFIX}{})", STANDARD.encode(bytes)),
        }
    }

    /// `None` for a blob that is not base64, such as Qt's raw escaped bytes.
    pub(crate) fn decode(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == EMPTY_LIST {
            return Some(SettingValue::List(vec![]));
        }
        if let Some(encoded) = raw
            .strip_prefix(BYTE_ARRAY_PREFIX)
            .and_then(|r| r.strip_suffix(')'))
        {
            return STANDARD.decode(encoded).ok().map(SettingValue::Bytes);
        }
        let mut items = match parse_items(raw) {
            Ok(("", items)) => items,
            _ => vec![raw.to_string()],
        };
        items.iter_mut().for_each(unescape_at);
        if items.len() == 1 {
            Some(SettingValue::Text(items.remove(0)))
        } else {
            Some(SettingValue::List(items))
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

impl From<&[String]> for SettingValue {
    fn from(value: &[String]) -> Self {
        SettingValue::List(value.to_vec())
    }
}

impl From<Vec<u8>> for SettingValue {
    fn from(value: Vec<u8>) -> Self {
        SettingValue::Bytes(value)
    }
}

impl From<&[u8]> for SettingValue {
    fn from(value: &[u8]) -> Self {
        SettingValue::Bytes(value.to_vec())
    }
}

fn encode_text(text: &str) -> String {
    let text = if text.starts_with('@') {
        format!("@{text}")
    } else {
        text.to_string()
    };
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    let needs_quotes = text.contains(',') || text.trim() != text;
    if needs_quotes {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

fn unescape_at(item: &mut String) {
    if item.starts_with("@@") {
        item.remove(0);
    }
}

fn parse_items(i: &str) -> IResult<&str, Vec<String>> {
    separated_list1(char(','), parse_item)(i)
}

fn parse_item(i: &str) -> IResult<&str, String> {
    delimited(space0, alt((parse_quoted, parse_bare)), space0)(i)
}

fn parse_quoted(i: &str) -> IResult<&str, String> {
    delimited(char('"'), escaped_text("\\\""), char('"'))(i)
}

fn parse_bare(i: &str) -> IResult<&str, String> {
    map(escaped_text("\\,"), |text| text.trim_end().to_string())(i)
}

fn escaped_text<'a>(stop: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |i: &'a str| {
        map(
            opt(escaped_transform(
                is_not(stop),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                    value("\r", tag("r")),
                    value("\t", tag("t")),
                )),
            )),
            Option::unwrap_or_default,
        )(i)
    }
}
