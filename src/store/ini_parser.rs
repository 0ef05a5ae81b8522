use std::collections::BTreeMap;

use nom::{
    branch::alt,
    bytes::complete::is_not,
    character::complete::char,
    combinator::{all_consuming, map, rest},
    sequence::{delimited, separated_pair},
    IResult,
};

use super::SettingValue;

const GENERAL_SECTION: &str = "General";

#[derive(Debug, PartialEq, Eq)]
enum IniLine<'a> {
    Section(&'a str),
    Entry(&'a str, &'a str),
}

/// Parses INI content into flat `group/key` entries.
///
/// Top level keys live in the `[General]` section, a key `a/b/c` is stored as
/// `b\c=` inside `[a]`. Lines that cannot be parsed are skipped.
pub(crate) fn parse_ini(content: &str) -> BTreeMap<String, SettingValue> {
    let mut entries = BTreeMap::new();
    let mut section: Option<String> = None;
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Ok((_, IniLine::Section(name))) => {
                let name = unescape_key(name.trim());
                section = if name == GENERAL_SECTION {
                    None
                } else {
                    Some(name)
                };
            }
            Ok((_, IniLine::Entry(key, raw))) => {
                let key = key
                    .trim()
                    .split(|c| c == '\\' || c == '/')
                    .map(unescape_key)
                    .collect::<Vec<_>>()
                    .join("/");
                if key.is_empty() {
                    continue;
                }
                let key = match &section {
                    Some(section) => format!("{section}/{key}"),
                    None => key,
                };
                match SettingValue::decode(raw) {
                    Some(value) => {
                        entries.insert(key, value);
                    }
                    None => {
                        tracing::warn!(line = number + 1, key = %key, "Skipping undecodable settings value");
                    }
                }
            }
            Err(_) => {
                tracing::warn!(line = number + 1, content = line, "Skipping unreadable settings line");
            }
        }
    }
    entries
}

pub(crate) fn write_ini(entries: &BTreeMap<String, SettingValue>) -> String {
    let mut general = vec![];
    let mut sections: BTreeMap<&str, Vec<(String, String)>> = BTreeMap::new();
    for (key, value) in entries {
        match key.split_once('/') {
            Some((section, key)) => {
                let key = key.split('/').map(escape_key).collect::<Vec<_>>().join("\\");
                sections
                    .entry(section)
                    .or_default()
                    .push((key, value.encode()));
            }
            None => general.push((escape_key(key), value.encode())),
        }
    }

    let mut out = String::new();
    if !general.is_empty() {
        push_section(&mut out, GENERAL_SECTION, &general);
    }
    for (section, lines) in sections {
        if !out.is_empty() {
            out.push('\n');
        }
        push_section(&mut out, &escape_key(section), &lines);
    }
    out
}

fn push_section(out: &mut String, name: &str, lines: &[(String, String)]) {
    out.push_str(&format!("[{name}]\n"));
    for (key, value) in lines {
        out.push_str(&format!("{key}={value}\n"));
    }
}

fn parse_line(i: &str) -> IResult<&str, IniLine<'_>> {
    alt((parse_section, parse_entry))(i)
}

fn parse_section(i: &str) -> IResult<&str, IniLine<'_>> {
    map(
        all_consuming(delimited(char('['), is_not("]"), char(']'))),
        IniLine::Section,
    )(i)
}

fn parse_entry(i: &str) -> IResult<&str, IniLine<'_>> {
    map(separated_pair(is_not("="), char('='), rest), |(key, value)| {
        IniLine::Entry(key, value)
    })(i)
}

fn escape_key(key: &str) -> String {
    let last = key.chars().count().saturating_sub(1);
    let mut escaped = String::with_capacity(key.len());
    for (index, c) in key.chars().enumerate() {
        let edge_space = c == ' ' && (index == 0 || index == last);
        match c {
            '%' | '=' | '\\' | '/' | '[' | ']' | ';' | '#' | '\n' | '\r' => {
                escaped.push_str(&format!("%{:02X}", c as u32))
            }
            _ if edge_space => escaped.push_str("%20"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape_key(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let decoded = if bytes[index] == b'%' {
            key.get(index + 1..index + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
        } else {
            None
        };
        match decoded {
            Some(byte) => {
                out.push(byte);
                index += 3;
            }
            None => {
                out.push(bytes[index]);
                index += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK_CONF: &str = r#"[General]
extensions=nl2br, codehilite, footnotes
fileExt=.md
geometry=@ByteArray(AAEC/w==)
mathJax=http://cdn.mathjax.org/mathjax/latest/MathJax.js?config=TeX-AMS-MML_HTMLorMML

; settings for extensions
[extensionsConfig]
codehilite\linenums=true
toc\title="Contents, all of them"
"#;

    #[test]
    fn reads_general_section_as_top_level() {
        let entries = parse_ini(NOTEBOOK_CONF);
        assert_eq!(
            entries.get("fileExt"),
            Some(&SettingValue::Text(".md".to_string()))
        );
    }

    #[test]
    fn reads_lists() {
        let entries = parse_ini(NOTEBOOK_CONF);
        assert_eq!(
            entries.get("extensions").map(SettingValue::to_list),
            Some(vec![
                "nl2br".to_string(),
                "codehilite".to_string(),
                "footnotes".to_string()
            ])
        );
    }

    #[test]
    fn keeps_equal_signs_in_values() {
        let entries = parse_ini(NOTEBOOK_CONF);
        assert!(entries
            .get("mathJax")
            .map(SettingValue::to_text)
            .unwrap_or_default()
            .ends_with("?config=TeX-AMS-MML_HTMLorMML"));
    }

    #[test]
    fn reads_nested_keys() {
        let entries = parse_ini(NOTEBOOK_CONF);
        assert_eq!(
            entries.get("extensionsConfig/codehilite/linenums"),
            Some(&SettingValue::Text("true".to_string()))
        );
        assert_eq!(
            entries.get("extensionsConfig/toc/title"),
            Some(&SettingValue::Text("Contents, all of them".to_string()))
        );
    }

    #[test]
    fn reads_byte_arrays() {
        let entries = parse_ini(NOTEBOOK_CONF);
        assert_eq!(
            entries.get("geometry"),
            Some(&SettingValue::Bytes(vec![0, 1, 2, 255]))
        );
    }

    #[test]
    fn skips_garbage_lines() {
        let entries = parse_ini("this is not ini\n[General]\nfileExt=.mkd\n[broken\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries.get("fileExt"),
            Some(&SettingValue::Text(".mkd".to_string()))
        );
    }

    #[test]
    fn written_content_parses_back() {
        let entries = parse_ini(NOTEBOOK_CONF);
        let written = write_ini(&entries);
        assert!(written.starts_with("[General]\n"));
        assert!(written.contains("[extensionsConfig]\ncodehilite\\linenums=true\n"));
        assert_eq!(parse_ini(&written), entries);
    }

    #[test]
    fn escapes_special_characters_in_keys() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "weird=key; #1".to_string(),
            SettingValue::Text("value".to_string()),
        );
        let written = write_ini(&entries);
        assert!(written.contains("weird%3Dkey%3B %231=value"));
        assert_eq!(parse_ini(&written), entries);
    }

    #[test]
    fn array_sections() {
        let entries = parse_ini(
            "[titleTemplates]\n1\\content=%Y-%m-%d\n1\\friendlyName=Date\n1\\type=1\nsize=1\n",
        );
        assert_eq!(
            entries.get("titleTemplates/size"),
            Some(&SettingValue::Text("1".to_string()))
        );
        assert_eq!(
            entries.get("titleTemplates/1/content"),
            Some(&SettingValue::Text("%Y-%m-%d".to_string()))
        );
    }

    #[test]
    fn raw_qt_byte_array_is_absent() {
        let entries = parse_ini(
            "[General]\ngeometry=@ByteArray(\\x1\\xd9\\xd0\\xcb\\0\\x3)\nfileExt=.md\n",
        );
        assert!(!entries.contains_key("geometry"));
        assert_eq!(
            entries.get("fileExt"),
            Some(&SettingValue::Text(".md".to_string()))
        );
    }
}
