//! Parser for the literal structures embedded in pricing-table `layout`
//! attributes.
//!
//! The attribute holds a Python-style literal (`{'rows': [{'cells': [...]}]}`),
//! so single-quoted strings, tuples, trailing commas and the
//! `True`/`False`/`None` keywords all have to be accepted. JSON spellings are
//! accepted as well. The result is a plain `serde_json::Value`.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while_m_n},
    character::complete::{anychar, char, multispace0, none_of},
    combinator::{all_consuming, cut, map, map_opt, opt, value},
    error::{ErrorKind, ParseError},
    multi::{fold_many0, separated_list0},
    number::complete::recognize_float,
    sequence::{delimited, preceded, separated_pair, terminated},
    Finish, IResult,
};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Deepest container nesting accepted, matching CPython's parser limit
pub const MAX_NESTING: usize = 200;

#[derive(Debug, Error, PartialEq)]
#[error("invalid literal at offset {offset}: {kind}")]
pub struct LiteralError {
    pub offset: usize,
    pub kind: String,
}

/// Parse a complete literal; trailing garbage is an error.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    all_consuming(ws(|i| parse_value(i, 0)))(input)
        .finish()
        .map(|(_, v)| v)
        .map_err(|e: nom::error::Error<&str>| LiteralError {
            offset: input.len() - e.input.len(),
            kind: match e.code {
                ErrorKind::TooLarge => format!("nesting deeper than {}", MAX_NESTING),
                code => format!("{:?}", code),
            },
        })
}

fn ws<'a, F, O, E: ParseError<&'a str>>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
    F: FnMut(&'a str) -> IResult<&'a str, O, E>,
{
    delimited(multispace0, inner, multispace0)
}

/// `depth` counts the containers enclosing `input`
fn parse_value<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Value> {
    alt((
        move |i: &'a str| parse_dict(i, depth),
        move |i: &'a str| parse_sequence(i, depth, '[', ']'),
        move |i: &'a str| parse_sequence(i, depth, '(', ')'),
        map(parse_string, Value::String),
        parse_keyword,
        parse_number,
    ))(input)
}

/// Step into a container, failing hard once the nesting limit is reached
fn enter(input: &str, depth: usize) -> IResult<&str, usize> {
    if depth >= MAX_NESTING {
        return Err(nom::Err::Failure(nom::error::Error::from_error_kind(
            input,
            ErrorKind::TooLarge,
        )));
    }
    Ok((input, depth + 1))
}

fn parse_keyword(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Bool(true), alt((tag("True"), tag("true")))),
        value(Value::Bool(false), alt((tag("False"), tag("false")))),
        value(Value::Null, alt((tag("None"), tag("null")))),
    ))(input)
}

fn parse_number(input: &str) -> IResult<&str, Value> {
    map_opt(recognize_float, |s: &str| {
        if s.contains(['.', 'e', 'E']) {
            s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
        } else {
            match s.parse::<i64>() {
                Ok(n) => Some(Value::Number(n.into())),
                // Python ints are unbounded; fall back to a float
                Err(_) => s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number),
            }
        }
    })(input)
}

/// Piece of a string literal body
#[derive(Debug, Clone, Copy)]
enum Fragment {
    Char(char),
    /// Unrecognized escape, kept with its backslash
    Unknown(char),
    /// Backslash-newline, contributes nothing
    LineContinuation,
}

fn parse_string(input: &str) -> IResult<&str, String> {
    alt((quoted('\''), quoted('"')))(input)
}

fn quoted<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    move |input: &'a str| {
        let stop = if quote == '\'' { "'\\" } else { "\"\\" };
        delimited(
            char(quote),
            fold_many0(
                alt((parse_escape, map(none_of(stop), Fragment::Char))),
                String::new,
                |mut s, fragment| {
                    match fragment {
                        Fragment::Char(c) => s.push(c),
                        Fragment::Unknown(c) => {
                            s.push('\\');
                            s.push(c);
                        }
                        Fragment::LineContinuation => {}
                    }
                    s
                },
            ),
            char(quote),
        )(input)
    }
}

fn parse_escape(input: &str) -> IResult<&str, Fragment> {
    preceded(
        char('\\'),
        alt((
            value(Fragment::LineContinuation, char('\n')),
            map(simple_escape, Fragment::Char),
            map(octal_char, Fragment::Char),
            map(preceded(char('x'), cut(hex_char(2))), Fragment::Char),
            map(preceded(char('u'), cut(hex_char(4))), Fragment::Char),
            map(preceded(char('U'), cut(hex_char(8))), Fragment::Char),
            map(anychar, Fragment::Unknown),
        )),
    )(input)
}

fn simple_escape(input: &str) -> IResult<&str, char> {
    alt((
        value('\n', char('n')),
        value('\t', char('t')),
        value('\r', char('r')),
        value('\\', char('\\')),
        value('\'', char('\'')),
        value('"', char('"')),
        value('\u{7}', char('a')),
        value('\u{8}', char('b')),
        value('\u{c}', char('f')),
        value('\u{b}', char('v')),
    ))(input)
}

/// `\NNN` with one to three octal digits
fn octal_char(input: &str) -> IResult<&str, char> {
    map_opt(
        take_while_m_n(1, 3, |c: char| c.is_digit(8)),
        |oct: &str| u32::from_str_radix(oct, 8).ok().and_then(char::from_u32),
    )(input)
}

fn hex_char<'a>(len: usize) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    move |input: &'a str| {
        map_opt(
            take_while_m_n(len, len, |c: char| c.is_ascii_hexdigit()),
            |hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32),
        )(input)
    }
}

/// Comma separated items with an optional trailing comma
fn items<'a, O, F>(item: F) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<O>>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    terminated(
        separated_list0(ws(char(',')), item),
        opt(ws(char(','))),
    )
}

/// Lists and tuples both become arrays
fn parse_sequence(input: &str, depth: usize, open: char, close: char) -> IResult<&str, Value> {
    let (input, _) = ws(char(open))(input)?;
    let (input, depth) = enter(input, depth)?;
    let (input, values) = items(ws(|i| parse_value(i, depth)))(input)?;
    let (input, _) = ws(char(close))(input)?;
    Ok((input, Value::Array(values)))
}

fn parse_dict(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, _) = ws(char('{'))(input)?;
    let (input, depth) = enter(input, depth)?;
    let (input, pairs) = items(separated_pair(
        ws(|i| parse_value(i, depth)),
        char(':'),
        ws(|i| parse_value(i, depth)),
    ))(input)?;
    let (input, _) = ws(char('}'))(input)?;

    let mut obj = Map::new();
    for (key, val) in pairs {
        obj.insert(key_to_string(key), val);
    }
    Ok((input, Value::Object(obj)))
}

fn key_to_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_python_dict_with_single_quotes() {
        let v = parse_literal("{'rows': [{'cells': ['Machine type', 'CPUs']}]}").unwrap();
        assert_eq!(v, json!({"rows": [{"cells": ["Machine type", "CPUs"]}]}));
    }

    #[test]
    fn test_keywords_and_numbers() {
        let v = parse_literal("[True, False, None, 4, -2.5, 1e3]").unwrap();
        assert_eq!(v, json!([true, false, null, 4, -2.5, 1000.0]));
    }

    #[test]
    fn test_json_spelling_is_accepted() {
        let v = parse_literal(r#"{"a": true, "b": null, "c": [1, 2]}"#).unwrap();
        assert_eq!(v, json!({"a": true, "b": null, "c": [1, 2]}));
    }

    #[test]
    fn test_trailing_commas_and_tuples() {
        let v = parse_literal("{'a': (1, 2,), 'b': [3,],}").unwrap();
        assert_eq!(v, json!({"a": [1, 2], "b": [3]}));
    }

    #[test]
    fn test_embedded_json_string_survives() {
        let v = parse_literal(r#"['{"priceByRegion": {"useast1": 0.2}}']"#).unwrap();
        assert_eq!(v, json!([r#"{"priceByRegion": {"useast1": 0.2}}"#]));
    }

    #[test]
    fn test_escapes() {
        let v = parse_literal(r"'it\'s \x41é\n'").unwrap();
        assert_eq!(v, json!("it's A\u{e9}\n"));
    }

    #[test]
    fn test_empty_containers_and_strings() {
        assert_eq!(parse_literal("{}").unwrap(), json!({}));
        assert_eq!(parse_literal("[ ]").unwrap(), json!([]));
        assert_eq!(parse_literal("''").unwrap(), json!(""));
    }

    #[test]
    fn test_non_string_keys() {
        let v = parse_literal("{1: 'a'}").unwrap();
        assert_eq!(v, json!({"1": "a"}));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_literal("{'rows': [").is_err());
        assert!(parse_literal("{'a': 1} extra").is_err());
        assert!(parse_literal("os.system('x')").is_err());
    }

    #[test]
    fn test_control_and_octal_escapes() {
        let cases = [
            (r"'\a'", "\u{7}"),
            (r"'\b'", "\u{8}"),
            (r"'\f'", "\u{c}"),
            (r"'\v'", "\u{b}"),
            (r"'\0'", "\0"),
            (r"'\101\12'", "A\n"),
            (r"'\U0001F600'", "\u{1F600}"),
        ];
        for (literal, expected) in cases {
            assert_eq!(parse_literal(literal).unwrap(), json!(expected), "{}", literal);
        }
    }

    #[test]
    fn test_unknown_escape_keeps_backslash() {
        let v = parse_literal(r"'Footnote: C:\d path \/ \8'").unwrap();
        assert_eq!(v, json!(r"Footnote: C:\d path \/ \8"));
    }

    #[test]
    fn test_line_continuation() {
        let v = parse_literal("'n2-\\\nstandard'").unwrap();
        assert_eq!(v, json!("n2-standard"));
    }

    #[test]
    fn test_truncated_hex_escape_is_rejected() {
        assert!(parse_literal(r"'\x4'").is_err());
        assert!(parse_literal(r"'\u12'").is_err());
        assert!(parse_literal(r"'\U110000FF'").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}{}", "[".repeat(depth), "]".repeat(depth));

        assert!(parse_literal(&nested(MAX_NESTING)).is_ok());

        let err = parse_literal(&nested(MAX_NESTING + 1)).unwrap_err();
        assert_eq!(err.offset, MAX_NESTING + 1);
        assert!(err.kind.contains("nesting"));

        assert!(parse_literal(&nested(5000)).is_err());
        assert!(parse_literal(&"{'a': ".repeat(5000)).is_err());
    }
}
