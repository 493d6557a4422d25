//! Human-readable rendering of values.

use std::iter::Peekable;
use std::str::Chars;

use netdl_common::Location;

use crate::{EvalError, Value, ValueKind};

/// Prefix every line of `s` with `indent` spaces.
pub fn indent_string(s: &str, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    s.split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indent `s` and wrap it in a pair of brackets, either on lines of their
/// own or inline.
pub fn nest_string(s: &str, open: char, newline: bool, close: char) -> String {
    let body = indent_string(s, 2);
    // The indented body starts with a space the open bracket replaces.
    let body = body.strip_prefix(' ').unwrap_or(&body);
    if newline {
        format!("{open}\n {body}\n{close}")
    } else {
        format!("{open}{body} {close}")
    }
}

/// Largest width or precision a format may ask for.
const MAX_FORMAT_WIDTH: usize = 4096;

/// A parsed printf-style format: `[-+0]*[width][.precision]`.
#[derive(Debug, Default, PartialEq)]
struct FormatSpec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    width: usize,
    precision: Option<usize>,
}

impl FormatSpec {
    fn parse(how: &str, location: Location) -> Result<Self, EvalError> {
        let invalid = || {
            EvalError::invalid_argument(format!("invalid format specification '{how}'"), location)
        };
        let mut spec = FormatSpec::default();
        let mut chars = how.chars().peekable();

        while let Some(&c) = chars.peek() {
            match c {
                '-' => spec.left_align = true,
                '0' => spec.zero_pad = true,
                '+' => spec.plus_sign = true,
                _ => break,
            }
            chars.next();
        }

        let digits = |chars: &mut Peekable<Chars<'_>>| -> Result<Option<usize>, EvalError> {
            let mut n: Option<usize> = None;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                let next = n
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(d as usize));
                n = Some(next.filter(|&n| n <= MAX_FORMAT_WIDTH).ok_or_else(invalid)?);
                chars.next();
            }
            Ok(n)
        };

        spec.width = digits(&mut chars)?.unwrap_or(0);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(digits(&mut chars)?.unwrap_or(0));
        }
        if chars.next().is_some() {
            return Err(invalid());
        }
        Ok(spec)
    }

    fn pad(&self, s: String, numeric: bool) -> String {
        let len = s.chars().count();
        if len >= self.width {
            return s;
        }
        let fill = self.width - len;
        if self.left_align {
            format!("{s}{}", " ".repeat(fill))
        } else if self.zero_pad && numeric {
            let (sign, digits) = match s.strip_prefix(['-', '+']) {
                Some(rest) => (&s[..1], rest),
                None => ("", s.as_str()),
            };
            format!("{sign}{}{digits}", "0".repeat(fill))
        } else {
            format!("{}{s}", " ".repeat(fill))
        }
    }
}

/// Integral numbers print like `%d`, where precision is a minimum digit
/// count; all others like `%f`.
fn format_number(n: f64, spec: &FormatSpec) -> String {
    let mut s = if n.fract() == 0.0 && n.abs() < 1e15 {
        let digits = (n.abs() as i64).to_string();
        let zeros = spec.precision.unwrap_or(0).saturating_sub(digits.len());
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{sign}{}{digits}", "0".repeat(zeros))
    } else {
        let precision = spec.precision.unwrap_or(6);
        format!("{n:.precision$}")
    };
    if spec.plus_sign && n >= 0.0 {
        s.insert(0, '+');
    }
    s
}

/// Render a value as text.
///
/// `how` is a printf-style format specification without the leading `%`;
/// it applies to numbers and strings. Records render as an indented
/// bracketed member list, arrays as an indented parenthesized element list.
/// Forcing nested members may fail, which is why this returns a `Result`.
pub fn format_value(value: &Value, how: &str) -> Result<String, EvalError> {
    if how.contains('%') {
        return Err(EvalError::invalid_argument(
            format!("format specification must not contain '%': '{how}'"),
            value.location,
        ));
    }
    let spec = FormatSpec::parse(how, value.location)?;

    let text = match &value.kind {
        ValueKind::Number(n) => spec.pad(format_number(*n, &spec), true),
        ValueKind::String(s) => {
            let s = match spec.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s.to_string(),
            };
            spec.pad(s, false)
        }
        ValueKind::Bool(b) => spec.pad(b.to_string(), false),
        ValueKind::Record(record) => {
            let mut members = Vec::with_capacity(record.len());
            for (id, member) in record.members() {
                let value = member.value.force()?;
                members.push(format!("{id} = {}", format_value(&value, how)?));
            }
            nest_string(&members.join("\n"), '[', true, ']')
        }
        ValueKind::Array(array) => {
            let mut items = Vec::with_capacity(array.len());
            for value in array.values()? {
                items.push(format_value(&value, how)?);
            }
            nest_string(&items.join("\n"), '(', false, ')')
        }
        ValueKind::Lambda(lambda) => format!("<function {}>", lambda.name()),
        ValueKind::Object(object) => match object.as_stringify() {
            Some(s) => s.to_display_string(),
            None => format!("<{}>", object.type_name()),
        },
    };
    Ok(text)
}
