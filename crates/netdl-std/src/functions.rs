//! Built-in functions, written as runtime types that evaluate to plain
//! strings and numbers: `new StringFunction [ what = "Chr" ; arg = 65 ]`.

use std::rc::Rc;

use netdl_common::Location;
use netdl_eval::{format_value, EvalError, Record, Value, ValueKind};

/// `StringFunction`: `Format(arg, how)`, `Chr(arg)`, `Substr(arg, pos, chars)`
/// and `Replace(arg, replacewhat, withwhat)`.
pub fn string_function(
    fields: &Rc<Record>,
    location: Location,
    path: &str,
) -> Result<Value, EvalError> {
    let what_value = fields.get("what")?;
    let what = what_value.as_str()?;
    let arg = fields.get("arg")?;

    let result = match what {
        "Format" => {
            let how = fields.get("how")?;
            format_value(&arg, how.as_str()?)?
        }
        "Chr" => {
            let code = arg.as_int()?;
            let c = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    EvalError::invalid_argument(
                        format!("{code} is not a character code"),
                        arg.location,
                    )
                })?;
            c.to_string()
        }
        "Substr" => {
            let pos = fields.get("pos")?.as_int()?;
            let chars = fields.get("chars")?.as_int()?;
            substr(arg.as_str()?, pos, chars)
        }
        "Replace" => {
            let replace_what = fields.get("replacewhat")?;
            let with_what = fields.get("withwhat")?;
            replace(arg.as_str()?, replace_what.as_str()?, with_what.as_str()?)
        }
        _ => {
            return Err(EvalError::invalid_argument(
                format!("unknown 'what' value to StringFunction: {what}"),
                what_value.location,
            ));
        }
    };
    Ok(Value::string(result, location, path))
}

/// Up to `chars` characters starting at `pos`. A negative `pos` counts from
/// the end and a negative `chars` means "to the end"; both may overshoot.
fn substr(s: &str, pos: i64, chars: i64) -> String {
    let len = s.chars().count() as i64;
    let begin = if pos < 0 { (len + pos).max(0) } else { pos.min(len) };
    let take = if chars < 0 { len - begin } else { chars.min(len - begin) };
    s.chars().skip(begin as usize).take(take as usize).collect()
}

/// Replace every occurrence of `what`. An empty `what` matches nothing.
fn replace(s: &str, what: &str, with: &str) -> String {
    if what.is_empty() {
        return s.to_string();
    }
    s.replace(what, with)
}

/// `NumericFunction`: `Floor(arg)` and `Length(arg)` of a string or array.
pub fn numeric_function(
    fields: &Rc<Record>,
    location: Location,
    path: &str,
) -> Result<Value, EvalError> {
    let what_value = fields.get("what")?;
    let what = what_value.as_str()?;
    let arg = fields.get("arg")?;

    let result = match what {
        "Floor" => arg.as_number()?.floor(),
        "Length" => match &arg.kind {
            ValueKind::String(s) => s.chars().count() as f64,
            ValueKind::Array(array) => array.len() as f64,
            _ => {
                return Err(EvalError::type_mismatch(
                    "string or array",
                    arg.type_name(),
                    arg.location,
                ))
            }
        },
        _ => {
            return Err(EvalError::invalid_argument(
                format!("unknown 'what' value to NumericFunction: {what}"),
                what_value.location,
            ));
        }
    };
    Ok(Value::number(result, location, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdl_eval::{Array, EvalErrorKind};

    fn call(
        f: fn(&Rc<Record>, Location, &str) -> Result<Value, EvalError>,
        entries: Vec<(&str, Value)>,
    ) -> Result<Value, EvalError> {
        let record = Rc::new(Record::new(None));
        for (id, value) in entries {
            record.add_value(id, value);
        }
        f(&record, Location::at(1, 1), "$.f")
    }

    fn s(x: &str) -> Value {
        Value::string(x, Location::NONE, "")
    }

    fn n(x: f64) -> Value {
        Value::number(x, Location::NONE, "")
    }

    fn string_result(entries: Vec<(&str, Value)>) -> String {
        call(string_function, entries).unwrap().as_str().unwrap().to_string()
    }

    #[test]
    fn test_substr() {
        assert_eq!(substr("hello", 1, 3), "ell");
        assert_eq!(substr("hello", -3, 2), "ll");
        assert_eq!(substr("hello", 2, -1), "llo");
        assert_eq!(substr("hello", 9, 2), "");
        assert_eq!(substr("hello", -9, 2), "he");
        assert_eq!(substr("hello", 3, 99), "lo");
    }

    #[test]
    fn test_replace() {
        assert_eq!(replace("a.b.c", ".", "::"), "a::b::c");
        assert_eq!(replace("aaa", "a", "aa"), "aaaaaa");
        assert_eq!(replace("abc", "", "x"), "abc");
    }

    #[test]
    fn test_string_function() {
        assert_eq!(string_result(vec![("what", s("Chr")), ("arg", n(65.0))]), "A");
        assert_eq!(
            string_result(vec![("what", s("Format")), ("arg", n(3.14)), ("how", s(".1"))]),
            "3.1"
        );
        assert_eq!(
            string_result(vec![
                ("what", s("Substr")),
                ("arg", s("network")),
                ("pos", n(0.0)),
                ("chars", n(3.0)),
            ]),
            "net"
        );
        assert_eq!(
            string_result(vec![
                ("what", s("Replace")),
                ("arg", s("a-b")),
                ("replacewhat", s("-")),
                ("withwhat", s("+"))
            ]),
            "a+b"
        );
    }

    #[test]
    fn test_result_is_plain_value_at_call_site() {
        let v = call(string_function, vec![("what", s("Chr")), ("arg", n(66.0))]).unwrap();
        assert!(v.is_string());
        assert_eq!(v.location, Location::at(1, 1));
        assert_eq!(&*v.path, "$.f");
    }

    #[test]
    fn test_unknown_what() {
        let err = call(string_function, vec![("what", s("Upper")), ("arg", s("x"))]).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn test_numeric_function() {
        let num = |entries| call(numeric_function, entries).unwrap().as_number().unwrap();
        assert_eq!(num(vec![("what", s("Floor")), ("arg", n(2.7))]), 2.0);
        assert_eq!(num(vec![("what", s("Floor")), ("arg", n(-2.5))]), -3.0);
        assert_eq!(num(vec![("what", s("Length")), ("arg", s("abcd"))]), 4.0);
        let array = Value::array(Array::from_values([n(1.0), n(2.0), n(3.0)]), Location::NONE, "");
        assert_eq!(num(vec![("what", s("Length")), ("arg", array)]), 3.0);

        let err = call(numeric_function, vec![("what", s("Length")), ("arg", n(1.0))]).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
    }
}
