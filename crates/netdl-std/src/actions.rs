//! Actions: runtime types whose construction is the effect.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use netdl_common::Location;
use netdl_eval::{
    format_value, EvalError, EvalErrorKind, Nameable, Object, Record, Value, ValueKind,
};
use tracing::info;

/// Where `PrintAction` writes its lines.
pub type Output = Rc<dyn Fn(&str)>;

/// Output that prints to stdout.
pub fn stdout_output() -> Output {
    Rc::new(|line| println!("{line}"))
}

/// `PrintAction [ what = ... ]` prints `what` once, when constructed.
/// Strings print as they are, anything else formatted.
pub struct PrintAction {
    text: String,
    name: RefCell<String>,
}

impl PrintAction {
    pub fn construct(
        output: &Output,
        fields: &Rc<Record>,
        location: Location,
        path: &str,
    ) -> Result<Value, EvalError> {
        let what = fields.get("what")?;
        let text = match &what.kind {
            ValueKind::String(s) => s.to_string(),
            _ => format_value(&what, "")?,
        };
        info!(path, "print");
        output(&text);
        let action = PrintAction {
            text,
            name: RefCell::new(String::new()),
        };
        Ok(Value::object(Rc::new(action), location, path))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }
}

impl Object for PrintAction {
    fn type_name(&self) -> &str {
        "PrintAction"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_nameable(&self) -> Option<&dyn Nameable> {
        Some(self)
    }
}

impl Nameable for PrintAction {
    fn set_name(&self, name: &str) {
        *self.name.borrow_mut() = name.to_string();
    }
}

/// `FailAction [ what = "message" ]` fails evaluation with `message`.
///
/// The error has no location of its own, so it is reported at the `new`
/// expression that created the action.
pub fn fail_action(
    fields: &Rc<Record>,
    _location: Location,
    _path: &str,
) -> Result<Value, EvalError> {
    let message = fields.get("what")?;
    Err(EvalError::new(
        EvalErrorKind::UserRaised(message.as_str()?.to_string()),
        Location::NONE,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use netdl_eval::{downcast, Array};

    fn capture() -> (Output, Rc<RefCell<Vec<String>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = lines.clone();
        let output: Output = Rc::new(move |line| sink.borrow_mut().push(line.to_string()));
        (output, lines)
    }

    fn what(value: Value) -> Rc<Record> {
        let record = Rc::new(Record::new(None));
        record.add_value("what", value);
        record
    }

    #[test]
    fn test_print_string_and_array() {
        let (output, lines) = capture();
        let hi = what(Value::string("hi", Location::NONE, ""));
        PrintAction::construct(&output, &hi, Location::NONE, "").unwrap();
        let array = Value::array(
            Array::from_values([
                Value::number(1.0, Location::NONE, ""),
                Value::number(2.5, Location::NONE, ""),
            ]),
            Location::NONE,
            "",
        );
        let value = PrintAction::construct(&output, &what(array), Location::NONE, "$.do").unwrap();
        assert_eq!(*lines.borrow(), ["hi", "( 1\n  2.500000 )"]);

        let ValueKind::Object(object) = &value.kind else {
            panic!("expected an object");
        };
        assert_eq!(downcast::<PrintAction>(object).unwrap().text(), "( 1\n  2.500000 )");
    }

    #[test]
    fn test_fail_action_has_no_location() {
        let stop = what(Value::string("stop", Location::at(2, 3), ""));
        let err = fail_action(&stop, Location::at(1, 1), "").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::UserRaised("stop".into()));
        assert!(err.location.is_none());
    }
}
