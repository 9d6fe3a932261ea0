use anyhow::{anyhow, bail, Result};

use crate::object::Value;

pub type BuiltinConverter = fn(&str) -> Result<Value>;

pub struct Builtins;

impl Builtins {
    /// The converters every evaluator starts with. Each plain tag has a `*` twin that
    /// hands the host a pointer instead of a value.
    pub fn get() -> Vec<(&'static str, BuiltinConverter)> {
        let builtins: [(&'static str, BuiltinConverter); 12] = [
            ("bool", Self::bool_fn),
            ("*bool", Self::bool_pointer_fn),
            ("int", Self::int_fn),
            ("*int", Self::int_pointer_fn),
            ("uint", Self::uint_fn),
            ("*uint", Self::uint_pointer_fn),
            ("float64", Self::float_fn),
            ("*float64", Self::float_pointer_fn),
            ("string", Self::string_fn),
            ("*string", Self::string_pointer_fn),
            ("rune", Self::rune_fn),
            ("*rune", Self::rune_pointer_fn),
        ];
        builtins.to_vec()
    }

    fn bool_fn(text: &str) -> Result<Value> {
        match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Value::Boolean(true)),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Value::Boolean(false)),
            _ => bail!("invalid boolean: {:?}", text),
        }
    }

    fn int_fn(text: &str) -> Result<Value> {
        Ok(Value::Integer(text.parse::<i64>()?))
    }

    fn uint_fn(text: &str) -> Result<Value> {
        Ok(Value::Unsigned(text.parse::<u64>()?))
    }

    fn float_fn(text: &str) -> Result<Value> {
        Ok(Value::Float(text.parse::<f64>()?))
    }

    fn string_fn(text: &str) -> Result<Value> {
        Ok(Value::String(text.to_string()))
    }

    fn rune_fn(text: &str) -> Result<Value> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(char), None) => Ok(Value::Char(char)),
            _ => Err(anyhow!("expected exactly one character, got {:?}", text)),
        }
    }

    fn bool_pointer_fn(text: &str) -> Result<Value> {
        Self::bool_fn(text).map(Value::pointer)
    }

    fn int_pointer_fn(text: &str) -> Result<Value> {
        Self::int_fn(text).map(Value::pointer)
    }

    fn uint_pointer_fn(text: &str) -> Result<Value> {
        Self::uint_fn(text).map(Value::pointer)
    }

    fn float_pointer_fn(text: &str) -> Result<Value> {
        Self::float_fn(text).map(Value::pointer)
    }

    fn string_pointer_fn(text: &str) -> Result<Value> {
        Self::string_fn(text).map(Value::pointer)
    }

    fn rune_pointer_fn(text: &str) -> Result<Value> {
        Self::rune_fn(text).map(Value::pointer)
    }
}
