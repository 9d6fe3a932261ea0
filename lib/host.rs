//! Capabilities a host implements on its types so the engine can reach into them.
//!
//! The engine never inspects host objects on its own. Fields are read through
//! [`Gettable`] and methods are called through [`Invokable`]; anything a type does
//! not expose simply reports "not found" and the evaluator turns that into an error.

use std::fmt;

use anyhow::{bail, Result};

use crate::object::Value;

pub trait Gettable {
    /// Returns the named field, or `None` if the type has no such field.
    fn field(&self, name: &str) -> Option<Value>;

    /// Writes a field in place. Types that allow `obj.Field = value` override this.
    fn set_field(&mut self, name: &str, _value: Value) -> Result<()> {
        bail!("field {} cannot be assigned", name)
    }
}

/// Implementations must report failures through `invoke`'s error rather than panic.
/// The evaluator contains every error a host returns, but a panic unwinds through
/// the caller.
pub trait Invokable {
    /// Declared parameter type tags of `method`, in order, or `None` if there is no
    /// such method. The tags select the converters used for literal arguments.
    fn params(&self, _method: &str) -> Option<&'static [&'static str]> {
        None
    }

    /// Calls `method` with arguments already converted to the declared types.
    fn invoke(&mut self, method: &str, _args: Vec<Value>) -> Result<Vec<Value>> {
        bail!("no method {}", method)
    }
}

pub trait HostObject: Gettable + Invokable + fmt::Debug {
    fn type_name(&self) -> &str;
}
