use std::collections::HashMap;

use anyhow::Result;

use crate::{
    converters::Builtins,
    error::{EvalError, EvalResult},
    object::Value,
};

/// Loads a host object by its identifier. Registered under a type tag.
pub type Finder = Box<dyn Fn(&str) -> Result<Value>>;

/// Parses literal text into a typed value. Registered under a parameter type tag.
pub type Converter = Box<dyn Fn(&str) -> Result<Value>>;

#[derive(Default)]
pub struct Finders {
    finders: HashMap<String, Finder>,
}

impl Finders {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn register(&mut self, tag: &str, finder: impl Fn(&str) -> Result<Value> + 'static) {
        self.finders.insert(tag.to_string(), Box::new(finder));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.finders.contains_key(tag)
    }

    pub fn find(&self, tag: &str, id: &str) -> EvalResult<Value> {
        let finder = self
            .finders
            .get(tag)
            .ok_or_else(|| EvalError::UnknownLookupType(tag.to_string()))?;
        finder(id).map_err(EvalError::LookupFailed)
    }
}

#[derive(Default)]
pub struct Converters {
    converters: HashMap<String, Converter>,
}

impl Converters {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_builtins() -> Self {
        let mut converters = Self::new();
        for (tag, converter) in Builtins::get() {
            converters.register(tag, converter);
        }
        converters
    }

    pub fn register(&mut self, tag: &str, converter: impl Fn(&str) -> Result<Value> + 'static) {
        self.converters
            .insert(tag.to_string(), Box::new(converter));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.converters.contains_key(tag)
    }

    pub fn convert(&self, tag: &str, text: &str) -> EvalResult<Value> {
        let converter = self
            .converters
            .get(tag)
            .ok_or_else(|| EvalError::UnknownConverterType(tag.to_string()))?;
        converter(text).map_err(|source| EvalError::ConversionFailed {
            text: text.to_string(),
            tag: tag.to_string(),
            source,
        })
    }
}
