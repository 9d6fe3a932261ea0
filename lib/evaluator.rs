use anyhow::Result;

use crate::{
    engine::Engine,
    error::{EvalError, EvalResult},
    heap::Heap,
    object::Value,
    parser::{prepare, Chain, Parser, Step},
    registry::{Converters, Finders},
    statement::{PreparedStatement, Shape, Statement},
    token::{Fragment, Token},
};

/// Runs statements against one heap, one set of finders and one set of converters.
///
/// An evaluator is meant for a single interactive session. It is not `Sync` and
/// callers that share one across threads must serialize access themselves.
pub struct Evaluator {
    heap: Heap,
    finders: Finders,
    converters: Converters,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            heap: Heap::new(),
            finders: Finders::new(),
            converters: Converters::with_builtins(),
        }
    }

    /// An evaluator with no converters at all, not even the primitive ones.
    pub fn without_builtins() -> Self {
        Self {
            heap: Heap::new(),
            finders: Finders::new(),
            converters: Converters::new(),
        }
    }

    pub fn register_lookup(&mut self, tag: &str, finder: impl Fn(&str) -> Result<Value> + 'static) {
        if self.finders.contains(tag) {
            tracing::debug!(%tag, "replacing lookup");
        }
        self.finders.register(tag, finder);
    }

    pub fn register_converter(
        &mut self,
        tag: &str,
        converter: impl Fn(&str) -> Result<Value> + 'static,
    ) {
        if self.converters.contains(tag) {
            tracing::debug!(%tag, "replacing converter");
        }
        self.converters.register(tag, converter);
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    pub fn evaluate_input(&mut self, input: &str) -> EvalResult<Value> {
        let statement = Statement::parse(input);
        let prepared = prepare(&statement)?;
        self.evaluate(&prepared)
    }

    pub fn evaluate(&mut self, prepared: &PreparedStatement) -> EvalResult<Value> {
        match prepared.shape {
            Shape::Lookup => self.eval_lookup(&prepared.left),
            Shape::Inspect => self.eval_inspect(&prepared.left),
            Shape::PropertyCall => self.eval_property_call(&prepared.left),
            Shape::MethodCall => self.eval_method_call(&prepared.left),
            Shape::Assignment => match &prepared.right {
                Some(right) => self.eval_assignment(&prepared.left, right),
                None => Err(EvalError::malformed("assignment without a right-hand side")),
            },
        }
    }

    fn eval_lookup(&self, statement: &Statement) -> EvalResult<Value> {
        let (tag, id) = Parser::new(statement).parse_find()?;
        tracing::debug!(%tag, %id, "looking up object");
        self.finders.find(&tag, &id)
    }

    fn eval_inspect(&self, statement: &Statement) -> EvalResult<Value> {
        let fragment = statement.first();
        match fragment.token {
            Token::Word => self
                .heap
                .get(&fragment.text)
                .ok_or_else(|| EvalError::UnknownVariable(fragment.text.clone())),
            token if token.is_literal() => literal_value(fragment),
            token => Err(EvalError::malformed(format!(
                "{} is not a valid token at position 0",
                token
            ))),
        }
    }

    fn eval_property_call(&self, statement: &Statement) -> EvalResult<Value> {
        let chain = Parser::new(statement).parse_chain()?;
        self.crawl(&chain.base, &chain.steps)
    }

    fn eval_method_call(&self, statement: &Statement) -> EvalResult<Value> {
        let call = Parser::new(statement).parse_method_call()?;
        // With no steps left the receiver is the variable itself.
        let receiver = self.crawl(&call.receiver.base, &call.receiver.steps)?;
        self.invoke(receiver, &call.method, &call.args)
    }

    /// Binds `a = b = ... = <source>` right to left. The chain is walked in place so
    /// long chains cost one pass and no recursion.
    fn eval_assignment(&mut self, left: &Statement, right: &Statement) -> EvalResult<Value> {
        let mut targets = vec![left.clone()];
        let fragments = right.fragments();
        let mut start = 0;
        while !fragments[start].is(Token::Find) {
            let Some(offset) = fragments[start..].iter().position(|f| f.is(Token::Assign)) else {
                break;
            };
            let target = Statement::new(fragments[start..start + offset].to_vec());
            if target.is_empty() {
                return Err(EvalError::malformed(format!(
                    "assignment needs both sides: {}",
                    right
                )));
            }
            targets.push(target);
            start += offset + 1;
        }

        let source = Statement::new(fragments[start..].to_vec());
        let value = self.evaluate(&prepare(&source)?)?;
        for target in targets.iter().rev() {
            self.assign(target, value.clone())?;
        }
        Ok(value)
    }

    fn assign(&mut self, target: &Statement, value: Value) -> EvalResult<()> {
        let target = prepare(target)?;
        match target.shape {
            Shape::Inspect => {
                let name = target.left.first();
                if !name.is(Token::Word) {
                    return Err(EvalError::malformed(format!("cannot assign to {}", name)));
                }
                match self.heap.set(&name.text, value) {
                    Some(_) => tracing::debug!(name = %name.text, "rebound variable"),
                    None => tracing::debug!(name = %name.text, "defined variable"),
                }
                Ok(())
            }
            Shape::PropertyCall => {
                let chain = Parser::new(&target.left).parse_chain()?;
                self.write_back(&chain, value)
            }
            shape => Err(EvalError::malformed(format!("cannot assign to a {}", shape))),
        }
    }

    /// Resolves `base` and walks `steps` from it, dereferencing pointers on the way.
    fn crawl(&self, base: &str, steps: &[Step]) -> EvalResult<Value> {
        let mut current = self
            .heap
            .get(base)
            .ok_or_else(|| EvalError::UnknownVariable(base.to_string()))?;

        for step in steps {
            current = match step {
                Step::Field(name) => field_of(&current, name)?,
                Step::Index(index) => element_of(&current, index)?,
            };
        }
        Ok(current)
    }

    fn write_back(&self, chain: &Chain, value: Value) -> EvalResult<()> {
        let (last, parents) = chain
            .steps
            .split_last()
            .ok_or_else(|| EvalError::malformed(format!("nothing to assign on {}", chain.base)))?;
        let parent = self.crawl(&chain.base, parents)?;

        let name = match last {
            Step::Field(name) => name,
            Step::Index(_) => {
                return Err(EvalError::dispatch(
                    "assignment through an index is not supported",
                ))
            }
        };

        match parent.deref() {
            Value::Object(object) => {
                let mut object = object.try_borrow_mut().map_err(|_| {
                    EvalError::dispatch(format!("cannot assign {} on an object in use", name))
                })?;
                tracing::debug!(field = %name, "writing field");
                let written = object.set_field(name, value);
                written.map_err(|error| EvalError::dispatch(format!("{}: {}", name, error)))
            }
            other => Err(EvalError::dispatch(format!(
                "cannot assign field {} on {}",
                name,
                other.type_name()
            ))),
        }
    }

    fn invoke(&self, receiver: Value, method: &str, args: &[Fragment]) -> EvalResult<Value> {
        let object = match receiver.deref() {
            Value::Object(object) => object,
            Value::Nil => {
                return Err(EvalError::dispatch(format!("cannot call {} on nil", method)));
            }
            other => {
                return Err(EvalError::dispatch(format!(
                    "{} has no method {}",
                    other.type_name(),
                    method
                )))
            }
        };

        let params = {
            let object = object.try_borrow().map_err(|_| {
                EvalError::dispatch(format!("cannot call {} on an object in use", method))
            })?;
            let params = object.params(method);
            params.ok_or_else(|| {
                EvalError::dispatch(format!("{} has no method {}", object.type_name(), method))
            })?
        };

        if params.len() != args.len() {
            return Err(EvalError::dispatch(format!(
                "wrong number of arguments for {}: want={}, got={}",
                method,
                params.len(),
                args.len()
            )));
        }

        // Conversion failures abort before the host sees anything.
        let args = params
            .iter()
            .zip(args)
            .map(|(tag, arg)| self.converters.convert(tag, &arg.text))
            .collect::<EvalResult<Vec<Value>>>()?;

        tracing::debug!(%method, args = args.len(), "invoking method");
        let mut object = object.try_borrow_mut().map_err(|_| {
            EvalError::dispatch(format!("cannot call {} on an object in use", method))
        })?;
        let results = object.invoke(method, args);
        let results =
            results.map_err(|error| EvalError::dispatch(format!("{}: {}", method, error)))?;
        Ok(Value::List(results))
    }
}

impl Engine for Evaluator {
    fn run(&mut self, input: &str) -> Result<String> {
        let value = self.evaluate_input(input)?;
        Ok(value.to_string())
    }
}

fn field_of(value: &Value, name: &str) -> EvalResult<Value> {
    match value.deref() {
        Value::Object(object) => {
            let object = object.try_borrow().map_err(|_| {
                EvalError::dispatch(format!("cannot read {} of an object in use", name))
            })?;
            let field = object.field(name);
            field.ok_or_else(|| {
                EvalError::dispatch(format!("no field {} on {}", name, object.type_name()))
            })
        }
        Value::Nil => Err(EvalError::dispatch(format!(
            "cannot read field {} of nil",
            name
        ))),
        other => Err(EvalError::dispatch(format!(
            "{} has no field {}",
            other.type_name(),
            name
        ))),
    }
}

fn element_of(value: &Value, index: &str) -> EvalResult<Value> {
    let position = index.parse::<usize>().map_err(|error| {
        EvalError::dispatch(format!("unable to use {} as an index: {}", index, error))
    })?;

    match value.deref() {
        Value::List(values) => values.get(position).cloned().ok_or_else(|| {
            EvalError::dispatch(format!(
                "index {} out of range for list of length {}",
                position,
                values.len()
            ))
        }),
        other => Err(EvalError::dispatch(format!(
            "{} is not indexable",
            other.type_name()
        ))),
    }
}

fn literal_value(fragment: &Fragment) -> EvalResult<Value> {
    let value = match fragment.token {
        Token::String => Value::String(fragment.text.clone()),
        Token::Bool => Value::Boolean(fragment.text == "true"),
        Token::Int => match fragment.text.parse::<i64>() {
            Ok(value) => Value::Integer(value),
            Err(_) => Value::Unsigned(fragment.text.parse::<u64>().map_err(|_| {
                EvalError::malformed(format!("integer literal {} is out of range", fragment.text))
            })?),
        },
        Token::Float => Value::Float(fragment.text.parse::<f64>().map_err(|_| {
            EvalError::malformed(format!("invalid float literal {}", fragment.text))
        })?),
        Token::Char => {
            let mut chars = fragment.text.chars();
            match (chars.next(), chars.next()) {
                (Some(char), None) => Value::Char(char),
                _ => {
                    return Err(EvalError::malformed(format!(
                        "character literal {} must hold exactly one character",
                        fragment
                    )))
                }
            }
        }
        token => {
            return Err(EvalError::malformed(format!("{} is not a literal", token)));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::{anyhow, bail};
    use serde::Deserialize;

    use super::*;
    use crate::{
        host::{Gettable, HostObject, Invokable},
        object::{object_ref, ObjectRef},
    };

    type CallLog = Rc<RefCell<Vec<Vec<Value>>>>;

    #[derive(Debug)]
    struct Record {
        name: String,
        email: String,
        orders: Vec<ObjectRef>,
        nested: ObjectRef,
        manager: Option<ObjectRef>,
        log: CallLog,
    }

    impl Gettable for Record {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "Name" => Some(Value::from(self.name.as_str())),
                "Email" => Some(Value::from(self.email.as_str())),
                "Orders" => Some(Value::List(
                    self.orders.iter().cloned().map(Value::Object).collect(),
                )),
                "Nested" => Some(Value::Object(self.nested.clone())),
                "Manager" => Some(self.manager.clone().map_or(Value::Nil, Value::Object)),
                "Lucky" => Some(Value::pointer(Value::from(7i64))),
                "NestedPtr" => Some(Value::pointer(Value::Object(self.nested.clone()))),
                "OrdersPtr" => Some(Value::pointer(Value::pointer(Value::List(
                    self.orders.iter().cloned().map(Value::Object).collect(),
                )))),
                _ => None,
            }
        }

        fn set_field(&mut self, name: &str, value: Value) -> anyhow::Result<()> {
            match name {
                "Name" => {
                    self.name = value
                        .as_string()
                        .ok_or_else(|| anyhow!("Name must be a string"))?;
                    Ok(())
                }
                _ => bail!("field {} cannot be assigned", name),
            }
        }
    }

    impl Invokable for Record {
        fn params(&self, method: &str) -> Option<&'static [&'static str]> {
            match method {
                "Stuff" | "Pair" | "Fail" => Some(&[]),
                "Stuff2" => Some(&["bool", "int"]),
                "Greet" => Some(&["bool"]),
                "Rename" => Some(&["*string"]),
                "Widget" => Some(&["Widget"]),
                _ => None,
            }
        }

        fn invoke(&mut self, method: &str, args: Vec<Value>) -> anyhow::Result<Vec<Value>> {
            self.log.borrow_mut().push(args.clone());
            match method {
                "Stuff" => Ok(vec![Value::from(500001i64)]),
                "Stuff2" => {
                    let add = args[0].as_bool().ok_or_else(|| anyhow!("want bool"))?;
                    let amount = args[1].as_int().ok_or_else(|| anyhow!("want int"))?;
                    Ok(vec![Value::from(if add { 500001 + amount } else { amount })])
                }
                "Greet" => {
                    let formal = args[0].as_bool().ok_or_else(|| anyhow!("want bool"))?;
                    let greeting = if formal {
                        format!("Hello, {}!", self.name)
                    } else {
                        format!("hi {}", self.name)
                    };
                    Ok(vec![Value::from(greeting)])
                }
                "Rename" => match &args[0] {
                    Value::Pointer(name) => {
                        self.name = name.borrow().as_string().ok_or_else(|| anyhow!("want string"))?;
                        Ok(vec![])
                    }
                    other => bail!("expected a pointer, got {}", other.type_name()),
                },
                "Pair" => Ok(vec![Value::from(1i64), Value::from("two")]),
                "Fail" => bail!("boom"),
                _ => bail!("no method {}", method),
            }
        }
    }

    impl HostObject for Record {
        fn type_name(&self) -> &str {
            "Record"
        }
    }

    #[derive(Debug)]
    struct Nested {
        yes: bool,
    }

    impl Gettable for Nested {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "Yes" => Some(Value::from(self.yes)),
                _ => None,
            }
        }
    }

    impl Invokable for Nested {
        fn params(&self, method: &str) -> Option<&'static [&'static str]> {
            match method {
                "DeepStuff" => Some(&[]),
                "DeepStuff2" => Some(&["bool", "int"]),
                "DeepStuff3" => Some(&["Flooper"]),
                _ => None,
            }
        }

        fn invoke(&mut self, method: &str, args: Vec<Value>) -> anyhow::Result<Vec<Value>> {
            match method {
                "DeepStuff" => Ok(vec![Value::from(30056i64)]),
                "DeepStuff2" => {
                    let add = args[0].as_bool().ok_or_else(|| anyhow!("want bool"))?;
                    let amount = args[1].as_int().ok_or_else(|| anyhow!("want int"))?;
                    Ok(vec![Value::from(if add { 30056 + amount } else { amount })])
                }
                "DeepStuff3" => {
                    let floops = match &args[0] {
                        Value::Object(flooper) => flooper.borrow().field("Floops"),
                        _ => None,
                    };
                    Ok(vec![floops.ok_or_else(|| anyhow!("want a Flooper"))?])
                }
                _ => bail!("no method {}", method),
            }
        }
    }

    impl HostObject for Nested {
        fn type_name(&self) -> &str {
            "Nested"
        }
    }

    #[derive(Debug)]
    struct Order {
        id: String,
        floops: i64,
    }

    impl Gettable for Order {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "ID" => Some(Value::from(self.id.as_str())),
                "NumFloops" => Some(Value::from(self.floops)),
                _ => None,
            }
        }
    }

    impl Invokable for Order {
        fn params(&self, method: &str) -> Option<&'static [&'static str]> {
            match method {
                "CustomID" => Some(&["bool"]),
                _ => None,
            }
        }

        fn invoke(&mut self, method: &str, args: Vec<Value>) -> anyhow::Result<Vec<Value>> {
            match method {
                "CustomID" => {
                    let id = if args[0].as_bool() == Some(true) {
                        format!("onum-{}-{}", self.id, self.floops)
                    } else {
                        format!("onum-{}", self.id)
                    };
                    Ok(vec![Value::from(id)])
                }
                _ => bail!("no method {}", method),
            }
        }
    }

    impl HostObject for Order {
        fn type_name(&self) -> &str {
            "Order"
        }
    }

    #[derive(Debug, Deserialize)]
    struct Flooper {
        floops: i64,
    }

    impl Gettable for Flooper {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "Floops" => Some(Value::from(self.floops)),
                _ => None,
            }
        }
    }

    impl Invokable for Flooper {}

    impl HostObject for Flooper {
        fn type_name(&self) -> &str {
            "Flooper"
        }
    }

    fn record(name: &str, log: CallLog) -> ObjectRef {
        let order = |id: &str, floops| {
            object_ref(Order {
                id: id.to_string(),
                floops,
            })
        };
        object_ref(Record {
            name: name.to_string(),
            email: "smedley@mail.com".to_string(),
            orders: vec![order("xxx", 10), order("rrr", 5), order("yyy", 15)],
            nested: object_ref(Nested { yes: true }),
            manager: None,
            log,
        })
    }

    fn fixture() -> (Evaluator, ObjectRef, CallLog) {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let record = record("Smedley", log.clone());

        let mut evaluator = Evaluator::new();
        let found = record.clone();
        evaluator.register_lookup("Record", move |id| match id {
            "smedley@gmail.com" => Ok(Value::Object(found.clone())),
            _ => bail!("Not found {}", id),
        });
        evaluator.register_converter("Flooper", |text| {
            let flooper: Flooper = serde_json::from_str(text)?;
            Ok(Value::object(flooper))
        });

        (evaluator, record, log)
    }

    fn bound_fixture() -> (Evaluator, ObjectRef, CallLog) {
        let (mut evaluator, record, log) = fixture();
        evaluator
            .evaluate_input(r#"o = find(Record, "smedley@gmail.com")"#)
            .unwrap();
        (evaluator, record, log)
    }

    #[test]
    fn test_variable_bound_by_find() {
        let (mut evaluator, record, _) = fixture();

        match evaluator.evaluate_input("o") {
            Err(EvalError::UnknownVariable(name)) => assert_eq!(name, "o"),
            other => panic!("expected unknown variable, got {:?}", other),
        }

        let found = evaluator
            .evaluate_input(r#"o = find(Record, "smedley@gmail.com")"#)
            .unwrap();
        assert_eq!(found, Value::Object(record.clone()));
        assert_eq!(evaluator.evaluate_input("o").unwrap(), Value::Object(record));
    }

    #[test]
    fn test_bare_lookup_does_not_bind() {
        let (mut evaluator, record, _) = fixture();
        let found = evaluator
            .evaluate_input(r#"find(Record, "smedley@gmail.com")"#)
            .unwrap();
        assert_eq!(found, Value::Object(record));
        assert!(evaluator.heap().is_empty());
    }

    #[test]
    fn test_property_calls() {
        let (mut evaluator, _, _) = bound_fixture();
        let tests = vec![
            ("o.Name", Value::from("Smedley")),
            ("o.Email", Value::from("smedley@mail.com")),
            ("o.Nested.Yes", Value::from(true)),
            ("o.Orders[0].ID", Value::from("xxx")),
            ("o.Orders[1].ID", Value::from("rrr")),
            ("o.Orders[2].NumFloops", Value::from(15i64)),
            ("o.Lucky", Value::pointer(Value::from(7i64))),
            ("o.Manager", Value::Nil),
            ("o.NestedPtr.Yes", Value::from(true)),
            ("o.OrdersPtr[0].ID", Value::from("xxx")),
            ("o.OrdersPtr[2].NumFloops", Value::from(15i64)),
        ];

        for (input, expected) in tests {
            assert_eq!(evaluator.evaluate_input(input).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_chain_matches_manual_access() {
        let (mut evaluator, record, _) = bound_fixture();

        let nested = record.borrow().field("Nested").unwrap();
        let manual = match &nested {
            Value::Object(object) => object.borrow().field("Yes").unwrap(),
            other => panic!("expected an object, got {:?}", other),
        };

        assert_eq!(evaluator.evaluate_input("o.Nested.Yes").unwrap(), manual);

        evaluator.evaluate_input("n = o.Nested").unwrap();
        assert_eq!(evaluator.evaluate_input("n.Yes").unwrap(), manual);
    }

    #[test]
    fn test_method_calls() {
        let (mut evaluator, _, _) = bound_fixture();
        let tests = vec![
            ("o.Stuff()", vec![Value::from(500001i64)]),
            ("o.Stuff2(false, 50)", vec![Value::from(50i64)]),
            ("o.Stuff2(true, 50)", vec![Value::from(500051i64)]),
            ("o.Nested.DeepStuff()", vec![Value::from(30056i64)]),
            ("o.Nested.DeepStuff2(true, 50)", vec![Value::from(30106i64)]),
            (
                "o.Nested.DeepStuff3(`{\"floops\":5}`)",
                vec![Value::from(5i64)],
            ),
            ("o.Orders[1].CustomID(true)", vec![Value::from("onum-rrr-5")]),
            ("o.Orders[0].CustomID(false)", vec![Value::from("onum-xxx")]),
            ("o.Pair()", vec![Value::from(1i64), Value::from("two")]),
            ("o.Greet(false)", vec![Value::from("hi Smedley")]),
            ("o.NestedPtr.DeepStuff()", vec![Value::from(30056i64)]),
            ("o.OrdersPtr[1].CustomID(true)", vec![Value::from("onum-rrr-5")]),
        ];

        for (input, expected) in tests {
            assert_eq!(
                evaluator.evaluate_input(input).unwrap(),
                Value::List(expected),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_arguments_converted_in_declared_order() {
        let (mut evaluator, _, log) = bound_fixture();
        evaluator.evaluate_input("o.Stuff2(true, 50)").unwrap();
        assert_eq!(
            *log.borrow(),
            vec![vec![Value::Boolean(true), Value::Integer(50)]]
        );
    }

    #[test]
    fn test_find_then_inspect_then_invoke() {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let user = record("Ada", log);
        let mut evaluator = Evaluator::new();
        let found = user.clone();
        evaluator.register_lookup("User", move |id| match id {
            "42" => Ok(Value::Object(found.clone())),
            _ => bail!("no user {}", id),
        });

        let bound = evaluator.evaluate_input(r#"u = find(User,"42")"#).unwrap();
        assert_eq!(bound, Value::Object(user));
        assert_eq!(evaluator.evaluate_input("u.Name").unwrap(), Value::from("Ada"));
        assert_eq!(
            evaluator.evaluate_input("u.Greet(true)").unwrap(),
            Value::List(vec![Value::from("Hello, Ada!")])
        );
    }

    #[test]
    fn test_error_handling() {
        let (mut evaluator, _, _) = bound_fixture();
        let tests = vec![
            ("x", "unknown variable: x"),
            ("x.Name", "unknown variable: x"),
            ("x.Stuff()", "unknown variable: x"),
            (
                "find(Record, a, b)",
                "malformed statement: invalid set of arguments for find, expected find(<type>, <id>)",
            ),
            ("find(Nope, 1)", "no lookup method for type Nope"),
            (r#"find(Record, "nobody")"#, "Not found nobody"),
            (
                "o.Orders[abc]",
                "dispatch failed: unable to use abc as an index: invalid digit found in string",
            ),
            (
                "o.Orders[9]",
                "dispatch failed: index 9 out of range for list of length 3",
            ),
            ("o.Email[0]", "dispatch failed: string is not indexable"),
            ("o.Missing", "dispatch failed: no field Missing on Record"),
            ("o.Email.Length", "dispatch failed: string has no field Length"),
            ("o.Manager.Name", "dispatch failed: cannot read field Name of nil"),
            ("o.Manager.Call()", "dispatch failed: cannot call Call on nil"),
            ("o.Nope()", "dispatch failed: Record has no method Nope"),
            ("o.Email.Len()", "dispatch failed: string has no method Len"),
            (
                "o.Stuff2(true)",
                "dispatch failed: wrong number of arguments for Stuff2: want=2, got=1",
            ),
            (
                "o.Stuff(1, 2, 3)",
                "dispatch failed: wrong number of arguments for Stuff: want=0, got=3",
            ),
            (
                "o.Stuff2(yes, 1)",
                "malformed statement: expected a literal argument, found identifier",
            ),
            (
                r#"o.Stuff2("maybe", 1)"#,
                r#"error converting maybe to bool: invalid boolean: "maybe""#,
            ),
            ("o.Widget(1)", "no converter for type Widget"),
            ("o.Fail()", "dispatch failed: Fail: boom"),
            ("x + 1", "malformed statement: unexpected character + in x + 1"),
            ("=", "malformed statement: = is not a valid token at position 0"),
        ];

        for (input, expected) in tests {
            match evaluator.evaluate_input(input) {
                Ok(value) => panic!("no error returned for {}, got {}", input, value),
                Err(error) => assert_eq!(error.to_string(), expected, "{}", input),
            }
        }
    }

    #[test]
    fn test_error_kinds() {
        let (mut evaluator, _, _) = bound_fixture();

        assert!(matches!(
            evaluator.evaluate_input("find(Record, a, b, c)"),
            Err(EvalError::MalformedStatement(_))
        ));
        assert!(matches!(
            evaluator.evaluate_input("o.Orders[x]"),
            Err(EvalError::DispatchFailed(_))
        ));
        assert!(matches!(
            evaluator.evaluate_input("find(Record, nobody)"),
            Err(EvalError::LookupFailed(_))
        ));
        assert!(matches!(
            evaluator.evaluate_input("o.Stuff2(1.5, 1)"),
            Err(EvalError::ConversionFailed { .. })
        ));
    }

    #[test]
    fn test_failed_call_leaves_heap_intact() {
        let (mut evaluator, record, _) = bound_fixture();

        assert!(evaluator.evaluate_input("o.Fail()").is_err());
        assert!(evaluator.evaluate_input("o = find(Nope, 1)").is_err());
        assert!(evaluator.evaluate_input("z = o.Missing").is_err());

        assert_eq!(evaluator.evaluate_input("o").unwrap(), Value::Object(record));
        assert!(matches!(
            evaluator.evaluate_input("z"),
            Err(EvalError::UnknownVariable(_))
        ));
        assert_eq!(evaluator.heap().names(), vec!["o"]);
    }

    #[test]
    fn test_assignments() {
        let (mut evaluator, record, _) = bound_fixture();
        let tests = vec![
            ("n = o.Email", Value::from("smedley@mail.com")),
            ("n", Value::from("smedley@mail.com")),
            ("c = o.Stuff()", Value::List(vec![Value::from(500001i64)])),
            ("x = 5", Value::from(5i64)),
            ("x = 2.5", Value::from(2.5)),
            ("x", Value::from(2.5)),
            ("s = \"hi there\"", Value::from("hi there")),
            ("b = true", Value::from(true)),
            ("ch = 'z'", Value::from('z')),
            ("big = 18446744073709551615", Value::from(u64::MAX)),
            ("a = b = 1", Value::from(1i64)),
            ("b", Value::from(1i64)),
            ("copy = o", Value::Object(record.clone())),
            ("first = o.Orders[0].ID", Value::from("xxx")),
        ];

        for (input, expected) in tests {
            assert_eq!(evaluator.evaluate_input(input).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_chained_assignment() {
        let (mut evaluator, _, _) = bound_fixture();

        assert_eq!(evaluator.evaluate_input("a = b = c = 2").unwrap(), Value::from(2i64));
        for name in ["a", "b", "c"] {
            assert_eq!(evaluator.evaluate_input(name).unwrap(), Value::from(2i64));
        }

        let input = format!("{}1", "a=".repeat(20_000));
        assert_eq!(evaluator.evaluate_input(&input).unwrap(), Value::from(1i64));
        assert_eq!(evaluator.evaluate_input("a").unwrap(), Value::from(1i64));
    }

    #[test]
    fn test_chained_assignment_binds_right_to_left() {
        let (mut evaluator, _, _) = bound_fixture();

        let error = evaluator.evaluate_input(r#"o.Email = n = "x""#).unwrap_err();
        assert_eq!(
            error.to_string(),
            "dispatch failed: Email: field Email cannot be assigned"
        );
        assert_eq!(evaluator.evaluate_input("n").unwrap(), Value::from("x"));

        let tests = vec![
            ("a = = 1", "malformed statement: assignment needs both sides: =1"),
            ("a = b =", "malformed statement: empty statement"),
        ];
        for (input, expected) in tests {
            let error = evaluator.evaluate_input(input).unwrap_err();
            assert_eq!(error.to_string(), expected, "{}", input);
        }
        assert!(matches!(
            evaluator.evaluate_input("a"),
            Err(EvalError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_field_write_back() {
        let (mut evaluator, _, _) = bound_fixture();

        assert_eq!(
            evaluator.evaluate_input(r#"o.Name = "Bob""#).unwrap(),
            Value::from("Bob")
        );
        assert_eq!(evaluator.evaluate_input("o.Name").unwrap(), Value::from("Bob"));

        let tests = vec![
            (
                r#"o.Email = "x""#,
                "dispatch failed: Email: field Email cannot be assigned",
            ),
            ("o.Name = 5", "dispatch failed: Name: Name must be a string"),
            (
                "o.Orders[0] = 1",
                "dispatch failed: assignment through an index is not supported",
            ),
            ("o.Email.Size = 1", "dispatch failed: cannot assign field Size on string"),
            ("nobody.Name = 1", "unknown variable: nobody"),
            (
                "find(Record, x) = 1",
                "malformed statement: invalid set of arguments for find, expected find(<type>, <id>)",
            ),
            (
                "o.Stuff() = 1",
                "malformed statement: cannot assign to a method call",
            ),
            ("5 = 1", "malformed statement: cannot assign to 5"),
        ];

        for (input, expected) in tests {
            match evaluator.evaluate_input(input) {
                Ok(value) => panic!("no error returned for {}, got {}", input, value),
                Err(error) => assert_eq!(error.to_string(), expected, "{}", input),
            }
        }
    }

    #[test]
    fn test_pointer_arguments() {
        let (mut evaluator, _, log) = bound_fixture();
        assert_eq!(
            evaluator.evaluate_input(r#"o.Rename("Grace")"#).unwrap(),
            Value::List(vec![])
        );
        assert_eq!(evaluator.evaluate_input("o.Name").unwrap(), Value::from("Grace"));
        assert_eq!(
            *log.borrow(),
            vec![vec![Value::pointer(Value::from("Grace"))]]
        );
    }

    #[test]
    fn test_custom_converter_overrides_builtin() {
        let (mut evaluator, _, log) = bound_fixture();
        evaluator.register_converter("bool", |_| Ok(Value::Boolean(false)));
        evaluator.evaluate_input("o.Stuff2(true, 50)").unwrap();
        assert_eq!(
            *log.borrow(),
            vec![vec![Value::Boolean(false), Value::Integer(50)]]
        );
    }

    #[test]
    fn test_without_builtins() {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let found = record("Smedley", log.clone());
        let mut evaluator = Evaluator::without_builtins();
        evaluator.register_lookup("Record", move |_| Ok(Value::Object(found.clone())));
        evaluator.evaluate_input("o = find(Record, any)").unwrap();

        match evaluator.evaluate_input("o.Stuff2(true, 1)") {
            Err(EvalError::UnknownConverterType(tag)) => assert_eq!(tag, "bool"),
            other => panic!("expected unknown converter, got {:?}", other),
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_evaluators_are_isolated() {
        let (mut first, _, _) = bound_fixture();
        let (mut second, _, _) = fixture();

        first.evaluate_input("x = 1").unwrap();
        assert_eq!(first.evaluate_input("x").unwrap(), Value::from(1i64));
        assert!(matches!(
            second.evaluate_input("x"),
            Err(EvalError::UnknownVariable(_))
        ));
        assert!(matches!(
            second.evaluate_input("o"),
            Err(EvalError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_engine_run() {
        let (mut evaluator, _, _) = bound_fixture();
        let engine: &mut dyn Engine = &mut evaluator;

        assert_eq!(engine.run("x = 5").unwrap(), "5");
        assert_eq!(engine.run("o.Name").unwrap(), "\"Smedley\"");
        assert_eq!(engine.run("o.Pair()").unwrap(), "[1, \"two\"]");
        assert_eq!(
            engine.run("y").unwrap_err().to_string(),
            "unknown variable: y"
        );
    }
}
