//! A small in-memory host so the binary has something to rummage through.

use anyhow::{anyhow, bail, Result};
use rummage::{object_ref, Evaluator, Gettable, HostObject, Invokable, ObjectRef, Value};
use serde::Deserialize;

#[derive(Debug)]
struct User {
    id: i64,
    name: String,
    email: String,
    admin: bool,
    profile: ObjectRef,
    orders: Vec<ObjectRef>,
}

impl Gettable for User {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "ID" => Value::from(self.id),
            "Name" => Value::from(self.name.as_str()),
            "Email" => Value::from(self.email.as_str()),
            "Admin" => Value::from(self.admin),
            "Profile" => Value::Object(self.profile.clone()),
            "Orders" => Value::List(self.orders.iter().cloned().map(Value::Object).collect()),
            "Manager" => Value::Nil,
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "Name" => {
                self.name = value
                    .as_string()
                    .ok_or_else(|| anyhow!("Name must be a string, got {}", value.type_name()))?;
            }
            "Admin" => {
                self.admin = value
                    .as_bool()
                    .ok_or_else(|| anyhow!("Admin must be a bool, got {}", value.type_name()))?;
            }
            _ => bail!("field {} cannot be assigned", name),
        }
        Ok(())
    }
}

impl Invokable for User {
    fn params(&self, method: &str) -> Option<&'static [&'static str]> {
        match method {
            "Greet" => Some(&["bool"]),
            "Discount" => Some(&["bool", "int"]),
            "Rename" => Some(&["string"]),
            _ => None,
        }
    }

    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        match (method, args.as_slice()) {
            ("Greet", [formal]) => {
                let greeting = if formal.as_bool() == Some(true) {
                    format!("Good day, {}.", self.name)
                } else {
                    format!("hey {}", self.name)
                };
                Ok(vec![Value::from(greeting)])
            }
            ("Discount", [loyal, percent]) => {
                let percent = percent.as_int().ok_or_else(|| anyhow!("percent must be an int"))?;
                if !(0..=100).contains(&percent) {
                    bail!("discount of {}% is out of range", percent);
                }
                let bonus = if loyal.as_bool() == Some(true) { 5 } else { 0 };
                Ok(vec![Value::from((percent + bonus).min(100))])
            }
            ("Rename", [name]) => {
                let previous = std::mem::replace(
                    &mut self.name,
                    name.as_string().ok_or_else(|| anyhow!("name must be a string"))?,
                );
                Ok(vec![Value::from(previous)])
            }
            _ => bail!("no method {}", method),
        }
    }
}

impl HostObject for User {
    fn type_name(&self) -> &str {
        "User"
    }
}

#[derive(Debug)]
struct Order {
    id: String,
    quantity: i64,
}

impl Gettable for Order {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "ID" => Some(Value::from(self.id.as_str())),
            "Quantity" => Some(Value::from(self.quantity)),
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

    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        match (method, args.as_slice()) {
            ("CustomID", [long]) if long.as_bool() == Some(true) => Ok(vec![Value::from(
                format!("onum-{}-{}", self.id, self.quantity),
            )]),
            ("CustomID", [_]) => Ok(vec![Value::from(format!("onum-{}", self.id))]),
            _ => bail!("no method {}", method),
        }
    }
}

impl HostObject for Order {
    fn type_name(&self) -> &str {
        "Order"
    }
}

#[derive(Debug)]
struct Profile {
    bio: String,
    score: f64,
    width: i64,
    height: i64,
}

impl Gettable for Profile {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Bio" => Some(Value::from(self.bio.as_str())),
            "Score" => Some(Value::from(self.score)),
            _ => None,
        }
    }
}

impl Invokable for Profile {
    fn params(&self, method: &str) -> Option<&'static [&'static str]> {
        match method {
            "Fits" => Some(&["Dimensions"]),
            _ => None,
        }
    }

    fn invoke(&mut self, method: &str, args: Vec<Value>) -> Result<Vec<Value>> {
        match (method, args.as_slice()) {
            ("Fits", [Value::Object(dimensions)]) => {
                let dimensions = dimensions.borrow();
                let width = dimensions.field("Width").and_then(|w| w.as_int());
                let height = dimensions.field("Height").and_then(|h| h.as_int());
                match (width, height) {
                    (Some(width), Some(height)) => Ok(vec![Value::from(
                        width <= self.width && height <= self.height,
                    )]),
                    _ => bail!("expected Dimensions, got {}", dimensions.type_name()),
                }
            }
            _ => bail!("no method {}", method),
        }
    }
}

impl HostObject for Profile {
    fn type_name(&self) -> &str {
        "Profile"
    }
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    width: i64,
    height: i64,
}

impl Gettable for Dimensions {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Width" => Some(Value::from(self.width)),
            "Height" => Some(Value::from(self.height)),
            _ => None,
        }
    }
}

impl Invokable for Dimensions {}

impl HostObject for Dimensions {
    fn type_name(&self) -> &str {
        "Dimensions"
    }
}

fn users() -> Vec<ObjectRef> {
    let order = |id: &str, quantity| {
        object_ref(Order {
            id: id.to_string(),
            quantity,
        })
    };

    vec![
        object_ref(User {
            id: 42,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            admin: true,
            profile: object_ref(Profile {
                bio: "counts things".to_string(),
                score: 9.5,
                width: 10,
                height: 10,
            }),
            orders: vec![order("xxx", 10), order("rrr", 5), order("yyy", 15)],
        }),
        object_ref(User {
            id: 7,
            name: "Smedley".to_string(),
            email: "smedley@gmail.com".to_string(),
            admin: false,
            profile: object_ref(Profile {
                bio: "".to_string(),
                score: 3.0,
                width: 2,
                height: 2,
            }),
            orders: vec![],
        }),
    ]
}

/// Registers the `User` finder and the `Dimensions` converter.
pub fn install(evaluator: &mut Evaluator) {
    let users = users();
    evaluator.register_lookup("User", move |id| {
        users
            .iter()
            .find(|user| {
                let user = user.borrow();
                let by_id = user.field("ID").map(|value| value.to_string());
                let by_email = user.field("Email").and_then(|value| value.as_string());
                by_id.as_deref() == Some(id) || by_email.as_deref() == Some(id)
            })
            .map(|user| Value::Object(user.clone()))
            .ok_or_else(|| anyhow!("no user with id or email {}", id))
    });

    evaluator.register_converter("Dimensions", |text| {
        let dimensions: Dimensions = serde_json::from_str(text)?;
        Ok(Value::object(dimensions))
    });
}
