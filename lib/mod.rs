pub mod converters;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod heap;
pub mod host;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod registry;
pub mod statement;
pub mod token;

pub use engine::Engine;
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use host::{Gettable, HostObject, Invokable};
pub use lexer::{Lexer, Scanner};
pub use object::{object_ref, ObjectRef, Value};
pub use parser::prepare;
pub use statement::{PreparedStatement, Shape, Statement};
pub use token::{Fragment, Token};
