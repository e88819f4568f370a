//! Declarative command-line parameters.
//!
//! A program describes its parameters once, as typed fields of an options
//! struct built with [`ParameterBuilder`]. From that declaration set the
//! crate provides:
//! - a consistency check ([`Parser::check`]) for conflicts that would make
//!   parsing ambiguous (duplicate identifiers, misplaced array positionals,
//!   defaults that can never apply, ...)
//! - parsing of a command line into a fresh, fully typed options value
//!   ([`Parser::parse`]), reporting every problem found rather than the first
//! - help text ([`Parser::help_text`]) and a serializable schema
//!   ([`Parser::schema`]) derived from the same declarations
//!
//! ```
//! use cmlparse::{DefaultParameter, OptionalParameter, ParameterBuilder, Parser, options};
//!
//! #[derive(Clone)]
//! struct Args {
//!     verbose: DefaultParameter<bool>,
//!     output: OptionalParameter<String>,
//!     input: DefaultParameter<String>,
//! }
//! options!(Args { verbose, output, input });
//!
//! let parser = Parser::new(Args {
//!     verbose: ParameterBuilder::new()
//!         .identifier("verbose", Some('v'))
//!         .default_value(false)
//!         .create_default(),
//!     output: ParameterBuilder::new().identifier("output", Some('o')).create_optional(),
//!     input: ParameterBuilder::new().description("Input file").create_default(),
//! });
//! parser.check().unwrap();
//!
//! let args = parser.parse(["-vo", "out.txt", "in.txt"]).unwrap();
//! assert!(*args.verbose.value());
//! assert_eq!(args.output.get().map(String::as_str), Some("out.txt"));
//! assert_eq!(args.input.value(), "in.txt");
//! ```

pub mod check;
pub mod error;
pub mod help;
pub mod index;
pub mod param;
pub mod parser;
pub mod resolve;
pub mod schema;
pub mod token;
pub mod value;

pub use check::check;
pub use error::{
    CheckResult, DeclarationError, Error, ErrorKind, ParseError, ParseResult, Problem, Rule,
    ValueNotSet,
};
pub use param::{
    Callback, Declaration, DefaultParameter, OptionalParameter, Options, ParamInfo,
    ParameterBuilder, Policy,
};
pub use parser::{HelpOrder, Input, Parser, Settings};
pub use schema::{CommandSchema, ParamSchema};
pub use token::{Token, Tokenizer, split_line};
pub use value::{ParamValue, Scalar, ScalarKind, ValueType};
