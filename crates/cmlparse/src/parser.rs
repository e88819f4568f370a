use crate::check;
use crate::error::{CheckResult, ParseResult};
use crate::help;
use crate::index::{IdentifierIndex, infos};
use crate::param::Options;
use crate::resolve::resolve;
use crate::schema::CommandSchema;
use crate::token::{Tokenizer, split_line};

/// Section ordering of the rendered help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpOrder {
    /// Named options, then positional arguments.
    #[default]
    OptionsFirst,
    ArgumentsFirst,
    /// One list in declaration order.
    Declaration,
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub program: String,
    pub summary: String,
    /// Answer to `-h`/`--help` unless a declaration claims them.
    pub help_flag: bool,
    pub help_order: HelpOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program: "program".to_string(),
            summary: String::new(),
            help_flag: true,
            help_order: HelpOrder::default(),
        }
    }
}

impl Settings {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn help_flag(mut self, enabled: bool) -> Self {
        self.help_flag = enabled;
        self
    }

    pub fn help_order(mut self, order: HelpOrder) -> Self {
        self.help_order = order;
        self
    }
}

/// Raw command-line input: one string, or an already split argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Args(Vec<String>),
}

impl Input {
    /// Collect host arguments, e.g. `Input::args(std::env::args().skip(1))`.
    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Args(args.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Input {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for Input {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<Vec<String>> for Input {
    fn from(args: Vec<String>) -> Self {
        Self::Args(args)
    }
}

impl From<Vec<&str>> for Input {
    fn from(args: Vec<&str>) -> Self {
        Self::args(args)
    }
}

impl From<&[String]> for Input {
    fn from(args: &[String]) -> Self {
        Self::args(args.iter().cloned())
    }
}

impl From<&[&str]> for Input {
    fn from(args: &[&str]) -> Self {
        Self::args(args.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Input {
    fn from(args: [&str; N]) -> Self {
        Self::args(args)
    }
}

/// Parses command lines into an options structure.
///
/// The parser keeps a pristine prototype of the options; every `parse` works
/// on a fresh clone, so a parser can be reused and shared between threads
/// when `O` allows it.
///
/// ```
/// use cmlparse::{DefaultParameter, ParameterBuilder, Parser, options};
///
/// #[derive(Clone)]
/// struct Args {
///     name: DefaultParameter<String>,
/// }
/// options!(Args { name });
///
/// let parser = Parser::new(Args {
///     name: ParameterBuilder::new()
///         .identifier("name", Some('n'))
///         .default_value("world".to_string())
///         .create_default(),
/// });
/// assert!(parser.check().is_ok());
/// let args = parser.parse("-n rust").unwrap();
/// assert_eq!(args.name.value(), "rust");
/// ```
#[derive(Debug, Clone)]
pub struct Parser<O: Options> {
    prototype: O,
    settings: Settings,
}

impl<O: Options> Parser<O> {
    pub fn new(options: O) -> Self {
        Self::with_settings(options, Settings::default())
    }

    pub fn with_settings(options: O, settings: Settings) -> Self {
        Self {
            prototype: options,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The unparsed options as declared.
    pub fn prototype(&self) -> &O {
        &self.prototype
    }

    /// Check the declarations for consistency. Independent of any input;
    /// run it once at startup (or in a test) before trusting `parse`.
    pub fn check(&self) -> CheckResult {
        check::check(&self.prototype.parameters())
    }

    fn index(&self) -> IdentifierIndex {
        let params = self.prototype.parameters();
        IdentifierIndex::build(&infos(&params), self.settings.help_flag)
    }

    /// Parse a command line into a fresh options value.
    pub fn parse(&self, input: impl Into<Input>) -> ParseResult<O> {
        let args = match input.into() {
            Input::Line(line) => split_line(&line)?,
            Input::Args(args) => args,
        };
        let index = self.index();
        let tokens = Tokenizer::new(&index).tokenize(args);
        resolve(&self.prototype, &index, tokens)
    }

    pub fn help_text(&self) -> String {
        let params = self.prototype.parameters();
        help::render(&self.settings, &params, &self.index())
    }

    /// Machine-readable description of the declarations.
    pub fn schema(&self) -> CommandSchema {
        CommandSchema::new(&self.settings, &self.prototype.parameters())
    }
}
