//! Parameter declarations and the builder that produces them.

use crate::error::ValueNotSet;
use crate::value::{ParamValue, ValueType};
use std::fmt;
use std::sync::Arc;

/// Callback run with a parameter's final value after a successful parse.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// What happens when a parameter is not given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    Required,
    DefaultValue,
    OptionalUnset,
}

/// Immutable metadata of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub long: Option<String>,
    pub short: Option<char>,
    pub description: String,
    pub value_name: Option<String>,
    pub index: Option<i64>,
    pub value_type: ValueType,
    /// `required()` was called on the builder.
    pub explicitly_required: bool,
}

impl ParamInfo {
    pub fn is_positional(&self) -> bool {
        self.long.is_none() && self.short.is_none()
    }

    pub fn takes_value(&self) -> bool {
        !self.value_type.is_flag()
    }
}

/// The type-erased view of a declaration used by the checker, resolver and
/// help renderer.
///
/// Only the resolver calls the mutating methods, and only on its own copy of
/// the options.
pub trait Declaration {
    fn info(&self) -> &ParamInfo;

    fn policy(&self) -> Policy;

    /// A default was supplied to the builder (whatever the policy).
    fn declares_default(&self) -> bool;

    /// The default rendered as tokens, for help and schema output.
    fn default_tokens(&self) -> Option<Vec<String>>;

    /// Coerce one raw token and stage it. Arrays accumulate. On error the
    /// staged value is left as it was.
    fn stage(&mut self, raw: &str) -> Result<(), String>;

    /// Move the staged value (or default) into the value slot.
    fn commit(&mut self);

    /// Run the callback, if any, with the committed value.
    fn notify(&self);
}

/// Fluent construction of a parameter declaration.
///
/// ```
/// use cmlparse::ParameterBuilder;
///
/// let format = ParameterBuilder::<String>::new()
///     .identifier("format", Some('f'))
///     .description("Output format")
///     .default_value("plain".to_string())
///     .create_default();
/// assert_eq!(format.value(), "plain");
/// ```
pub struct ParameterBuilder<T: ParamValue> {
    long: Option<String>,
    short: Option<char>,
    description: String,
    value_name: Option<String>,
    index: Option<i64>,
    default: Option<T>,
    required: bool,
    callback: Option<Callback<T>>,
}

impl<T: ParamValue> Default for ParameterBuilder<T> {
    fn default() -> Self {
        Self {
            long: None,
            short: None,
            description: String::new(),
            value_name: None,
            index: None,
            default: None,
            required: false,
            callback: None,
        }
    }
}

impl<T: ParamValue> ParameterBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifiers (`--long`, `-s`).
    ///
    /// A parameter without identifiers is positional.
    pub fn identifier(mut self, long: impl Into<String>, short: Option<char>) -> Self {
        self.long = Some(long.into());
        self.short = short;
        self
    }

    /// Set only a short identifier.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Default used when the parameter isn't given. Makes a `create_default`
    /// parameter non-required.
    pub fn default_value(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    /// Rank of a positional parameter. Positionals are matched in ascending
    /// rank; equal ranks keep declaration order.
    pub fn index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }

    /// Placeholder shown in help, e.g. `FILE`.
    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    /// Mark the parameter required. Combined with a default this is a
    /// declaration conflict, reported by the consistency check.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Called with the final value once every parameter parsed successfully.
    pub fn on_parse(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    fn info(&self) -> ParamInfo {
        ParamInfo {
            long: self.long.clone(),
            short: self.short,
            description: self.description.clone(),
            value_name: self.value_name.clone(),
            index: self.index,
            value_type: T::value_type(),
            explicitly_required: self.required,
        }
    }

    /// Freeze into a parameter that always has a value after parsing: the
    /// given one, or the default. Without a default it is required.
    pub fn create_default(self) -> DefaultParameter<T> {
        DefaultParameter {
            info: self.info(),
            value: self.default.clone(),
            default: self.default,
            staged: None,
            callback: self.callback,
        }
    }

    /// Freeze into a parameter that may stay unset.
    pub fn create_optional(self) -> OptionalParameter<T> {
        OptionalParameter {
            info: self.info(),
            value: None,
            stray_default: self.default,
            staged: None,
            callback: self.callback,
        }
    }
}

fn describe(info: &ParamInfo) -> String {
    match (&info.long, info.short) {
        (Some(long), _) => long.clone(),
        (None, Some(short)) => short.to_string(),
        (None, None) => info.description.clone(),
    }
}

/// A parameter that is either required or falls back to a default.
#[derive(Clone)]
pub struct DefaultParameter<T: ParamValue> {
    info: ParamInfo,
    value: Option<T>,
    default: Option<T>,
    staged: Option<T>,
    callback: Option<Callback<T>>,
}

impl<T: ParamValue> DefaultParameter<T> {
    pub fn info(&self) -> &ParamInfo {
        &self.info
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.info.explicitly_required || self.default.is_none()
    }

    /// The resolved value.
    ///
    /// Fails only for a required parameter read before a successful parse.
    pub fn try_value(&self) -> Result<&T, ValueNotSet> {
        self.value.as_ref().ok_or_else(|| ValueNotSet {
            parameter: describe(&self.info),
        })
    }

    /// The resolved value.
    ///
    /// # Panics
    ///
    /// If this is a required parameter on options that were never parsed.
    pub fn value(&self) -> &T {
        match self.try_value() {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: ParamValue> fmt::Debug for DefaultParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultParameter")
            .field("info", &self.info)
            .field("value", &self.value)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

impl<T: ParamValue> Declaration for DefaultParameter<T> {
    fn info(&self) -> &ParamInfo {
        &self.info
    }

    fn policy(&self) -> Policy {
        if self.is_required() {
            Policy::Required
        } else {
            Policy::DefaultValue
        }
    }

    fn declares_default(&self) -> bool {
        self.default.is_some()
    }

    fn default_tokens(&self) -> Option<Vec<String>> {
        self.default.as_ref().map(ParamValue::to_tokens)
    }

    fn stage(&mut self, raw: &str) -> Result<(), String> {
        self.staged = Some(T::absorb(self.staged.clone(), raw)?);
        Ok(())
    }

    fn commit(&mut self) {
        if let Some(v) = self.staged.take() {
            self.value = Some(v);
        } else {
            self.value = self.default.clone();
        }
    }

    fn notify(&self) {
        if let (Some(callback), Some(value)) = (&self.callback, &self.value) {
            callback(value);
        }
    }
}

/// A parameter that may be left unset. Check `is_set` before reading.
#[derive(Clone)]
pub struct OptionalParameter<T: ParamValue> {
    info: ParamInfo,
    value: Option<T>,
    /// A default handed to the builder; never used, only reported by `check`.
    stray_default: Option<T>,
    staged: Option<T>,
    callback: Option<Callback<T>>,
}

impl<T: ParamValue> OptionalParameter<T> {
    pub fn info(&self) -> &ParamInfo {
        &self.info
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn try_value(&self) -> Result<&T, ValueNotSet> {
        self.value.as_ref().ok_or_else(|| ValueNotSet {
            parameter: describe(&self.info),
        })
    }

    /// The value of a set parameter.
    ///
    /// # Panics
    ///
    /// If the parameter is not set. Reading an unset optional is a bug in the
    /// caller, not bad input.
    pub fn value(&self) -> &T {
        match self.try_value() {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: ParamValue> fmt::Debug for OptionalParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalParameter")
            .field("info", &self.info)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<T: ParamValue> Declaration for OptionalParameter<T> {
    fn info(&self) -> &ParamInfo {
        &self.info
    }

    fn policy(&self) -> Policy {
        Policy::OptionalUnset
    }

    fn declares_default(&self) -> bool {
        self.stray_default.is_some()
    }

    fn default_tokens(&self) -> Option<Vec<String>> {
        None
    }

    fn stage(&mut self, raw: &str) -> Result<(), String> {
        self.staged = Some(T::absorb(self.staged.clone(), raw)?);
        Ok(())
    }

    fn commit(&mut self) {
        if let Some(v) = self.staged.take() {
            self.value = Some(v);
        }
    }

    fn notify(&self) {
        if let (Some(callback), Some(value)) = (&self.callback, &self.value) {
            callback(value);
        }
    }
}

/// An options structure: an ordered set of named declarations.
///
/// Implement with the [`options!`](crate::options) macro, which lists fields
/// in declaration order and uses the field names as parameter names.
pub trait Options: Clone {
    fn parameters(&self) -> Vec<(&'static str, &dyn Declaration)>;

    fn parameters_mut(&mut self) -> Vec<(&'static str, &mut dyn Declaration)>;
}

/// Implement [`Options`] for a struct whose listed fields are parameters.
///
/// ```
/// use cmlparse::{DefaultParameter, ParameterBuilder, options};
///
/// #[derive(Clone)]
/// struct Args {
///     verbose: DefaultParameter<bool>,
/// }
///
/// options!(Args { verbose });
///
/// let args = Args {
///     verbose: ParameterBuilder::new()
///         .identifier("verbose", Some('v'))
///         .default_value(false)
///         .create_default(),
/// };
/// # let _ = args;
/// ```
#[macro_export]
macro_rules! options {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Options for $ty {
            fn parameters(&self) -> ::std::vec::Vec<(&'static str, &dyn $crate::Declaration)> {
                vec![$((stringify!($field), &self.$field as &dyn $crate::Declaration)),*]
            }

            fn parameters_mut(
                &mut self,
            ) -> ::std::vec::Vec<(&'static str, &mut dyn $crate::Declaration)> {
                vec![$((stringify!($field), &mut self.$field as &mut dyn $crate::Declaration)),*]
            }
        }
    };
}
