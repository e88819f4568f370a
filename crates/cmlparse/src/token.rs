//! Splitting raw command-line input into tokens.

use crate::error::{ParseError, Problem};
use crate::index::IdentifierIndex;

/// One lexical unit of command-line input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `--name`, `--name=value`, or `--name value` for value-taking options.
    Long { name: String, value: Option<String> },
    /// `-x`, one entry per flag of a cluster; `-xvalue` / `-x value` carry a value.
    Short { flag: char, value: Option<String> },
    /// A bare argument, including everything after `--`.
    Value(String),
    /// The literal `--`.
    Separator,
    /// An argument that can't be read. Always the last token of a stream.
    Malformed { token: String, reason: String },
}

impl Token {
    fn malformed(token: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

fn malformed(token: &str, reason: impl Into<String>) -> ParseError {
    ParseError::single(Problem::MalformedToken {
        token: token.to_string(),
        reason: reason.into(),
    })
}

/// Split a single command-line string into arguments.
///
/// Whitespace separates arguments. Single quotes are literal, double quotes
/// allow `\"` and `\\`, and a backslash outside quotes escapes the next
/// character.
pub fn split_line(line: &str) -> Result<Vec<String>, ParseError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut args = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty argument) from no argument at all.
    let mut in_arg = false;
    let mut quote = Quote::None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (Quote::None, '\'') => {
                quote = Quote::Single;
                in_arg = true;
            }
            (Quote::None, '"') => {
                quote = Quote::Double;
                in_arg = true;
            }
            (Quote::None, '\\') => {
                let Some(next) = chars.next() else {
                    return Err(malformed(line, "trailing backslash"));
                };
                current.push(next);
                in_arg = true;
            }
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            (Quote::Double, '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => return Err(malformed(line, "unterminated double quote")),
            },
            (_, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    match quote {
        Quote::Single => return Err(malformed(line, "unterminated single quote")),
        Quote::Double => return Err(malformed(line, "unterminated double quote")),
        Quote::None => {}
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Turns arguments into [`Token`]s.
///
/// Needs the identifier index to know which options consume a value and how
/// to read a cluster like `-vofile` (`-v`, `-o file`). An argument that can't
/// be read ends the stream with [`Token::Malformed`], so whatever came before
/// it is still seen first.
pub struct Tokenizer<'i> {
    index: &'i IdentifierIndex,
}

impl<'i> Tokenizer<'i> {
    pub fn new(index: &'i IdentifierIndex) -> Self {
        Self { index }
    }

    pub fn tokenize<I, S>(&self, args: I) -> Vec<Token>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = Vec::new();
        let mut args = args.into_iter().map(Into::<String>::into);
        let mut literal = false;

        while let Some(arg) = args.next() {
            if literal {
                tokens.push(Token::Value(arg));
                continue;
            }
            if arg == "--" {
                literal = true;
                tokens.push(Token::Separator);
                continue;
            }

            if let Some(body) = arg.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (body, None),
                };
                if name.is_empty() {
                    tokens.push(Token::malformed(&arg, "missing option name"));
                    break;
                }
                if name.starts_with('-') {
                    tokens.push(Token::malformed(&arg, "too many leading dashes"));
                    break;
                }
                let value = match inline {
                    Some(v) => Some(v),
                    None => match self.index.long(name) {
                        Some(target) if self.index.takes_value(target) => {
                            match next_value(&mut args, &arg) {
                                Ok(v) => Some(v),
                                Err(malformed) => {
                                    tokens.push(malformed);
                                    break;
                                }
                            }
                        }
                        _ => None,
                    },
                };
                tokens.push(Token::Long {
                    name: name.to_string(),
                    value,
                });
                continue;
            }

            if let Some(cluster) = arg.strip_prefix('-') {
                if !cluster.is_empty() && !self.is_negative_number(cluster) {
                    if let Err(malformed) = self.lex_cluster(cluster, &arg, &mut args, &mut tokens) {
                        tokens.push(malformed);
                        break;
                    }
                    continue;
                }
            }

            tokens.push(Token::Value(arg));
        }

        tokens
    }

    fn is_negative_number(&self, cluster: &str) -> bool {
        let Some(first) = cluster.chars().next() else {
            return false;
        };
        self.index.short(first).is_none() && cluster.parse::<f64>().is_ok()
    }

    fn lex_cluster(
        &self,
        cluster: &str,
        arg: &str,
        rest: &mut impl Iterator<Item = String>,
        tokens: &mut Vec<Token>,
    ) -> Result<(), Token> {
        for (pos, flag) in cluster.char_indices() {
            let after = &cluster[pos + flag.len_utf8()..];
            let Some(target) = self.index.short(flag) else {
                // Unknown; the resolver reports it and nothing after it is trusted.
                tokens.push(Token::Short { flag, value: None });
                return Ok(());
            };

            if self.index.takes_value(target) {
                let inline = after.strip_prefix('=').unwrap_or(after);
                let value = if inline.is_empty() {
                    next_value(rest, arg)?
                } else {
                    inline.to_string()
                };
                tokens.push(Token::Short {
                    flag,
                    value: Some(value),
                });
                return Ok(());
            }

            if let Some(inline) = after.strip_prefix('=') {
                tokens.push(Token::Short {
                    flag,
                    value: Some(inline.to_string()),
                });
                return Ok(());
            }
            tokens.push(Token::Short { flag, value: None });
        }
        Ok(())
    }
}

fn next_value(rest: &mut impl Iterator<Item = String>, option: &str) -> Result<String, Token> {
    match rest.next() {
        Some(value) if value != "--" => Ok(value),
        _ => Err(Token::malformed(option, "missing value")),
    }
}
