//! Matching tokens to declarations and resolving final values.

use crate::error::{ParseError, ParseResult, Problem};
use crate::index::{IdentifierIndex, Ranked, Target, infos, rank_positionals};
use crate::param::{Declaration, Options, Policy};
use crate::token::Token;

/// Resolve `tokens` against a fresh copy of `prototype`.
///
/// Problems are collected across the whole token stream. The first unknown
/// option, malformed token or help request, in stream order, stops the walk,
/// since later tokens can no longer be attributed. A declaration counts as
/// missing only when no token was matched to it, whether or not its value
/// coerced. Values and callbacks are only committed when nothing went wrong.
pub fn resolve<O: Options>(
    prototype: &O,
    index: &IdentifierIndex,
    tokens: Vec<Token>,
) -> ParseResult<O> {
    let mut options = prototype.clone();

    let (ranked, array_tail) = {
        let params = options.parameters();
        let ranked: Vec<Ranked> = rank_positionals(&infos(&params));
        // Once reached, an array positional absorbs every further bare value.
        let tail = ranked
            .last()
            .filter(|r| params[r.slot].1.info().value_type.array)
            .map(|r| r.slot);
        (ranked, tail)
    };

    let mut params = options.parameters_mut();
    let mut matched = vec![false; params.len()];
    let mut problems: Vec<Problem> = Vec::new();
    let mut cursor = 0usize;

    tracing::debug!(
        tokens = tokens.len(),
        parameters = params.len(),
        positionals = ranked.len(),
        "resolving command line"
    );

    for token in tokens {
        let (slot, shown, raw) = match token {
            Token::Separator => continue,
            Token::Malformed { token, reason } => {
                report(Problem::MalformedToken { token, reason }, &mut problems)?;
                continue;
            }
            Token::Value(raw) => {
                let Some(r) = ranked.get(cursor) else {
                    report(Problem::UnexpectedArgument { token: raw }, &mut problems)?;
                    continue;
                };
                if Some(r.slot) != array_tail {
                    cursor += 1;
                }
                (r.slot, None, raw)
            }
            Token::Long { name, value } => {
                let shown = format!("--{name}");
                match named(index.long(&name), shown, value, &params, &mut problems)? {
                    Some(found) => found,
                    None => continue,
                }
            }
            Token::Short { flag, value } => {
                let shown = format!("-{flag}");
                match named(index.short(flag), shown, value, &params, &mut problems)? {
                    Some(found) => found,
                    None => continue,
                }
            }
        };

        matched[slot] = true;
        let (name, param) = &mut params[slot];
        match &shown {
            Some(option) => {
                tracing::trace!(parameter = *name, option = %option, value = %raw, "named match")
            }
            None => tracing::trace!(parameter = *name, value = %raw, "positional match"),
        }
        if let Err(reason) = param.stage(&raw) {
            let problem = Problem::TypeMismatch {
                parameter: name.to_string(),
                token: raw,
                expected: param.info().value_type,
                reason,
            };
            report(problem, &mut problems)?;
        }
    }

    let missing: Vec<String> = params
        .iter()
        .enumerate()
        .filter(|(slot, (_, p))| p.policy() == Policy::Required && !matched[*slot])
        .map(|(_, (name, _))| name.to_string())
        .collect();
    if !missing.is_empty() {
        problems.push(Problem::MissingRequired {
            parameters: missing,
        });
    }

    if !problems.is_empty() {
        tracing::debug!(problems = problems.len(), "command line rejected");
        return Err(ParseError::new(problems));
    }

    for (_, param) in params.iter_mut() {
        param.commit();
    }
    for (_, param) in params.iter() {
        param.notify();
    }
    drop(params);

    Ok(options)
}

/// Look up a named token. Yields the slot, the option as written and the raw
/// value, or `None` if the token was recorded as a problem.
fn named(
    target: Option<Target>,
    shown: String,
    value: Option<String>,
    params: &[(&'static str, &mut dyn Declaration)],
    problems: &mut Vec<Problem>,
) -> ParseResult<Option<(usize, Option<String>, String)>> {
    let slot = match target {
        Some(Target::Param(slot)) => slot,
        Some(Target::Help) => {
            report(Problem::HelpRequested, problems)?;
            return Ok(None);
        }
        None => {
            report(Problem::UnknownOption { option: shown }, problems)?;
            return Ok(None);
        }
    };
    let raw = match value {
        Some(v) => v,
        None if params[slot].1.info().value_type.is_flag() => "true".to_string(),
        None => {
            let problem = Problem::MalformedToken {
                token: shown,
                reason: "missing value".to_string(),
            };
            report(problem, problems)?;
            return Ok(None);
        }
    };
    Ok(Some((slot, Some(shown), raw)))
}

/// Record `problem`; a fatal one stops the walk, leading the problems
/// collected so far.
fn report(problem: Problem, problems: &mut Vec<Problem>) -> ParseResult<()> {
    if !problem.is_fatal() {
        problems.push(problem);
        return Ok(());
    }
    tracing::debug!(problem = %problem, "command line aborted");
    let mut all = Vec::with_capacity(problems.len() + 1);
    all.push(problem);
    all.append(problems);
    Err(ParseError::new(all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::param::{DefaultParameter, OptionalParameter, ParameterBuilder};
    use crate::token::Tokenizer;
    use crate::value::ScalarKind;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug)]
    struct CopyArgs {
        recursive: DefaultParameter<bool>,
        jobs: DefaultParameter<u32>,
        exclude: DefaultParameter<Vec<String>>,
        log: OptionalParameter<String>,
        source: DefaultParameter<String>,
        dest: DefaultParameter<String>,
    }

    crate::options!(CopyArgs { recursive, jobs, exclude, log, source, dest });

    fn copy() -> CopyArgs {
        CopyArgs {
            recursive: ParameterBuilder::new()
                .identifier("recursive", Some('r'))
                .default_value(false)
                .create_default(),
            jobs: ParameterBuilder::new()
                .identifier("jobs", Some('j'))
                .default_value(1)
                .create_default(),
            exclude: ParameterBuilder::new()
                .identifier("exclude", Some('e'))
                .default_value(Vec::new())
                .create_default(),
            log: ParameterBuilder::new()
                .identifier("log", None)
                .create_optional(),
            source: ParameterBuilder::new().create_default(),
            dest: ParameterBuilder::new().create_default(),
        }
    }

    fn run(options: &CopyArgs, args: &[&str]) -> ParseResult<CopyArgs> {
        let index = {
            let params = options.parameters();
            IdentifierIndex::build(&infos(&params), true)
        };
        let tokens = Tokenizer::new(&index).tokenize(args.iter().copied());
        resolve(options, &index, tokens)
    }

    #[test]
    fn resolves_named_and_positional_values() {
        let parsed = run(&copy(), &["-rj", "4", "--exclude=*.o", "-e", "*.a", "src", "dst"]).unwrap();
        assert!(*parsed.recursive.value());
        assert_eq!(*parsed.jobs.value(), 4);
        assert_eq!(parsed.exclude.value(), &vec!["*.o".to_string(), "*.a".to_string()]);
        assert!(!parsed.log.is_set());
        assert_eq!(parsed.source.value(), "src");
        assert_eq!(parsed.dest.value(), "dst");
    }

    #[test]
    fn collects_every_type_mismatch_and_missing_parameter() {
        let err = run(&copy(), &["--jobs", "many", "--recursive=maybe"]).unwrap_err();
        let kinds: Vec<ErrorKind> = err.problems().iter().map(|p| p.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::TypeMismatch,
                ErrorKind::TypeMismatch,
                ErrorKind::MissingRequiredParameter,
            ]
        );
        assert_eq!(err.missing(), &["source".to_string(), "dest".to_string()]);
        match &err.problems()[0] {
            Problem::TypeMismatch {
                parameter,
                token,
                expected,
                ..
            } => {
                assert_eq!(parameter, "jobs");
                assert_eq!(token, "many");
                assert_eq!(expected.scalar, ScalarKind::Integer);
            }
            other => panic!("expected TypeMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn mismatched_positional_is_not_also_missing() {
        #[derive(Clone, Debug)]
        struct Repeat {
            count: DefaultParameter<u32>,
        }
        crate::options!(Repeat { count });

        let options = Repeat {
            count: ParameterBuilder::new().create_default(),
        };
        let index = IdentifierIndex::build(&infos(&options.parameters()), true);
        let tokens = Tokenizer::new(&index).tokenize(["abc"]);
        let err = resolve(&options, &index, tokens).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        match &err.problems()[0] {
            Problem::TypeMismatch {
                parameter, token, ..
            } => {
                assert_eq!(parameter, "count");
                assert_eq!(token, "abc");
            }
            other => panic!("expected TypeMismatch, got: {other:?}"),
        }
        assert!(err.missing().is_empty());
    }

    #[test]
    fn fatal_token_wins_in_stream_order() {
        let err = run(&copy(), &["--bogus", "--jobs"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOption);
        assert_eq!(err.problems().len(), 1);

        let err = run(&copy(), &["--jobs=x", "--log"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedToken);
        assert_eq!(err.problems()[1].kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn surplus_positionals_are_unexpected() {
        let err = run(&copy(), &["a", "b", "c"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedArgument);
    }

    #[test]
    fn unknown_option_leads_even_after_other_problems() {
        let err = run(&copy(), &["--jobs=x", "a", "b", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownOption);
        assert_eq!(err.problems().len(), 2);
    }

    #[test]
    fn help_flag_stops_parsing() {
        let err = run(&copy(), &["--jobs=x", "-h"]).unwrap_err();
        assert!(err.is_help());
    }

    #[test]
    fn callbacks_fire_only_after_full_success() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut options = copy();
        let sink = Arc::clone(&seen);
        options.jobs = ParameterBuilder::new()
            .identifier("jobs", Some('j'))
            .default_value(1)
            .on_parse(move |v: &u32| sink.lock().unwrap().push(format!("jobs={v}")))
            .create_default();
        let sink = Arc::clone(&seen);
        options.log = ParameterBuilder::new()
            .identifier("log", None)
            .on_parse(move |v: &String| sink.lock().unwrap().push(format!("log={v}")))
            .create_optional();

        // `dest` is missing, so nothing may fire.
        assert!(run(&options, &["-j", "3", "src"]).is_err());
        assert!(seen.lock().unwrap().is_empty());

        run(&options, &["src", "dst"]).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["jobs=1".to_string()]);
    }

    #[test]
    fn prototype_is_left_untouched() {
        let prototype = copy();
        run(&prototype, &["-r", "a", "b"]).unwrap();
        assert!(!*prototype.recursive.value());
        assert!(prototype.source.try_value().is_err());
    }
}
