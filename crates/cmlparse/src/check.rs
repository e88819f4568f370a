//! Consistency checking of a declaration set, independent of any input.

use crate::error::{CheckResult, DeclarationError, Rule};
use crate::index::rank_positionals;
use crate::param::{Declaration, Policy};
use std::collections::HashMap;

/// Validate a declaration set.
///
/// Rules run in a fixed order and the first violation is returned, so the
/// same set always produces the same error.
pub fn check(params: &[(&'static str, &dyn Declaration)]) -> CheckResult {
    let result = check_identifiers(params)
        .and_then(|()| check_duplicates(params))
        .and_then(|()| check_positional_ranking(params))
        .and_then(|()| check_positional_types(params))
        .and_then(|()| check_policies(params));

    match &result {
        Ok(()) => tracing::debug!(parameters = params.len(), "declaration set is consistent"),
        Err(e) => tracing::debug!(rule = %e.rule, parameters = ?e.parameters, "declaration conflict"),
    }
    result
}

fn check_identifiers(params: &[(&'static str, &dyn Declaration)]) -> CheckResult {
    for &(name, param) in params {
        let info = param.info();
        if let Some(long) = &info.long {
            let reason = if long.is_empty() {
                Some("is empty")
            } else if long.starts_with('-') {
                Some("must be given without leading dashes")
            } else if long.contains('=') {
                Some("must not contain '='")
            } else if long.chars().any(char::is_whitespace) {
                Some("must not contain whitespace")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(DeclarationError::new(
                    Rule::MalformedIdentifier,
                    &[name],
                    format!("long identifier '{long}' of '{name}' {reason}"),
                ));
            }
        }
        if let Some(short) = info.short {
            if short.is_whitespace() || short == '-' || short == '=' {
                return Err(DeclarationError::new(
                    Rule::MalformedIdentifier,
                    &[name],
                    format!("short identifier {short:?} of '{name}' is not usable"),
                ));
            }
        }
    }
    Ok(())
}

fn check_duplicates(params: &[(&'static str, &dyn Declaration)]) -> CheckResult {
    let mut longs: HashMap<&str, &str> = HashMap::new();
    let mut shorts: HashMap<char, &str> = HashMap::new();

    for &(name, param) in params {
        let info = param.info();
        if let Some(long) = &info.long {
            if let Some(prev) = longs.insert(long.as_str(), name) {
                return Err(DeclarationError::new(
                    Rule::DuplicateIdentifier,
                    &[prev, name],
                    format!("--{long} maps to both '{prev}' and '{name}'"),
                ));
            }
        }
        if let Some(short) = info.short {
            if let Some(prev) = shorts.insert(short, name) {
                return Err(DeclarationError::new(
                    Rule::DuplicateIdentifier,
                    &[prev, name],
                    format!("-{short} maps to both '{prev}' and '{name}'"),
                ));
            }
        }
    }
    Ok(())
}

fn check_positional_ranking(params: &[(&'static str, &dyn Declaration)]) -> CheckResult {
    for &(name, param) in params {
        let info = param.info();
        if !info.is_positional() {
            if let Some(index) = info.index {
                return Err(DeclarationError::new(
                    Rule::IndexedNamedParameter,
                    &[name],
                    format!("'{name}' has identifiers and positional index {index}"),
                ));
            }
        }
    }

    let infos: Vec<_> = params.iter().map(|(_, p)| p.info()).collect();
    let ranked = rank_positionals(&infos);
    for explicit in ranked.iter().filter(|r| r.explicit) {
        if let Some(implicit) = ranked
            .iter()
            .find(|r| !r.explicit && r.rank == explicit.rank)
        {
            let (first, second) = if implicit.slot < explicit.slot {
                (implicit.slot, explicit.slot)
            } else {
                (explicit.slot, implicit.slot)
            };
            let (a, b) = (params[first].0, params[second].0);
            return Err(DeclarationError::new(
                Rule::PositionalIndexCollision,
                &[a, b],
                format!(
                    "'{}' takes index {} explicitly, which is also the implicit position of '{}'",
                    params[explicit.slot].0, explicit.rank, params[implicit.slot].0
                ),
            ));
        }
    }
    Ok(())
}

fn check_positional_types(params: &[(&'static str, &dyn Declaration)]) -> CheckResult {
    for &(name, param) in params {
        let info = param.info();
        if info.is_positional() && info.value_type.is_flag() {
            return Err(DeclarationError::new(
                Rule::BooleanPositional,
                &[name],
                format!("'{name}' is a boolean without identifiers; booleans must be flags"),
            ));
        }
    }

    let infos: Vec<_> = params.iter().map(|(_, p)| p.info()).collect();
    let ranked = rank_positionals(&infos);
    let arrays: Vec<usize> = ranked
        .iter()
        .map(|r| r.slot)
        .filter(|&slot| infos[slot].value_type.array)
        .collect();

    if let [first, second, ..] = arrays.as_slice() {
        let (a, b) = (params[*first].0, params[*second].0);
        return Err(DeclarationError::new(
            Rule::ArrayPositional,
            &[b, a],
            format!("'{b}' is a second array positional after '{a}'"),
        ));
    }
    if let (Some(&array), Some(last)) = (arrays.first(), ranked.last()) {
        if last.slot != array {
            let name = params[array].0;
            return Err(DeclarationError::new(
                Rule::ArrayPositional,
                &[name],
                format!(
                    "array positional '{name}' must come last, but '{}' ranks after it",
                    params[last.slot].0
                ),
            ));
        }
    }
    Ok(())
}

fn check_policies(params: &[(&'static str, &dyn Declaration)]) -> CheckResult {
    for &(name, param) in params {
        let info = param.info();
        match param.policy() {
            Policy::Required if info.explicitly_required && param.declares_default() => {
                return Err(DeclarationError::new(
                    Rule::RequiredWithDefault,
                    &[name],
                    format!("'{name}' is marked required but also declares a default"),
                ));
            }
            Policy::OptionalUnset if info.explicitly_required => {
                return Err(DeclarationError::new(
                    Rule::RequiredWithDefault,
                    &[name],
                    format!("'{name}' is optional but marked required"),
                ));
            }
            _ => {}
        }
    }
    for &(name, param) in params {
        if param.policy() == Policy::OptionalUnset && param.declares_default() {
            return Err(DeclarationError::new(
                Rule::OptionalWithDefault,
                &[name],
                format!("optional '{name}' declares a default that can never be used"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParameterBuilder;

    fn flag(long: &str, short: char) -> Box<dyn Declaration> {
        Box::new(
            ParameterBuilder::<bool>::new()
                .identifier(long, Some(short))
                .default_value(false)
                .create_default(),
        )
    }

    fn positional<T: crate::ParamValue>(index: Option<i64>) -> Box<dyn Declaration> {
        let builder = ParameterBuilder::<T>::new();
        let builder = match index {
            Some(i) => builder.index(i),
            None => builder,
        };
        Box::new(builder.create_default())
    }

    fn run(decls: &[(&'static str, Box<dyn Declaration>)]) -> CheckResult {
        let params: Vec<(&'static str, &dyn Declaration)> =
            decls.iter().map(|(n, d)| (*n, d.as_ref())).collect();
        check(&params)
    }

    #[test]
    fn valid_set_passes() {
        let decls = vec![
            ("verbose", flag("verbose", 'v')),
            ("quiet", flag("quiet", 'q')),
            ("input", positional::<String>(Some(0))),
            ("rest", positional::<Vec<String>>(Some(1))),
        ];
        assert!(run(&decls).is_ok());
    }

    #[test]
    fn duplicate_short_names_both() {
        let decls = vec![
            ("append", flag("append", 'a')),
            ("verbose", flag("verbose", 'a')),
        ];
        let err = run(&decls).unwrap_err();
        assert_eq!(err.rule, Rule::DuplicateIdentifier);
        assert_eq!(err.parameters, vec!["append", "verbose"]);
    }

    #[test]
    fn identifier_with_index_is_contradictory() {
        let decls: Vec<(&'static str, Box<dyn Declaration>)> = vec![(
            "mode",
            Box::new(
                ParameterBuilder::<String>::new()
                    .index(0)
                    .identifier("mode", None)
                    .create_default(),
            ),
        )];
        assert_eq!(run(&decls).unwrap_err().rule, Rule::IndexedNamedParameter);
    }

    #[test]
    fn explicit_index_colliding_with_implicit_is_rejected() {
        let decls = vec![
            ("first", positional::<String>(None)),
            ("second", positional::<String>(Some(0))),
        ];
        let err = run(&decls).unwrap_err();
        assert_eq!(err.rule, Rule::PositionalIndexCollision);
        assert!(err.names("first") && err.names("second"));
    }

    #[test]
    fn equal_explicit_indices_are_allowed() {
        let decls = vec![
            ("a", positional::<String>(Some(3))),
            ("b", positional::<String>(Some(3))),
        ];
        assert!(run(&decls).is_ok());
    }

    #[test]
    fn array_positional_must_rank_last() {
        let decls = vec![
            ("files", positional::<Vec<String>>(Some(0))),
            ("target", positional::<String>(Some(1))),
        ];
        let err = run(&decls).unwrap_err();
        assert_eq!(err.rule, Rule::ArrayPositional);
        assert_eq!(err.parameters, vec!["files"]);
    }

    #[test]
    fn boolean_positional_is_rejected() {
        let decls = vec![("force", positional::<bool>(None))];
        assert_eq!(run(&decls).unwrap_err().rule, Rule::BooleanPositional);
    }

    #[test]
    fn malformed_long_identifier_is_rejected() {
        let decls = vec![("output", flag("--output", 'o'))];
        assert_eq!(run(&decls).unwrap_err().rule, Rule::MalformedIdentifier);
    }

    #[test]
    fn optional_with_default_is_rejected() {
        let decls: Vec<(&'static str, Box<dyn Declaration>)> = vec![(
            "output",
            Box::new(
                ParameterBuilder::<String>::new()
                    .identifier("output", Some('o'))
                    .default_value("out.txt".to_string())
                    .create_optional(),
            ),
        )];
        let err = run(&decls).unwrap_err();
        assert_eq!(err.rule, Rule::OptionalWithDefault);
        assert_eq!(err.parameters, vec!["output"]);
    }
}
