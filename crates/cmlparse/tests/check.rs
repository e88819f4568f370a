use cmlparse::{
    DefaultParameter, ErrorKind, OptionalParameter, ParameterBuilder, Parser, Rule, options,
};

#[derive(Clone, Debug)]
struct Time {
    format: DefaultParameter<String>,
    portability: DefaultParameter<bool>,
    output: OptionalParameter<std::path::PathBuf>,
    append: DefaultParameter<bool>,
    verbose: DefaultParameter<bool>,
    command: DefaultParameter<Vec<String>>,
}

options!(Time { format, portability, output, append, verbose, command });

fn time() -> Time {
    Time {
        format: ParameterBuilder::new()
            .identifier("format", Some('f'))
            .default_value("%e real".to_string())
            .create_default(),
        portability: ParameterBuilder::new()
            .identifier("portability", Some('p'))
            .default_value(false)
            .create_default(),
        output: ParameterBuilder::new()
            .identifier("output", Some('o'))
            .create_optional(),
        append: ParameterBuilder::new()
            .identifier("append", Some('a'))
            .default_value(false)
            .create_default(),
        verbose: ParameterBuilder::new()
            .identifier("verbose", Some('v'))
            .default_value(false)
            .create_default(),
        command: ParameterBuilder::new().create_default(),
    }
}

#[test]
fn consistent_declarations_pass() {
    assert!(Parser::new(time()).check().is_ok());
}

#[test]
fn duplicate_short_identifier_names_both_declarations() {
    let mut options = time();
    options.verbose = ParameterBuilder::new()
        .identifier("verbose", Some('a'))
        .default_value(false)
        .create_default();
    let err = Parser::new(options).check().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeclarationConflict);
    assert_eq!(err.rule, Rule::DuplicateIdentifier);
    assert_eq!(err.parameters, vec!["append", "verbose"]);
}

#[test]
fn duplicate_long_identifier_is_a_conflict() {
    let mut options = time();
    options.verbose = ParameterBuilder::new()
        .identifier("append", None)
        .default_value(false)
        .create_default();
    let err = Parser::new(options).check().unwrap_err();
    assert_eq!(err.rule, Rule::DuplicateIdentifier);
    assert!(err.names("append") && err.names("verbose"));
    assert!(err.to_string().contains("--append"));
}

#[test]
fn required_with_default_is_a_conflict() {
    let mut options = time();
    options.format = ParameterBuilder::new()
        .identifier("format", Some('f'))
        .default_value("%e".to_string())
        .required()
        .create_default();
    let err = Parser::new(options).check().unwrap_err();
    assert_eq!(err.rule, Rule::RequiredWithDefault);
    assert_eq!(err.parameters, vec!["format"]);
}

#[test]
fn second_array_positional_is_a_conflict() {
    #[derive(Clone, Debug)]
    struct Two {
        left: DefaultParameter<Vec<String>>,
        right: OptionalParameter<Vec<String>>,
    }
    options!(Two { left, right });

    let err = Parser::new(Two {
        left: ParameterBuilder::new().create_default(),
        right: ParameterBuilder::new().create_optional(),
    })
    .check()
    .unwrap_err();
    assert_eq!(err.rule, Rule::ArrayPositional);
    assert!(err.names("right"));
}

#[test]
fn earlier_rule_wins_when_several_are_broken() {
    let mut options = time();
    options.output = ParameterBuilder::new()
        .identifier("output", Some('o'))
        .default_value("log.txt".into())
        .create_optional();
    options.verbose = ParameterBuilder::new()
        .identifier("verbose", Some('p'))
        .default_value(false)
        .create_default();
    let err = Parser::new(options).check().unwrap_err();
    assert_eq!(err.rule, Rule::DuplicateIdentifier);
}

#[test]
fn check_is_independent_of_parsing() {
    let parser = Parser::new(time());
    let before = parser.check();
    let _ = parser.parse("-p -o out ls -l");
    let _ = parser.parse("--nonsense");
    assert_eq!(before, parser.check());
}
