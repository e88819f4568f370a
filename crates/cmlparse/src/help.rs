//! Help and usage rendering.

use crate::index::{IdentifierIndex, infos, rank_positionals};
use crate::param::{Declaration, Policy};
use crate::parser::{HelpOrder, Settings};

fn placeholder(name: &str, decl: &dyn Declaration) -> String {
    decl.info()
        .value_name
        .clone()
        .unwrap_or_else(|| name.replace('-', "_").to_ascii_uppercase())
}

fn format_positional(name: &str, decl: &dyn Declaration) -> String {
    let n = placeholder(name, decl);
    let mut out = if decl.policy() == Policy::Required {
        format!("<{n}>")
    } else {
        format!("[{n}]")
    };
    if decl.info().value_type.array {
        out.push_str("...");
    }
    out
}

fn format_named(name: &str, decl: &dyn Declaration) -> String {
    let info = decl.info();
    let mut names: Vec<String> = Vec::new();
    if let Some(s) = info.short {
        names.push(format!("-{s}"));
    }
    if let Some(l) = &info.long {
        names.push(format!("--{l}"));
    }
    let mut out = names.join(", ");
    if info.takes_value() {
        out.push_str(&format!(" <{}>", placeholder(name, decl)));
    }
    out
}

fn format_help(decl: &dyn Declaration) -> String {
    let info = decl.info();
    let mut out = info.description.trim().to_string();
    let mut push = |text: &str| {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(text);
    };
    if decl.policy() == Policy::Required && !info.is_positional() {
        push("(required)");
    }
    if decl.policy() == Policy::DefaultValue {
        if let Some(tokens) = decl.default_tokens() {
            if !tokens.is_empty() {
                push(&format!("[default: {}]", tokens.join(" ")));
            }
        }
    }
    out
}

fn push_rows(out: &mut String, title: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

fn usage_line(
    settings: &Settings,
    params: &[(&'static str, &dyn Declaration)],
    has_options: bool,
) -> String {
    let mut usage = settings.program.clone();
    if has_options {
        usage.push_str(" [OPTIONS]");
    }
    for &(name, decl) in params {
        if decl.policy() == Policy::Required && !decl.info().is_positional() {
            usage.push(' ');
            usage.push_str(&format_named(name, decl));
        }
    }
    for ranked in rank_positionals(&infos(params)) {
        let (name, decl) = params[ranked.slot];
        usage.push(' ');
        usage.push_str(&format_positional(name, decl));
    }
    usage
}

/// Render help text for a declaration set.
///
/// Named options are listed in declaration order, positionals in matching
/// order. The output depends only on the declarations and `settings`.
pub fn render(
    settings: &Settings,
    params: &[(&'static str, &dyn Declaration)],
    index: &IdentifierIndex,
) -> String {
    let mut out = String::new();
    if settings.summary.trim().is_empty() {
        out.push_str(&settings.program);
        out.push('\n');
    } else {
        out.push_str(&format!("{} - {}\n", settings.program, settings.summary.trim()));
    }

    let mut options: Vec<(String, String)> = params
        .iter()
        .filter(|(_, d)| !d.info().is_positional())
        .map(|&(name, d)| (format_named(name, d), format_help(d)))
        .collect();
    let builtin_help = match (index.help_short(), index.help_long()) {
        (true, true) => Some("-h, --help"),
        (true, false) => Some("-h"),
        (false, true) => Some("--help"),
        (false, false) => None,
    };
    if let Some(left) = builtin_help {
        options.push((left.to_string(), "Print help".to_string()));
    }

    let ranked = rank_positionals(&infos(params));
    let arguments: Vec<(String, String)> = ranked
        .iter()
        .map(|r| {
            let (name, d) = params[r.slot];
            (format_positional(name, d), format_help(d))
        })
        .collect();

    out.push_str(&format!(
        "\nUsage: {}\n",
        usage_line(settings, params, !options.is_empty())
    ));

    match settings.help_order {
        HelpOrder::OptionsFirst => {
            push_rows(&mut out, "Options", &options);
            push_rows(&mut out, "Arguments", &arguments);
        }
        HelpOrder::ArgumentsFirst => {
            push_rows(&mut out, "Arguments", &arguments);
            push_rows(&mut out, "Options", &options);
        }
        HelpOrder::Declaration => {
            let mut rows: Vec<(String, String)> = params
                .iter()
                .map(|&(name, d)| {
                    if d.info().is_positional() {
                        (format_positional(name, d), format_help(d))
                    } else {
                        (format_named(name, d), format_help(d))
                    }
                })
                .collect();
            if let Some(left) = builtin_help {
                rows.push((left.to_string(), "Print help".to_string()));
            }
            push_rows(&mut out, "Parameters", &rows);
        }
    }

    out
}
