//! Machine-readable description of a declaration set.
//!
//! The schema is what a host prints for tooling (completion generators,
//! documentation). It is derived from the declarations only; parsing never
//! changes it.

use crate::index::{infos, rank_positionals};
use crate::param::{Declaration, Policy};
use crate::parser::Settings;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub policy: Policy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    /// Matching position of a positional parameter (0 = first bare value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub program: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub help_flag: bool,
    pub parameters: Vec<ParamSchema>,
}

impl CommandSchema {
    pub fn new(settings: &Settings, params: &[(&'static str, &dyn Declaration)]) -> Self {
        let ranked = rank_positionals(&infos(params));
        let parameters = params
            .iter()
            .enumerate()
            .map(|(slot, &(name, decl))| {
                let info = decl.info();
                ParamSchema {
                    name: name.to_string(),
                    long: info.long.clone(),
                    short: info.short,
                    description: info.description.clone(),
                    value_type: info.value_type.to_string(),
                    policy: decl.policy(),
                    default: match decl.policy() {
                        Policy::DefaultValue => decl.default_tokens(),
                        _ => None,
                    },
                    value_name: info.value_name.clone(),
                    position: ranked.iter().position(|r| r.slot == slot),
                }
            })
            .collect();

        Self {
            program: settings.program.clone(),
            summary: settings.summary.clone(),
            help_flag: settings.help_flag,
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
