//! Lookup structures derived once from a declaration set.

use crate::param::{Declaration, ParamInfo};
use std::collections::HashMap;

pub(crate) const HELP_LONG: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';

/// What an identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Slot of a declaration, in declaration order.
    Param(usize),
    /// The built-in help flag.
    Help,
}

/// Identifier → declaration lookup.
///
/// On an inconsistent set the first declaration of a duplicated identifier
/// wins; `check` is what reports the duplicate.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    long: HashMap<String, Target>,
    short: HashMap<char, Target>,
    takes_value: Vec<bool>,
}

impl IdentifierIndex {
    pub fn build(infos: &[&ParamInfo], help_flag: bool) -> Self {
        let mut index = Self {
            takes_value: infos.iter().map(|i| i.takes_value()).collect(),
            ..Self::default()
        };
        for (slot, info) in infos.iter().enumerate() {
            if let Some(long) = &info.long {
                index
                    .long
                    .entry(long.clone())
                    .or_insert(Target::Param(slot));
            }
            if let Some(short) = info.short {
                index.short.entry(short).or_insert(Target::Param(slot));
            }
        }
        if help_flag {
            index
                .long
                .entry(HELP_LONG.to_string())
                .or_insert(Target::Help);
            index.short.entry(HELP_SHORT).or_insert(Target::Help);
        }
        index
    }

    pub fn long(&self, name: &str) -> Option<Target> {
        self.long.get(name).copied()
    }

    pub fn short(&self, flag: char) -> Option<Target> {
        self.short.get(&flag).copied()
    }

    pub fn takes_value(&self, target: Target) -> bool {
        match target {
            Target::Param(slot) => self.takes_value.get(slot).copied().unwrap_or(false),
            Target::Help => false,
        }
    }

    /// Whether the built-in help flag answers to `--help` (it may be shadowed).
    pub fn help_long(&self) -> bool {
        self.long(HELP_LONG) == Some(Target::Help)
    }

    pub fn help_short(&self) -> bool {
        self.short(HELP_SHORT) == Some(Target::Help)
    }
}

/// A positional declaration with its effective rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub slot: usize,
    pub rank: i64,
    pub explicit: bool,
}

/// Positional declarations in matching order.
///
/// The rank is the explicit `index`, or the declaration's ordinal among
/// positionals. Ties are broken by declaration order.
pub fn rank_positionals(infos: &[&ParamInfo]) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = infos
        .iter()
        .enumerate()
        .filter(|(_, info)| info.is_positional())
        .enumerate()
        .map(|(ordinal, (slot, info))| Ranked {
            slot,
            rank: info.index.unwrap_or(ordinal as i64),
            explicit: info.index.is_some(),
        })
        .collect();
    ranked.sort_by_key(|r| (r.rank, r.slot));
    ranked
}

pub(crate) fn infos<'a>(params: &'a [(&'static str, &'a dyn Declaration)]) -> Vec<&'a ParamInfo> {
    params.iter().map(|(_, p)| p.info()).collect()
}
