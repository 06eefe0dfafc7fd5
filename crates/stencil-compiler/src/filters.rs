//! Filter sets: named tag patterns matched against declared value and block ids.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use regex::Regex;
use stencil_core::{FilterCaptures, FILTER_L10N, FILTER_LANG, FILTER_RENDER};

use crate::error::FilterError;

/// Built-in value filters, in evaluation order.
pub const BUILTIN_VALUE_FILTERS: &[(&str, &str)] = &[
    (FILTER_RENDER, r"^render:([^:]+)(?::(.*))?$"),
    (FILTER_L10N, r"^l10n:(?:([^:]+):)?([^:]+)$"),
    (FILTER_LANG, r"^lang:(.+)$"),
];

/// Built-in block filters.
pub const BUILTIN_BLOCK_FILTERS: &[(&str, &str)] = &[(FILTER_LANG, r"^lang:([^:]+):([\w,\-]+)$")];

/// A named pattern as configured for a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefinition {
    pub name: String,
    pub pattern: String,
}

impl FilterDefinition {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledFilter {
    name: String,
    regex: Regex,
}

/// Compiled value and block filters of one family.
#[derive(Debug, Clone)]
pub struct FilterSet {
    value_filters: Vec<CompiledFilter>,
    block_filters: Vec<CompiledFilter>,
    fingerprint: String,
}

impl FilterSet {
    /// Compile `value_filters` and `block_filters` as given.
    pub fn new(
        value_filters: &[FilterDefinition],
        block_filters: &[FilterDefinition],
    ) -> Result<Self, FilterError> {
        let mut hasher = DefaultHasher::new();
        let value_filters = compile_all("value", value_filters, &mut hasher)?;
        let block_filters = compile_all("block", block_filters, &mut hasher)?;
        Ok(Self {
            value_filters,
            block_filters,
            fingerprint: format!("{:016x}", hasher.finish()),
        })
    }

    /// The built-in filters followed by `extra_values` and `extra_blocks`.
    pub fn with_builtins(
        extra_values: &[FilterDefinition],
        extra_blocks: &[FilterDefinition],
    ) -> Result<Self, FilterError> {
        let values: Vec<FilterDefinition> = builtin(BUILTIN_VALUE_FILTERS)
            .chain(extra_values.iter().cloned())
            .collect();
        let blocks: Vec<FilterDefinition> = builtin(BUILTIN_BLOCK_FILTERS)
            .chain(extra_blocks.iter().cloned())
            .collect();
        Self::new(&values, &blocks)
    }

    pub fn builtin() -> Result<Self, FilterError> {
        Self::with_builtins(&[], &[])
    }

    /// Stable digest of every filter name and pattern, used as the
    /// modification-state token of artifacts compiled with this set.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn value_filter_names(&self) -> impl Iterator<Item = &str> {
        self.value_filters.iter().map(|f| f.name.as_str())
    }

    pub fn block_filter_names(&self) -> impl Iterator<Item = &str> {
        self.block_filters.iter().map(|f| f.name.as_str())
    }

    /// Captures per value filter for every matching id. Filters without a
    /// match are left out.
    pub fn capture_values<'a, I>(&self, ids: I) -> HashMap<String, Vec<FilterCaptures>>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        capture(&self.value_filters, ids)
    }

    pub fn capture_blocks<'a, I>(&self, ids: I) -> HashMap<String, Vec<FilterCaptures>>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        capture(&self.block_filters, ids)
    }
}

fn builtin(table: &'static [(&'static str, &'static str)]) -> impl Iterator<Item = FilterDefinition> {
    table.iter().map(|(name, pattern)| FilterDefinition::new(*name, *pattern))
}

fn compile_all(
    kind: &str,
    definitions: &[FilterDefinition],
    hasher: &mut DefaultHasher,
) -> Result<Vec<CompiledFilter>, FilterError> {
    definitions
        .iter()
        .map(|def| {
            (kind, &def.name, &def.pattern).hash(hasher);
            let regex = Regex::new(&def.pattern).map_err(|source| FilterError::InvalidPattern {
                name: def.name.clone(),
                source,
            })?;
            Ok(CompiledFilter {
                name: def.name.clone(),
                regex,
            })
        })
        .collect()
}

fn capture<'a, I>(filters: &[CompiledFilter], ids: I) -> HashMap<String, Vec<FilterCaptures>>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut result: HashMap<String, Vec<FilterCaptures>> = HashMap::new();
    for filter in filters {
        for id in ids.clone() {
            let Some(caps) = filter.regex.captures(id) else {
                continue;
            };
            let groups = caps
                .iter()
                .skip(1)
                .map(|g| g.map(|m| m.as_str().to_string()))
                .collect();
            result
                .entry(filter.name.clone())
                .or_default()
                .push(FilterCaptures {
                    id: id.to_string(),
                    groups,
                });
        }
    }
    result
}
