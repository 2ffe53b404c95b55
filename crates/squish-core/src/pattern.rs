//! Asset name patterns
//!
//! The `test` option selects which assets are optimized. It holds one or more
//! patterns; an asset is a candidate when any of them matches its name.
//!
//! # Example
//!
//! ```yaml
//! test:
//!   - "**/*.png"
//!   - regex: '\.gif$'
//!   - !regex '\.jpe?g$'
//! ```

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::glob;

static MATCH_ANY: Lazy<Regex> = Lazy::new(|| Regex::new(".*").expect("constant regex"));

const SHAPE_MESSAGE: &str =
    "test must be a regex, a glob string, or a list of regexes or glob strings";

/// A single pattern before compilation
#[derive(Debug, Clone)]
pub enum RawPattern {
    /// A regular expression, matched anywhere in the name
    Regex(Regex),
    /// A glob string, translated to a regex at compile time
    Glob(String),
}

impl From<Regex> for RawPattern {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<&str> for RawPattern {
    fn from(glob: &str) -> Self {
        Self::Glob(glob.to_string())
    }
}

impl From<String> for RawPattern {
    fn from(glob: String) -> Self {
        Self::Glob(glob)
    }
}

#[derive(Debug, Clone)]
struct CompiledPattern {
    source: String,
    regex: Regex,
    negated: bool,
}

impl CompiledPattern {
    fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name) != self.negated
    }
}

/// Compiled, immutable set of name patterns combined with logical OR
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    patterns: Vec<CompiledPattern>,
}

impl PatternMatcher {
    /// Compile an ordered list of patterns.
    ///
    /// Globs are translated here, so [`test`](Self::test) never parses
    /// anything. An empty list matches nothing.
    pub fn compile<I, P>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<RawPattern>,
    {
        let patterns = raw
            .into_iter()
            .map(|p| compile_one(p.into()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Compile the `test` option as it appears in YAML: a single pattern or a
    /// sequence of patterns.
    ///
    /// Strings are globs. Regexes are written as `{ regex: ..., ignore_case: bool }`
    /// or with the `!regex` tag. Anything else is an [`Error::InvalidPattern`].
    pub fn from_value(value: &Value) -> Result<Self> {
        let raw = match value {
            Value::Sequence(items) => items
                .iter()
                .map(raw_from_value)
                .collect::<Result<Vec<_>>>()?,
            single => vec![raw_from_value(single)?],
        };
        Self::compile(raw)
    }

    /// A matcher that accepts every name
    pub fn match_all() -> Self {
        Self {
            patterns: vec![CompiledPattern {
                source: ".*".to_string(),
                regex: MATCH_ANY.clone(),
                negated: false,
            }],
        }
    }

    /// Whether `filename` matches at least one pattern
    pub fn test(&self, filename: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(filename))
    }

    /// Number of compiled patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the matcher holds no patterns (and so matches nothing)
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The patterns as written, for logging
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.source.as_str())
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::match_all()
    }
}

fn compile_one(raw: RawPattern) -> Result<CompiledPattern> {
    match raw {
        RawPattern::Regex(regex) => Ok(CompiledPattern {
            source: regex.as_str().to_string(),
            regex,
            negated: false,
        }),
        RawPattern::Glob(source) => {
            let translation = glob::translate(&source);
            let regex = Regex::new(&translation.regex).map_err(|e| Error::InvalidPattern {
                pattern: source.clone(),
                message: e.to_string(),
            })?;
            Ok(CompiledPattern {
                source,
                regex,
                negated: translation.negated,
            })
        }
    }
}

fn raw_from_value(value: &Value) -> Result<RawPattern> {
    match value {
        Value::String(glob) => Ok(RawPattern::Glob(glob.clone())),
        Value::Tagged(tagged) if tagged.tag == "regex" => match &tagged.value {
            Value::String(source) => build_regex(source, false),
            other => Err(invalid_shape(other)),
        },
        Value::Mapping(map) => {
            let source = map
                .get("regex")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid_shape(value))?;
            let ignore_case = match map.get("ignore_case") {
                None => false,
                Some(flag) => flag.as_bool().ok_or_else(|| Error::InvalidPattern {
                    pattern: source.to_string(),
                    message: "ignore_case must be a boolean".to_string(),
                })?,
            };
            if map
                .keys()
                .any(|k| !matches!(k.as_str(), Some("regex" | "ignore_case")))
            {
                return Err(invalid_shape(value));
            }
            build_regex(source, ignore_case)
        }
        other => Err(invalid_shape(other)),
    }
}

fn build_regex(source: &str, ignore_case: bool) -> Result<RawPattern> {
    RegexBuilder::new(source)
        .case_insensitive(ignore_case)
        .build()
        .map(RawPattern::Regex)
        .map_err(|e| Error::InvalidPattern {
            pattern: source.to_string(),
            message: e.to_string(),
        })
}

fn invalid_shape(value: &Value) -> Error {
    let pattern = serde_yaml::to_string(value)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{value:?}"));
    Error::InvalidPattern {
        pattern,
        message: SHAPE_MESSAGE.to_string(),
    }
}
