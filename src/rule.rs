//! The parsed schema: a recursive sum type whose leaves are booleans and
//! whose inner nodes carry at most one occurrence of each dirschema keyword.
//! See spec §3/§4.4.

use std::fmt;

use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The four states a path's existence/kind can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeEnum {
    /// The path must not exist (neither file nor directory).
    Missing,
    /// The path must be a file.
    File,
    /// The path must be a directory.
    Dir,
    /// The path must exist, regardless of kind.
    Any,
}

impl TypeEnum {
    pub fn is_satisfied(self, is_file: bool, is_dir: bool) -> bool {
        match self {
            TypeEnum::Missing => !(is_file || is_dir),
            TypeEnum::Any => is_file || is_dir,
            TypeEnum::Dir => is_dir,
            TypeEnum::File => is_file,
        }
    }
}

impl<'de> Deserialize<'de> for TypeEnum {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TypeEnumVisitor;

        impl Visitor<'_> for TypeEnumVisitor {
            type Value = TypeEnum;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a boolean, or the string \"file\"/\"dir\"")
            }

            fn visit_bool<E>(self, v: bool) -> Result<TypeEnum, E> {
                Ok(if v { TypeEnum::Any } else { TypeEnum::Missing })
            }

            fn visit_str<E>(self, v: &str) -> Result<TypeEnum, E>
            where
                E: de::Error,
            {
                match v {
                    "file" => Ok(TypeEnum::File),
                    "dir" => Ok(TypeEnum::Dir),
                    other => Err(E::custom(format!(
                        "invalid type literal '{other}' (expected true/false/\"file\"/\"dir\")"
                    ))),
                }
            }
        }

        deserializer.deserialize_any(TypeEnumVisitor)
    }
}

/// A compiled regex, parsed eagerly so a malformed pattern is a schema error
/// at load time rather than at evaluation time.
#[derive(Debug, Clone)]
pub struct MatchPattern(pub Regex);

impl<'de> Deserialize<'de> for MatchPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Regex::new(&s)
            .map(MatchPattern)
            .map_err(|e| de::Error::custom(format!("invalid regex '{s}': {e}")))
    }
}

/// Either an embedded JSON-Schema-like document, or a string (a plugin
/// pseudo-URI `v#NAME://ARGS`, or a URI to a remote/local schema).
#[derive(Debug, Clone)]
pub enum ValidatorRef {
    Schema(serde_json::Value),
    Ref(String),
}

impl<'de> Deserialize<'de> for ValidatorRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        match v {
            serde_json::Value::String(s) => Ok(ValidatorRef::Ref(s)),
            other => {
                jsonschema::meta::validate(&other)
                    .map_err(|e| de::Error::custom(format!("invalid JSON Schema document: {e}")))?;
                Ok(ValidatorRef::Schema(other))
            }
        }
    }
}

/// A dirschema rule node: either a trivial boolean, or a [`Rule`] carrying a
/// subset of the keywords documented on that type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DSRule {
    Bool(bool),
    Node(Box<Rule>),
}

impl DSRule {
    pub fn trivial() -> DSRule {
        DSRule::Node(Box::new(Rule::default()))
    }
}

impl Default for DSRule {
    fn default() -> Self {
        DSRule::trivial()
    }
}

/// A dirschema rule is a conjunction of a subset of distinct
/// constraints/keywords. All fields are optional; an unknown key in the
/// source document is a parse-time schema error.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    #[serde(rename = "type", default)]
    pub type_: Option<TypeEnum>,

    #[serde(default)]
    pub valid: Option<ValidatorRef>,

    #[serde(rename = "validMeta", default)]
    pub valid_meta: Option<ValidatorRef>,

    #[serde(rename = "allOf", default)]
    pub all_of: Vec<DSRule>,

    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<DSRule>,

    #[serde(rename = "oneOf", default)]
    pub one_of: Vec<DSRule>,

    #[serde(rename = "not", default)]
    pub not_: Option<Box<DSRule>>,

    #[serde(rename = "if", default)]
    pub if_: Option<Box<DSRule>>,

    #[serde(default)]
    pub then: Option<Box<DSRule>>,

    #[serde(rename = "else", default)]
    pub else_: Option<Box<DSRule>>,

    #[serde(rename = "match", default)]
    pub match_: Option<MatchPattern>,

    #[serde(rename = "matchStart", default)]
    pub match_start: Option<i64>,

    #[serde(rename = "matchStop", default)]
    pub match_stop: Option<i64>,

    #[serde(default)]
    pub rewrite: Option<String>,

    #[serde(default)]
    pub next: Option<Box<DSRule>>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub details: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            type_: None,
            valid: None,
            valid_meta: None,
            all_of: Vec::new(),
            any_of: Vec::new(),
            one_of: Vec::new(),
            not_: None,
            if_: None,
            then: None,
            else_: None,
            match_: None,
            match_start: None,
            match_stop: None,
            rewrite: None,
            next: None,
            description: None,
            details: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_enum_satisfaction() {
        assert!(TypeEnum::Missing.is_satisfied(false, false));
        assert!(TypeEnum::File.is_satisfied(true, false));
        assert!(TypeEnum::Dir.is_satisfied(false, true));
        assert!(TypeEnum::Any.is_satisfied(true, false));
        assert!(TypeEnum::Any.is_satisfied(false, true));

        assert!(!TypeEnum::Missing.is_satisfied(true, false));
        assert!(!TypeEnum::Missing.is_satisfied(false, true));
        assert!(!TypeEnum::File.is_satisfied(false, true));
        assert!(!TypeEnum::Dir.is_satisfied(true, false));
        assert!(!TypeEnum::Any.is_satisfied(false, false));
    }

    #[test]
    fn trivial_bool_rules_parse() {
        let t: DSRule = serde_json::from_str("true").unwrap();
        let f: DSRule = serde_json::from_str("false").unwrap();
        assert!(matches!(t, DSRule::Bool(true)));
        assert!(matches!(f, DSRule::Bool(false)));
    }

    #[test]
    fn unknown_keyword_is_rejected() {
        let res: Result<DSRule, _> = serde_json::from_str(r#"{"tyype": "file"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_object_is_trivial_rule() {
        let r: DSRule = serde_json::from_str("{}").unwrap();
        match r {
            DSRule::Node(n) => assert!(n.type_.is_none() && n.all_of.is_empty()),
            _ => panic!("expected a node"),
        }
    }
}
