//! Component identifiers
//!
//! Textual form: `[scope/]name[@version]`, for example `org.widgets/button@1.2.0`.
//! When the path has more than one `/`-separated segment the first one is the
//! scope and the remainder is the name. Every segment is restricted to
//! `[A-Za-z0-9._-]`, so the textual and structured forms convert losslessly.

use capsule_errors::IdentifierError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scope directory name used on disk for unscoped components
pub const UNSCOPED_DIR: &str = "_";

/// Version directory name used on disk for unversioned components
pub const UNVERSIONED_DIR: &str = "latest";

/// Reference to a component in a repository
///
/// Every constructor validates, so any value renders as text that parses back
/// to an equal id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId {
    scope: Option<String>,
    name: String,
    version: Option<Version>,
}

impl ComponentId {
    /// Create an unscoped, unversioned id
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Empty` for an empty name and
    /// `IdentifierError::Malformed` if `name` is not a single legal segment.
    /// An unscoped name with a `/` would read back as scoped.
    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        Self::from_parts(None, name.into(), None)
    }

    /// Set the scope
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Malformed` if `scope` is not a single legal
    /// segment.
    pub fn with_scope(self, scope: impl Into<String>) -> Result<Self, IdentifierError> {
        Self::from_parts(Some(scope.into()), self.name, self.version)
    }

    /// Set the version
    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Build an id from its structured parts
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Malformed` if the scope is not one legal
    /// segment, the name has empty or illegal segments, or the name has
    /// several segments but no scope.
    pub fn from_parts(
        scope: Option<String>,
        name: String,
        version: Option<Version>,
    ) -> Result<Self, IdentifierError> {
        let rendered = match &scope {
            Some(scope) => format!("{scope}/{name}"),
            None => name.clone(),
        };
        if name.is_empty() && scope.is_none() {
            return Err(IdentifierError::Empty);
        }
        if let Some(scope) = &scope {
            if scope.contains('/') {
                return Err(malformed(&rendered, "scope must be a single segment"));
            }
            validate_segment(&rendered, scope)?;
        } else if name.contains('/') {
            return Err(malformed(&rendered, "a multi-segment name needs a scope"));
        }
        for segment in name.split('/') {
            validate_segment(&rendered, segment)?;
        }
        Ok(Self {
            scope,
            name,
            version,
        })
    }

    /// Parse the textual form
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError` if the text is empty, has empty or illegal
    /// segments, more than one `@`, or a version that is not valid semver.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        if input.is_empty() {
            return Err(IdentifierError::Empty);
        }

        let (path, version) = match input.split_once('@') {
            Some((_, version)) if version.contains('@') => {
                return Err(malformed(input, "more than one `@`"));
            }
            Some((_, "")) => return Err(malformed(input, "empty version after `@`")),
            Some((path, version)) => {
                let version =
                    Version::parse(version).map_err(|e| IdentifierError::InvalidVersion {
                        input: input.to_string(),
                        message: e.to_string(),
                    })?;
                (path, Some(version))
            }
            None => (input, None),
        };

        let segments: Vec<&str> = path.split('/').collect();
        for segment in &segments {
            validate_segment(input, segment)?;
        }

        let (scope, name) = match segments.split_first() {
            Some((scope, rest)) if !rest.is_empty() => (Some((*scope).to_string()), rest.join("/")),
            _ => (None, path.to_string()),
        };

        Ok(Self {
            scope,
            name,
            version,
        })
    }

    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// The id without its version, e.g. `org.widgets/button`
    #[must_use]
    pub fn without_version(&self) -> Self {
        Self {
            scope: self.scope.clone(),
            name: self.name.clone(),
            version: None,
        }
    }

    /// Whether `other` names the same component, ignoring the version when
    /// this id does not pin one
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.scope == other.scope
            && self.name == other.name
            && self.version.as_ref().is_none_or(|v| other.version.as_ref() == Some(v))
    }

    /// Whether `other` names the same component, whatever either version is
    #[must_use]
    pub fn same_component(&self, other: &Self) -> bool {
        self.scope == other.scope && self.name == other.name
    }

    /// Directory segments used when laying this component out on disk
    #[must_use]
    pub fn path_segments(&self) -> [String; 3] {
        [
            self.scope
                .clone()
                .unwrap_or_else(|| UNSCOPED_DIR.to_string()),
            self.name.clone(),
            self.version
                .as_ref()
                .map_or_else(|| UNVERSIONED_DIR.to_string(), ToString::to_string),
        ]
    }

    /// Flat package-style name, e.g. `org.widgets.button`
    #[must_use]
    pub fn package_name(&self) -> String {
        let name = self.name.replace('/', ".");
        match &self.scope {
            Some(scope) => format!("{scope}.{name}"),
            None => name,
        }
    }
}

fn malformed(input: &str, reason: &str) -> IdentifierError {
    IdentifierError::Malformed {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_segment(input: &str, segment: &str) -> Result<(), IdentifierError> {
    if segment.is_empty() {
        return Err(malformed(input, "empty path segment"));
    }
    if let Some(c) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(malformed(input, &format!("illegal character `{c}`")));
    }
    if segment == "." || segment == ".." {
        return Err(malformed(input, "relative path segment"));
    }
    Ok(())
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scope) = &self.scope {
            write!(f, "{scope}/")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

impl FromStr for ComponentId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ComponentId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_scoped_versioned() {
        let id = ComponentId::parse("org.widgets/button@1.2.0").unwrap();
        assert_eq!(id.scope(), Some("org.widgets"));
        assert_eq!(id.name(), "button");
        assert_eq!(id.version(), Some(&Version::new(1, 2, 0)));
        assert_eq!(id.to_string(), "org.widgets/button@1.2.0");
    }

    #[test]
    fn test_parse_bare_name() {
        let id: ComponentId = "button".parse().unwrap();
        assert_eq!(id, ComponentId::new("button").unwrap());
    }

    #[test]
    fn test_parse_nested_name() {
        let id = ComponentId::parse("org/ui/forms/input").unwrap();
        assert_eq!(id.scope(), Some("org"));
        assert_eq!(id.name(), "ui/forms/input");
        assert_eq!(id.package_name(), "org.ui.forms.input");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(ComponentId::parse(""), Err(IdentifierError::Empty));
        for bad in [
            "org//button",
            "/button",
            "button/",
            "org/but ton",
            "button@",
            "button@1.0.0@2.0.0",
            "org/../button",
            "button@latest",
        ] {
            assert!(ComponentId::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_matches_ignores_unpinned_version() {
        let loose = ComponentId::parse("org/button").unwrap();
        let pinned = ComponentId::parse("org/button@2.0.0").unwrap();
        assert!(loose.matches(&pinned));
        assert!(!pinned.matches(&loose));
        assert!(!loose.matches(&ComponentId::parse("other/button@2.0.0").unwrap()));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let id = ComponentId::parse("org/button@1.0.0").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"org/button@1.0.0\"");
        let back: ComponentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ComponentId>("\"org//x\"").is_err());
    }

    #[test]
    fn test_structured_constructors_validate() {
        assert!(matches!(
            ComponentId::new("a/b"),
            Err(IdentifierError::Malformed { .. })
        ));
        assert!(ComponentId::new("has space").is_err());
        assert_eq!(ComponentId::new(""), Err(IdentifierError::Empty));
        assert!(ComponentId::new("button").unwrap().with_scope("a/b").is_err());
        assert!(ComponentId::new("button").unwrap().with_scope("..").is_err());

        let scoped = ComponentId::from_parts(Some("org".into()), "ui/input".into(), None).unwrap();
        assert_eq!(scoped.to_string(), "org/ui/input");
        assert_eq!(ComponentId::parse(&scoped.to_string()).unwrap(), scoped);
    }

    fn segment() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-][A-Za-z0-9._-]{0,8}"
    }

    proptest! {
        #[test]
        fn text_and_structured_forms_agree(
            scope in proptest::option::of(segment()),
            name in proptest::collection::vec(segment(), 1..3),
            version in proptest::option::of((0u64..50, 0u64..50, 0u64..50)),
        ) {
            let unscoped_multi = scope.is_none() && name.len() > 1;
            let built = ComponentId::from_parts(
                scope,
                name.join("/"),
                version.map(|(a, b, c)| Version::new(a, b, c)),
            );

            if unscoped_multi {
                prop_assert!(built.is_err());
            } else {
                let id = built.unwrap();
                let parsed = ComponentId::parse(&id.to_string()).unwrap();
                prop_assert_eq!(&parsed, &id);
                let json = serde_json::to_string(&id).unwrap();
                prop_assert_eq!(serde_json::from_str::<ComponentId>(&json).unwrap(), id);
            }
        }
    }
}
