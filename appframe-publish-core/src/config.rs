//! Publish configuration as read from a config file or assembled from flags.
//!
//! `targets` accepts several shapes. Each element is classified by its own shape when the
//! configuration is deserialized: an array is a [`ShorthandTarget`] and an object is a
//! [`TargetOverlay`]. A bare object in place of the list is the legacy single target.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// The shared defaults every target is merged onto.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDefaults {
    pub domain: Option<String>,
    pub hostname: Option<String>,
}

/// An object-form target. Unset fields fall back to the config-level defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOverlay {
    pub domain: Option<String>,
    pub hostname: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub target_article_id: Option<String>,
}

/// A positional target: `[source, target, type, hostname?]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShorthandTarget {
    pub source: String,
    pub target: String,
    pub kind: String,
    pub hostname: Option<String>,
}

impl TryFrom<Vec<Option<String>>> for ShorthandTarget {
    type Error = String;

    fn try_from(values: Vec<Option<String>>) -> Result<Self, Self::Error> {
        if !(3..=4).contains(&values.len()) {
            return Err(format!(
                "shorthand targets are [source, target, type, hostname?], got {} elements",
                values.len()
            ));
        }
        let mut values = values.into_iter();
        let mut required = |name: &str| {
            values
                .next()
                .flatten()
                .ok_or_else(|| format!("shorthand target is missing its {name}"))
        };
        let source = required("source")?;
        let target = required("target")?;
        let kind = required("type")?;
        let hostname = values.next().flatten();
        Ok(Self {
            source,
            target,
            kind,
            hostname,
        })
    }
}

/// One element of a `targets` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    Explicit(TargetOverlay),
    Shorthand(ShorthandTarget),
}

impl TargetSpec {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Array(elements) => {
                let values: Vec<Option<String>> = serde_json::from_value(Value::Array(elements))
                    .map_err(|e| format!("shorthand target elements must be strings: {e}"))?;
                ShorthandTarget::try_from(values).map(TargetSpec::Shorthand)
            }
            Value::Object(_) => serde_json::from_value(value)
                .map(TargetSpec::Explicit)
                .map_err(|e| format!("invalid target object: {e}")),
            other => Err(format!(
                "a target must be an object or an array, got {other}"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for TargetSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        TargetSpec::from_value(value).map_err(de::Error::custom)
    }
}

/// The `targets` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetsConfig {
    /// An ordered list of targets, each counted in the summary.
    List(Vec<TargetSpec>),
    /// Legacy single-object form. Published, but left out of the summary counts.
    Single(TargetOverlay),
}

impl<'de> Deserialize<'de> for TargetsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(elements) => elements
                .into_iter()
                .map(TargetSpec::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(TargetsConfig::List)
                .map_err(de::Error::custom),
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(TargetsConfig::Single)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "targets must be a list or an object, got {other}"
            ))),
        }
    }
}

/// An empty string counts as unset.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Top-level publish configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishConfig {
    pub domain: Option<String>,
    pub hostname: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub target_article_id: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub targets: Option<TargetsConfig>,
}

impl PublishConfig {
    /// The login domain: `domain`, or `hostname` when unset.
    pub fn login_domain(&self) -> Option<&str> {
        present(&self.domain).or(present(&self.hostname))
    }

    pub fn defaults(&self) -> TargetDefaults {
        TargetDefaults {
            domain: self.login_domain().map(str::to_string),
            hostname: self.hostname.clone(),
        }
    }

    /// The config-level target, present only when `target`, `source` and `type` are all non-empty.
    pub fn primary_target(&self) -> Option<TargetOverlay> {
        match (
            present(&self.target),
            present(&self.source),
            present(&self.kind),
        ) {
            (Some(target), Some(source), Some(kind)) => Some(TargetOverlay {
                domain: self.domain.clone(),
                hostname: self.hostname.clone(),
                source: Some(source.to_string()),
                target: Some(target.to_string()),
                kind: Some(kind.to_string()),
                target_article_id: self.target_article_id.clone(),
            }),
            _ => None,
        }
    }

    pub fn trace_loaded(&self) {
        let (listed, legacy) = match &self.targets {
            Some(TargetsConfig::List(list)) => (list.len(), false),
            Some(TargetsConfig::Single(_)) => (0, true),
            None => (0, false),
        };
        info!(
            hostname = self.hostname.as_deref().unwrap_or("<unset>"),
            primary = self.primary_target().is_some(),
            targets = listed,
            legacy_single = legacy,
            "Loaded PublishConfig"
        );
        debug!(
            user = self.user.as_deref().unwrap_or("<unset>"),
            "PublishConfig credentials user"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_and_shorthand_targets_in_one_list() {
        let config: PublishConfig = serde_json::from_str(
            r#"{
                "hostname": "host1",
                "targets": [
                    {"source": "a.js", "target": "a", "type": "site-script"},
                    ["b.css", "art/b", "article-script"]
                ]
            }"#,
        )
        .unwrap();

        let Some(TargetsConfig::List(list)) = config.targets else {
            panic!("expected a target list");
        };
        assert!(matches!(list[0], TargetSpec::Explicit(_)));
        assert_eq!(
            list[1],
            TargetSpec::Shorthand(ShorthandTarget {
                source: "b.css".into(),
                target: "art/b".into(),
                kind: "article-script".into(),
                hostname: None,
            })
        );
    }

    #[test]
    fn test_yaml_targets_are_classified_per_element() {
        let yaml = r#"
hostname: host1
targets:
  - [theme.css, home, article-style, host2]
  - source: site.js
    target: main
    type: site-script
"#;
        let config: PublishConfig = serde_yaml::from_str(yaml).unwrap();

        let Some(TargetsConfig::List(list)) = config.targets else {
            panic!("expected a target list");
        };
        assert_eq!(list.len(), 2);
        match &list[0] {
            TargetSpec::Shorthand(s) => assert_eq!(s.hostname.as_deref(), Some("host2")),
            other => panic!("expected shorthand, got {other:?}"),
        }
        match &list[1] {
            TargetSpec::Explicit(o) => assert_eq!(o.kind.as_deref(), Some("site-script")),
            other => panic!("expected overlay, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_object_targets_is_legacy_single() {
        let config: PublishConfig =
            serde_json::from_str(r#"{"targets": {"source": "a.js", "target": "a"}}"#).unwrap();
        assert!(matches!(config.targets, Some(TargetsConfig::Single(_))));
    }

    #[test]
    fn test_short_tuple_is_rejected() {
        let result: Result<PublishConfig, _> =
            serde_json::from_str(r#"{"targets": [["a.js", "a"]]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_primary_target_needs_target_source_and_type() {
        let mut config = PublishConfig {
            hostname: Some("host1".into()),
            source: Some("a.js".into()),
            target: Some("a".into()),
            ..Default::default()
        };
        assert!(config.primary_target().is_none());

        config.kind = Some("site-script".into());
        let primary = config.primary_target().unwrap();
        assert_eq!(primary.hostname.as_deref(), Some("host1"));
        assert_eq!(config.defaults().domain.as_deref(), Some("host1"));
    }

    #[test]
    fn test_empty_strings_count_as_unset() {
        let config: PublishConfig = serde_json::from_str(
            r#"{"domain": "", "hostname": "host1", "target": "", "source": "a.js", "type": "site-script"}"#,
        )
        .unwrap();
        assert!(config.primary_target().is_none());
        assert_eq!(config.login_domain(), Some("host1"));
        assert_eq!(config.defaults().domain.as_deref(), Some("host1"));
    }
}
