//! Canonical publish items and the resolver that builds them from configured targets.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::{ShorthandTarget, TargetDefaults, TargetOverlay, TargetSpec};
use crate::contract::ContentLoader;
use crate::error::{PublishError, Result};

/// The kinds of record content can be published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublishType {
    ArticleScript,
    ArticleStyle,
    ComponentGlobal,
    ComponentSite,
    SiteScript,
    SiteStyle,
}

impl PublishType {
    pub const ALL: [PublishType; 6] = [
        PublishType::ArticleScript,
        PublishType::ArticleStyle,
        PublishType::ComponentGlobal,
        PublishType::ComponentSite,
        PublishType::SiteScript,
        PublishType::SiteStyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PublishType::ArticleScript => "article-script",
            PublishType::ArticleStyle => "article-style",
            PublishType::ComponentGlobal => "component-global",
            PublishType::ComponentSite => "component-site",
            PublishType::SiteScript => "site-script",
            PublishType::SiteStyle => "site-style",
        }
    }

    /// Style types merge into a shared stylesheet instead of overwriting a field.
    pub fn is_style(&self) -> bool {
        matches!(self, PublishType::ArticleStyle | PublishType::SiteStyle)
    }
}

impl fmt::Display for PublishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishType {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        PublishType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PublishError::configuration(format!("'{s}' is not a valid type.")))
    }
}

/// A fully resolved publish request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishItem {
    pub hostname: String,
    pub domain: String,
    pub source: String,
    /// Content of `source`, loaded during resolution.
    pub source_data: String,
    pub target: String,
    /// Owning article for article-scoped sub-records.
    pub target_article_id: Option<String>,
    /// The declared type, checked again by the dispatcher.
    pub kind: String,
}

impl PublishItem {
    pub fn publish_type(&self) -> Result<PublishType> {
        self.kind.parse()
    }
}

/// Fields gathered from one target shape before validation.
#[derive(Default)]
struct Draft {
    domain: Option<String>,
    hostname: Option<String>,
    source: Option<String>,
    target: Option<String>,
    kind: Option<String>,
    target_article_id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Turns configured targets into [`PublishItem`]s, loading each source once.
pub struct ItemResolver<'a> {
    loader: &'a dyn ContentLoader,
}

impl<'a> ItemResolver<'a> {
    pub fn new(loader: &'a dyn ContentLoader) -> Self {
        Self { loader }
    }

    pub fn resolve(&self, spec: &TargetSpec, defaults: &TargetDefaults) -> Result<PublishItem> {
        match spec {
            TargetSpec::Explicit(overlay) => self.resolve_overlay(overlay, defaults),
            TargetSpec::Shorthand(shorthand) => {
                self.resolve_shorthand(shorthand, defaults.hostname.as_deref())
            }
        }
    }

    /// Object form: the overlay's fields win over the shared defaults.
    pub fn resolve_overlay(
        &self,
        overlay: &TargetOverlay,
        defaults: &TargetDefaults,
    ) -> Result<PublishItem> {
        self.finish(Draft {
            domain: non_empty(overlay.domain.clone()).or_else(|| defaults.domain.clone()),
            hostname: non_empty(overlay.hostname.clone()).or_else(|| defaults.hostname.clone()),
            source: overlay.source.clone(),
            target: overlay.target.clone(),
            kind: overlay.kind.clone(),
            target_article_id: overlay.target_article_id.clone(),
        })
    }

    /// Tuple form. Article scripts address their record as `articleName/target`.
    pub fn resolve_shorthand(
        &self,
        shorthand: &ShorthandTarget,
        fallback_hostname: Option<&str>,
    ) -> Result<PublishItem> {
        let (target_article_id, target) = if shorthand.kind == PublishType::ArticleScript.as_str()
        {
            match shorthand.target.find('/') {
                Some(idx) if idx > 0 => (
                    Some(shorthand.target[..idx].to_string()),
                    shorthand.target[idx + 1..].to_string(),
                ),
                _ => {
                    return Err(PublishError::configuration(format!(
                        "article scripts require 'articleName/target' as the shorthand target, got '{}'",
                        shorthand.target
                    )))
                }
            }
        } else {
            (None, shorthand.target.clone())
        };

        self.finish(Draft {
            hostname: non_empty(shorthand.hostname.clone())
                .or_else(|| fallback_hostname.map(str::to_string)),
            source: Some(shorthand.source.clone()),
            target: Some(target),
            kind: Some(shorthand.kind.clone()),
            target_article_id,
            ..Default::default()
        })
    }

    fn finish(&self, draft: Draft) -> Result<PublishItem> {
        let target = non_empty(draft.target)
            .ok_or_else(|| PublishError::configuration("target is required"))?;
        let source = non_empty(draft.source).ok_or_else(|| {
            PublishError::configuration(format!("source is required for target '{target}'"))
        })?;
        let hostname = non_empty(draft.hostname).ok_or_else(|| {
            PublishError::configuration(format!("hostname is required for target '{target}'"))
        })?;
        let kind: PublishType = non_empty(draft.kind)
            .ok_or_else(|| {
                PublishError::configuration(format!("type is required for target '{target}'"))
            })?
            .parse()?;

        let target_article_id = non_empty(draft.target_article_id);
        if kind == PublishType::ArticleScript && target_article_id.is_none() {
            return Err(PublishError::configuration(format!(
                "article script '{target}' requires a targetArticleId"
            )));
        }

        let domain = non_empty(draft.domain).unwrap_or_else(|| hostname.clone());

        let source_data = self
            .loader
            .load(&source)
            .map_err(|error| PublishError::Load {
                path: source.clone(),
                error,
            })?;
        debug!(source = %source, bytes = source_data.len(), "Loaded source content");

        Ok(PublishItem {
            hostname,
            domain,
            source,
            source_data,
            target,
            target_article_id,
            kind: kind.as_str().to_string(),
        })
    }
}
