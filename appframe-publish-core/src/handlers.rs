//! Default publish handlers backed by a [`DataBackend`].
//!
//! Script and component types overwrite a single field of their record. Style types merge
//! the source into a shared stylesheet (see [`crate::merge`]) and write the whole sheet back.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::contract::{DataBackend, PublishHandler, RecordDescriptor, StyledDocument};
use crate::error::{PublishError, Result};
use crate::item::{PublishItem, PublishType};
use crate::merge;

/// Where a publish type's content lives in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub article_id: &'static str,
    pub data_object_id: &'static str,
    pub field_name: &'static str,
    /// Article used to create a record that does not exist yet. `None` means never create.
    pub create_article_id: Option<&'static str>,
}

impl Destination {
    pub fn for_type(kind: PublishType) -> Self {
        match kind {
            PublishType::ArticleScript => Destination {
                article_id: "appdesigner-script",
                data_object_id: "dsScripts",
                field_name: "Script",
                create_article_id: Some("appdesigner"),
            },
            PublishType::ArticleStyle => Destination {
                article_id: "appdesigner-css",
                data_object_id: "dsArticle",
                field_name: "CSS",
                create_article_id: None,
            },
            PublishType::ComponentGlobal => Destination {
                article_id: "appdesigner-components",
                data_object_id: "dsGlobalComponents",
                field_name: "Code",
                create_article_id: None,
            },
            PublishType::ComponentSite => Destination {
                article_id: "appdesigner-components",
                data_object_id: "dsSiteComponents",
                field_name: "Code",
                create_article_id: None,
            },
            PublishType::SiteScript => Destination {
                article_id: "appdesigner-site",
                data_object_id: "dsSiteScripts",
                field_name: "Script",
                create_article_id: Some("appdesigner-site"),
            },
            PublishType::SiteStyle => Destination {
                article_id: "appdesigner-site",
                data_object_id: "dsSiteStyles",
                field_name: "CSS",
                create_article_id: None,
            },
        }
    }
}

/// Field/value pairs identifying the item's record for a publish type.
fn criteria(kind: PublishType, item: &PublishItem) -> Result<Vec<(String, String)>> {
    let host = ("HostName".to_string(), item.hostname.clone());
    Ok(match kind {
        PublishType::ArticleScript => {
            let article_id = item.target_article_id.clone().ok_or_else(|| {
                PublishError::configuration(format!(
                    "article script '{}' has no targetArticleId",
                    item.target
                ))
            })?;
            vec![
                host,
                ("ArticleID".to_string(), article_id),
                ("ID".to_string(), item.target.clone()),
            ]
        }
        PublishType::ArticleStyle => vec![host, ("ArticleID".to_string(), item.target.clone())],
        PublishType::ComponentGlobal => vec![("Name".to_string(), item.target.clone())],
        PublishType::ComponentSite => vec![host, ("Name".to_string(), item.target.clone())],
        PublishType::SiteScript | PublishType::SiteStyle => {
            vec![host, ("ID".to_string(), item.target.clone())]
        }
    })
}

fn descriptor(
    item: &PublishItem,
    article_id: &str,
    destination: &Destination,
    criteria: Vec<(String, String)>,
) -> RecordDescriptor {
    RecordDescriptor {
        domain: item.domain.clone(),
        hostname: item.hostname.clone(),
        article_id: article_id.to_string(),
        data_object_id: destination.data_object_id.to_string(),
        criteria,
    }
}

fn report(kind: PublishType, item: &PublishItem, outcome: Result<bool>) -> bool {
    match outcome {
        Ok(true) => {
            info!(kind = %kind, record = %item.target, hostname = %item.hostname, "Published");
            true
        }
        Ok(false) => {
            error!(
                kind = %kind,
                record = %item.target,
                hostname = %item.hostname,
                "Backend did not apply the write"
            );
            false
        }
        Err(e) => {
            error!(
                kind = %kind,
                record = %item.target,
                hostname = %item.hostname,
                error = %e,
                "Publish failed"
            );
            false
        }
    }
}

/// Writes the source content into one field of an existing record, creating the record
/// when the destination allows it.
pub struct FieldHandler {
    backend: Arc<dyn DataBackend>,
    kind: PublishType,
    destination: Destination,
}

impl FieldHandler {
    pub fn new(backend: Arc<dyn DataBackend>, kind: PublishType) -> Self {
        Self {
            backend,
            kind,
            destination: Destination::for_type(kind),
        }
    }

    async fn try_publish(&self, item: &PublishItem) -> Result<bool> {
        let criteria = criteria(self.kind, item)?;
        let lookup = descriptor(
            item,
            self.destination.article_id,
            &self.destination,
            criteria.clone(),
        );

        if let Some(record) = self.backend.fetch_record_if_exists(&lookup).await? {
            info!(record = %item.target, filter = %lookup.filter(), "Updating existing record");
            return Ok(self
                .backend
                .write_field(
                    &lookup,
                    self.destination.field_name,
                    &item.source_data,
                    &record.primary_key,
                )
                .await?);
        }

        let Some(create_article_id) = self.destination.create_article_id else {
            return Err(PublishError::NotFound {
                what: format!("{} '{}'", self.kind, item.target),
                hostname: item.hostname.clone(),
            });
        };

        info!(record = %item.target, "Record not found, creating it");
        let mut fields: BTreeMap<String, String> = criteria.into_iter().collect();
        fields.insert(self.destination.field_name.to_string(), item.source_data.clone());
        let create = descriptor(item, create_article_id, &self.destination, Vec::new());
        Ok(self.backend.insert_record(&create, fields).await?)
    }
}

#[async_trait]
impl PublishHandler for FieldHandler {
    async fn publish(&self, item: &PublishItem) -> bool {
        let outcome = self.try_publish(item).await;
        report(self.kind, item, outcome)
    }
}

/// Merges the source into the target's stylesheet as a marker block.
pub struct StylesheetHandler {
    backend: Arc<dyn DataBackend>,
    kind: PublishType,
    destination: Destination,
}

impl StylesheetHandler {
    pub fn new(backend: Arc<dyn DataBackend>, kind: PublishType) -> Self {
        Self {
            backend,
            kind,
            destination: Destination::for_type(kind),
        }
    }

    async fn try_publish(&self, item: &PublishItem) -> Result<bool> {
        let lookup = descriptor(
            item,
            self.destination.article_id,
            &self.destination,
            criteria(self.kind, item)?,
        );

        let record = self
            .backend
            .fetch_record_if_exists(&lookup)
            .await?
            .ok_or_else(|| PublishError::NotFound {
                what: format!("{} '{}'", self.kind, item.target),
                hostname: item.hostname.clone(),
            })?;

        let document = StyledDocument::from_record(&record, self.destination.field_name);
        if merge::has_block(&document.body, &item.source) {
            info!(source = %item.source, record = %item.target, "Updating styles");
        } else {
            info!(source = %item.source, record = %item.target, "Inserting styles");
        }
        let body = merge::merge_block(&document.body, &item.source, &item.source_data)?;

        Ok(self
            .backend
            .write_field(
                &lookup,
                self.destination.field_name,
                &body,
                &document.primary_key,
            )
            .await?)
    }
}

#[async_trait]
impl PublishHandler for StylesheetHandler {
    async fn publish(&self, item: &PublishItem) -> bool {
        let outcome = self.try_publish(item).await;
        report(self.kind, item, outcome)
    }
}

/// Builds the default handler for a publish type.
pub fn default_handler(
    backend: Arc<dyn DataBackend>,
    kind: PublishType,
) -> Arc<dyn PublishHandler> {
    if kind.is_style() {
        Arc::new(StylesheetHandler::new(backend, kind))
    } else {
        Arc::new(FieldHandler::new(backend, kind))
    }
}
