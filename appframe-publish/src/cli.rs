//! This module implements the CLI interface for appframe-publish: command parsing,
//! flag overrides and the async entrypoint used by `main()` and the integration tests.
//!
//! All publish logic (target resolution, dispatch, stylesheet merging) lives in the
//! [`appframe-publish-core`] crate. This module wires the core engine to the local record
//! store and the file-system content loader.
//!
//! ## How To Use
//! - For command-line users: run `appframe-publish publish --help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`appframe-publish-core`]: ../../appframe-publish-core/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use appframe_publish_core::dispatch::Dispatcher;
use appframe_publish_core::session::PublishSession;
use clap::{Parser, Subcommand};

use crate::load_config::{load_config, ConfigOverrides};
use crate::loader::FsContentLoader;
use crate::store::LocalStore;

/// CLI for appframe-publish: push local scripts and stylesheets into appframe records.
#[derive(Parser)]
#[clap(
    name = "appframe-publish",
    version,
    about = "Publish local scripts, stylesheets and components into appframe hosts"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish the configured targets
    Publish {
        /// Path to a JSON or YAML publish config
        #[clap(long)]
        config: Option<PathBuf>,
        /// Record store to publish into
        #[clap(long, default_value = "appframe-store.json")]
        store: PathBuf,
        #[clap(long)]
        domain: Option<String>,
        #[clap(long)]
        hostname: Option<String>,
        /// Local file to publish
        #[clap(long)]
        source: Option<String>,
        /// Destination record (script id, article id, component name)
        #[clap(long)]
        target: Option<String>,
        /// One of article-script, article-style, component-global, component-site, site-script, site-style
        #[clap(long = "type")]
        kind: Option<String>,
        /// Owning article of an article script
        #[clap(long)]
        article: Option<String>,
        #[clap(long)]
        user: Option<String>,
        #[clap(long)]
        password: Option<String>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish {
            config,
            store,
            domain,
            hostname,
            source,
            target,
            kind,
            article,
            user,
            password,
        } => {
            let overrides = ConfigOverrides {
                domain,
                hostname,
                source,
                target,
                kind,
                article,
                user,
                password,
            };
            let publish_config = load_config(config.as_deref(), overrides)?;
            tracing::info!(command = "publish", store = %store.display(), "Starting publish");

            let store = Arc::new(
                LocalStore::open(&store)
                    .map_err(|e| anyhow::anyhow!(e))
                    .with_context(|| format!("Failed to open record store {}", store.display()))?,
            );
            let base_dir = config
                .as_deref()
                .and_then(|path| path.parent())
                .map(PathBuf::from);
            let loader = Arc::new(FsContentLoader::new(base_dir));
            let session =
                PublishSession::new(store.clone(), loader, Dispatcher::with_backend(store));

            match session.run(&publish_config).await {
                Ok(summary) => {
                    tracing::info!(command = "publish", ?summary, "Publish finished");
                    println!("{summary}");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publish failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
