#![doc = "appframe-publish-core: publish orchestration engine for appframe-publish."]

//! This crate contains the logic for publishing local scripts and stylesheets into
//! appframe records: target resolution, dispatch to per-type handlers, batch accounting
//! and the stylesheet block merge.
//! Transport, credentials and file access are collaborators defined in [`contract`].
//!
//! # Usage
//! Implement the [`contract`] traits for a backend, build a [`dispatch::Dispatcher`] and
//! hand both to a [`session::PublishSession`].

pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod item;
pub mod merge;
pub mod session;
