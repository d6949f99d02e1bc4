#![doc = "kb-deploy-core: core logic library for kb-deploy."]

//! This crate contains the deployment glue behaviour: reading Terraform outputs for an
//! environment, rendering the front-end build settings, uploading documents to the
//! knowledge-base bucket and driving an ingestion job to a terminal state.
//!
//! Cloud clients live in the `kb-deploy` CLI crate; everything here talks to the outside
//! world through the traits in [`contract`].

pub mod config;
pub mod contract;
pub mod error;
pub mod frontend_env;
pub mod ingestion;
pub mod outputs;
pub mod pipeline;
pub mod upload;

pub use error::{DeployError, Result};
