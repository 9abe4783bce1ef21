//! Shared test harness modules for the shelfload CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::ingest::{
    IngestConfig, IngestOutcome, config_from_layers_for_test, resolve_ingest_config, run_ingest,
};

mod helpers;
mod unit;
