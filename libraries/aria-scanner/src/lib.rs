//! Aria Scanner
//!
//! Media library scan pipeline: file discovery, change detection, metadata
//! extraction, entity resolution and post-scan maintenance.
//!
//! # Example
//!
//! ```rust,no_run
//! use aria_metadata::LoftyParser;
//! use aria_scanner::{ScanOptions, ScanOrchestrator};
//! use aria_storage::{create_pool, migrations, Session};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://aria.db").await?;
//! let mut session = Session::new(pool);
//! migrations::migrate(&mut session).await?;
//!
//! let mut orchestrator = ScanOrchestrator::new(session, Arc::new(LoftyParser::new()));
//! let stats = orchestrator.scan(ScanOptions::default()).await?;
//! println!("added {} tracks", stats.added);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod cluster_indexer;
mod error;
mod orchestrator;
mod resolver;
mod steps;

pub mod scanners;

pub use error::{Result, ScanError};
pub use orchestrator::{ScanOptions, ScanOrchestrator, ScanStats};
