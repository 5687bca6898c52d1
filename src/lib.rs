//! Wine tasting journal: AI label identification and research, with a
//! locally persisted, newest-first record collection.
//!
//! # Examples
//!
//! In-memory usage with [`persist::journal::Journal`]:
//! ```
//! use sommelier::{
//!     core::normalize::{normalize, NoteOrigin},
//!     persist::{journal::Journal, memory::MemoryBackend},
//!     types::SortBy,
//!     wine::WineAnalysis,
//! };
//!
//! let mut journal = Journal::open(Box::new(MemoryBackend::new())).expect("open");
//! let note = normalize(
//!     WineAnalysis { name: Some("Cuvée Test".to_string()), ..WineAnalysis::default() },
//!     NoteOrigin::Search { sources: vec![] },
//!     1_700_000_000_000,
//! );
//! journal.insert(note).expect("insert");
//! assert_eq!(journal.sorted_view(SortBy::Rating)[0].winery, "Unknown Winery");
//! ```
//!
//! Runtime usage with the SQLite backend:
//! ```no_run
//! use sommelier::{
//!     config::{Overrides, Settings},
//!     persist::{journal::Journal, sqlite::SqliteBackend},
//!     runtime::handle::{spawn_journal, RuntimeConfig},
//!     synth::client::WineSynthesizer,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let settings = Settings::load(&Overrides::default(), None).expect("settings");
//! let backend = SqliteBackend::open(&settings.database).expect("open sqlite");
//! let journal = Journal::open(Box::new(backend)).expect("load journal");
//! let synth = WineSynthesizer::from_settings(&settings).expect("client");
//! let handle = spawn_journal(journal, synth, RuntimeConfig::default());
//! let note = handle.add_from_query("Ridge Monte Bello 2019").await.expect("research");
//! println!("{} ({})", note.name, note.vintage);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Settings from command line, environment, and config file.
pub mod config;
/// Core in-memory store, sort order, and normalization.
pub mod core;
/// Reversible mutation records.
pub mod op;
/// Storage backends and the persisted journal.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// AI synthesis client.
pub mod synth;
/// Shared primitive types and enums.
pub mod types;
/// Wine domain records and patches.
pub mod wine;
