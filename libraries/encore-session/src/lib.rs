//! Encore Player - Playback Session Engine
//!
//! Owns "what plays next", independent of the UI that renders it and of
//! the provider that streams the bytes.
//!
//! This crate provides:
//! - Ordered play queue with a current-position pointer
//! - Shuffle with exact un-shuffle restoration
//! - Repeat modes (Off, All, One)
//! - Sleep timer (countdown to a single stop signal)
//! - Bounded, deduplicated play history with a top-tracks view
//! - Recent searches (case-insensitive, most recent first)
//! - Favorites (toggle set keyed by track identity)
//! - Radio mode (automatic queue replenishment from related tracks)
//! - Per-key persistence so a new process restores the prior session
//!
//! # Architecture
//!
//! [`SessionEngine`] is the synchronous single-writer core: every
//! mutation takes `&mut self` and runs to completion, which is what keeps
//! the queue and its pointer consistent without locks. It performs no
//! I/O; instead it queues [`SessionEvent`]s and marks persistence keys
//! dirty.
//!
//! [`Session`] wraps the engine for async use: it serializes mutations
//! through a mutex, writes dirty state through a
//! [`PersistenceAdapter`](encore_core::PersistenceAdapter) after each
//! mutation, broadcasts events, drives the sleep-timer tick, and runs
//! radio fetches as detached tasks whose results are discarded when the
//! current track has changed in the meantime.
//!
//! # Example
//!
//! ```rust
//! use encore_core::{Track, TrackSource};
//! use encore_session::{SessionConfig, SessionEngine};
//!
//! let mut engine = SessionEngine::new(SessionConfig::default());
//!
//! let track = Track::new(TrackSource::YouTube, "abc123", "My Song", "Some Artist");
//! engine.play_now(track);
//!
//! assert_eq!(engine.queue().len(), 1);
//! assert_eq!(engine.current_index(), Some(0));
//! ```

#![forbid(unsafe_code)]

mod engine;
mod error;
mod events;
mod history;
mod modes;
mod persist;
mod queue;
mod radio;
mod searches;
mod service;
mod sleep;
pub mod types;

// Public exports
pub use engine::SessionEngine;
pub use error::{Result, SessionError};
pub use events::SessionEvent;
pub use history::HistoryLog;
pub use persist::StateKey;
pub use queue::TrackQueue;
pub use searches::RecentSearches;
pub use service::Session;
pub use sleep::{SleepTick, SleepTimer};
pub use types::{PlaybackState, RepeatMode, SessionConfig, SessionSnapshot};
