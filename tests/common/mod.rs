//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across different test categories

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use sil3ntbot::commands::music::utils::music_manager::MusicManager;
use std::sync::Arc;

use mocks::FakeBackend;

/// A manager over a fresh in-memory voice backend
pub fn manager() -> Arc<MusicManager<FakeBackend>> {
    Arc::new(MusicManager::new(FakeBackend::new()))
}

/// A manager whose backend is already in `fixtures::voice_channel()`
/// of `fixtures::guild()`
pub fn connected_manager() -> Arc<MusicManager<FakeBackend>> {
    let music = manager();
    music
        .backend()
        .join_now(fixtures::guild(), fixtures::voice_channel());
    music
}
