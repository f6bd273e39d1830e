//! Storage core of a small praise/kudos timeline.
//!
//! Posts, users and the logged-in flag live in a key-value store behind
//! [`storage::KeyValueStore`]. [`Kudos`] ties the components together and
//! serializes every load-modify-save sequence.

pub mod auth;
pub mod database;
pub mod error;
pub mod limits;
pub mod normalize;
pub mod post;
pub mod storage;
pub mod user;
pub mod utils;

use std::sync::{Mutex, MutexGuard, PoisonError};

use auth::AuthFlag;
use limits::Limits;
use post::{PostStore, Timeline};
use storage::KeyValueStore;
use user::UserRegistry;

pub struct Kudos<S> {
    storage: S,
    limits: Limits,
    writer: Mutex<()>,
}

impl<S: KeyValueStore> Kudos<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            limits: Limits::default(),
            writer: Mutex::new(()),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn posts(&self) -> PostStore<'_, S> {
        PostStore::new(&self.storage, &self.limits)
    }

    pub fn timeline(&self) -> Timeline<'_, S> {
        Timeline::new(self)
    }

    pub fn users(&self) -> UserRegistry<'_, S> {
        UserRegistry::new(self)
    }

    pub fn auth(&self) -> AuthFlag<'_, S> {
        AuthFlag::new(&self.storage)
    }

    /// Held across every load-modify-save of the post collection.
    pub(crate) fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
