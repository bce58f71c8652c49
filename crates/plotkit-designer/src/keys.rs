//! Scoped keyboard interception for interactive sessions.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use tracing::debug;

use crate::host::InputService;

/// Keys the filter cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Space,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A raw key event as delivered by the host's message loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub kind: KeyEventKind,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            key,
            kind: KeyEventKind::Down,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// What the host should do with a filtered key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Deliver the event unchanged
    PassThrough,
    /// Swallow the event and send this command string instead
    Replace(String),
}

/// Handle of an installed filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterId(pub u64);

/// Translates a plain key-down of `key` into `command`.
///
/// The same key with Control held passes through so the host's own binding
/// for that combination keeps working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFilter {
    pub key: Key,
    pub command: String,
}

impl KeyFilter {
    pub fn new(key: Key, command: impl Into<String>) -> Self {
        Self {
            key,
            command: command.into(),
        }
    }

    /// Tab sends the rotate command.
    pub fn rotate(command: impl Into<String>) -> Self {
        Self::new(Key::Tab, command)
    }

    pub fn filter(&self, event: &KeyEvent) -> FilterAction {
        if event.kind == KeyEventKind::Down && event.key == self.key && !event.ctrl {
            FilterAction::Replace(self.command.clone())
        } else {
            FilterAction::PassThrough
        }
    }
}

/// Keeps a key filter installed for as long as it lives.
///
/// Dereferences to the input service, so the session drives its prompts
/// through the guard. The filter is removed when the guard drops, on every
/// exit path.
pub struct InterceptGuard<'a> {
    input: &'a mut dyn InputService,
    id: FilterId,
}

impl<'a> InterceptGuard<'a> {
    pub fn install(input: &'a mut dyn InputService, filter: KeyFilter) -> Self {
        let key = filter.key;
        let id = input.install_key_filter(filter);
        debug!(?key, filter = id.0, "key interception installed");
        Self { input, id }
    }

    pub fn id(&self) -> FilterId {
        self.id
    }
}

impl<'a> Deref for InterceptGuard<'a> {
    type Target = dyn InputService + 'a;

    fn deref(&self) -> &Self::Target {
        self.input
    }
}

impl<'a> DerefMut for InterceptGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.input
    }
}

impl Drop for InterceptGuard<'_> {
    fn drop(&mut self) {
        self.input.remove_key_filter(self.id);
        debug!(filter = self.id.0, "key interception removed");
    }
}
