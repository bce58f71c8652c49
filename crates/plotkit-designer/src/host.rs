//! Host application interfaces.
//!
//! The drawing database, the interactive input service and the entities they
//! hand out are owned by the host CAD application. The engine only talks to
//! them through the traits in this module.

use plotkit_core::{Error, Extents3d, Point2D, RawPoint3D, Result, SpaceConverter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::keys::{FilterId, KeyFilter};

/// Outcome class of an interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptStatus {
    /// A value was supplied
    Ok,
    /// The operator pressed Escape or otherwise aborted
    Cancel,
    /// The operator entered one of the prompt's keywords
    Keyword,
    /// Empty response (Enter with no input)
    None,
}

/// Result of an interactive prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptResult<T> {
    pub status: PromptStatus,
    pub value: Option<T>,
    pub keyword: Option<String>,
}

impl<T> PromptResult<T> {
    pub fn ok(value: T) -> Self {
        Self {
            status: PromptStatus::Ok,
            value: Some(value),
            keyword: None,
        }
    }

    pub fn cancel() -> Self {
        Self {
            status: PromptStatus::Cancel,
            value: None,
            keyword: None,
        }
    }

    pub fn none() -> Self {
        Self {
            status: PromptStatus::None,
            value: None,
            keyword: None,
        }
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            status: PromptStatus::Keyword,
            value: None,
            keyword: Some(keyword.into()),
        }
    }

    /// The supplied value, or `UserCancelled` for every other outcome.
    pub fn into_value(self) -> Result<T> {
        match (self.status, self.value) {
            (PromptStatus::Ok, Some(v)) => Ok(v),
            _ => Err(Error::UserCancelled),
        }
    }
}

/// Options of a point or corner prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPromptOptions {
    pub message: String,
    /// Accept an empty response
    pub allow_none: bool,
    /// Rubber-band a rectangle from this point (corner prompts)
    pub base_point: Option<RawPoint3D>,
}

impl PointPromptOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            allow_none: false,
            base_point: None,
        }
    }

    pub fn corner(message: impl Into<String>, base_point: RawPoint3D) -> Self {
        Self {
            base_point: Some(base_point),
            ..Self::new(message)
        }
    }
}

/// Options of the point prompt shown while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct JigPromptOptions {
    pub message: String,
    pub keywords: Vec<String>,
    pub accept_3d_coordinates: bool,
    pub no_zero_response: bool,
    pub no_negative_response: bool,
}

impl JigPromptOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            keywords: Vec::new(),
            accept_3d_coordinates: true,
            no_zero_response: true,
            no_negative_response: true,
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }
}

/// What a drag sampler reports for each acquired point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerStatus {
    /// Something changed, redraw
    Ok,
    /// Same as last time, no redraw needed
    NoChange,
    /// End the drag as cancelled
    Cancel,
}

/// Callback driven by the host during a drag.
///
/// For every pointer move or keyword the host acquires a point with
/// [`DragSampler::prompt_options`], passes it to [`DragSampler::sample`] and,
/// when that reports `Ok`, calls [`DragSampler::update`] to move the entity.
/// The drag returns to the caller on confirm (`Ok`), on a keyword (`Keyword`)
/// or on cancel / a failed update (`Cancel`).
pub trait DragSampler {
    fn prompt_options(&self) -> JigPromptOptions;

    fn sample(&mut self, acquired: &PromptResult<RawPoint3D>) -> SamplerStatus;

    /// Applies the sampled state to the dragged entity. Returning `false`
    /// ends the drag as cancelled.
    fn update(&mut self) -> bool;
}

/// Interactive input service of the host.
pub trait InputService {
    fn get_point(&mut self, options: &PointPromptOptions) -> PromptResult<RawPoint3D>;

    fn get_corner(&mut self, options: &PointPromptOptions) -> PromptResult<RawPoint3D>;

    fn get_string(&mut self, message: &str, allow_spaces: bool) -> PromptResult<String>;

    /// Runs one drag session; see [`DragSampler`].
    fn drag(&mut self, sampler: &mut dyn DragSampler) -> PromptResult<()>;

    /// Installs a raw keyboard filter ahead of the host's own key handling.
    fn install_key_filter(&mut self, filter: KeyFilter) -> FilterId;

    fn remove_key_filter(&mut self, id: FilterId);

    /// Prints a message on the command line.
    fn write_message(&mut self, message: &str);
}

/// Identifier of a block definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// Identifier of an open drawing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx#{}", self.0)
    }
}

/// An inserted block reference that can be moved and rotated.
pub trait FrameEntity {
    fn set_position(&mut self, position: Point2D) -> std::result::Result<(), String>;

    fn set_rotation(&mut self, radians: f64) -> std::result::Result<(), String>;

    fn geometric_extents(&self) -> std::result::Result<Extents3d, String>;
}

/// The host's drawing database.
pub trait DrawingDatabase {
    /// Full path of the drawing file.
    fn document_path(&self) -> PathBuf;

    /// Name of the current layout (`Model` for model space).
    fn current_layout(&self) -> String;

    /// Space conversion primitive for the active view.
    fn converter(&self) -> &dyn SpaceConverter;

    fn start_transaction(&mut self) -> TransactionId;

    fn commit_transaction(&mut self, id: TransactionId) -> std::result::Result<(), String>;

    fn abort_transaction(&mut self, id: TransactionId);

    fn block_id(&self, name: &str) -> Option<BlockId>;

    /// Creates a block definition made of one closed polyline.
    fn define_block(
        &mut self,
        name: &str,
        outline: &[Point2D],
    ) -> std::result::Result<BlockId, String>;

    /// Inserts a reference to `block` into the current space.
    fn insert_reference(
        &mut self,
        block: BlockId,
        position: Point2D,
    ) -> std::result::Result<Box<dyn FrameEntity>, String>;
}

/// A drawing transaction bound to one command invocation.
///
/// Dereferences to the database so the command keeps working through it.
/// Dropping the scope without [`TransactionScope::commit`] aborts the
/// transaction, which covers cancellation, errors and panics alike.
pub struct TransactionScope<'a> {
    db: &'a mut dyn DrawingDatabase,
    id: TransactionId,
    finished: bool,
}

impl<'a> TransactionScope<'a> {
    pub fn begin(db: &'a mut dyn DrawingDatabase) -> Self {
        let id = db.start_transaction();
        debug!(transaction = %id, "transaction started");
        Self {
            db,
            id,
            finished: false,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.db.commit_transaction(self.id).map_err(Error::host)?;
        debug!(transaction = %self.id, "transaction committed");
        Ok(())
    }
}

impl<'a> Deref for TransactionScope<'a> {
    type Target = dyn DrawingDatabase + 'a;

    fn deref(&self) -> &Self::Target {
        self.db
    }
}

impl<'a> DerefMut for TransactionScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.db
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(transaction = %self.id, "transaction aborted");
            self.db.abort_transaction(self.id);
        }
    }
}

/// Matches operator input against a keyword list.
///
/// Input may be the full keyword or its abbreviation (the leading capital
/// letters, `RO` for `ROtate90`), in any case, optionally prefixed with `_`.
pub fn match_keyword<'k>(input: &str, keywords: &'k [String]) -> Option<&'k str> {
    let input = input.trim().trim_start_matches('_');
    if input.is_empty() {
        return None;
    }
    keywords
        .iter()
        .find(|kw| {
            let abbreviation: String = kw.chars().take_while(|c| !c.is_lowercase()).collect();
            kw.eq_ignore_ascii_case(input)
                || (!abbreviation.is_empty() && abbreviation.eq_ignore_ascii_case(input))
        })
        .map(String::as_str)
}
