//! Interactive frame jig.
//!
//! The operator drags a fixed-size frame (the `PlotGuide` block, 8.5 x 11 by
//! default) around the drawing and turns it in quarter turns with Tab. The
//! accepted frame's extents become the plot window.
//!
//! A drag hands control back to the caller on every keyword, so the session
//! is a loop over [`FrameState`] that re-enters the drag until the frame is
//! accepted or cancelled.

use plotkit_core::{Error, Extents3d, Orientation, PlotRotation, Point2D, RawPoint3D, Result};
use plotkit_settings::FrameSettings;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::host::{
    match_keyword, DragSampler, DrawingDatabase, FrameEntity, InputService, JigPromptOptions,
    PromptResult, PromptStatus, SamplerStatus, TransactionScope,
};
use crate::keys::{InterceptGuard, KeyFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrameState {
    Sampling,
    Accepted,
    Cancelled,
}

impl FrameState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Sampling)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    Sample(Point2D),
    Rotate,
    Confirm,
    Cancel,
}

/// Transient state of one framing command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSession {
    pub anchor: Point2D,
    pub rotation: PlotRotation,
    pub last_sampled: Option<Point2D>,
    pub state: FrameState,
}

impl FrameSession {
    pub fn new(anchor: Point2D) -> Self {
        Self {
            anchor,
            rotation: PlotRotation::Degrees000,
            last_sampled: None,
            state: FrameState::Sampling,
        }
    }

    /// Applies one event. Accepted and Cancelled are terminal: later events
    /// leave the session untouched.
    pub fn handle(&mut self, event: FrameEvent) -> SamplerStatus {
        match self.state {
            FrameState::Accepted => return SamplerStatus::NoChange,
            FrameState::Cancelled => return SamplerStatus::Cancel,
            FrameState::Sampling => {}
        }

        match event {
            FrameEvent::Sample(point) => {
                if self.last_sampled == Some(point) {
                    return SamplerStatus::NoChange;
                }
                self.last_sampled = Some(point);
                self.anchor = point;
                SamplerStatus::Ok
            }
            FrameEvent::Rotate => {
                self.rotation = self.rotation.turned_clockwise();
                debug!(rotation = %self.rotation, "frame rotated");
                SamplerStatus::Ok
            }
            FrameEvent::Confirm => {
                self.state = FrameState::Accepted;
                debug!(anchor = %self.anchor, rotation = %self.rotation, "frame accepted");
                SamplerStatus::Ok
            }
            FrameEvent::Cancel => {
                self.state = FrameState::Cancelled;
                debug!("frame cancelled");
                SamplerStatus::Cancel
            }
        }
    }

    /// The template is portrait at 0°; a quarter turn makes it landscape.
    pub fn orientation(&self) -> Orientation {
        if self.rotation.is_quarter() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Result of an accepted framing session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FramedWindow {
    pub extents: Extents3d,
    pub orientation: Orientation,
    pub rotation: PlotRotation,
}

/// Drives a frame entity from a [`FrameSession`].
pub struct FrameJig {
    entity: Box<dyn FrameEntity>,
    session: FrameSession,
    keyword: String,
    apply_error: Option<String>,
}

impl FrameJig {
    pub fn new(entity: Box<dyn FrameEntity>, keyword: impl Into<String>) -> Self {
        Self {
            entity,
            session: FrameSession::new(Point2D::default()),
            keyword: keyword.into(),
            apply_error: None,
        }
    }

    pub fn session(&self) -> &FrameSession {
        &self.session
    }

    pub fn prompt(&self) -> String {
        format!(
            "\nSurround plot area: \nTab to rotate window [{}]:",
            self.keyword
        )
    }

    /// Runs drags until the frame is accepted or cancelled.
    pub fn run(&mut self, input: &mut dyn InputService) -> Result<FramedWindow> {
        let keywords = [self.keyword.clone()];

        while self.session.state == FrameState::Sampling {
            let result: PromptResult<()> = input.drag(self);
            match result.status {
                PromptStatus::Keyword => {
                    let entered = result.keyword.unwrap_or_default();
                    if match_keyword(&entered, &keywords).is_some() {
                        self.session.handle(FrameEvent::Rotate);
                        self.update();
                    } else {
                        debug!(keyword = %entered, "ignoring unknown keyword");
                    }
                }
                PromptStatus::Ok => {
                    self.session.handle(FrameEvent::Confirm);
                }
                PromptStatus::Cancel | PromptStatus::None => {
                    self.session.handle(FrameEvent::Cancel);
                }
            }
        }

        if self.session.state == FrameState::Cancelled {
            return Err(match self.apply_error.take() {
                Some(reason) => Error::ApplyFailure { reason },
                None => Error::UserCancelled,
            });
        }

        let extents = self.entity.geometric_extents().map_err(Error::host)?;
        let framed = FramedWindow {
            extents,
            orientation: self.session.orientation(),
            rotation: self.session.rotation,
        };
        info!(
            orientation = %framed.orientation,
            width = extents.width(),
            height = extents.height(),
            "plot frame accepted"
        );
        Ok(framed)
    }
}

impl DragSampler for FrameJig {
    fn prompt_options(&self) -> JigPromptOptions {
        JigPromptOptions::new(self.prompt()).with_keyword(self.keyword.clone())
    }

    fn sample(&mut self, acquired: &PromptResult<RawPoint3D>) -> SamplerStatus {
        match (acquired.status, acquired.value) {
            (PromptStatus::Ok, Some(point)) => {
                self.session.handle(FrameEvent::Sample(point.to_2d()))
            }
            (PromptStatus::Cancel, _) => self.session.handle(FrameEvent::Cancel),
            _ => SamplerStatus::NoChange,
        }
    }

    fn update(&mut self) -> bool {
        let applied = self
            .entity
            .set_position(self.session.anchor)
            .and_then(|()| self.entity.set_rotation(self.session.rotation.radians()));
        match applied {
            Ok(()) => true,
            Err(reason) => {
                warn!(%reason, "failed to move plot frame");
                self.apply_error = Some(reason);
                self.session.handle(FrameEvent::Cancel);
                false
            }
        }
    }
}

/// Closed outline of the frame template, centered on the insertion point.
pub fn frame_outline(settings: &FrameSettings) -> Vec<Point2D> {
    let (hw, hh) = (settings.width / 2.0, settings.height / 2.0);
    vec![
        Point2D::new(-hw, -hh),
        Point2D::new(hw, -hh),
        Point2D::new(hw, hh),
        Point2D::new(-hw, hh),
    ]
}

/// Runs the interactive framing command.
///
/// Looks up (or defines) the frame block, inserts it at the origin, and lets
/// the operator place it. The Tab filter is installed only while the jig
/// runs. The drawing transaction is committed on acceptance and aborted on
/// every other path.
pub fn frame_window(
    db: &mut dyn DrawingDatabase,
    input: &mut dyn InputService,
    settings: &FrameSettings,
) -> Result<FramedWindow> {
    let mut tx = TransactionScope::begin(db);

    let block = match tx.block_id(&settings.block_name) {
        Some(id) => id,
        None => {
            debug!(block = %settings.block_name, "defining frame block");
            tx.define_block(&settings.block_name, &frame_outline(settings))
                .map_err(Error::host)?
        }
    };
    let entity = tx
        .insert_reference(block, Point2D::default())
        .map_err(Error::host)?;

    let mut jig = FrameJig::new(entity, settings.rotate_keyword.clone());
    let framed = {
        let mut guard =
            InterceptGuard::install(input, KeyFilter::rotate(settings.rotate_command.clone()));
        jig.run(&mut *guard)
    }?;

    tx.commit()?;
    Ok(framed)
}
