//! Two-corner window selection.

use plotkit_core::{convert_window, DeviceWindow, Error, RawPoint3D, Result, SpaceConverter};
use tracing::debug;

use crate::host::{InputService, PointPromptOptions};

const FIRST_CORNER_PROMPT: &str = "\nSelect First corner of plot area: ";
const SECOND_CORNER_PROMPT: &str = "\nSelect second corner of the plot area.";

/// Turns two operator picks into a device window.
#[derive(Debug, Clone, Default)]
pub struct WindowSelector;

impl WindowSelector {
    pub fn new() -> Self {
        Self
    }

    /// Converts two picked points. A missing point means the pick was
    /// cancelled, and nothing is converted.
    pub fn select(
        &self,
        converter: &dyn SpaceConverter,
        a: Option<RawPoint3D>,
        b: Option<RawPoint3D>,
    ) -> Result<DeviceWindow> {
        match (a, b) {
            (Some(a), Some(b)) => convert_window(converter, a, b),
            _ => {
                debug!("window pick cancelled");
                Err(Error::UserCancelled)
            }
        }
    }

    /// Prompts for the first corner, then a corner rubber-banded from it.
    pub fn pick(
        &self,
        input: &mut dyn InputService,
        converter: &dyn SpaceConverter,
    ) -> Result<DeviceWindow> {
        let first = input
            .get_point(&PointPromptOptions::new(FIRST_CORNER_PROMPT))
            .value;
        let Some(first) = first else {
            return self.select(converter, None, None);
        };

        let second = input
            .get_corner(&PointPromptOptions::corner(SECOND_CORNER_PROMPT, first))
            .value;
        self.select(converter, Some(first), second)
    }
}
