mod range_slider;
mod throttle;

pub use range_slider::{
    DragTarget, RangeSlider, SelectedRange, SliderConfig, SliderLayout, SliderTrack,
};
pub use throttle::Throttle;

use serde::{Deserialize, Serialize};

use crate::core::CanvasPoint;

/// Lifecycle of a chart surface.
///
/// `Idle -> Rendered` on the first draw, `Rendered <-> Highlighted` while the
/// pointer hovers, and back to `Rendered` on hover end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartPhase {
    Idle,
    Rendered,
    Highlighted,
}

/// Point currently highlighted by the hover tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverTarget {
    pub index: usize,
    pub canvas_point: CanvasPoint,
    pub time: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionState {
    phase: ChartPhase,
    pointer_x: Option<f64>,
    hover: Option<HoverTarget>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            phase: ChartPhase::Idle,
            pointer_x: None,
            hover: None,
        }
    }
}

impl InteractionState {
    #[must_use]
    pub fn phase(self) -> ChartPhase {
        self.phase
    }

    #[must_use]
    pub fn pointer_x(self) -> Option<f64> {
        self.pointer_x
    }

    #[must_use]
    pub fn hover(self) -> Option<HoverTarget> {
        self.hover
    }

    /// Base chart was (re)drawn; any previous highlight is gone.
    pub fn on_rendered(&mut self) {
        self.phase = ChartPhase::Rendered;
        self.hover = None;
    }

    pub fn on_pointer_move(&mut self, x: f64, target: Option<HoverTarget>) {
        if self.phase == ChartPhase::Idle {
            return;
        }
        self.pointer_x = Some(x);
        self.hover = target;
        self.phase = if target.is_some() {
            ChartPhase::Highlighted
        } else {
            ChartPhase::Rendered
        };
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer_x = None;
        self.hover = None;
        if self.phase == ChartPhase::Highlighted {
            self.phase = ChartPhase::Rendered;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
