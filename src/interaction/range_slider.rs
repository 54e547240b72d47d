use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{map_value, normalize};
use crate::error::{ChartError, ChartResult};

/// Value domain and rounding step of a range slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_step() -> f64 {
    1.0
}

impl SliderConfig {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: default_step(),
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(ChartError::InvalidData(
                "slider domain must be finite with min < max".to_owned(),
            ));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ChartError::InvalidData(
                "slider step must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Measured page geometry of the slider track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderTrack {
    pub left: f64,
    pub width: f64,
}

impl SliderTrack {
    pub fn new(left: f64, width: f64) -> ChartResult<Self> {
        if !left.is_finite() || !width.is_finite() || width <= 0.0 {
            return Err(ChartError::InvalidData(
                "slider track must have finite left and width > 0".to_owned(),
            ));
        }
        Ok(Self { left, width })
    }
}

/// Selected interval in the slider's value domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedRange {
    pub start: f64,
    pub end: f64,
}

impl SelectedRange {
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragTarget {
    StartHandle,
    EndHandle,
    Band,
}

/// Percent positions of every slider visual, derived from state only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SliderLayout {
    pub start_handle_left_pct: f64,
    pub end_handle_left_pct: f64,
    pub band_left_pct: f64,
    pub band_width_pct: f64,
    pub left_mask_width_pct: f64,
    pub right_mask_width_pct: f64,
}

type ChangeListener = Box<dyn FnMut(SelectedRange) + Send>;

/// Dual-handle range selector over `[min, max]`.
///
/// Drag positions arrive as raw page x coordinates. Every mutation clamps
/// state so that `min <= start <= end <= max` and then rebuilds the full
/// [`SliderLayout`].
pub struct RangeSlider {
    config: SliderConfig,
    track: SliderTrack,
    selected: SelectedRange,
    layout: SliderLayout,
    active_drag: Option<DragTarget>,
    listener: Option<ChangeListener>,
    drag_listener: Option<ChangeListener>,
}

impl std::fmt::Debug for RangeSlider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RangeSlider")
            .field("config", &self.config)
            .field("track", &self.track)
            .field("selected", &self.selected)
            .field("active_drag", &self.active_drag)
            .finish_non_exhaustive()
    }
}

impl RangeSlider {
    pub fn new(
        config: SliderConfig,
        track: SliderTrack,
        initial: SelectedRange,
    ) -> ChartResult<Self> {
        let config = config.validate()?;
        let mut slider = Self {
            config,
            track,
            selected: initial,
            layout: SliderLayout::default(),
            active_drag: None,
            listener: None,
            drag_listener: None,
        };
        slider.set_selected_range(initial.start, initial.end);
        Ok(slider)
    }

    /// Registers the callback fired with the rounded range on drag end.
    pub fn on_change(&mut self, listener: impl FnMut(SelectedRange) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Registers a callback fired on every drag move with the current
    /// selection rounded to the step grid. The stored selection itself stays
    /// unrounded until [`Self::end_drag`].
    pub fn on_drag(&mut self, listener: impl FnMut(SelectedRange) + Send + 'static) {
        self.drag_listener = Some(Box::new(listener));
    }

    #[must_use]
    pub fn config(&self) -> SliderConfig {
        self.config
    }

    #[must_use]
    pub fn selected_range(&self) -> SelectedRange {
        self.selected
    }

    #[must_use]
    pub fn layout(&self) -> SliderLayout {
        self.layout
    }

    #[must_use]
    pub fn active_drag(&self) -> Option<DragTarget> {
        self.active_drag
    }

    /// Re-measures the track, e.g. after the host resized.
    pub fn measure(&mut self, track: SliderTrack) {
        self.track = track;
        self.synchronize_layout();
    }

    /// Replaces the selection, clamped into the domain with `start <= end`.
    pub fn set_selected_range(&mut self, start: f64, end: f64) {
        let start = start.clamp(self.config.min, self.config.max);
        let end = end.clamp(start, self.config.max);
        self.selected = SelectedRange::new(start, end);
        self.synchronize_layout();
    }

    /// Dispatches a drag update to the matching affordance.
    ///
    /// For [`DragTarget::Band`] `page_x` is the band's new left edge.
    pub fn drag(&mut self, target: DragTarget, page_x: f64) -> SliderLayout {
        self.active_drag = Some(target);
        let layout = match target {
            DragTarget::StartHandle => self.drag_start_handle(page_x),
            DragTarget::EndHandle => self.drag_end_handle(page_x),
            DragTarget::Band => self.drag_band(page_x),
        };
        let rounded = self.rounded_selection();
        if let Some(listener) = self.drag_listener.as_mut() {
            listener(rounded);
        }
        layout
    }

    fn drag_start_handle(&mut self, page_x: f64) -> SliderLayout {
        let normalized_end = self.value_to_normalized(self.selected.end);
        let start = self.page_to_normalized(page_x).clamp(0.0, normalized_end);
        self.apply_normalized(start, normalized_end)
    }

    fn drag_end_handle(&mut self, page_x: f64) -> SliderLayout {
        let normalized_start = self.value_to_normalized(self.selected.start);
        let end = self.page_to_normalized(page_x).clamp(normalized_start, 1.0);
        self.apply_normalized(normalized_start, end)
    }

    fn drag_band(&mut self, page_x: f64) -> SliderLayout {
        let length = self.value_to_normalized(self.selected.end)
            - self.value_to_normalized(self.selected.start);
        let start = self.page_to_normalized(page_x).clamp(0.0, 1.0 - length);
        self.apply_normalized(start, start + length)
    }

    /// Finishes a drag: snaps both ends to the step grid, re-syncs visuals and
    /// notifies the change listener.
    pub fn end_drag(&mut self) -> SelectedRange {
        let SelectedRange { start, end } = self.rounded_selection();
        self.active_drag = None;
        self.set_selected_range(start, end);
        debug!(start = self.selected.start, end = self.selected.end, "slider drag end");
        if let Some(listener) = self.listener.as_mut() {
            listener(self.selected);
        }
        self.selected
    }

    /// Rounds to the nearest multiple of `step`, kept inside `[min, max]`.
    #[must_use]
    pub fn round_to_step(&self, value: f64) -> f64 {
        let SliderConfig { min, max, step } = self.config;
        ((value / step).round() * step).clamp(min, max)
    }

    /// Current selection with both ends snapped to the step grid.
    #[must_use]
    pub fn rounded_selection(&self) -> SelectedRange {
        SelectedRange::new(
            self.round_to_step(self.selected.start),
            self.round_to_step(self.selected.end),
        )
    }

    #[must_use]
    pub fn page_to_normalized(&self, page_x: f64) -> f64 {
        (page_x - self.track.left) / self.track.width
    }

    #[must_use]
    pub fn value_to_normalized(&self, value: f64) -> f64 {
        normalize(value, self.config.min, self.config.max)
    }

    #[must_use]
    pub fn normalized_to_value(&self, normalized: f64) -> f64 {
        map_value(normalized, 0.0, 1.0, self.config.min, self.config.max)
    }

    fn apply_normalized(&mut self, start: f64, end: f64) -> SliderLayout {
        let start = self.normalized_to_value(start);
        let end = self.normalized_to_value(end);
        trace!(start, end, "slider drag");
        self.set_selected_range(start, end);
        self.layout
    }

    fn synchronize_layout(&mut self) {
        let start = self.value_to_normalized(self.selected.start);
        let end = self.value_to_normalized(self.selected.end);
        self.layout = SliderLayout {
            start_handle_left_pct: start * 100.0,
            end_handle_left_pct: end * 100.0,
            band_left_pct: start * 100.0,
            band_width_pct: (end - start) * 100.0,
            left_mask_width_pct: start * 100.0,
            right_mask_width_pct: (1.0 - end) * 100.0,
        };
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::{DragTarget, RangeSlider, SelectedRange, SliderConfig, SliderTrack};

    fn slider() -> RangeSlider {
        RangeSlider::new(
            SliderConfig::new(1881.0, 2006.0),
            SliderTrack::new(100.0, 500.0).expect("track"),
            SelectedRange::new(1881.0, 2006.0),
        )
        .expect("slider")
    }

    #[test]
    fn config_rejects_empty_domain_and_zero_step() {
        assert!(SliderConfig::new(5.0, 5.0).validate().is_err());
        assert!(SliderConfig::new(0.0, 5.0).with_step(0.0).validate().is_err());
        assert!(SliderTrack::new(0.0, 0.0).is_err());
    }

    #[test]
    fn initial_range_is_clamped() {
        let slider = RangeSlider::new(
            SliderConfig::new(0.0, 10.0),
            SliderTrack::new(0.0, 100.0).expect("track"),
            SelectedRange::new(-5.0, 20.0),
        )
        .expect("slider");
        assert_eq!(slider.selected_range(), SelectedRange::new(0.0, 10.0));
    }

    #[test]
    fn start_handle_maps_page_position() {
        let mut slider = slider();
        // Halfway along the 500px track that starts at page x = 100.
        slider.drag(DragTarget::StartHandle, 350.0);
        assert_abs_diff_eq!(slider.selected_range().start, 1943.5);
        assert_eq!(slider.active_drag(), Some(DragTarget::StartHandle));
    }

    #[test]
    fn layout_masks_cover_unselected_parts() {
        let mut slider = slider();
        slider.drag(DragTarget::StartHandle, 200.0);
        slider.drag(DragTarget::EndHandle, 500.0);
        let layout = slider.layout();
        assert_abs_diff_eq!(layout.left_mask_width_pct, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(layout.right_mask_width_pct, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(layout.band_width_pct, 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(layout.band_left_pct, layout.start_handle_left_pct);
    }

    #[test]
    fn rounding_snaps_to_step_grid_inside_domain() {
        let slider = RangeSlider::new(
            SliderConfig::new(1.0, 10.0).with_step(2.0),
            SliderTrack::new(0.0, 100.0).expect("track"),
            SelectedRange::new(1.0, 10.0),
        )
        .expect("slider");
        assert_abs_diff_eq!(slider.round_to_step(3.9), 4.0);
        assert_abs_diff_eq!(slider.round_to_step(4.9), 4.0);
        assert_abs_diff_eq!(slider.round_to_step(5.1), 6.0);
        // 0.9 snaps to 0.0 and is clamped back up to min.
        assert_abs_diff_eq!(slider.round_to_step(0.9), 1.0);
        assert_abs_diff_eq!(slider.round_to_step(10.0), 10.0);
    }
}
