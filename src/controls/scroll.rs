//! Horizontal scrollbar emulation
//!
//! The content scrolls inside a viewport; a thumb on a separate track mirrors
//! the scroll offset and can be dragged to change it.

/// Thumb placement on the track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thumb {
    pub left: u16,
    pub width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scrollbar {
    pub content_width: u16,
    pub viewport_width: u16,
    pub track_width: u16,
    pub min_thumb: u16,
}

impl Scrollbar {
    pub fn new(content_width: u16, viewport_width: u16, track_width: u16, min_thumb: u16) -> Self {
        Self {
            content_width,
            viewport_width,
            track_width,
            min_thumb,
        }
    }

    /// Largest valid scroll offset
    pub fn max_scroll(&self) -> u16 {
        self.content_width.saturating_sub(self.viewport_width)
    }

    /// Thumb for the given offset, or `None` when the content fits
    pub fn thumb(&self, scroll_offset: u16) -> Option<Thumb> {
        if self.content_width == 0 || self.viewport_width >= self.content_width {
            return None;
        }

        let ratio = f64::from(self.viewport_width) / f64::from(self.content_width);
        let width = (f64::from(self.track_width) * ratio)
            .max(f64::from(self.min_thumb))
            .min(f64::from(self.track_width)) as u16;

        let travel = self.track_width.saturating_sub(width);
        let offset = scroll_offset.min(self.max_scroll());
        let left = (f64::from(offset) / f64::from(self.max_scroll()) * f64::from(travel)).round()
            as u16;

        Some(Thumb { left, width })
    }

    /// Scroll offset matching a thumb position
    pub fn offset_for_thumb(&self, thumb_left: u16, thumb_width: u16) -> u16 {
        let travel = self.track_width.saturating_sub(thumb_width);
        if travel == 0 {
            return 0;
        }
        let ratio = f64::from(thumb_left.min(travel)) / f64::from(travel);
        (ratio * f64::from(self.max_scroll())).round() as u16
    }
}

/// An in-progress thumb drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbDrag {
    start_x: u16,
    start_left: u16,
}

impl ThumbDrag {
    pub fn begin(pointer_x: u16, thumb_left: u16) -> Self {
        Self {
            start_x: pointer_x,
            start_left: thumb_left,
        }
    }

    /// New thumb position and scroll offset for the pointer's current x
    pub fn drag_to(&self, pointer_x: u16, bar: &Scrollbar, thumb_width: u16) -> (u16, u16) {
        let travel = bar.track_width.saturating_sub(thumb_width);
        let delta = i32::from(pointer_x) - i32::from(self.start_x);
        let left = (i32::from(self.start_left) + delta).clamp(0, i32::from(travel)) as u16;
        (left, bar.offset_for_thumb(left, thumb_width))
    }
}
