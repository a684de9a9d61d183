use ratatui::layout::{Position, Rect};
use tracing::trace;

use crate::columns::{Cell, picture_column};
use crate::region::DisplayRegion;

pub const OVERLAY_ALT: &str = "User picture";

/// A thumbnail cell under the pointer: its body row and where it was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTarget {
    pub row: usize,
    pub anchor: Rect,
}

/// The large picture shown next to a hovered thumbnail. `anchor` is the cell it
/// is positioned against.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub row: usize,
    pub url: String,
    pub anchor: Rect,
}

impl Overlay {
    pub fn target(&self) -> HoverTarget {
        HoverTarget {
            row: self.row,
            anchor: self.anchor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipState {
    Idle,
    Shown { row: usize },
}

pub fn state(region: &DisplayRegion) -> TooltipState {
    match region.overlay() {
        Some(overlay) => TooltipState::Shown { row: overlay.row },
        None => TooltipState::Idle,
    }
}

/// Find the thumbnail cell containing the pointer, if any.
pub fn hit_test(thumbnails: &[HoverTarget], column: u16, row: u16) -> Option<HoverTarget> {
    let pos = Position::new(column, row);
    thumbnails.iter().find(|t| t.anchor.contains(pos)).copied()
}

/// Apply one hover event. The old overlay is always removed before a new one is
/// created, and a target that does not resolve to a thumbnail with a picture
/// leaves the tooltip idle.
pub fn on_hover(region: &mut DisplayRegion, target: Option<HoverTarget>) -> TooltipState {
    let current = state(region);
    match (current, target) {
        (TooltipState::Idle, None) => return current,
        // Unchanged only when both the row and its drawn rectangle match.
        (TooltipState::Shown { .. }, Some(t))
            if region.overlay().is_some_and(|o| o.target() == t) =>
        {
            return current;
        }
        _ => {}
    }

    region.remove_overlay();

    let Some(target) = target else {
        trace!("Tooltip hidden");
        return TooltipState::Idle;
    };
    let url = region
        .table()
        .and_then(|table| table.cell(target.row, picture_column()))
        .and_then(Cell::tooltip_url)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    match url {
        Some(url) => {
            trace!("Tooltip for row {} -> {}", target.row, url);
            region.set_overlay(Overlay {
                row: target.row,
                url,
                anchor: target.anchor,
            });
            TooltipState::Shown { row: target.row }
        }
        None => TooltipState::Idle,
    }
}

/// Where the overlay goes: right of its anchor cell, or left of it when there is
/// no room, clipped to `area`.
pub fn overlay_area(overlay: &Overlay, area: Rect) -> Rect {
    let width = (overlay.url.chars().count().max(OVERLAY_ALT.len()) + 4)
        .min(area.width as usize) as u16;
    let height = 3.min(area.height);

    let right = overlay.anchor.right();
    let x = if right + width <= area.right() {
        right
    } else {
        overlay.anchor.x.saturating_sub(width).max(area.x)
    };
    let y = overlay
        .anchor
        .y
        .min(area.bottom().saturating_sub(height))
        .max(area.y);
    Rect::new(x, y, width, height).intersection(area)
}
