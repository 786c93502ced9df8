use tracing::trace;
use crate::{deadline::Deadline, error::Result, types::Rectangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Grows merged gutters until they touch a panel or the page edge.
#[derive(Debug, Clone)]
pub struct BoundaryExpander<'a> {
    panels: &'a [Rectangle],
    width: u32,
    height: u32,
}

impl<'a> BoundaryExpander<'a> {
    pub fn new(panels: &'a [Rectangle], width: u32, height: u32) -> Self {
        Self { panels, width, height }
    }

    fn hits_panel(&self, rect: &Rectangle) -> bool {
        self.panels.iter().any(|panel| panel.intersects(rect))
    }

    /// Push one side outward a pixel at a time while the grown rectangle
    /// stays clear of every panel and inside the page.
    fn grow(&self, mut rect: Rectangle, side: Side) -> Rectangle {
        loop {
            let grown = match side {
                Side::Left if rect.left > 0 => Rectangle { left: rect.left - 1, ..rect },
                Side::Right if rect.right < self.width => Rectangle { right: rect.right + 1, ..rect },
                Side::Top if rect.top > 0 => Rectangle { top: rect.top - 1, ..rect },
                Side::Bottom if rect.bottom < self.height => Rectangle { bottom: rect.bottom + 1, ..rect },
                _ => return rect,
            };
            if self.hits_panel(&grown) {
                return rect;
            }
            rect = grown;
        }
    }

    /// Expand `seed` to its maximal extent, growing left, right, top, then
    /// bottom. Each side sees the rectangle as already grown by the sides
    /// before it, so the order decides the final shape.
    ///
    /// Returns `None` when the seed is empty after clipping to the page or
    /// already overlaps a panel.
    pub fn expand(&self, seed: Rectangle) -> Option<Rectangle> {
        let seed = seed.clamp_to(self.width, self.height);
        if seed.is_empty() {
            trace!(?seed, "degenerate gutter dropped");
            return None;
        }
        if self.hits_panel(&seed) {
            trace!(?seed, "gutter overlapping a panel dropped");
            return None;
        }

        let expanded = [Side::Left, Side::Right, Side::Top, Side::Bottom]
            .into_iter()
            .fold(seed, |rect, side| self.grow(rect, side));
        Some(expanded)
    }

    /// Expand every seed, dropping the degenerate ones. Seeds that grow into
    /// the same rectangle are kept once.
    pub fn expand_all(&self, seeds: &[Rectangle], deadline: &Deadline) -> Result<Vec<Rectangle>> {
        let mut expanded = Vec::with_capacity(seeds.len());
        for seed in seeds {
            deadline.check()?;
            if let Some(grown) = self.expand(*seed) {
                if expanded.contains(&grown) {
                    trace!(?seed, ?grown, "duplicate gutter dropped");
                    continue;
                }
                expanded.push(grown);
            }
        }
        Ok(expanded)
    }
}
