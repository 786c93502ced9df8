use crate::types::{PanelCandidate, Rectangle, RegionList};

/// Stable row-major sort: top edge ascending, then left edge ascending.
pub fn sort_reading_order<T>(items: &mut [T], rect_of: impl Fn(&T) -> Rectangle) {
    items.sort_by_key(|item| rect_of(item).reading_order_key());
}

/// Combine panels and expanded gutters into one reading-ordered list.
pub fn compose(panels: &[PanelCandidate], gutters: &[Rectangle]) -> RegionList {
    let mut regions: Vec<Rectangle> = panels
        .iter()
        .map(|panel| panel.rect)
        .chain(gutters.iter().copied())
        .collect();
    sort_reading_order(&mut regions, |rect| *rect);
    RegionList::from_ordered(regions)
}
