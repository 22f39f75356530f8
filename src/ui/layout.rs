//! Pure geometry for the card: grid cells and vertical section stacking.
//! Knows nothing about what is drawn inside a cell.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[cfg(test)]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Horizontal band a section may occupy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentArea {
    pub x: f32,
    pub width: f32,
}

impl ContentArea {
    /// Symmetric horizontal margins inside a card of `card_width`.
    pub fn with_margin(card_width: f32, margin_x: f32) -> Self {
        Self {
            x: margin_x,
            width: (card_width - margin_x * 2.0).max(0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    pub columns: usize,
    pub row_height: f32,
    /// Space taken out of each cell's right and bottom edge.
    pub gutter_x: f32,
    pub gutter_y: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridPlacement {
    pub cells: Vec<LayoutRect>,
    pub bottom: f32,
}

/// Row-major placement: `column = i % columns`, `row = i / columns`.
///
/// Columns below one are treated as one. `bottom` is
/// `start_y + ceil(item_count / columns) * row_height`.
pub fn grid_placement(
    area: &ContentArea,
    start_y: f32,
    item_count: usize,
    spec: &GridSpec,
) -> GridPlacement {
    let columns = spec.columns.max(1);
    let column_width = area.width / columns as f32;
    let cell_width = (column_width - spec.gutter_x).max(0.0);
    let cell_height = (spec.row_height - spec.gutter_y).max(0.0);

    let cells = (0..item_count)
        .map(|index| {
            let col = index % columns;
            let row = index / columns;
            LayoutRect::new(
                (col as f32).mul_add(column_width, area.x),
                (row as f32).mul_add(spec.row_height, start_y),
                cell_width,
                cell_height,
            )
        })
        .collect();

    let rows = item_count.div_ceil(columns);
    GridPlacement {
        cells,
        bottom: (rows as f32).mul_add(spec.row_height, start_y),
    }
}

/// Full-width rows stacked with a fixed gap, one per item.
pub fn stacked_rows(
    area: &ContentArea,
    start_y: f32,
    item_count: usize,
    row_height: f32,
    row_gap: f32,
) -> GridPlacement {
    let pitch = row_height + row_gap;
    let cells = (0..item_count)
        .map(|index| LayoutRect::new(area.x, (index as f32).mul_add(pitch, start_y), area.width, row_height))
        .collect::<Vec<_>>();
    let bottom = cells.last().map_or(start_y, LayoutRect::bottom);
    GridPlacement { cells, bottom }
}

/// Tracks the running y-offset as sections are drawn top to bottom.
#[derive(Clone, Copy, Debug)]
pub struct SectionCursor {
    y: f32,
}

impl SectionCursor {
    pub const fn new(start_y: f32) -> Self {
        Self { y: start_y }
    }

    #[inline(always)]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Moves below a finished section, leaving `gap` before the next one.
    pub fn advance_to(&mut self, section_bottom: f32, gap: f32) -> f32 {
        self.y = section_bottom + gap;
        self.y
    }
}
