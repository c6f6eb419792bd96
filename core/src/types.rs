use ndarray::Array2;

/// Single grid axis, used for board dimensions and positions.
pub type Coord = u8;

/// Count type for cell and mine totals.
pub type CellCount = u16;

/// `(row, col)` grid position.
pub type Coord2 = (Coord, Coord);

pub trait ToIndex {
    type Output;
    fn to_index(self) -> Self::Output;
}

impl ToIndex for Coord2 {
    type Output = [usize; 2];

    fn to_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn cell_area(rows: Coord, cols: Coord) -> CellCount {
    let rows = rows as CellCount;
    let cols = cols as CellCount;
    rows.saturating_mul(cols)
}

/// Offsets of the 8-neighborhood in row-major scan order, self skipped.
const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `pos`, returning a value only while it stays in bounds.
fn offset_within(pos: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let row = pos.0.checked_add_signed(delta.0)?;
    if row >= bounds.0 {
        return None;
    }
    let col = pos.1.checked_add_signed(delta.1)?;
    if col >= bounds.1 {
        return None;
    }
    Some((row, col))
}

/// Bounds-clipped iterator over the up-to-8 neighbors of a grid position.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    cursor: u8,
}

impl NeighborIter {
    fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            cursor: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while usize::from(self.cursor) < OFFSETS.len() {
            let candidate =
                offset_within(self.center, OFFSETS[self.cursor as usize], self.bounds);
            self.cursor += 1;
            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }
}

pub trait GridNeighbors {
    fn neighbors_of(&self, pos: Coord2) -> NeighborIter;
}

impl<T> GridNeighbors for Array2<T> {
    fn neighbors_of(&self, pos: Coord2) -> NeighborIter {
        let dim = self.dim();
        NeighborIter::new(pos, (dim.0 as Coord, dim.1 as Coord))
    }
}
