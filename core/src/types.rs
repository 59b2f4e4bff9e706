/// Single axis of the board, used for width, height and positions.
pub type Coord = u8;

/// Count of cells, mines included.
pub type CellCount = u16;

/// Board position `(x, y)`, or board size `(width, height)`.
pub type Coord2 = (Coord, Coord);

pub(crate) trait GridIndex {
    fn grid_index(self) -> [usize; 2];
}

impl GridIndex for Coord2 {
    fn grid_index(self) -> [usize; 2] {
        [self.0.into(), self.1.into()]
    }
}

pub const fn area((width, height): Coord2) -> CellCount {
    (width as CellCount).saturating_mul(height as CellCount)
}

/// Whether `pos` lies within a board of `size`.
pub const fn in_bounds(pos: Coord2, size: Coord2) -> bool {
    pos.0 < size.0 && pos.1 < size.1
}

const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn offset(pos: Coord2, (dx, dy): (i8, i8), size: Coord2) -> Option<Coord2> {
    let x = pos.0.checked_add_signed(dx)?;
    let y = pos.1.checked_add_signed(dy)?;
    in_bounds((x, y), size).then_some((x, y))
}

/// Iterates the up to eight in-bounds neighbors of a cell, row by row.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    size: Coord2,
    next: usize,
}

impl NeighborIter {
    pub fn new(center: Coord2, size: Coord2) -> Self {
        Self {
            center,
            size,
            next: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = OFFSETS.get(self.next) {
            self.next += 1;
            if let Some(pos) = offset(self.center, delta, self.size) {
                return Some(pos);
            }
        }
        None
    }
}

/// Number of cells in the 3x3 block around the worst placed start cell.
pub const fn max_neighborhood((width, height): Coord2) -> CellCount {
    let w = if width < 3 { width } else { 3 };
    let h = if height < 3 { height } else { 3 };
    area((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn corner_has_three_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), (5, 5)).collect();
        assert_eq!(neighbors, [(1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn center_has_eight_neighbors() {
        assert_eq!(NeighborIter::new((2, 2), (5, 5)).count(), 8);
        assert!(NeighborIter::new((2, 2), (5, 5)).all(|pos| pos != (2, 2)));
    }

    #[test]
    fn single_row_board() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), (3, 1)).collect();
        assert_eq!(neighbors, [(1, 0)]);
    }

    #[test]
    fn neighborhood_shrinks_on_small_boards() {
        assert_eq!(max_neighborhood((5, 5)), 9);
        assert_eq!(max_neighborhood((2, 5)), 6);
        assert_eq!(max_neighborhood((1, 1)), 1);
    }
}
