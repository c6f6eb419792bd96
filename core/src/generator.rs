use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// Derives an RNG seed from the wall clock, for callers without entropy of
/// their own.
pub fn seed_from_time() -> u64 {
    use web_time::SystemTime;
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as u64,
        Err(_) => 0x5EED,
    }
}

/// Uniform mine placement by rejection sampling: draw cells until the quota is
/// met, resampling on collisions and on the protected first-clicked cell.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Picks exactly `mines` distinct cells on a `dim`×`dim` grid, never the
    /// `excluded` cell.
    pub fn place(
        &mut self,
        dim: Coord,
        mines: CellCount,
        excluded: Coord2,
    ) -> Result<Array2<bool>> {
        let total = cell_area(dim, dim);
        if total == 0 || mines >= total {
            log::warn!("cannot fit {mines} mines and a safe start into {total} cells");
            return Err(GameError::TooManyMines);
        }

        let mut mask: Array2<bool> = Array2::default((dim as usize, dim as usize));
        let mut placed: CellCount = 0;
        while placed < mines {
            let pos: Coord2 = (
                self.rng.random_range(0..dim),
                self.rng.random_range(0..dim),
            );
            if pos == excluded || mask[pos.to_index()] {
                continue;
            }
            mask[pos.to_index()] = true;
            placed += 1;
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn places_exactly_the_requested_mines() {
        let mut generator = RandomMineGenerator::new(42);
        let mask = generator.place(8, 12, (3, 3)).unwrap();
        assert_eq!(mask.iter().filter(|&&mine| mine).count(), 12);
        assert!(!mask[[3, 3]]);
    }

    #[test]
    fn same_seed_same_layout() {
        let mut first = RandomMineGenerator::new(9);
        let mut second = RandomMineGenerator::new(9);
        assert_eq!(
            first.place(6, 8, (0, 0)).unwrap(),
            second.place(6, 8, (0, 0)).unwrap()
        );
    }

    #[test]
    fn excluded_cell_stays_clear_even_on_dense_boards() {
        // every cell but the protected start carries a mine
        let mut generator = RandomMineGenerator::new(1);
        let mask = generator.place(3, 8, (1, 1)).unwrap();
        assert!(!mask[[1, 1]]);
        assert_eq!(mask.iter().filter(|&&mine| mine).count(), 8);
    }

    #[test]
    fn rejects_mine_counts_that_leave_no_safe_start() {
        let mut generator = RandomMineGenerator::new(1);
        assert_eq!(generator.place(3, 9, (0, 0)), Err(GameError::TooManyMines));
        assert_eq!(generator.place(0, 1, (0, 0)), Err(GameError::TooManyMines));
    }
}
