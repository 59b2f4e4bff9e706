use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Places mines uniformly at random over every cell outside the start zone.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomGenerator {
    seed: u64,
    start: Option<Coord2>,
}

impl RandomGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed, start: None }
    }

    /// Uses `start` as the start cell instead of picking one at random.
    /// Ignored for [`StartTile::None`].
    pub fn with_start(self, start: Coord2) -> Self {
        Self {
            start: Some(start),
            ..self
        }
    }
}

impl BoardGenerator for RandomGenerator {
    fn generate(self, config: GameConfig) -> Result<Game> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (width, height) = config.size();
        let rule = config.start();

        let start = match (rule, self.start) {
            (StartTile::None, _) => None,
            (_, Some(start)) if !in_bounds(start, config.size()) => {
                return Err(GameError::InvalidCoords);
            }
            (_, Some(start)) => Some(start),
            (StartTile::Safe | StartTile::Clear, None) => {
                Some((rng.random_range(0..width), rng.random_range(0..height)))
            }
        };

        let mut candidates: Vec<Coord2> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&pos| start.is_none_or(|start| !rule.excludes(start, pos)))
            .collect();

        let wanted = usize::from(config.mines());
        if wanted > candidates.len() {
            log::warn!(
                "Only {} cells free for {} mines",
                candidates.len(),
                wanted
            );
            return Err(GameError::TooManyMines {
                max: candidates.len() as CellCount,
            });
        }
        let (chosen, _) = candidates.partial_shuffle(&mut rng, wanted);

        let mut mine_mask: Array2<bool> = Array2::default(config.size().grid_index());
        for &pos in chosen.iter() {
            mine_mask[pos.grid_index()] = true;
        }
        let layout = MineLayout::from_mine_mask(mine_mask);

        log::debug!(
            "Generated {:?} board with {} mines, start cell {:?}",
            config.size(),
            layout.mine_count(),
            start
        );
        Ok(Game::from_layout(layout, start))
    }
}
