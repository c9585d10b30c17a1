use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{AutomatonKind, Cell, CellContext, CellId, Parameters, Result, Rule, Vitals};

/// Open water.
pub const EMPTY: u32 = 0;
/// Prey.
pub const FISH: u32 = 1;
/// Predator.
pub const SHARK: u32 = 2;

/// Ticks a fish must survive before it can breed.
pub const FISH_REPRODUCTION_TIME: &str = "fishReproductionTime";
/// Energy a shark gains per fish eaten.
pub const SHARK_ENERGY_GAIN: &str = "sharkEnergyGain";
/// Ticks a shark must survive before it can breed.
pub const SHARK_REPRODUCTION_TIME: &str = "sharkReproductionTime";
/// Energy of a newborn shark.
pub const SHARK_INITIAL_ENERGY: &str = "sharkInitialEnergy";

/// Default parameter values.
pub const DEFAULTS: &[(&str, f64)] = &[
    (FISH_REPRODUCTION_TIME, 3.0),
    (SHARK_ENERGY_GAIN, 2.0),
    (SHARK_REPRODUCTION_TIME, 3.0),
    (SHARK_INITIAL_ENERGY, 5.0),
];

/// Wa-Tor predator/prey dynamics.
///
/// Fish wander and breed. Sharks spend one unit of energy per tick, eat an
/// adjacent fish when they can, and starve when their energy runs out. An
/// agent that breeds leaves a newborn in the cell it moved out of.
///
/// Agents write their counters into the pending vitals of the cell they end
/// up in; [`Rule::reset_cell`] promotes them once every cell has committed.
#[derive(Debug, Clone)]
pub struct WaTorRule {
    params: Parameters,
    rng: StdRng,
}

impl WaTorRule {
    /// Creates the rule drawing randomness from `rng`.
    pub fn new(params: Parameters, rng: StdRng) -> Self {
        Self { params, rng }
    }

    fn count(&self, key: &str) -> Result<i64> {
        Ok(self.params.get(key)?.round() as i64)
    }

    fn newborn(&self, species: u32) -> Result<Vitals> {
        let energy = if species == SHARK {
            self.count(SHARK_INITIAL_ENERGY)? as i32
        } else {
            0
        };
        Ok(Vitals {
            energy,
            ..Vitals::default()
        })
    }

    /// Unclaimed neighbors that are empty and not yet targeted this tick.
    fn vacancies(ctx: &CellContext<'_>) -> Result<Vec<CellId>> {
        ctx.find_neighbors(|cell| {
            cell.state() == EMPTY && cell.next_state() == EMPTY && !cell.is_claimed()
        })
    }

    /// Moves the acting agent into a random vacancy, breeding if old enough.
    ///
    /// Returns the acting cell's next state.
    fn wander(
        &mut self,
        ctx: &mut CellContext<'_>,
        species: u32,
        mut vitals: Vitals,
        breed_key: &str,
    ) -> Result<u32> {
        let targets = Self::vacancies(ctx)?;
        let Some(&target) = targets.choose(&mut self.rng) else {
            ctx.cell_mut().set_next_vitals(vitals);
            return Ok(species);
        };

        if i64::from(vitals.age) >= self.count(breed_key)? {
            vitals.age = 0;
            let child = self.newborn(species)?;
            ctx.claim(target, species)?;
            ctx.neighbor_mut(target)?.set_next_vitals(vitals);
            ctx.cell_mut().set_next_vitals(child);
            return Ok(species);
        }

        ctx.claim(target, species)?;
        ctx.neighbor_mut(target)?.set_next_vitals(vitals);
        ctx.cell_mut().set_next_vitals(Vitals::default());
        Ok(EMPTY)
    }

    fn fish(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        let mut vitals = ctx.cell().vitals();
        vitals.age += 1;
        self.wander(ctx, FISH, vitals, FISH_REPRODUCTION_TIME)
    }

    fn shark(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        let mut vitals = ctx.cell().vitals();
        vitals.age += 1;
        vitals.energy -= 1;
        if vitals.energy <= 0 {
            ctx.cell_mut().set_next_vitals(Vitals::default());
            return Ok(EMPTY);
        }

        let prey = ctx.find_neighbors(|cell| {
            cell.state() == FISH && cell.next_state() == FISH && !cell.is_claimed()
        })?;
        if let Some(&target) = prey.choose(&mut self.rng) {
            vitals.energy += self.count(SHARK_ENERGY_GAIN)? as i32;
            let breeds = i64::from(vitals.age) >= self.count(SHARK_REPRODUCTION_TIME)?;
            ctx.claim(target, SHARK)?;
            if breeds {
                vitals.age = 0;
                let child = self.newborn(SHARK)?;
                ctx.neighbor_mut(target)?.set_next_vitals(vitals);
                ctx.cell_mut().set_next_vitals(child);
                return Ok(SHARK);
            }
            ctx.neighbor_mut(target)?.set_next_vitals(vitals);
            ctx.cell_mut().set_next_vitals(Vitals::default());
            return Ok(EMPTY);
        }

        self.wander(ctx, SHARK, vitals, SHARK_REPRODUCTION_TIME)
    }
}

impl Rule for WaTorRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::WaTor
    }

    fn num_states(&self) -> u32 {
        3
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn should_skip(&self, ctx: &CellContext<'_>) -> bool {
        ctx.cell().is_claimed()
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        match ctx.state() {
            FISH => self.fish(ctx),
            SHARK => self.shark(ctx),
            _ => Ok(EMPTY),
        }
    }

    fn reset_cell(&self, cell: &mut Cell) {
        cell.roll_vitals();
    }

    fn prepare_cell(&self, cell: &mut Cell) {
        let vitals = match cell.state() {
            EMPTY => Vitals::default(),
            species => self.newborn(species).unwrap_or_else(|error| {
                tracing::warn!(
                    %error,
                    species,
                    "newborn counters unavailable, starting from zero"
                );
                Vitals::default()
            }),
        };
        cell.set_vitals(vitals);
        cell.set_next_vitals(Vitals::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid;
    use rand::SeedableRng;

    fn setup(states: &[u32]) -> (WaTorRule, Grid) {
        let cells = states.iter().map(|&s| Cell::new(s, 3).unwrap()).collect();
        let mut grid = Grid::new(cells, 3, 3).unwrap();
        grid.set_adjacent_neighbors().unwrap();
        let rule = WaTorRule::new(
            Parameters::for_kind(AutomatonKind::WaTor),
            StdRng::seed_from_u64(3),
        );
        for cell in grid.cells_mut() {
            rule.prepare_cell(cell);
        }
        (rule, grid)
    }

    fn vitals(age: u32, energy: i32) -> Vitals {
        Vitals {
            age,
            energy,
            ..Vitals::default()
        }
    }

    fn compute(rule: &mut WaTorRule, grid: &mut Grid, id: usize) {
        let mut ctx = CellContext::new(id, grid.cells_mut());
        rule.compute_next(&mut ctx).unwrap();
    }

    #[test]
    fn test_prepare_gives_sharks_energy() {
        let (_, grid) = setup(&[2, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(grid.cells()[0].vitals(), vitals(0, 5));
        assert_eq!(grid.cells()[1].vitals(), Vitals::default());
    }

    #[test]
    fn test_prepare_without_energy_parameter() {
        let rule = WaTorRule::new(Parameters::new(), StdRng::seed_from_u64(3));
        let mut shark = Cell::new(SHARK, 3).unwrap();
        shark.set_vitals(vitals(4, 9));
        rule.prepare_cell(&mut shark);
        assert_eq!(shark.vitals(), Vitals::default());
    }

    #[test]
    fn test_fish_moves_to_only_vacancy() {
        let (mut rule, mut grid) = setup(&[1, 1, 1, 1, 1, 0, 1, 1, 1]);
        compute(&mut rule, &mut grid, 4);
        assert_eq!(grid.cells()[4].next_state(), EMPTY);
        assert_eq!(grid.cells()[5].next_state(), FISH);
        assert!(grid.cells()[5].is_claimed());
        assert_eq!(grid.cells()[5].next_vitals().age, 1);
    }

    #[test]
    fn test_trapped_fish_ages_in_place() {
        let (mut rule, mut grid) = setup(&[1; 9]);
        compute(&mut rule, &mut grid, 4);
        assert_eq!(grid.cells()[4].next_state(), FISH);
        assert_eq!(grid.cells()[4].next_vitals().age, 1);
    }

    #[test]
    fn test_fish_breeds_when_old_enough() {
        let (mut rule, mut grid) = setup(&[1, 1, 1, 1, 1, 0, 1, 1, 1]);
        grid.cells_mut()[4].set_vitals(vitals(2, 0));
        compute(&mut rule, &mut grid, 4);
        assert_eq!(grid.cells()[4].next_state(), FISH);
        assert_eq!(grid.cells()[5].next_state(), FISH);
        assert_eq!(grid.cells()[5].next_vitals().age, 0);
    }

    #[test]
    fn test_shark_eats_fish() {
        let (mut rule, mut grid) = setup(&[0, 0, 0, 0, 2, 1, 0, 0, 0]);
        compute(&mut rule, &mut grid, 4);
        assert_eq!(grid.cells()[4].next_state(), EMPTY);
        assert_eq!(grid.cells()[5].next_state(), SHARK);
        // 5 - 1 + 2
        assert_eq!(grid.cells()[5].next_vitals().energy, 6);
        // the eaten fish does not act
        compute(&mut rule, &mut grid, 5);
        assert_eq!(grid.cells()[5].next_state(), SHARK);
    }

    #[test]
    fn test_shark_starves() {
        let (mut rule, mut grid) = setup(&[0, 0, 0, 0, 2, 0, 0, 0, 0]);
        grid.cells_mut()[4].set_vitals(vitals(0, 1));
        compute(&mut rule, &mut grid, 4);
        assert_eq!(grid.cells()[4].next_state(), EMPTY);
        assert!(grid.cells().iter().all(|c| c.next_state() == EMPTY));
    }

    #[test]
    fn test_reset_rolls_vitals() {
        let (mut rule, mut grid) = setup(&[1, 1, 1, 1, 1, 0, 1, 1, 1]);
        compute(&mut rule, &mut grid, 4);
        for cell in grid.cells_mut() {
            cell.commit();
            rule.reset_cell(cell);
        }
        assert_eq!(grid.cells()[5].state(), FISH);
        assert_eq!(grid.cells()[5].vitals().age, 1);
        assert_eq!(grid.cells()[4].vitals(), Vitals::default());
    }
}
