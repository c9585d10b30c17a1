//! Darwin's World: every species runs its own small program.
//!
//! A creature faces one compass direction and keeps an instruction pointer
//! into its species' program. Each tick it executes control instructions
//! until it reaches an action (move, turn, or infect), which ends its turn.
//! Infected creatures join the attacker's species and restart its program.

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use crate::{
    AutomatonKind, Cell, CellContext, CellId, Direction, LatticeError, Parameters, Result, Rule,
    Vitals,
};

/// Unoccupied cell.
pub const EMPTY: u32 = 0;

/// How many cells ahead the conditional instructions look.
pub const NEARBY_AHEAD: &str = "nearbyAhead";

/// Default parameter values.
pub const DEFAULTS: &[(&str, f64)] = &[(NEARBY_AHEAD, 1.0)];

/// Prefix of the text extras holding species programs.
pub const PROGRAM_PREFIX: &str = "program";

/// Extra key of the program run by `species` (`program1`, `program2`, ...).
pub fn program_key(species: u32) -> String {
    format!("{PROGRAM_PREFIX}{species}")
}

/// Built-in species programs.
pub mod programs {
    /// Sits still, spinning, and infects anything that comes into view.
    pub const FLYTRAP: &str = "\
# flytrap
ifenemy 4
left 90
go 1
infect
go 1
";

    /// Roams forward, turns at random when blocked, infects enemies.
    pub const ROVER: &str = "\
# rover
ifenemy 10
ifempty 8
ifrandom 6
left 90
go 1
right 90
go 1
move
go 1
infect
go 1
";
}

/// One program instruction.
///
/// Jump and restart targets are zero-based instruction indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step into the cell ahead if it is empty.
    Move,
    /// Turn counter-clockwise by the given degrees, snapped to 45.
    Left(u32),
    /// Turn clockwise by the given degrees, snapped to 45.
    Right(u32),
    /// Convert the enemy ahead; it resumes at the given instruction.
    Infect(usize),
    /// Jump if a cell in sight ahead is empty.
    IfEmpty(usize),
    /// Jump if there is no cell ahead.
    IfWall(usize),
    /// Jump if a cell in sight ahead holds the same species.
    IfSame(usize),
    /// Jump if a cell in sight ahead holds another species.
    IfEnemy(usize),
    /// Jump half of the time.
    IfRandom(usize),
    /// Jump unconditionally.
    Go(usize),
}

impl Command {
    /// Whether executing this instruction ends the creature's turn.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            Command::Move | Command::Left(_) | Command::Right(_) | Command::Infect(_)
        )
    }

    fn name(self) -> &'static str {
        match self {
            Command::Move => "MOVE",
            Command::Left(_) => "LEFT",
            Command::Right(_) => "RIGHT",
            Command::Infect(_) => "INFECT",
            Command::IfEmpty(_) => "IF_EMPTY",
            Command::IfWall(_) => "IF_WALL",
            Command::IfSame(_) => "IF_SAME",
            Command::IfEnemy(_) => "IF_ENEMY",
            Command::IfRandom(_) => "IF_RANDOM",
            Command::Go(_) => "GO",
        }
    }

    /// Instruction index this command may continue at, other than the next.
    fn target(self) -> Option<usize> {
        match self {
            Command::Move | Command::Left(_) | Command::Right(_) => None,
            Command::Infect(target)
            | Command::IfEmpty(target)
            | Command::IfWall(target)
            | Command::IfSame(target)
            | Command::IfEnemy(target)
            | Command::IfRandom(target)
            | Command::Go(target) => Some(target),
        }
    }

    /// Parses one source line; `Ok(None)` for an unrecognized command word.
    fn parse(line: &str) -> std::result::Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let argument = words.next();
        if let Some(extra) = words.next() {
            return Err(format!("unexpected '{extra}'"));
        }

        let degrees = |default: u32| match argument {
            None => Ok(default),
            Some(text) => text
                .parse::<u32>()
                .map_err(|_| format!("expected degrees, got '{text}'")),
        };
        let instruction = |required: bool| match argument {
            None if required => Err(format!("'{word}' needs an instruction number")),
            None => Ok(0),
            Some(text) => match text.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n - 1),
                _ => Err(format!("expected an instruction number, got '{text}'")),
            },
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "move" | "mv" => match argument {
                None => Command::Move,
                Some(text) => return Err(format!("move takes no argument, got '{text}'")),
            },
            "left" | "lt" => Command::Left(degrees(90)?),
            "right" | "rt" => Command::Right(degrees(90)?),
            "infect" | "inf" => Command::Infect(instruction(false)?),
            "ifempty" | "emp?" => Command::IfEmpty(instruction(true)?),
            "ifwall" | "wl?" => Command::IfWall(instruction(true)?),
            "ifsame" | "sm?" => Command::IfSame(instruction(true)?),
            "ifenemy" | "emy?" => Command::IfEnemy(instruction(true)?),
            "ifrandom" | "rnd?" => Command::IfRandom(instruction(true)?),
            "go" => Command::Go(instruction(true)?),
            _ => return Ok(None),
        };
        Ok(Some(command))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move => f.write_str(self.name()),
            Command::Left(degrees) | Command::Right(degrees) => {
                write!(f, "{} {degrees}", self.name())
            }
            _ => match self.target() {
                Some(target) => write!(f, "{} {}", self.name(), target + 1),
                None => f.write_str(self.name()),
            },
        }
    }
}

/// Eighth-turns for a rotation of `degrees`, rounded to the nearest 45.
fn eighths(degrees: u32) -> usize {
    ((degrees as usize + 22) / 45) % 8
}

/// The instruction list of one species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    commands: Vec<Command>,
}

impl Program {
    /// Parses the program of `species`.
    ///
    /// One instruction per line; blank lines and lines starting with `#` are
    /// skipped, as are unrecognized command words. Instruction numbers in the
    /// source are one-based and count instructions, not lines.
    pub fn parse(species: u32, source: &str) -> Result<Self> {
        let mut commands = Vec::new();
        let mut lines = Vec::new();
        for (index, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let invalid = |reason: String| {
                tracing::error!(species, line = index + 1, %reason, "invalid program");
                LatticeError::InvalidProgram {
                    species,
                    line: index + 1,
                    reason,
                }
            };
            match Command::parse(line).map_err(invalid)? {
                Some(command) => {
                    commands.push(command);
                    lines.push(index + 1);
                }
                None => {
                    tracing::warn!(species, line = index + 1, text = line, "unknown command ignored");
                }
            }
        }

        if commands.is_empty() {
            tracing::error!(species, "program has no instructions");
            return Err(LatticeError::InvalidProgram {
                species,
                line: 0,
                reason: "no instructions".to_string(),
            });
        }
        for (command, &line) in commands.iter().zip(&lines) {
            if let Some(target) = command.target().filter(|&t| t >= commands.len()) {
                return Err(LatticeError::InvalidProgram {
                    species,
                    line,
                    reason: format!(
                        "instruction {} out of range 1..={}",
                        target + 1,
                        commands.len()
                    ),
                });
            }
        }
        tracing::debug!(species, instructions = commands.len(), "program parsed");
        Ok(Self { commands })
    }

    /// Number of instructions; never zero.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Always false; parsed programs hold at least one instruction.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Instruction at `index`.
    pub fn get(&self, index: usize) -> Option<Command> {
        self.commands.get(index).copied()
    }

    /// All instructions in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn next(&self, index: usize) -> usize {
        (index + 1) % self.commands.len()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, command) in self.commands.iter().enumerate() {
            writeln!(f, "{}: {command}", index + 1)?;
        }
        Ok(())
    }
}

/// Darwin's World.
///
/// States are `0` (empty) and one state per species, where species `n` runs
/// the program in the `program{n}` text extra. A creature's instruction
/// pointer and heading live in its [`Vitals`]; moves and infections claim
/// the target cell and hand it the pending vitals, which
/// [`Rule::reset_cell`] promotes after the commit.
#[derive(Debug, Clone)]
pub struct DarwinRule {
    params: Parameters,
    programs: Vec<Program>,
    rng: StdRng,
}

impl DarwinRule {
    /// Parses every species program found in `params`.
    pub fn new(params: Parameters, rng: StdRng) -> Result<Self> {
        let mut programs = Vec::new();
        for species in 1u32.. {
            let Some(source) = params.text(&program_key(species)) else {
                break;
            };
            programs.push(Program::parse(species, source)?);
        }
        if programs.is_empty() {
            tracing::error!(key = %program_key(1), "no species programs");
            return Err(LatticeError::UnknownParameter(program_key(1)));
        }
        Ok(Self {
            params,
            programs,
            rng,
        })
    }

    /// Program run by `species`.
    pub fn program(&self, species: u32) -> Option<&Program> {
        let index = usize::try_from(species.checked_sub(1)?).ok()?;
        self.programs.get(index)
    }

    fn sight(&self) -> Result<usize> {
        Ok(self.params.get(NEARBY_AHEAD)?.round().max(1.0) as usize)
    }
}

/// Ids of up to `sight` cells ahead, nearest first.
fn ahead(ctx: &CellContext<'_>, heading: Direction, sight: usize) -> Result<Vec<CellId>> {
    Ok(ctx
        .cell()
        .neighbors_toward(heading)?
        .iter()
        .take(sight)
        .copied()
        .collect())
}

/// Whether any of `ids` satisfies `predicate`.
fn sees(ctx: &CellContext<'_>, ids: &[CellId], predicate: impl Fn(u32) -> bool) -> Result<bool> {
    for &id in ids {
        if predicate(ctx.neighbor(id)?.state()) {
            return Ok(true);
        }
    }
    Ok(false)
}

impl Rule for DarwinRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::Darwin
    }

    fn num_states(&self) -> u32 {
        self.programs.len() as u32 + 1
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn should_skip(&self, ctx: &CellContext<'_>) -> bool {
        ctx.state() == EMPTY || ctx.cell().is_claimed()
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        let species = ctx.state();
        let sight = self.sight()?;
        let num_states = self.num_states();
        let Some(program) = species
            .checked_sub(1)
            .and_then(|index| self.programs.get(index as usize))
        else {
            return Err(LatticeError::InvalidState {
                state: species,
                num_states,
            });
        };

        let mut vitals = ctx.cell().vitals();
        let mut pc = vitals.instruction as usize % program.len();
        let mut moved_to = None;
        let mut acted = false;

        // a program that cannot reach an action within one pass never will
        for _ in 0..=program.len() {
            let command = program.commands[pc];
            let mut next = program.next(pc);
            match command {
                Command::Move => {
                    if let Some(&target) = ahead(ctx, vitals.heading, 1)?.first() {
                        let cell = ctx.neighbor(target)?;
                        if cell.state() == EMPTY && cell.next_state() == EMPTY && !cell.is_claimed()
                        {
                            ctx.claim(target, species)?;
                            moved_to = Some(target);
                        }
                    }
                }
                Command::Left(degrees) => {
                    vitals.heading = vitals.heading.rotate_ccw(eighths(degrees));
                }
                Command::Right(degrees) => {
                    vitals.heading = vitals.heading.rotate_cw(eighths(degrees));
                }
                Command::Infect(restart) => {
                    if let Some(&target) = ahead(ctx, vitals.heading, 1)?.first() {
                        let cell = ctx.neighbor(target)?;
                        let state = cell.state();
                        let in_place = cell.next_state() == state && !cell.is_claimed();
                        if state != EMPTY && state != species && in_place {
                            let victim = Vitals {
                                instruction: restart as u32,
                                heading: cell.vitals().heading,
                                ..Vitals::default()
                            };
                            ctx.claim(target, species)?;
                            ctx.neighbor_mut(target)?.set_next_vitals(victim);
                        }
                    }
                }
                Command::IfEmpty(target) => {
                    let ids = ahead(ctx, vitals.heading, sight)?;
                    if sees(ctx, &ids, |state| state == EMPTY)? {
                        next = target;
                    }
                }
                Command::IfWall(target) => {
                    if ahead(ctx, vitals.heading, 1)?.is_empty() {
                        next = target;
                    }
                }
                Command::IfSame(target) => {
                    let ids = ahead(ctx, vitals.heading, sight)?;
                    if sees(ctx, &ids, |state| state == species)? {
                        next = target;
                    }
                }
                Command::IfEnemy(target) => {
                    let ids = ahead(ctx, vitals.heading, sight)?;
                    if sees(ctx, &ids, |state| state != EMPTY && state != species)? {
                        next = target;
                    }
                }
                Command::IfRandom(target) => {
                    if self.rng.gen_bool(0.5) {
                        next = target;
                    }
                }
                Command::Go(target) => next = target,
            }
            pc = next;
            if command.is_action() {
                acted = true;
                break;
            }
        }
        if !acted {
            tracing::warn!(species, instruction = pc + 1, "program loops without acting");
        }

        vitals.instruction = pc as u32;
        match moved_to {
            Some(target) => {
                ctx.neighbor_mut(target)?.set_next_vitals(vitals);
                ctx.cell_mut().set_next_vitals(Vitals::default());
                Ok(EMPTY)
            }
            None => {
                ctx.cell_mut().set_next_vitals(vitals);
                Ok(species)
            }
        }
    }

    fn reset_cell(&self, cell: &mut Cell) {
        cell.roll_vitals();
    }

    fn prepare_cell(&self, cell: &mut Cell) {
        cell.set_vitals(Vitals::default());
        cell.set_next_vitals(Vitals::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid, ParamValue};
    use rand::SeedableRng;

    const SPINNER: &str = "left 90\n";
    const WALKER: &str = "move\n";
    const INFECTOR: &str = "infect 1\n";

    fn rule(sources: &[&str]) -> DarwinRule {
        let mut params = Parameters::new();
        params.extend(DEFAULTS.iter().copied());
        for (i, source) in sources.iter().enumerate() {
            params.set_extra(program_key(i as u32 + 1), ParamValue::Text(source.to_string()));
        }
        DarwinRule::new(params, StdRng::seed_from_u64(9)).unwrap()
    }

    fn setup(rule: &DarwinRule, states: &[u32]) -> Grid {
        let n = rule.num_states();
        let cells = states.iter().map(|&s| Cell::new(s, n).unwrap()).collect();
        let mut grid = Grid::new(cells, 3, 3).unwrap();
        grid.set_adjacent_neighbors().unwrap();
        for cell in grid.cells_mut() {
            rule.prepare_cell(cell);
        }
        grid
    }

    fn face(grid: &mut Grid, id: usize, heading: Direction) {
        let vitals = Vitals {
            heading,
            ..Vitals::default()
        };
        grid.cells_mut()[id].set_vitals(vitals);
    }

    fn tick(rule: &mut DarwinRule, grid: &mut Grid) {
        for id in 0..grid.len() {
            let mut ctx = CellContext::new(id, grid.cells_mut());
            rule.compute_next(&mut ctx).unwrap();
        }
        for cell in grid.cells_mut() {
            cell.commit();
            rule.reset_cell(cell);
        }
    }

    #[test]
    fn test_parse_aliases_and_comments() {
        let program = Program::parse(
            1,
            "# sample\nIFENEMY 4\n\nlt 90\ngo 1\ninf 2\nmv\nemp? 1\nrt\n",
        )
        .unwrap();
        assert_eq!(
            program.commands(),
            &[
                Command::IfEnemy(3),
                Command::Left(90),
                Command::Go(0),
                Command::Infect(1),
                Command::Move,
                Command::IfEmpty(0),
                Command::Right(90),
            ]
        );
    }

    #[test]
    fn test_parse_skips_unknown_commands() {
        let program = Program::parse(1, "hop\nmove\n").unwrap();
        assert_eq!(program.commands(), &[Command::Move]);
    }

    #[test]
    fn test_parse_rejects_bad_programs() {
        assert!(matches!(
            Program::parse(2, "move\ngo 5\n"),
            Err(LatticeError::InvalidProgram { species: 2, line: 2, .. })
        ));
        assert!(matches!(
            Program::parse(1, "go\n"),
            Err(LatticeError::InvalidProgram { line: 1, .. })
        ));
        assert!(matches!(
            Program::parse(1, "left ninety\n"),
            Err(LatticeError::InvalidProgram { .. })
        ));
        assert!(matches!(
            Program::parse(1, "# nothing\n"),
            Err(LatticeError::InvalidProgram { line: 0, .. })
        ));
    }

    #[test]
    fn test_program_display() {
        let program = Program::parse(1, "ifenemy 4\nleft 90\ngo 1\ninfect\n").unwrap();
        assert_eq!(
            program.to_string(),
            "1: IF_ENEMY 4\n2: LEFT 90\n3: GO 1\n4: INFECT 1\n"
        );
    }

    #[test]
    fn test_builtin_programs_parse() {
        let rule = DarwinRule::new(
            Parameters::for_kind(AutomatonKind::Darwin),
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(rule.num_states(), 3);
        assert_eq!(rule.program(1).map(Program::len), Some(5));
        assert_eq!(rule.program(2).map(Program::len), Some(11));
        assert!(rule.program(0).is_none());
    }

    #[test]
    fn test_missing_programs() {
        assert_eq!(
            DarwinRule::new(Parameters::new(), StdRng::seed_from_u64(0)).unwrap_err(),
            LatticeError::UnknownParameter("program1".to_string())
        );
    }

    #[test]
    fn test_turning_keeps_place() {
        let mut rule = rule(&[SPINNER]);
        let mut grid = setup(&rule, &[0, 0, 0, 0, 1, 0, 0, 0, 0]);
        tick(&mut rule, &mut grid);
        let center = &grid.cells()[4];
        assert_eq!(center.state(), 1);
        assert_eq!(center.vitals().heading, Direction::W);
        assert_eq!(center.vitals().instruction, 0);
    }

    #[test]
    fn test_move_carries_vitals() {
        let mut rule = rule(&[WALKER]);
        let mut grid = setup(&rule, &[0, 0, 0, 0, 1, 0, 0, 0, 0]);
        face(&mut grid, 4, Direction::E);
        tick(&mut rule, &mut grid);
        assert_eq!(grid.cells()[4].state(), EMPTY);
        assert_eq!(grid.cells()[5].state(), 1);
        assert_eq!(grid.cells()[5].vitals().heading, Direction::E);
        // blocked by the east edge from now on
        tick(&mut rule, &mut grid);
        assert_eq!(grid.cells()[5].state(), 1);
    }

    #[test]
    fn test_two_walkers_never_share_a_cell() {
        let mut rule = rule(&[WALKER]);
        let mut grid = setup(&rule, &[0, 0, 0, 1, 0, 1, 0, 0, 0]);
        face(&mut grid, 3, Direction::E);
        face(&mut grid, 5, Direction::W);
        tick(&mut rule, &mut grid);
        let creatures = grid.cells().iter().filter(|c| c.state() == 1).count();
        assert_eq!(creatures, 2);
        assert_eq!(grid.cells()[4].state(), 1);
    }

    #[test]
    fn test_infect_converts_enemy() {
        let mut rule = rule(&[INFECTOR, SPINNER]);
        let mut grid = setup(&rule, &[0, 0, 0, 0, 1, 2, 0, 0, 0]);
        face(&mut grid, 4, Direction::E);
        face(&mut grid, 5, Direction::S);
        tick(&mut rule, &mut grid);
        let victim = &grid.cells()[5];
        assert_eq!(victim.state(), 1);
        assert_eq!(victim.vitals().instruction, 0);
        // the victim lost its turn and kept its heading
        assert_eq!(victim.vitals().heading, Direction::S);
    }

    #[test]
    fn test_infect_spares_own_species() {
        let mut rule = rule(&[INFECTOR]);
        let mut grid = setup(&rule, &[0, 0, 0, 0, 1, 1, 0, 0, 0]);
        face(&mut grid, 4, Direction::E);
        tick(&mut rule, &mut grid);
        assert_eq!(grid.cells()[5].state(), 1);
        assert_eq!(grid.cells().iter().filter(|c| c.state() == 1).count(), 2);
    }

    #[test]
    fn test_conditionals_jump() {
        // faces north from the top row: wall, so it turns right instead of left
        let mut rule = rule(&["ifwall 3\nleft 90\nright 90\n"]);
        let mut grid = setup(&rule, &[0, 1, 0, 0, 0, 0, 0, 0, 0]);
        tick(&mut rule, &mut grid);
        let cell = &grid.cells()[1];
        assert_eq!(cell.vitals().heading, Direction::E);
        assert_eq!(cell.vitals().instruction, 0);
    }

    #[test]
    fn test_if_enemy_and_if_same() {
        let scout = "ifsame 4\nifenemy 5\nleft 90\nright 90\nright 180\n";
        let mut rule = rule(&[scout, SPINNER]);
        let mut grid = setup(&rule, &[0, 0, 0, 0, 1, 2, 0, 0, 0]);
        face(&mut grid, 4, Direction::E);
        tick(&mut rule, &mut grid);
        assert_eq!(grid.cells()[4].vitals().heading, Direction::W);
    }

    #[test]
    fn test_control_loop_ends_turn() {
        let mut rule = rule(&["go 1\n"]);
        let mut grid = setup(&rule, &[0, 0, 0, 0, 1, 0, 0, 0, 0]);
        tick(&mut rule, &mut grid);
        assert_eq!(grid.cells()[4].state(), 1);
    }

    #[test]
    fn test_eighths() {
        assert_eq!(eighths(90), 2);
        assert_eq!(eighths(45), 1);
        assert_eq!(eighths(30), 1);
        assert_eq!(eighths(360), 0);
        assert_eq!(eighths(0), 0);
    }
}
