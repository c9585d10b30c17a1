use crate::{AutomatonKind, CellContext, LatticeError, ParamValue, Parameters, Result, Rule};

/// Dead cell.
pub const DEAD: u32 = 0;
/// Live cell.
pub const ALIVE: u32 = 1;

/// Extra holding the birth counts.
pub const BIRTH_KEY: &str = "B";
/// Extra holding the survival counts.
pub const SURVIVE_KEY: &str = "S";

/// Life-like rule with configurable birth and survival counts.
///
/// A dead cell is born when its live-neighbor count is in the birth set; a
/// live cell survives when its count is in the survival set.
///
/// # Example
///
/// ```
/// use unshape_lattice::{LifeRule, Parameters, AutomatonKind};
///
/// let rule = LifeRule::new(Parameters::for_kind(AutomatonKind::GameOfLife));
/// assert_eq!(rule.birth(), &[3]);
/// assert_eq!(rule.survive(), &[2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct LifeRule {
    params: Parameters,
    birth: Vec<u32>,
    survive: Vec<u32>,
}

impl LifeRule {
    /// Builds the rule from the `B` and `S` extras, defaulting to B3/S23.
    pub fn new(params: Parameters) -> Self {
        let (default_birth, default_survive) = rules::LIFE;
        let birth = params
            .int_list(BIRTH_KEY)
            .unwrap_or(default_birth)
            .to_vec();
        let survive = params
            .int_list(SURVIVE_KEY)
            .unwrap_or(default_survive)
            .to_vec();
        Self {
            params,
            birth,
            survive,
        }
    }

    /// Builds the rule from explicit counts, recording them as extras.
    pub fn with_counts(mut params: Parameters, birth: &[u32], survive: &[u32]) -> Self {
        params.set_extra(BIRTH_KEY, ParamValue::IntList(birth.to_vec()));
        params.set_extra(SURVIVE_KEY, ParamValue::IntList(survive.to_vec()));
        Self::new(params)
    }

    /// Parses `B3/S23`-style notation into `(birth, survive)` counts.
    ///
    /// Either part may be empty (`B2/S` is Seeds).
    pub fn parse_notation(notation: &str) -> Result<(Vec<u32>, Vec<u32>)> {
        let invalid = || LatticeError::InvalidNotation(notation.to_string());
        let (b, s) = notation.trim().split_once('/').ok_or_else(invalid)?;
        let b = b.strip_prefix(['B', 'b']).ok_or_else(invalid)?;
        let s = s.strip_prefix(['S', 's']).ok_or_else(invalid)?;
        let digits = |part: &str| {
            part.chars()
                .map(|c| c.to_digit(10).filter(|&d| d <= 8).ok_or_else(invalid))
                .collect::<Result<Vec<u32>>>()
        };
        Ok((digits(b)?, digits(s)?))
    }

    /// Builds the rule from `B3/S23`-style notation.
    pub fn from_notation(params: Parameters, notation: &str) -> Result<Self> {
        let (birth, survive) = Self::parse_notation(notation)?;
        Ok(Self::with_counts(params, &birth, &survive))
    }

    /// Live-neighbor counts that cause birth.
    pub fn birth(&self) -> &[u32] {
        &self.birth
    }

    /// Live-neighbor counts that allow survival.
    pub fn survive(&self) -> &[u32] {
        &self.survive
    }
}

impl Rule for LifeRule {
    fn kind(&self) -> AutomatonKind {
        AutomatonKind::GameOfLife
    }

    fn num_states(&self) -> u32 {
        2
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        let alive = ctx.count_neighbors(ALIVE)? as u32;
        let next = if ctx.state() == ALIVE {
            self.survive.contains(&alive)
        } else {
            self.birth.contains(&alive)
        };
        Ok(if next { ALIVE } else { DEAD })
    }
}

/// Common life-like rule presets as `(birth, survive)`.
pub mod rules {
    /// Game of Life (B3/S23) - classic rules.
    pub const LIFE: (&[u32], &[u32]) = (&[3], &[2, 3]);

    /// HighLife (B36/S23) - similar to Life but with a replicator.
    pub const HIGH_LIFE: (&[u32], &[u32]) = (&[3, 6], &[2, 3]);

    /// Seeds (B2/S) - every live cell dies each tick.
    pub const SEEDS: (&[u32], &[u32]) = (&[2], &[]);

    /// Day & Night (B3678/S34678) - symmetric under inversion.
    pub const DAY_NIGHT: (&[u32], &[u32]) = (&[3, 6, 7, 8], &[3, 4, 6, 7, 8]);

    /// Life without Death (B3/S012345678) - cells never die.
    pub const LIFE_WITHOUT_DEATH: (&[u32], &[u32]) = (&[3], &[0, 1, 2, 3, 4, 5, 6, 7, 8]);

    /// Maze (B3/S12345) - grows maze-like corridors.
    pub const MAZE: (&[u32], &[u32]) = (&[3], &[1, 2, 3, 4, 5]);
}
