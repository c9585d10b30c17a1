//! Self-replicating loop automata driven by symmetric transition tables.

use crate::{
    AutomatonKind, CellContext, Lookup, Parameters, Result, Rule, RuleTable, SymmetrySearch,
};

/// A table-driven loop automaton.
///
/// Each tick the acting cell's state key is looked up in every orientation
/// the search allows. Langton reads an absent neighbor as the quiescent
/// state `0`; the other loops leave it out, and such a cell keeps its state.
#[derive(Debug, Clone)]
pub struct LoopRule {
    params: Parameters,
    kind: AutomatonKind,
    num_states: u32,
    table: &'static RuleTable,
    search: SymmetrySearch,
    unmatched: Option<u32>,
}

impl LoopRule {
    /// Langton's loop: 8 states, cardinal neighbors, absent neighbors read
    /// as `0`, unmatched keys keep their state.
    pub fn langton(params: Parameters) -> Self {
        Self {
            params,
            kind: AutomatonKind::Langton,
            num_states: 8,
            table: &tables::LANGTON,
            search: SymmetrySearch::CARDINAL.padded(0),
            unmatched: None,
        }
    }

    /// Chou-Reggia loop: 8 states, cardinal neighbors, unmatched keys keep
    /// their state.
    pub fn chou_reg2(params: Parameters) -> Self {
        Self {
            params,
            kind: AutomatonKind::ChouReg2,
            num_states: 8,
            table: &tables::CHOU_REG2,
            search: SymmetrySearch::CARDINAL,
            unmatched: None,
        }
    }

    /// Petelka loop: 5 states, all eight neighbors with reflections,
    /// unmatched complete keys become `0`.
    pub fn petelka(params: Parameters) -> Self {
        Self {
            params,
            kind: AutomatonKind::Petelka,
            num_states: 5,
            table: &tables::PETELKA,
            search: SymmetrySearch::OCTAGONAL,
            unmatched: Some(0),
        }
    }

    /// The transition table.
    pub fn table(&self) -> &'static RuleTable {
        self.table
    }
}

impl Rule for LoopRule {
    fn kind(&self) -> AutomatonKind {
        self.kind
    }

    fn num_states(&self) -> u32 {
        self.num_states
    }

    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn apply(&mut self, ctx: &mut CellContext<'_>) -> Result<u32> {
        Ok(match self.search.search(ctx, self.table)? {
            Lookup::Found(state) => state,
            Lookup::Unmatched => self.unmatched.unwrap_or(ctx.state()),
            Lookup::Incomplete => ctx.state(),
        })
    }
}

/// Transition tables.
pub mod tables {
    use crate::RuleTable;

    /// Langton's loop transitions, keyed `self N E S W`.
    pub static LANGTON: RuleTable = RuleTable::new(&[
        ("00000", 0),
        ("00001", 2),
        ("00002", 0),
        ("00003", 0),
        ("00005", 0),
        ("00006", 3),
        ("00007", 1),
        ("00011", 2),
        ("00012", 2),
        ("00013", 2),
        ("00021", 2),
        ("00022", 0),
        ("00023", 0),
        ("00026", 2),
        ("00027", 2),
        ("00032", 0),
        ("00052", 5),
        ("00062", 2),
        ("00072", 2),
        ("00102", 2),
        ("00112", 0),
        ("00202", 0),
        ("00203", 0),
        ("00205", 0),
        ("00212", 5),
        ("00222", 0),
        ("00232", 2),
        ("00522", 2),
        ("01232", 1),
        ("01242", 1),
        ("01252", 5),
        ("01262", 1),
        ("01272", 1),
        ("01275", 1),
        ("01422", 1),
        ("01432", 1),
        ("01442", 1),
        ("01472", 1),
        ("01625", 1),
        ("01722", 1),
        ("01725", 5),
        ("01752", 1),
        ("01762", 1),
        ("01772", 1),
        ("02527", 1),
        ("10001", 1),
        ("10006", 1),
        ("10007", 7),
        ("10011", 1),
        ("10012", 1),
        ("10021", 1),
        ("10024", 4),
        ("10027", 7),
        ("10051", 1),
        ("10101", 1),
        ("10111", 1),
        ("10124", 4),
        ("10127", 7),
        ("10202", 6),
        ("10212", 1),
        ("10221", 1),
        ("10224", 4),
        ("10226", 3),
        ("10227", 7),
        ("10232", 7),
        ("10242", 4),
        ("10262", 6),
        ("10264", 4),
        ("10267", 7),
        ("10271", 0),
        ("10272", 7),
        ("10542", 7),
        ("11112", 1),
        ("11122", 1),
        ("11124", 4),
        ("11125", 1),
        ("11126", 1),
        ("11127", 7),
        ("11152", 2),
        ("11212", 1),
        ("11222", 1),
        ("11224", 4),
        ("11225", 1),
        ("11227", 7),
        ("11232", 1),
        ("11242", 4),
        ("11262", 1),
        ("11272", 7),
        ("11322", 1),
        ("12224", 4),
        ("12227", 7),
        ("12243", 4),
        ("12254", 7),
        ("12324", 4),
        ("12327", 7),
        ("12425", 5),
        ("12426", 7),
        ("12527", 5),
        ("20001", 2),
        ("20002", 2),
        ("20004", 2),
        ("20007", 1),
        ("20012", 2),
        ("20015", 2),
        ("20021", 2),
        ("20022", 2),
        ("20023", 2),
        ("20024", 2),
        ("20025", 0),
        ("20026", 2),
        ("20027", 2),
        ("20032", 6),
        ("20042", 3),
        ("20051", 7),
        ("20052", 2),
        ("20057", 5),
        ("20072", 2),
        ("20102", 2),
        ("20112", 2),
        ("20122", 2),
        ("20142", 2),
        ("20172", 2),
        ("20202", 2),
        ("20203", 2),
        ("20205", 2),
        ("20207", 3),
        ("20212", 2),
        ("20215", 2),
        ("20221", 2),
        ("20222", 2),
        ("20227", 2),
        ("20232", 1),
        ("20242", 2),
        ("20245", 2),
        ("20252", 0),
        ("20255", 2),
        ("20262", 2),
        ("20272", 2),
        ("20312", 2),
        ("20321", 6),
        ("20322", 6),
        ("20342", 2),
        ("20422", 2),
        ("20512", 2),
        ("20521", 2),
        ("20522", 2),
        ("20552", 1),
        ("20572", 5),
        ("20622", 2),
        ("20672", 2),
        ("20712", 2),
        ("20722", 2),
        ("20742", 2),
        ("20772", 2),
        ("21122", 2),
        ("21126", 1),
        ("21222", 2),
        ("21224", 2),
        ("21226", 2),
        ("21227", 2),
        ("21422", 2),
        ("21522", 2),
        ("21622", 2),
        ("21722", 2),
        ("22227", 2),
        ("22244", 2),
        ("22246", 2),
        ("22276", 2),
        ("22277", 2),
        ("30001", 3),
        ("30002", 2),
        ("30004", 1),
        ("30007", 6),
        ("30012", 3),
        ("30042", 1),
        ("30062", 2),
        ("30102", 1),
        ("30122", 0),
        ("30251", 1),
        ("40112", 0),
        ("40122", 0),
        ("40125", 0),
        ("40212", 0),
        ("40222", 1),
        ("40232", 6),
        ("40252", 0),
        ("40322", 1),
        ("50002", 2),
        ("50021", 5),
        ("50022", 5),
        ("50023", 2),
        ("50027", 2),
        ("50052", 0),
        ("50202", 2),
        ("50212", 2),
        ("50215", 2),
        ("50222", 0),
        ("50224", 4),
        ("50272", 2),
        ("51212", 2),
        ("51222", 0),
        ("51242", 2),
        ("51272", 2),
        ("60001", 1),
        ("60002", 1),
        ("60212", 0),
        ("61212", 5),
        ("61213", 1),
        ("61222", 5),
        ("70007", 7),
        ("70112", 0),
        ("70122", 0),
        ("70125", 0),
        ("70212", 0),
        ("70222", 1),
        ("70225", 1),
        ("70232", 1),
        ("70252", 5),
        ("70272", 0),
    ]);

    /// Chou-Reggia loop transitions, keyed `self N E S W`.
    pub static CHOU_REG2: RuleTable = RuleTable::new(&[
        ("00000", 0),
        ("00044", 0),
        ("00054", 7),
        ("00010", 0),
        ("00011", 0),
        ("00033", 0),
        ("00404", 0),
        ("00444", 5),
        ("00410", 0),
        ("00104", 0),
        ("00101", 0),
        ("00174", 0),
        ("00300", 0),
        ("00301", 0),
        ("00303", 0),
        ("00704", 0),
        ("00703", 0),
        ("00710", 4),
        ("00711", 0),
        ("04000", 0),
        ("04007", 0),
        ("04710", 0),
        ("05000", 7),
        ("01700", 0),
        ("07000", 0),
        ("07007", 7),
        ("07101", 0),
        ("40010", 1),
        ("40031", 3),
        ("40103", 3),
        ("40710", 3),
        ("41103", 3),
        ("43103", 3),
        ("50003", 3),
        ("50333", 0),
        ("10004", 5),
        ("10001", 1),
        ("10041", 4),
        ("10104", 4),
        ("10130", 1),
        ("10301", 1),
        ("10713", 1),
        ("14041", 4),
        ("14104", 4),
        ("11104", 4),
        ("13301", 1),
        ("17771", 1),
        ("30401", 1),
        ("30501", 1),
        ("30514", 1),
        ("30714", 1),
        ("34401", 1),
        ("34501", 1),
        ("35401", 0),
        ("31400", 1),
        ("37771", 1),
        ("70000", 0),
        ("70033", 7),
        ("70710", 0),
        ("70714", 1),
        ("70711", 0),
        ("71700", 0),
        ("73000", 7),
        ("77007", 0),
        ("77071", 1),
    ]);

    /// Petelka loop transitions, keyed `self N NE E SE S SW W NW`.
    pub static PETELKA: RuleTable = RuleTable::new(&[
        ("014000000", 1),
        ("123400000", 2),
        ("234100000", 2),
        ("041000000", 4),
        ("432100000", 2),
        ("341200000", 3),
        ("122400000", 3),
        ("223241000", 3),
        ("232200000", 2),
        ("422100000", 3),
        ("232214000", 3),
        ("322200000", 3),
        ("133400000", 2),
        ("333341000", 0),
        ("323333000", 2),
        ("233300000", 3),
        ("433100000", 3),
        ("333314000", 0),
        ("332333000", 1),
        ("333200000", 4),
    ]);
}
