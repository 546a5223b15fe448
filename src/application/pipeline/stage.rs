use std::fmt;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageName {
    Syncer,
    Fetcher,
    Parser,
    Sequencer,
    Aggregator,
    Persistor,
}

impl StageName {
    pub const ORDERED: [StageName; 6] = [
        StageName::Syncer,
        StageName::Fetcher,
        StageName::Parser,
        StageName::Sequencer,
        StageName::Aggregator,
        StageName::Persistor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Syncer => "syncer",
            StageName::Fetcher => "fetcher",
            StageName::Parser => "parser",
            StageName::Sequencer => "sequencer",
            StageName::Aggregator => "aggregator",
            StageName::Persistor => "persistor",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
