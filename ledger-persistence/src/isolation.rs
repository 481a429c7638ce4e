/// Transaction isolation levels the engines can request. The wallet engine
/// always opens `Serializable`; the interest engine is content with
/// `ReadCommitted` (and would also be correct under `Serializable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadCommitted,
    Serializable,
}

impl IsolationLevel {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}
