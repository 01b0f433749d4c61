mod findings;

pub use findings::{EggAggregate, FindingRepository, NewFinding, RegisteredFinding};
