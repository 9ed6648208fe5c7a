pub(crate) mod jobs;
pub(crate) mod logs;
pub(crate) mod units;
