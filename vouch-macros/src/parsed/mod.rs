mod bean;
mod constraint;
mod executable;
mod types;

pub(crate) use bean::ParsedBean;
pub(crate) use executable::ConstrainedImpl;
