mod header;

pub use bitcoin::block::{BlockHash, Header as InnerHeader, ValidationError};
pub use header::PowHeader;
