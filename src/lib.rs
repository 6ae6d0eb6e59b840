// Watchword: suspicious-content screening for financial communications
//
// This is the library root. Each module corresponds to a major subsystem
// of the screening pipeline.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod normalize;
pub mod output;
pub mod table;
pub mod topics;
