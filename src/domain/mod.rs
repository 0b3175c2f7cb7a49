pub mod deadline;
pub mod error;
pub mod path;
pub mod prediction;
pub mod token;
pub mod tree;
