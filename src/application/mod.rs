pub mod interactive;
pub mod mine;

pub use interactive::InteractivePredictor;
pub use mine::{MineOptions, MineReport, MineUsecase};
