//! Domain models.

mod account;
mod intake;
mod patient;
mod questionnaire;
mod visit;

pub use account::*;
pub use intake::*;
pub use patient::*;
pub use questionnaire::*;
pub use visit::*;
