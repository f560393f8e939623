pub mod refresh;
pub mod run;
pub mod selection;
pub mod session;
pub mod util;
