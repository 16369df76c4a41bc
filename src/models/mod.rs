mod service;
pub use service::*;

mod decision;
pub use decision::*;
