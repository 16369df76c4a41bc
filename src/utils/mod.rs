mod time;
pub use time::*;

mod url;
pub use url::*;
