pub mod cipher;
pub mod column;
pub mod hash;

pub use cipher::*;
pub use column::*;
pub use hash::*;
