pub mod clustering;
pub mod naming;
pub mod stripes;
pub mod shapes;
pub mod layout;
pub mod complexity;

pub use clustering::*;
pub use naming::*;
pub use stripes::*;
pub use shapes::*;
pub use layout::*;
pub use complexity::*;
