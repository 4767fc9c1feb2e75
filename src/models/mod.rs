pub mod debug_info;
pub mod gallery;
pub mod gallery_store;
pub mod media_item;
pub mod session;
pub mod showcase;

pub use debug_info::*;
pub use gallery::*;
pub use gallery_store::*;
pub use media_item::*;
pub use session::*;
pub use showcase::*;
