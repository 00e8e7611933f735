mod backing_buffer;
mod read;
mod seek;
mod write;

pub use backing_buffer::*;
pub use read::*;
pub use seek::*;
pub use write::*;
