pub mod codec;
pub mod frame;
pub mod renderer;
pub mod scene;

pub use codec::*;
pub use frame::*;
pub use renderer::*;
pub use scene::*;
