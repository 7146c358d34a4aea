// Software convolution backend

pub mod kernel;

pub use kernel::{conv1d, conv1d_at};
