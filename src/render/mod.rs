pub(crate) mod blit;
pub mod compositor;
pub(crate) mod placeholder;
pub mod raster;
pub(crate) mod text;
