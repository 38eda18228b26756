pub mod color;
pub mod decode;
pub mod fetch;
pub mod font;
pub mod palette;
pub(crate) mod svg_raster;
