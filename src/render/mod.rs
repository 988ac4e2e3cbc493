pub mod annotations;
pub mod backend;
pub mod decorations;
pub mod raster;
pub mod scene;
pub mod vector;
