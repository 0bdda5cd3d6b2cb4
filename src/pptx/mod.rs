//! OPC package handling and DrawingML emission for the output deck.

pub mod layouts;
pub mod package;
pub mod slide;
pub mod xml;

pub use package::PptxPackage;
pub use slide::SlideBuilder;
