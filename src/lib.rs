pub mod chart;
pub mod converter;
pub mod error;
pub mod ssq;
pub mod timeline;

pub use chart::Chart;
pub use converter::Converter;
pub use error::Error;
