pub mod paths;
pub mod reader;
pub mod writer;

pub use reader::TrackReader;
pub use writer::{OutputColumns, SummaryWriter};
