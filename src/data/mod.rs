/// Table storage and I/O

pub mod dataset;
pub mod frame;
pub mod loader;
pub mod writer;

pub use frame::{Column, Frame};
pub use loader::DataLoader;
pub use writer::{DataWriter, PartitionSizes};
