mod storage;

pub use storage::{load_threads, parse_threads};
