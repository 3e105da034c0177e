pub mod utils;

mod pipeline;
