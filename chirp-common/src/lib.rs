pub mod feed;
pub mod model;
