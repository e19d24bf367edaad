pub mod event;
pub mod product;
pub mod sale;
pub mod score;
