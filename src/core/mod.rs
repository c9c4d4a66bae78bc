pub mod article;
pub mod date;
pub mod tag_filter;
pub mod text;
