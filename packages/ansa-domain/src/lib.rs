pub mod faq;
pub mod links;
pub mod render;
