pub mod input;
pub mod keys;
pub mod mode;
pub mod view;
