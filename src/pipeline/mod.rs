pub mod scores;
pub mod song;
