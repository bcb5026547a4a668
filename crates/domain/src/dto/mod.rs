pub mod action;
pub mod attempts;
pub mod game;
pub mod ranking;
pub mod search;
