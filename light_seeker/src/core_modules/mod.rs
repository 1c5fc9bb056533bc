pub mod band;
pub mod direction_selector;
pub mod frame_analyzer;
pub mod heading;
pub mod movement;
pub mod obstacle_guard;
pub mod run_statistics;
