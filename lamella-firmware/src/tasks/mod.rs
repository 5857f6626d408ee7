//! Embassy async tasks
//!
//! The control loop and the edge tasks run on the high-priority interrupt
//! executor; everything else runs in thread mode.

pub mod buzzer;
pub mod command;
pub mod control;
pub mod link;
pub mod persistence;
pub mod report;
pub mod supervisor;

pub use buzzer::buzzer_task;
pub use command::command_task;
pub use control::{button_task, control_task, rotation_task, BoardController};
pub use link::{link_rx_task, link_tx_task};
pub use persistence::persistence_task;
pub use supervisor::supervisor_task;
