mod controller;
mod notice;
mod projector;

pub use controller::{BoardController, DragSession, ItemState, MoveOutcome};
pub use notice::{Notice, NoticeLevel};
pub use projector::{Board, Column, project};
