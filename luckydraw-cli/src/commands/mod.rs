pub mod draw;
pub mod prizes;
pub mod roster;
pub mod status;
pub mod winners;

pub use draw::{handle_draw_command, DrawArgs};
pub use prizes::{handle_prize_command, PrizeCommands};
pub use roster::{handle_roster_command, RosterCommands};
pub use status::handle_status_command;
pub use winners::{handle_winner_command, WinnerCommands};
