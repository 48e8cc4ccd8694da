mod keybindings;

pub use keybindings::{Action, map_key_to_action};
