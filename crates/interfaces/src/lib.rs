pub mod hotkeys;
pub mod terminal;
pub mod traits;

pub use hotkeys::{HotkeyAction, HotkeyError, HotkeyRegistry, LocalHotkeys};
pub use terminal::TerminalInterface;
pub use traits::{AssistantEvent, Interface};
