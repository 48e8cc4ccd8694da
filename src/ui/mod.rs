mod app_layout;
mod help_popup;
pub mod markdown;
mod status_bar;
mod styles;
pub mod thread_view;
pub mod time_ago;

pub use app_layout::render;
