mod debug_panel;
mod dialogs;
mod gallery_view;
mod keybindings;
mod lightbox;
mod rooms;
mod window;

pub use window::MainWindow;
