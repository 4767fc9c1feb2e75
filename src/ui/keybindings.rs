// Keybindings for the cave portfolio
// Handles room navigation and lightbox dismissal
//
// Keybindings:
// - Arrow keys / WASD: Move one room
// - Escape: Close the lightbox
//
// Every handled key is also reported so the debug panel can show the last input.

use gdk4::Key;
use gtk4::prelude::*;
use gtk4::{EventControllerKey, PropagationPhase, Widget};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::grid::Direction;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Navigate(Direction),
    CloseLightbox,
}

/// Map a key to its action, independent of the current mode
pub fn action_for_key(keyval: Key) -> Option<KeyAction> {
    let direction = match keyval {
        Key::Up | Key::w | Key::W => Direction::Up,
        Key::Down | Key::s | Key::S => Direction::Down,
        Key::Left | Key::a | Key::A => Direction::Left,
        Key::Right | Key::d | Key::D => Direction::Right,
        Key::Escape => return Some(KeyAction::CloseLightbox),
        _ => return None,
    };
    Some(KeyAction::Navigate(direction))
}

/// Callback type for navigation requests
pub type NavigateCallback = Box<dyn Fn(Direction)>;

/// Callback type for lightbox close requests
pub type CloseLightboxCallback = Box<dyn Fn()>;

/// Callback type for reporting the last key
pub type KeyReportedCallback = Box<dyn Fn(&str)>;

/// Keybinding manager for the main window
pub struct Keybindings {
    controller: EventControllerKey,
    lightbox_open: Rc<Cell<bool>>,
    on_navigate: Rc<RefCell<Option<NavigateCallback>>>,
    on_close_lightbox: Rc<RefCell<Option<CloseLightboxCallback>>>,
    on_key_reported: Rc<RefCell<Option<KeyReportedCallback>>>,
}

impl Keybindings {
    pub fn new() -> Self {
        let controller = EventControllerKey::new();
        controller.set_propagation_phase(PropagationPhase::Capture);

        let lightbox_open = Rc::new(Cell::new(false));
        let on_navigate: Rc<RefCell<Option<NavigateCallback>>> = Rc::new(RefCell::new(None));
        let on_close_lightbox: Rc<RefCell<Option<CloseLightboxCallback>>> =
            Rc::new(RefCell::new(None));
        let on_key_reported: Rc<RefCell<Option<KeyReportedCallback>>> =
            Rc::new(RefCell::new(None));

        let lightbox_open_clone = lightbox_open.clone();
        let on_navigate_clone = on_navigate.clone();
        let on_close_lightbox_clone = on_close_lightbox.clone();
        let on_key_reported_clone = on_key_reported.clone();

        controller.connect_key_pressed(move |_controller, keyval, _keycode, _state| {
            let handled = Self::handle_key_press(
                keyval,
                &lightbox_open_clone,
                &on_navigate_clone,
                &on_close_lightbox_clone,
                &on_key_reported_clone,
            );

            if handled {
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        });

        Self {
            controller,
            lightbox_open,
            on_navigate,
            on_close_lightbox,
            on_key_reported,
        }
    }

    /// Attach keybindings to a widget (typically the main window)
    pub fn attach(&self, widget: &impl IsA<Widget>) {
        widget.add_controller(self.controller.clone());
    }

    /// While the lightbox is open only Escape is handled
    pub fn set_lightbox_open(&self, open: bool) {
        self.lightbox_open.set(open);
    }

    pub fn connect_navigate<F>(&self, callback: F)
    where
        F: Fn(Direction) + 'static,
    {
        *self.on_navigate.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_close_lightbox<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        *self.on_close_lightbox.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_key_reported<F>(&self, callback: F)
    where
        F: Fn(&str) + 'static,
    {
        *self.on_key_reported.borrow_mut() = Some(Box::new(callback));
    }

    fn handle_key_press(
        keyval: Key,
        lightbox_open: &Rc<Cell<bool>>,
        on_navigate: &Rc<RefCell<Option<NavigateCallback>>>,
        on_close_lightbox: &Rc<RefCell<Option<CloseLightboxCallback>>>,
        on_key_reported: &Rc<RefCell<Option<KeyReportedCallback>>>,
    ) -> bool {
        let Some(action) = action_for_key(keyval) else {
            return false;
        };

        if let Some(ref callback) = *on_key_reported.borrow() {
            let name = keyval.name().map(|n| n.to_string()).unwrap_or_default();
            callback(&name);
        }

        match action {
            KeyAction::CloseLightbox => {
                if !lightbox_open.get() {
                    return false;
                }
                if let Some(ref callback) = *on_close_lightbox.borrow() {
                    callback();
                }
                true
            }
            KeyAction::Navigate(direction) => {
                // Swallow navigation while the lightbox covers the rooms
                if lightbox_open.get() {
                    return true;
                }
                if let Some(ref callback) = *on_navigate.borrow() {
                    callback(direction);
                }
                true
            }
        }
    }
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::new()
    }
}
