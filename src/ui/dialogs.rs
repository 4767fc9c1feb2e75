// Modal dialogs: blocking notices, yes/no confirmations and the login form

use gtk4::prelude::*;
use gtk4::{Align, Box as GtkBox, Button, Entry, Label, Orientation, PasswordEntry, Window};
use std::cell::Cell;
use std::rc::Rc;

use crate::models::GalleryError;

const DIALOG_MARGIN: i32 = 12;

/// User-facing messages shown in a blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    LoggedIn,
    LoggedOut,
    LoginRequired,
    /// Delete attempted without a session.
    ArtistOnly,
    InvalidCredentials,
    TooLarge(String),
    Unsupported(String),
    Uploaded(String),
    Deleted(String),
    SettingsSaved,
    Failed(String),
}

impl Notice {
    pub fn text(&self) -> String {
        match self {
            Notice::LoggedIn => "Logged in".to_string(),
            Notice::LoggedOut => "Logged out".to_string(),
            Notice::LoginRequired => "Please log in first".to_string(),
            Notice::ArtistOnly => {
                "Please log in! Only listed artists can manage the gallery".to_string()
            }
            Notice::InvalidCredentials => "Wrong account or password".to_string(),
            Notice::TooLarge(name) => format!("{} exceeds the size limit", name),
            Notice::Unsupported(name) => format!("{} is not an image or video", name),
            Notice::Uploaded(name) => format!("Uploaded {}", name),
            Notice::Deleted(name) => format!("Deleted {}", name),
            Notice::SettingsSaved => "Settings saved".to_string(),
            Notice::Failed(reason) => format!("Something went wrong: {}", reason),
        }
    }

    /// Notice for a failed gallery action. A cancelled delete stays silent.
    pub fn for_error(err: &GalleryError) -> Option<Notice> {
        match err {
            GalleryError::NotAuthenticated => Some(Notice::LoginRequired),
            GalleryError::TooLarge { name, .. } => Some(Notice::TooLarge(name.clone())),
            GalleryError::UnsupportedType(name) => Some(Notice::Unsupported(name.clone())),
            GalleryError::Cancelled => None,
            other => Some(Notice::Failed(other.to_string())),
        }
    }
}

pub struct DialogShell {
    pub dialog: Window,
    pub content: GtkBox,
}

pub fn build_dialog_shell(parent: &impl IsA<Window>, title: &str, width: i32) -> DialogShell {
    let dialog = Window::builder()
        .title(title)
        .transient_for(parent)
        .modal(true)
        .resizable(false)
        .default_width(width)
        .build();

    let content = GtkBox::new(Orientation::Vertical, 12);
    content.set_margin_top(DIALOG_MARGIN);
    content.set_margin_bottom(DIALOG_MARGIN);
    content.set_margin_start(DIALOG_MARGIN);
    content.set_margin_end(DIALOG_MARGIN);
    content.add_css_class("dialog-content");

    dialog.set_child(Some(&content));

    DialogShell { dialog, content }
}

fn button_row(buttons: &[&Button]) -> GtkBox {
    let row = GtkBox::new(Orientation::Horizontal, 8);
    row.set_halign(Align::End);
    for button in buttons {
        row.append(*button);
    }
    row
}

/// Modal notice with a single OK button.
pub fn show_notice(parent: &impl IsA<Window>, notice: &Notice) {
    let shell = build_dialog_shell(parent, "Notice", 320);
    let label = Label::new(Some(&notice.text()));
    label.set_wrap(true);
    label.set_halign(Align::Start);
    shell.content.append(&label);

    let ok_button = Button::with_label("OK");
    shell.content.append(&button_row(&[&ok_button]));

    let dialog_weak = shell.dialog.downgrade();
    ok_button.connect_clicked(move |_| {
        if let Some(dialog) = dialog_weak.upgrade() {
            dialog.close();
        }
    });

    shell.dialog.set_default_widget(Some(&ok_button));
    shell.dialog.present();
    tracing::debug!("Notice: {}", notice.text());
}

/// Ask a yes/no question; `on_answer` runs exactly once.
pub fn confirm<F>(parent: &impl IsA<Window>, message: &str, on_answer: F)
where
    F: Fn(bool) + 'static,
{
    let shell = build_dialog_shell(parent, "Confirm", 320);
    let label = Label::new(Some(message));
    label.set_wrap(true);
    label.set_halign(Align::Start);
    shell.content.append(&label);

    let cancel_button = Button::with_label("Cancel");
    let ok_button = Button::with_label("OK");
    shell
        .content
        .append(&button_row(&[&cancel_button, &ok_button]));

    let answered = Rc::new(Cell::new(false));
    let on_answer = Rc::new(on_answer);
    let answer = {
        let dialog_weak = shell.dialog.downgrade();
        let answered = answered.clone();
        let on_answer = on_answer.clone();
        Rc::new(move |yes: bool| {
            if answered.replace(true) {
                return;
            }
            if let Some(dialog) = dialog_weak.upgrade() {
                dialog.close();
            }
            on_answer(yes);
        })
    };

    let answer_ok = answer.clone();
    ok_button.connect_clicked(move |_| answer_ok(true));
    let answer_cancel = answer.clone();
    cancel_button.connect_clicked(move |_| answer_cancel(false));

    // Closing the window counts as "no"
    shell.dialog.connect_close_request(move |_| {
        if !answered.replace(true) {
            on_answer(false);
        }
        glib::Propagation::Proceed
    });

    shell.dialog.set_default_widget(Some(&ok_button));
    shell.dialog.present();
}

/// Login form. `on_submit` returns whether the dialog should close;
/// `on_closed` runs once however the dialog goes away.
pub fn prompt_login<S, C>(parent: &impl IsA<Window>, on_submit: S, on_closed: C)
where
    S: Fn(&str, &str) -> bool + 'static,
    C: Fn() + 'static,
{
    let shell = build_dialog_shell(parent, "Artist login", 280);
    let dialog = shell.dialog;
    let content = shell.content;

    let user_label = Label::new(Some("Account"));
    user_label.set_halign(Align::Start);
    let user_entry = Entry::new();
    user_entry.set_hexpand(true);

    let password_label = Label::new(Some("Password"));
    password_label.set_halign(Align::Start);
    let password_entry = PasswordEntry::new();
    password_entry.set_show_peek_icon(true);

    let cancel_button = Button::with_label("Cancel");
    let confirm_button = Button::with_label("Log in");

    content.append(&user_label);
    content.append(&user_entry);
    content.append(&password_label);
    content.append(&password_entry);
    content.append(&button_row(&[&cancel_button, &confirm_button]));

    let dialog_weak = dialog.downgrade();
    let user_for_submit = user_entry.clone();
    let password_for_submit = password_entry.clone();
    let submit = Rc::new(move || {
        let user = user_for_submit.text().to_string();
        let password = password_for_submit.text().to_string();
        if on_submit(&user, &password) {
            if let Some(dialog) = dialog_weak.upgrade() {
                dialog.close();
            }
        } else {
            password_for_submit.set_text("");
        }
    });

    let submit_for_button = submit.clone();
    confirm_button.connect_clicked(move |_| submit_for_button());
    let submit_for_entry = submit.clone();
    password_entry.connect_activate(move |_| submit_for_entry());

    let dialog_weak = dialog.downgrade();
    cancel_button.connect_clicked(move |_| {
        if let Some(dialog) = dialog_weak.upgrade() {
            dialog.close();
        }
    });

    dialog.connect_close_request(move |_| {
        on_closed();
        glib::Propagation::Proceed
    });

    dialog.set_default_widget(Some(&confirm_button));
    dialog.present();
    user_entry.grab_focus();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_texts() {
        assert_eq!(Notice::LoginRequired.text(), "Please log in first");
        assert_eq!(
            Notice::TooLarge("big.mp4".into()).text(),
            "big.mp4 exceeds the size limit"
        );
        assert!(Notice::ArtistOnly.text().starts_with("Please log in!"));
    }

    #[test]
    fn test_notice_for_gallery_errors() {
        assert_eq!(
            Notice::for_error(&GalleryError::NotAuthenticated),
            Some(Notice::LoginRequired)
        );
        let too_large = GalleryError::TooLarge {
            name: "huge.png".into(),
            size: 40,
            limit: 30,
        };
        assert_eq!(
            Notice::for_error(&too_large),
            Some(Notice::TooLarge("huge.png".into()))
        );
        assert_eq!(Notice::for_error(&GalleryError::Cancelled), None);
        assert_eq!(
            Notice::for_error(&GalleryError::NotFound),
            Some(Notice::Failed("artwork not found".into()))
        );
    }
}
