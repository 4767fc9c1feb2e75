// Gallery wall inside the R1_D1..R1_D5 rooms
// Toolbar (filter row, sort toggle, login, upload) above a FlowBox of tiles.
// Left click opens the lightbox, right click asks to delete. Hovered tiles
// grow and glow; video tiles play a muted preview while hovered.

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, Button, ContentFit, EventControllerMotion, FlowBox, GestureClick, Label,
    MediaFile, Orientation, Overlay, Picture, PolicyType, ScrolledWindow, SelectionMode, Widget,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::lightbox::{load_texture, media_file};
use crate::models::{GalleryItem, SortMode};

const TILE_SIZE: i32 = 220;

type ItemCallback = Rc<RefCell<Option<Box<dyn Fn(u64)>>>>;
type TagCallback = Rc<RefCell<Option<Box<dyn Fn(&str)>>>>;
type ActionCallback = Rc<RefCell<Option<Box<dyn Fn()>>>>;

fn invoke(callback: &ActionCallback) {
    if let Some(ref callback) = *callback.borrow() {
        callback();
    }
}

pub struct GalleryView {
    root: GtkBox,
    flow: FlowBox,
    filter_buttons: Vec<(&'static str, Button)>,
    sort_button: Button,
    login_button: Button,
    upload_button: Button,
    count_label: Label,
    textures: RefCell<HashMap<u64, Texture>>,
    previews: RefCell<HashMap<u64, MediaFile>>,
    on_open: ItemCallback,
    on_delete: ItemCallback,
    on_filter: TagCallback,
    on_sort: ActionCallback,
    on_login: ActionCallback,
    on_upload: ActionCallback,
}

impl GalleryView {
    pub fn new(tags: &[&'static str]) -> Rc<Self> {
        let root = GtkBox::new(Orientation::Vertical, 8);
        root.add_css_class("gallery-room");
        root.set_hexpand(true);
        root.set_vexpand(true);

        let toolbar = GtkBox::new(Orientation::Horizontal, 8);
        toolbar.add_css_class("gallery-toolbar");
        toolbar.set_margin_start(12);
        toolbar.set_margin_end(12);
        toolbar.set_margin_top(12);

        let on_filter: TagCallback = Rc::new(RefCell::new(None));
        let mut filter_buttons = Vec::with_capacity(tags.len());
        for &tag in tags {
            let button = Button::with_label(tag);
            button.add_css_class("filter-button");
            let on_filter = on_filter.clone();
            button.connect_clicked(move |_| {
                if let Some(ref callback) = *on_filter.borrow() {
                    callback(tag);
                }
            });
            toolbar.append(&button);
            filter_buttons.push((tag, button));
        }

        let spacer = GtkBox::new(Orientation::Horizontal, 0);
        spacer.set_hexpand(true);
        toolbar.append(&spacer);

        let count_label = Label::new(None);
        count_label.add_css_class("muted");
        toolbar.append(&count_label);

        let sort_button = Button::with_label("Sort: date");
        sort_button.set_tooltip_text(Some("Toggle date / name order"));
        let login_button = Button::with_label("Log in");
        let upload_button = Button::with_label("Upload");
        upload_button.set_sensitive(false);
        toolbar.append(&sort_button);
        toolbar.append(&login_button);
        toolbar.append(&upload_button);

        let flow = FlowBox::new();
        flow.set_selection_mode(SelectionMode::None);
        flow.set_homogeneous(true);
        flow.set_valign(Align::Start);
        flow.set_column_spacing(12);
        flow.set_row_spacing(12);
        flow.set_margin_start(12);
        flow.set_margin_end(12);
        flow.add_css_class("gallery-wall");

        // The wall scrolls on its own; the zone keeps a fixed five-room height
        let wall = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Never)
            .vscrollbar_policy(PolicyType::Automatic)
            .child(&flow)
            .vexpand(true)
            .build();

        root.append(&toolbar);
        root.append(&wall);

        let on_sort: ActionCallback = Rc::new(RefCell::new(None));
        let on_login: ActionCallback = Rc::new(RefCell::new(None));
        let on_upload: ActionCallback = Rc::new(RefCell::new(None));

        let callback = on_sort.clone();
        sort_button.connect_clicked(move |_| invoke(&callback));
        let callback = on_login.clone();
        login_button.connect_clicked(move |_| invoke(&callback));
        let callback = on_upload.clone();
        upload_button.connect_clicked(move |_| invoke(&callback));

        Rc::new(Self {
            root,
            flow,
            filter_buttons,
            sort_button,
            login_button,
            upload_button,
            count_label,
            textures: RefCell::new(HashMap::new()),
            previews: RefCell::new(HashMap::new()),
            on_open: Rc::new(RefCell::new(None)),
            on_delete: Rc::new(RefCell::new(None)),
            on_filter,
            on_sort,
            on_login,
            on_upload,
        })
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    /// Replace the wall with `items`, in order.
    pub fn render(&self, items: &[&GalleryItem]) {
        self.flow.remove_all();
        for item in items {
            let tile = self.build_tile(item);
            self.flow.insert(&tile, -1);
        }

        let live: Vec<u64> = items.iter().map(|i| i.fingerprint()).collect();
        self.textures.borrow_mut().retain(|fp, _| live.contains(fp));
        self.previews.borrow_mut().retain(|fp, preview| {
            preview.pause();
            live.contains(fp)
        });
        self.count_label.set_text(&format!("{} works", items.len()));
    }

    pub fn set_active_filter(&self, tag: &str) {
        for (button_tag, button) in &self.filter_buttons {
            if *button_tag == tag {
                button.add_css_class("active");
            } else {
                button.remove_css_class("active");
            }
        }
    }

    pub fn set_sort_mode(&self, mode: SortMode) {
        self.sort_button.set_label(&format!("Sort: {}", mode.label()));
        if mode == SortMode::Date {
            self.sort_button.add_css_class("active");
        } else {
            self.sort_button.remove_css_class("active");
        }
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.login_button
            .set_label(if logged_in { "Log out" } else { "Log in" });
        self.upload_button.set_sensitive(logged_in);
    }

    pub fn connect_open<F: Fn(u64) + 'static>(&self, callback: F) {
        *self.on_open.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_delete<F: Fn(u64) + 'static>(&self, callback: F) {
        *self.on_delete.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_filter<F: Fn(&str) + 'static>(&self, callback: F) {
        *self.on_filter.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_sort<F: Fn() + 'static>(&self, callback: F) {
        *self.on_sort.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_login<F: Fn() + 'static>(&self, callback: F) {
        *self.on_login.borrow_mut() = Some(Box::new(callback));
    }

    pub fn connect_upload<F: Fn() + 'static>(&self, callback: F) {
        *self.on_upload.borrow_mut() = Some(Box::new(callback));
    }

    fn tile_texture(&self, item: &GalleryItem) -> Option<Texture> {
        let fingerprint = item.fingerprint();
        if let Some(texture) = self.textures.borrow().get(&fingerprint) {
            return Some(texture.clone());
        }
        let texture = load_texture(&item.data)?;
        self.textures
            .borrow_mut()
            .insert(fingerprint, texture.clone());
        Some(texture)
    }

    /// Muted, looping stream shown on a video tile.
    fn tile_preview(&self, item: &GalleryItem) -> MediaFile {
        let fingerprint = item.fingerprint();
        if let Some(preview) = self.previews.borrow().get(&fingerprint) {
            return preview.clone();
        }
        let preview = media_file(&item.data);
        preview.set_muted(true);
        preview.set_loop(true);
        self.previews
            .borrow_mut()
            .insert(fingerprint, preview.clone());
        preview
    }

    fn build_tile(&self, item: &GalleryItem) -> Widget {
        let overlay = Overlay::new();
        overlay.set_size_request(TILE_SIZE, TILE_SIZE);
        overlay.add_css_class("gallery-item");
        overlay.set_tooltip_text(Some(&item.name));

        let preview = if item.is_video() {
            let preview = self.tile_preview(item);
            let picture = Picture::for_paintable(&preview);
            picture.set_can_shrink(true);
            picture.set_content_fit(ContentFit::Cover);
            overlay.set_child(Some(&picture));

            let badge = Label::new(Some("[VIDEO]"));
            badge.add_css_class("video-badge");
            badge.set_halign(Align::Start);
            badge.set_valign(Align::Start);
            overlay.add_overlay(&badge);
            Some(preview)
        } else {
            let picture = Picture::new();
            picture.set_can_shrink(true);
            picture.set_content_fit(ContentFit::Cover);
            picture.set_paintable(self.tile_texture(item).as_ref());
            overlay.set_child(Some(&picture));
            None
        };

        let name = Label::new(Some(&item.name));
        name.set_halign(Align::Fill);
        name.set_valign(Align::End);
        name.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
        name.add_css_class("gallery-item-name");
        overlay.add_overlay(&name);

        let motion = EventControllerMotion::new();
        let tile = overlay.clone();
        let enter_preview = preview.clone();
        motion.connect_enter(move |_, _x, _y| {
            tile.add_css_class("hover");
            if let Some(ref preview) = enter_preview {
                preview.play();
            }
        });
        let tile = overlay.clone();
        motion.connect_leave(move |_| {
            tile.remove_css_class("hover");
            if let Some(ref preview) = preview {
                preview.pause();
            }
        });
        overlay.add_controller(motion);

        let fingerprint = item.fingerprint();

        let click = GestureClick::new();
        click.set_button(1);
        let on_open = self.on_open.clone();
        click.connect_released(move |_, _n, _x, _y| {
            if let Some(ref callback) = *on_open.borrow() {
                callback(fingerprint);
            }
        });
        overlay.add_controller(click);

        let context_click = GestureClick::new();
        context_click.set_button(3);
        let on_delete = self.on_delete.clone();
        context_click.connect_pressed(move |_, _n, _x, _y| {
            if let Some(ref callback) = *on_delete.borrow() {
                callback(fingerprint);
            }
        });
        overlay.add_controller(context_click);

        overlay.upcast()
    }
}
