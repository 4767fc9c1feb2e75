// Lightbox overlay for the cave portfolio
// Features:
// - Dimmed backdrop covering the rooms; click outside the media or [X] to close
// - Image or autoplaying video sized to 70% of the viewport, never upscaled
// - Video is paused and rewound on close

use gdk4::Texture;
use gtk4::prelude::*;
use gtk4::subclass::prelude::*;
use gtk4::{
    gio, glib, Align, Box as GtkBox, Button, GestureClick, Label, MediaFile, MediaStream,
    Orientation, Overlay, Picture, Stack, StackTransitionType, Video, Widget,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::layout::lightbox_fit;
use crate::models::{GalleryItem, MediaData};

mod imp {
    use super::*;

    #[derive(Default)]
    pub struct LightboxInner {
        pub overlay: RefCell<Option<Overlay>>,
        pub content_stack: RefCell<Option<Stack>>,
        pub picture: RefCell<Option<Picture>>,
        pub video_area: RefCell<Option<Video>>,
        pub video_stream: RefCell<Option<MediaFile>>,
        pub title_label: RefCell<Option<Label>>,
        // Source pixel size of the shown media, 0x0 when unknown
        pub media_width: Cell<u32>,
        pub media_height: Cell<u32>,
        pub visible: Cell<bool>,
        pub on_close: RefCell<Option<Rc<dyn Fn()>>>,
    }

    #[glib::object_subclass]
    impl ObjectSubclass for LightboxInner {
        const NAME: &'static str = "CaveLightbox";
        type Type = super::Lightbox;
        type ParentType = glib::Object;
    }

    impl ObjectImpl for LightboxInner {}
}

glib::wrapper! {
    pub struct Lightbox(ObjectSubclass<imp::LightboxInner>);
}

impl Lightbox {
    pub fn new() -> Self {
        let obj: Self = glib::Object::builder().build();
        obj.setup_widgets();
        obj
    }

    fn setup_widgets(&self) {
        let imp = self.imp();

        let overlay = Overlay::new();
        overlay.set_hexpand(true);
        overlay.set_vexpand(true);
        overlay.add_css_class("lightbox-overlay");
        overlay.set_visible(false);

        // Backdrop receives clicks that miss the media
        let backdrop = GtkBox::new(Orientation::Vertical, 0);
        backdrop.set_hexpand(true);
        backdrop.set_vexpand(true);
        backdrop.add_css_class("lightbox-backdrop");

        let content_stack = Stack::new();
        content_stack.set_hhomogeneous(false);
        content_stack.set_vhomogeneous(false);
        content_stack.set_transition_type(StackTransitionType::None);

        let picture = Picture::new();
        picture.set_can_shrink(true);
        picture.set_content_fit(gtk4::ContentFit::Contain);
        picture.add_css_class("lightbox-image");

        let video_area = Video::new();
        video_area.set_autoplay(true);
        video_area.set_loop(false);
        video_area.add_css_class("lightbox-video");

        content_stack.add_named(&picture, Some("image"));
        content_stack.add_named(&video_area, Some("video"));
        content_stack.set_visible_child_name("image");

        let title_label = Label::new(None);
        title_label.add_css_class("lightbox-title");
        title_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);

        let frame = GtkBox::new(Orientation::Vertical, 8);
        frame.set_halign(Align::Center);
        frame.set_valign(Align::Center);
        frame.append(&content_stack);
        frame.append(&title_label);

        let close_btn = Button::with_label("[X]");
        close_btn.add_css_class("btn-primary");
        close_btn.set_tooltip_text(Some("Close (Escape)"));
        close_btn.set_halign(Align::End);
        close_btn.set_valign(Align::Start);
        close_btn.set_margin_top(16);
        close_btn.set_margin_end(16);

        overlay.set_child(Some(&backdrop));
        overlay.add_overlay(&frame);
        overlay.add_overlay(&close_btn);

        *imp.overlay.borrow_mut() = Some(overlay.clone());
        *imp.content_stack.borrow_mut() = Some(content_stack);
        *imp.picture.borrow_mut() = Some(picture);
        *imp.video_area.borrow_mut() = Some(video_area);
        *imp.title_label.borrow_mut() = Some(title_label);

        let backdrop_click = GestureClick::new();
        let lightbox_weak = self.downgrade();
        backdrop_click.connect_released(move |_, _n, _x, _y| {
            if let Some(lightbox) = lightbox_weak.upgrade() {
                lightbox.close();
            }
        });
        backdrop.add_controller(backdrop_click);

        let lightbox_weak = self.downgrade();
        close_btn.connect_clicked(move |_| {
            if let Some(lightbox) = lightbox_weak.upgrade() {
                lightbox.close();
            }
        });
    }

    pub fn widget(&self) -> Widget {
        match self.imp().overlay.borrow().as_ref() {
            Some(overlay) => overlay.clone().upcast(),
            None => Overlay::new().upcast(),
        }
    }

    /// Show `item` sized for a `viewport_w` x `viewport_h` window.
    pub fn open(&self, item: &GalleryItem, viewport_w: f64, viewport_h: f64) {
        let imp = self.imp();
        self.stop_video();

        if let Some(label) = imp.title_label.borrow().as_ref() {
            label.set_text(&item.name);
        }

        if item.is_video() {
            let media = media_file(&item.data);
            if let Some(video) = imp.video_area.borrow().as_ref() {
                video.set_media_stream(Some(&media));
            }
            media.play();
            *imp.video_stream.borrow_mut() = Some(media);
            imp.media_width.set(0);
            imp.media_height.set(0);
            self.show_page("video");
        } else {
            let texture = load_texture(&item.data);
            let (w, h) = crate::image_loader::media_dimensions(&item.data)
                .ok()
                .or_else(|| {
                    texture
                        .as_ref()
                        .map(|t| (t.width().max(0) as u32, t.height().max(0) as u32))
                })
                .unwrap_or((0, 0));
            imp.media_width.set(w);
            imp.media_height.set(h);
            if let Some(picture) = imp.picture.borrow().as_ref() {
                picture.set_paintable(texture.as_ref());
            }
            self.show_page("image");
        }

        imp.visible.set(true);
        self.refit(viewport_w, viewport_h);
        if let Some(overlay) = imp.overlay.borrow().as_ref() {
            overlay.set_visible(true);
        }
        tracing::info!("Lightbox open: {}", item.name);
    }

    /// Re-apply the 70% fit after the window changes size.
    pub fn refit(&self, viewport_w: f64, viewport_h: f64) {
        let imp = self.imp();
        if !imp.visible.get() {
            return;
        }
        let (w, h) = lightbox_fit(
            imp.media_width.get(),
            imp.media_height.get(),
            viewport_w,
            viewport_h,
        );
        if let Some(picture) = imp.picture.borrow().as_ref() {
            picture.set_size_request(w, h);
        }
        if let Some(video) = imp.video_area.borrow().as_ref() {
            video.set_size_request(w, h);
        }
    }

    pub fn close(&self) {
        let imp = self.imp();
        if !imp.visible.get() {
            return;
        }
        imp.visible.set(false);
        self.stop_video();

        if let Some(picture) = imp.picture.borrow().as_ref() {
            picture.set_paintable(Option::<&Texture>::None);
        }
        if let Some(overlay) = imp.overlay.borrow().as_ref() {
            overlay.set_visible(false);
        }
        tracing::info!("Lightbox closed");

        let callback = imp.on_close.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    pub fn connect_close<F: Fn() + 'static>(&self, callback: F) {
        *self.imp().on_close.borrow_mut() = Some(Rc::new(callback));
    }

    fn show_page(&self, name: &str) {
        if let Some(stack) = self.imp().content_stack.borrow().as_ref() {
            stack.set_visible_child_name(name);
        }
    }

    fn stop_video(&self) {
        let imp = self.imp();
        if let Some(stream) = imp.video_stream.borrow_mut().take() {
            stream.pause();
            if stream.is_seekable() {
                stream.seek(0);
            }
        }
        if let Some(video) = imp.video_area.borrow().as_ref() {
            video.set_media_stream(Option::<&MediaStream>::None);
        }
    }
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Playable stream for a video item, from disk or from the uploaded bytes.
pub fn media_file(data: &MediaData) -> MediaFile {
    match data {
        MediaData::Asset(path) => MediaFile::for_filename(path),
        MediaData::Inline { bytes, .. } => {
            let stream = gio::MemoryInputStream::from_bytes(&glib::Bytes::from(bytes));
            MediaFile::for_input_stream(&stream)
        }
    }
}

/// Texture for an image item, from disk or from the uploaded bytes.
pub fn load_texture(data: &MediaData) -> Option<Texture> {
    let result = match data {
        MediaData::Asset(path) => Texture::from_filename(path),
        MediaData::Inline { bytes, .. } => Texture::from_bytes(&glib::Bytes::from(bytes)),
    };
    match result {
        Ok(texture) => Some(texture),
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to load artwork texture");
            None
        }
    }
}
