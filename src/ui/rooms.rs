// The 5x7 wall of rooms
// Every room is sized to the viewport. The gallery wall spans the five
// R1_D1..R1_D5 rooms as a single widget.

use gtk4::prelude::*;
use gtk4::{
    Align, Box as GtkBox, ContentFit, EventControllerMotion, GestureClick, Grid, Label,
    Orientation, Picture, Widget,
};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::grid::{GridPos, COL_R1, ROW_D1, ROWS};
use crate::models::{showcase_at, GalleryItem, Showcase};

/// Rows covered by the gallery wall.
const GALLERY_SPAN: usize = ROWS - ROW_D1;

type OpenCallback = Rc<RefCell<Option<Box<dyn Fn(GalleryItem)>>>>;
type HoverCallback = Rc<RefCell<Option<Box<dyn Fn(Option<String>)>>>>;

pub struct Rooms {
    grid: Grid,
    cells: Vec<Widget>,
    gallery_zone: Widget,
    on_open: OpenCallback,
    on_hover: HoverCallback,
}

impl Rooms {
    pub fn new(
        showcases: &[Showcase],
        asset_dir: &Path,
        gallery_zone: &impl IsA<Widget>,
    ) -> Self {
        let on_open: OpenCallback = Rc::new(RefCell::new(None));
        let on_hover: HoverCallback = Rc::new(RefCell::new(None));
        let grid = Grid::new();
        grid.add_css_class("rooms");

        let mut cells: Vec<Widget> = Vec::new();
        for pos in GridPos::all().filter(|p| !p.is_restricted()) {
            let room = match showcase_at(showcases, pos) {
                Some(showcase) => {
                    build_showcase_room(showcase, asset_dir, on_open.clone(), on_hover.clone())
                }
                None => build_plain_room(pos),
            };
            grid.attach(&room, pos.col() as i32, pos.row() as i32, 1, 1);
            cells.push(room.upcast());
        }

        gallery_zone.add_css_class("room");
        grid.attach(
            gallery_zone,
            COL_R1 as i32,
            ROW_D1 as i32,
            1,
            GALLERY_SPAN as i32,
        );

        Self {
            grid,
            cells,
            gallery_zone: gallery_zone.clone().upcast(),
            on_open,
            on_hover,
        }
    }

    /// Click on a showcase artwork.
    pub fn connect_open<F: Fn(GalleryItem) + 'static>(&self, callback: F) {
        *self.on_open.borrow_mut() = Some(Box::new(callback));
    }

    /// Pointer entering (`Some(summary)`) or leaving (`None`) a showcase room.
    pub fn connect_hover<F: Fn(Option<String>) + 'static>(&self, callback: F) {
        *self.on_hover.borrow_mut() = Some(Box::new(callback));
    }

    pub fn widget(&self) -> &Grid {
        &self.grid
    }

    /// Size every room to a `width` x `height` viewport.
    pub fn resize(&self, width: i32, height: i32) {
        let (width, height) = (width.max(1), height.max(1));
        for cell in &self.cells {
            cell.set_size_request(width, height);
        }
        self.gallery_zone
            .set_size_request(width, height * GALLERY_SPAN as i32);
        tracing::debug!("Rooms resized to {}x{}", width, height);
    }
}

fn room_box(pos: GridPos) -> GtkBox {
    let room = GtkBox::new(Orientation::Vertical, 12);
    room.add_css_class("room");
    room.add_css_class(&format!("room-{}", pos.id().to_lowercase().replace('_', "-")));
    room.set_overflow(gtk4::Overflow::Hidden);
    room
}

fn room_label(pos: GridPos) -> Label {
    let label = Label::new(Some(&pos.id()));
    label.add_css_class("room-id");
    label.set_halign(Align::Start);
    label.set_margin_start(16);
    label.set_margin_top(56);
    label
}

fn build_plain_room(pos: GridPos) -> GtkBox {
    let room = room_box(pos);
    room.append(&room_label(pos));
    room
}

fn build_showcase_room(
    showcase: &Showcase,
    asset_dir: &Path,
    on_open: OpenCallback,
    on_hover: HoverCallback,
) -> GtkBox {
    let room = room_box(showcase.pos);
    room.add_css_class("showcase-room");
    room.append(&room_label(showcase.pos));

    let source = asset_dir.join(showcase.source);
    let mut item = GalleryItem::asset(source.clone(), showcase.kind);
    item.name = showcase.title.to_string();
    item.tag = showcase.tag.to_string();

    let media: Widget = if item.is_video() {
        let badge = Label::new(Some(&format!("[VIDEO] {}", showcase.title)));
        badge.add_css_class("video-badge");
        badge.upcast()
    } else {
        let picture = Picture::for_filename(&source);
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Contain);
        picture.add_css_class("showcase-art");
        picture.upcast()
    };
    media.set_vexpand(true);
    media.set_margin_start(48);
    media.set_margin_end(48);
    room.append(&media);

    let card = Label::new(Some(&format!(
        "{} ({})\n{}",
        showcase.title, showcase.year, showcase.medium
    )));
    card.add_css_class("showcase-card");
    card.set_halign(Align::Center);
    card.set_margin_bottom(32);
    card.set_opacity(0.0);
    room.append(&card);

    let motion = EventControllerMotion::new();
    let summary = showcase.summary();
    let card_for_enter = card.clone();
    let hover_enter = on_hover.clone();
    motion.connect_enter(move |_, _x, _y| {
        card_for_enter.set_opacity(1.0);
        if let Some(ref callback) = *hover_enter.borrow() {
            callback(Some(summary.clone()));
        }
    });
    let card_for_leave = card.clone();
    motion.connect_leave(move |_| {
        card_for_leave.set_opacity(0.0);
        if let Some(ref callback) = *on_hover.borrow() {
            callback(None);
        }
    });
    room.add_controller(motion);

    let click = GestureClick::new();
    click.set_button(1);
    click.connect_released(move |_, _n, _x, _y| {
        if let Some(ref callback) = *on_open.borrow() {
            callback(item.clone());
        }
    });
    media.add_controller(click);

    room
}
