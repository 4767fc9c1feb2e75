// Developer overlays
// - DebugPanel: paged info lines (8 per page, 10 pages)
// - OverviewPanel: one button per room, click to jump, click the backdrop to close
// - TuningPanel: sliders for the behaviour timings, "Save settings" persists them,
//   plus a background music picker

use gtk4::prelude::*;
use gtk4::{
    gio, Adjustment, Align, Box as GtkBox, Button, GestureClick, Grid, Label, MediaControls,
    MediaFile, Orientation, Scale, SpinButton,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use crate::config::{Settings, Tunable};
use crate::grid::GridPos;
use crate::models::{DebugInfo, DebugPager, DEBUG_PAGE_SIZE};

pub struct DebugPanel {
    root: GtkBox,
    lines: Vec<Label>,
    page_label: Label,
    prev_button: Button,
    next_button: Button,
    pager: Cell<DebugPager>,
    info: RefCell<DebugInfo>,
}

impl DebugPanel {
    pub fn new() -> Rc<Self> {
        let root = GtkBox::new(Orientation::Vertical, 2);
        root.add_css_class("debug-panel");
        root.set_halign(Align::Start);
        root.set_valign(Align::End);
        root.set_margin_start(12);
        root.set_margin_bottom(12);
        root.set_can_target(true);

        let title = Label::new(Some("Debug"));
        title.add_css_class("section-title");
        title.set_halign(Align::Start);
        root.append(&title);

        let lines: Vec<Label> = (0..DEBUG_PAGE_SIZE)
            .map(|_| {
                let label = Label::new(None);
                label.set_halign(Align::Start);
                label.add_css_class("debug-line");
                root.append(&label);
                label
            })
            .collect();

        let pagination = GtkBox::new(Orientation::Horizontal, 6);
        let prev_button = Button::with_label("<");
        let next_button = Button::with_label(">");
        let page_label = Label::new(None);
        page_label.add_css_class("muted");
        pagination.append(&prev_button);
        pagination.append(&page_label);
        pagination.append(&next_button);
        root.append(&pagination);

        let panel = Rc::new(Self {
            root,
            lines,
            page_label,
            prev_button: prev_button.clone(),
            next_button: next_button.clone(),
            pager: Cell::new(DebugPager::default()),
            info: RefCell::new(DebugInfo::default()),
        });

        let panel_weak = Rc::downgrade(&panel);
        prev_button.connect_clicked(move |_| {
            if let Some(panel) = panel_weak.upgrade() {
                let mut pager = panel.pager.get();
                if pager.prev() {
                    panel.pager.set(pager);
                    panel.refresh();
                }
            }
        });

        let panel_weak = Rc::downgrade(&panel);
        next_button.connect_clicked(move |_| {
            if let Some(panel) = panel_weak.upgrade() {
                let mut pager = panel.pager.get();
                if pager.next() {
                    panel.pager.set(pager);
                    panel.refresh();
                }
            }
        });

        panel.refresh();
        panel
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    /// Mutate the reported state and redraw.
    pub fn update(&self, f: impl FnOnce(&mut DebugInfo)) {
        f(&mut self.info.borrow_mut());
        self.refresh();
    }

    fn refresh(&self) {
        let pager = self.pager.get();
        let lines = pager.lines(&self.info.borrow());
        for (label, text) in self.lines.iter().zip(lines) {
            label.set_text(&text);
        }
        self.page_label.set_text(&pager.label());
        self.prev_button.set_sensitive(pager.has_prev());
        self.next_button.set_sensitive(pager.has_next());
    }
}

/// Card bounds as `(x, y, width, height)` in backdrop coordinates.
type Bounds = (f32, f32, f32, f32);

/// Whether a click at `(x, y)` missed the card. Unknown bounds never close.
fn is_outside(bounds: Option<Bounds>, x: f64, y: f64) -> bool {
    let Some((left, top, width, height)) = bounds else {
        return false;
    };
    let (x, y) = (x as f32, y as f32);
    x < left || y < top || x > left + width || y > top + height
}

pub struct OverviewPanel {
    root: GtkBox,
    buttons: Vec<(GridPos, Button)>,
    on_jump: Rc<RefCell<Option<Box<dyn Fn(GridPos)>>>>,
}

impl OverviewPanel {
    pub fn new() -> Rc<Self> {
        // Full-window backdrop around a centered card
        let root = GtkBox::new(Orientation::Vertical, 0);
        root.add_css_class("overview-backdrop");
        root.set_halign(Align::Fill);
        root.set_valign(Align::Fill);
        root.set_visible(false);

        let card = GtkBox::new(Orientation::Vertical, 6);
        card.add_css_class("overview-panel");
        card.set_halign(Align::Center);
        card.set_valign(Align::Center);
        card.set_hexpand(true);
        card.set_vexpand(true);
        root.append(&card);

        let title = Label::new(Some("Overview"));
        title.add_css_class("section-title");
        card.append(&title);

        let grid = Grid::new();
        grid.set_row_spacing(4);
        grid.set_column_spacing(4);
        card.append(&grid);

        let on_jump: Rc<RefCell<Option<Box<dyn Fn(GridPos)>>>> = Rc::new(RefCell::new(None));
        let mut buttons = Vec::new();
        for pos in GridPos::all() {
            let button = Button::with_label(&pos.id());
            button.add_css_class("overview-cell");
            if pos.is_restricted() {
                button.add_css_class("restricted");
            }
            let on_jump = on_jump.clone();
            button.connect_clicked(move |_| {
                if let Some(ref callback) = *on_jump.borrow() {
                    callback(pos);
                }
            });
            grid.attach(&button, pos.col() as i32, pos.row() as i32, 1, 1);
            buttons.push((pos, button));
        }

        let backdrop_click = GestureClick::new();
        backdrop_click.set_button(1);
        let backdrop = root.clone();
        backdrop_click.connect_released(move |_, _n, x, y| {
            let bounds = card
                .compute_bounds(&backdrop)
                .map(|r| (r.x(), r.y(), r.width(), r.height()));
            if is_outside(bounds, x, y) {
                backdrop.set_visible(false);
            }
        });
        root.add_controller(backdrop_click);

        Rc::new(Self {
            root,
            buttons,
            on_jump,
        })
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    pub fn set_visible(&self, visible: bool) {
        self.root.set_visible(visible);
    }

    pub fn is_visible(&self) -> bool {
        self.root.is_visible()
    }

    /// Highlight the current room.
    pub fn set_current(&self, current: GridPos) {
        for (pos, button) in &self.buttons {
            if *pos == current {
                button.add_css_class("current");
            } else {
                button.remove_css_class("current");
            }
        }
    }

    pub fn connect_jump<F: Fn(GridPos) + 'static>(&self, callback: F) {
        *self.on_jump.borrow_mut() = Some(Box::new(callback));
    }
}

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "flac", "m4a", "aac", "opus"];

/// Background music accepts common audio containers only.
fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub struct TuningPanel {
    root: GtkBox,
    adjustments: Vec<(Tunable, Adjustment)>,
    music: RefCell<Option<MediaFile>>,
    music_label: Label,
    music_controls: MediaControls,
    on_save: Rc<RefCell<Option<Box<dyn Fn(Vec<(Tunable, u64)>)>>>>,
}

impl TuningPanel {
    pub fn new(settings: &Settings) -> Rc<Self> {
        let root = GtkBox::new(Orientation::Vertical, 6);
        root.add_css_class("tuning-panel");
        root.set_halign(Align::End);
        root.set_valign(Align::Center);
        root.set_margin_end(12);
        root.set_visible(false);

        let title = Label::new(Some("Parameters"));
        title.add_css_class("section-title");
        root.append(&title);

        let rows = Grid::new();
        rows.set_row_spacing(4);
        rows.set_column_spacing(8);
        root.append(&rows);

        let mut adjustments = Vec::with_capacity(Tunable::ALL.len());
        for (row, tunable) in Tunable::ALL.into_iter().enumerate() {
            let (min, max) = tunable.range();
            let adjustment = Adjustment::new(
                settings.get(tunable) as f64,
                min as f64,
                max as f64,
                1.0,
                10.0,
                0.0,
            );

            let label = Label::new(Some(tunable.label()));
            label.set_halign(Align::Start);
            label.add_css_class("debug-label");

            let scale = Scale::new(Orientation::Horizontal, Some(&adjustment));
            scale.set_draw_value(false);
            scale.set_hexpand(true);
            scale.set_width_request(160);

            let spin = SpinButton::new(Some(&adjustment), 1.0, 0);
            spin.set_numeric(true);

            rows.attach(&label, 0, row as i32, 1, 1);
            rows.attach(&scale, 1, row as i32, 1, 1);
            rows.attach(&spin, 2, row as i32, 1, 1);
            adjustments.push((tunable, adjustment));
        }

        let music_row = GtkBox::new(Orientation::Horizontal, 8);
        let music_title = Label::new(Some("Background music"));
        music_title.add_css_class("debug-label");
        let music_button = Button::with_label("Choose audio…");
        let music_label = Label::new(None);
        music_label.add_css_class("muted");
        music_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
        music_row.append(&music_title);
        music_row.append(&music_button);
        music_row.append(&music_label);
        root.append(&music_row);

        let music_controls = MediaControls::new(None::<&MediaFile>);
        music_controls.set_visible(false);
        root.append(&music_controls);

        let save_button = Button::with_label("Save settings");
        save_button.add_css_class("btn-primary");
        save_button.set_halign(Align::End);
        root.append(&save_button);

        let panel = Rc::new(Self {
            root,
            adjustments,
            music: RefCell::new(None),
            music_label,
            music_controls,
            on_save: Rc::new(RefCell::new(None)),
        });

        let panel_weak = Rc::downgrade(&panel);
        music_button.connect_clicked(move |button| {
            if let Some(panel) = panel_weak.upgrade() {
                panel.prompt_music(button);
            }
        });

        let panel_weak = Rc::downgrade(&panel);
        save_button.connect_clicked(move |_| {
            if let Some(panel) = panel_weak.upgrade() {
                let values = panel.values();
                if let Some(ref callback) = *panel.on_save.borrow() {
                    callback(values);
                }
            }
        });

        panel
    }

    pub fn widget(&self) -> &GtkBox {
        &self.root
    }

    pub fn set_visible(&self, visible: bool) {
        self.root.set_visible(visible);
    }

    pub fn is_visible(&self) -> bool {
        self.root.is_visible()
    }

    fn prompt_music(self: &Rc<Self>, button: &Button) {
        let filter = gtk4::FileFilter::new();
        filter.set_name(Some("Audio"));
        filter.add_mime_type("audio/*");
        let filters = gio::ListStore::new::<gtk4::FileFilter>();
        filters.append(&filter);

        let dialog = gtk4::FileDialog::builder()
            .title("Background music")
            .modal(true)
            .filters(&filters)
            .build();

        let parent = button.root().and_downcast::<gtk4::Window>();
        let panel_weak = Rc::downgrade(self);
        dialog.open(parent.as_ref(), gio::Cancellable::NONE, move |result| {
            let Some(panel) = panel_weak.upgrade() else {
                return;
            };
            match result {
                Ok(file) => panel.play_music(&file),
                Err(err) => tracing::debug!("Music dialog dismissed: {}", err),
            }
        });
    }

    /// Replace the current track with `file` and start playing it.
    fn play_music(&self, file: &gio::File) {
        let name = file
            .basename()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !file.path().is_some_and(|path| is_audio_file(&path)) {
            tracing::warn!("Ignoring non-audio music file {}", name);
            self.music_label.set_text("Not an audio file");
            return;
        }

        if let Some(previous) = self.music.borrow_mut().take() {
            previous.pause();
        }
        let media = MediaFile::for_file(file);
        media.set_loop(true);
        self.music_controls.set_media_stream(Some(&media));
        self.music_controls.set_visible(true);
        self.music_label.set_text(&name);
        media.play();
        tracing::info!("Playing background music {}", name);
        *self.music.borrow_mut() = Some(media);
    }

    fn values(&self) -> Vec<(Tunable, u64)> {
        self.adjustments
            .iter()
            .map(|(tunable, adjustment)| (*tunable, adjustment.value().round().max(0.0) as u64))
            .collect()
    }

    pub fn connect_save<F: Fn(Vec<(Tunable, u64)>) + 'static>(&self, callback: F) {
        *self.on_save.borrow_mut() = Some(Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_backdrop_click_outside_card_closes() {
        let card = Some((100.0, 50.0, 300.0, 200.0));
        assert!(is_outside(card, 20.0, 20.0));
        assert!(is_outside(card, 401.0, 120.0));
        assert!(is_outside(card, 200.0, 251.0));
        assert!(!is_outside(card, 250.0, 150.0));
        // Edges count as the card
        assert!(!is_outside(card, 100.0, 50.0));
        assert!(!is_outside(None, 0.0, 0.0));
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(&PathBuf::from("/music/loop.MP3")));
        assert!(is_audio_file(&PathBuf::from("ambient.ogg")));
        assert!(is_audio_file(&PathBuf::from("take.flac")));
        assert!(!is_audio_file(&PathBuf::from("clip.mp4")));
        assert!(!is_audio_file(&PathBuf::from("cover.png")));
        assert!(!is_audio_file(&PathBuf::from("README")));
    }
}
