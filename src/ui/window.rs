// Main window for the cave portfolio
// A scroll-locked 5x7 wall of rooms under overlays: nav chrome, arrows,
// debug panels, lightbox and the black transition curtain.

use gdk4::Display;
use gtk4::prelude::*;
use gtk4::{
    gio, Align, Application, ApplicationWindow, Box as GtkBox, Button, CssProvider, Label,
    Orientation, Overlay, PolicyType, ScrolledWindow, Settings as GtkSettings,
    STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use super::debug_panel::{DebugPanel, OverviewPanel, TuningPanel};
use super::dialogs::{self, Notice};
use super::gallery_view::GalleryView;
use super::keybindings::Keybindings;
use super::lightbox::Lightbox;
use super::rooms::Rooms;
use crate::config::{Settings, Tunable};
use crate::grid::{
    ease_in_out, progress, Debouncer, Direction, FadeAnimation, GridPos, MoveStyle, Navigator,
    SnapDecision, TransitionSequencer, TransitionStep,
};
use crate::layout::GridGeometry;
use crate::models::{
    filter_tags, now_millis, read_upload, GalleryError, Gallery, GalleryItem, Session, Showcase,
    UploadPayload,
};

const DEFAULT_WIDTH: i32 = 1280;
const DEFAULT_HEIGHT: i32 = 800;

/// CSS for the dark gallery look - embedded as fallback
const FALLBACK_CSS: &str = r#"
* {
    border-radius: 0;
    box-shadow: none;
    background-image: none;
}

window {
    background-color: #0a0a0a;
    color: #e0e0e0;
}

button {
    background-color: transparent;
    border: 1px solid #333333;
    color: #e0e0e0;
}

button:hover {
    background-color: rgba(224, 224, 224, 0.05);
    border-color: #555555;
}

button.active {
    border-color: #00ff88;
    color: #00ff88;
}

.room {
    background-color: #0f0f0f;
    border: 1px solid #1a1a1a;
}

.room-id {
    color: #555555;
    font-size: 11px;
}

.showcase-card,
.debug-panel,
.overview-panel,
.tuning-panel,
.nav-bar {
    background-color: rgba(0, 0, 0, 0.8);
    padding: 6px 10px;
}

.transition-curtain {
    background-color: #000000;
}

.lightbox-backdrop {
    background-color: rgba(0, 0, 0, 0.85);
}

.gallery-item {
    background-color: #121212;
    border: 1px solid #333333;
    transition: transform 200ms ease, box-shadow 200ms ease;
}

.gallery-item.hover {
    transform: scale(1.05);
    box-shadow: 0 0 12px rgba(0, 255, 136, 0.5);
}

.overview-backdrop {
    background-color: rgba(0, 0, 0, 0.6);
}

.overview-cell.restricted {
    color: #ff5555;
}

.overview-cell.current {
    border-color: #00ff88;
}
"#;

/// Load and apply the stylesheet
fn load_css() {
    let provider = CssProvider::new();

    let css_path = concat!(env!("CARGO_MANIFEST_DIR"), "/src/style.css");

    if Path::new(css_path).exists() {
        provider.load_from_path(css_path);
        tracing::info!("Loaded CSS from: {}", css_path);
    } else {
        provider.load_from_string(FALLBACK_CSS);
        tracing::info!("Loaded fallback embedded CSS");
    }

    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

fn arrow_button(label: &str, tooltip: &str, halign: Align, valign: Align) -> Button {
    let button = Button::with_label(label);
    button.set_tooltip_text(Some(tooltip));
    button.add_css_class("nav-arrow");
    button.set_halign(halign);
    button.set_valign(valign);
    button.set_margin_start(8);
    button.set_margin_end(8);
    button.set_margin_top(8);
    button.set_margin_bottom(8);
    button
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

pub struct MainWindow {
    self_weak: RefCell<Weak<MainWindow>>,
    window: ApplicationWindow,
    scroller: ScrolledWindow,
    rooms: Rooms,
    curtain: GtkBox,
    nav_items: GtkBox,
    nav_toggle_button: Button,
    arrows: Vec<(Direction, Button)>,
    lightbox: Lightbox,
    gallery_view: Rc<GalleryView>,
    debug_panel: Rc<DebugPanel>,
    overview: Rc<OverviewPanel>,
    tuning: Rc<TuningPanel>,
    keybindings: Rc<Keybindings>,
    navigator: RefCell<Navigator>,
    sequencer: RefCell<TransitionSequencer>,
    scroll_debouncer: Debouncer,
    resize_debouncer: Debouncer,
    scroll_generation: Cell<u64>,
    fade_generation: Cell<u64>,
    programmatic_scroll: Cell<bool>,
    last_viewport: Cell<(i32, i32)>,
    nav_visible: Cell<bool>,
    settings: RefCell<Settings>,
    session: RefCell<Session>,
    gallery: RefCell<Gallery>,
}

impl MainWindow {
    pub fn new(
        app: &Application,
        settings: Settings,
        gallery: Gallery,
        showcases: &[Showcase],
    ) -> Rc<Self> {
        load_css();
        if let Some(gtk_settings) = GtkSettings::default() {
            gtk_settings.set_gtk_application_prefer_dark_theme(true);
        }

        let window = ApplicationWindow::builder()
            .application(app)
            .title("cave - portfolio")
            .default_width(DEFAULT_WIDTH)
            .default_height(DEFAULT_HEIGHT)
            .build();

        let gallery_view = GalleryView::new(&filter_tags(showcases));
        let rooms = Rooms::new(showcases, &settings.asset_dir, gallery_view.widget());

        // Scrollbars are hidden; movement is driven by navigation and snapping
        let scroller = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::External)
            .vscrollbar_policy(PolicyType::External)
            .child(rooms.widget())
            .hexpand(true)
            .vexpand(true)
            .build();

        let root = Overlay::new();
        root.set_child(Some(&scroller));

        let arrows = vec![
            (
                Direction::Left,
                arrow_button("◀", "Move left", Align::Start, Align::Center),
            ),
            (
                Direction::Right,
                arrow_button("▶", "Move right", Align::End, Align::Center),
            ),
            (
                Direction::Up,
                arrow_button("△", "Move up", Align::Center, Align::Start),
            ),
            (
                Direction::Down,
                arrow_button("▽", "Move down", Align::Center, Align::End),
            ),
        ];
        for (direction, button) in &arrows {
            if *direction == Direction::Up {
                button.set_margin_top(56);
            }
            root.add_overlay(button);
        }

        // Top bar; the toggle collapses everything else in it
        let nav_bar = GtkBox::new(Orientation::Horizontal, 8);
        nav_bar.add_css_class("nav-bar");
        nav_bar.set_halign(Align::Fill);
        nav_bar.set_valign(Align::Start);

        let title = Label::new(Some("CAVE"));
        title.add_css_class("section-title");
        let nav_items = GtkBox::new(Orientation::Horizontal, 8);
        let overview_button = Button::with_label("[overview]");
        overview_button.set_tooltip_text(Some("Jump to any room"));
        let tuning_button = Button::with_label("[parameters]");
        tuning_button.set_tooltip_text(Some("Timing and upload parameters"));
        let debug_button = Button::with_label("[debug]");
        debug_button.set_tooltip_text(Some("Toggle debug panel"));
        nav_items.append(&title);
        nav_items.append(&overview_button);
        nav_items.append(&tuning_button);
        nav_items.append(&debug_button);

        let nav_spacer = GtkBox::new(Orientation::Horizontal, 0);
        nav_spacer.set_hexpand(true);
        let nav_toggle_button = Button::with_label("[nav: ON]");
        nav_toggle_button.set_tooltip_text(Some("Collapse navigation"));

        nav_bar.append(&nav_items);
        nav_bar.append(&nav_spacer);
        nav_bar.append(&nav_toggle_button);
        root.add_overlay(&nav_bar);

        let debug_panel = DebugPanel::new();
        let overview = OverviewPanel::new();
        let tuning = TuningPanel::new(&settings);
        root.add_overlay(debug_panel.widget());
        root.add_overlay(overview.widget());
        root.add_overlay(tuning.widget());

        let lightbox = Lightbox::new();
        root.add_overlay(&lightbox.widget());

        // Starts opaque; the startup sequence fades it out
        let curtain = GtkBox::new(Orientation::Vertical, 0);
        curtain.add_css_class("transition-curtain");
        curtain.set_hexpand(true);
        curtain.set_vexpand(true);
        curtain.set_opacity(1.0);
        curtain.set_can_target(true);
        root.add_overlay(&curtain);

        window.set_child(Some(&root));

        let keybindings = Rc::new(Keybindings::new());
        let session = Session::new(settings.credentials());
        let sequencer = TransitionSequencer::new(settings.transition_timings());
        let scroll_debouncer = Debouncer::new(settings.scroll_debounce());
        let resize_debouncer = Debouncer::new(settings.resize_debounce());

        let main_window = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            scroller,
            rooms,
            curtain,
            nav_items,
            nav_toggle_button: nav_toggle_button.clone(),
            arrows,
            lightbox,
            gallery_view,
            debug_panel,
            overview,
            tuning,
            keybindings,
            navigator: RefCell::new(Navigator::new(GridPos::HOME)),
            sequencer: RefCell::new(sequencer),
            scroll_debouncer,
            resize_debouncer,
            scroll_generation: Cell::new(0),
            fade_generation: Cell::new(0),
            programmatic_scroll: Cell::new(false),
            last_viewport: Cell::new((0, 0)),
            nav_visible: Cell::new(true),
            settings: RefCell::new(settings),
            session: RefCell::new(session),
            gallery: RefCell::new(gallery),
        });
        *main_window.self_weak.borrow_mut() = Rc::downgrade(&main_window);

        main_window.setup_keybindings();
        main_window.setup_chrome(&overview_button, &tuning_button, &debug_button);
        main_window.setup_rooms();
        main_window.setup_gallery();
        main_window.setup_panels();
        main_window.setup_scroll_tracking();
        main_window.setup_resize_observer();

        main_window.render_gallery();
        main_window.refresh_blocks();
        main_window.start_intro();

        main_window
    }

    /// Present the window
    pub fn present(&self) {
        self.window.present();
    }

    fn weak(&self) -> Weak<MainWindow> {
        self.self_weak.borrow().clone()
    }

    fn setup_keybindings(self: &Rc<Self>) {
        self.keybindings.attach(&self.window);

        let window_weak = Rc::downgrade(self);
        self.keybindings.connect_navigate(move |direction| {
            if let Some(window) = window_weak.upgrade() {
                window.navigate(direction);
            }
        });

        let window_weak = Rc::downgrade(self);
        self.keybindings.connect_close_lightbox(move || {
            if let Some(window) = window_weak.upgrade() {
                window.lightbox.close();
            }
        });

        let window_weak = Rc::downgrade(self);
        self.keybindings.connect_key_reported(move |key| {
            if let Some(window) = window_weak.upgrade() {
                window
                    .debug_panel
                    .update(|info| info.input = format!("key {}", key));
            }
        });
    }

    fn setup_chrome(
        self: &Rc<Self>,
        overview_button: &Button,
        tuning_button: &Button,
        debug_button: &Button,
    ) {
        for (direction, button) in &self.arrows {
            let direction = *direction;
            let window_weak = Rc::downgrade(self);
            button.connect_clicked(move |_| {
                if let Some(window) = window_weak.upgrade() {
                    window
                        .debug_panel
                        .update(|info| info.input = format!("arrow {}", direction.label()));
                    window.navigate(direction);
                }
            });
        }

        let window_weak = Rc::downgrade(self);
        self.nav_toggle_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                window.toggle_nav();
            }
        });

        let window_weak = Rc::downgrade(self);
        overview_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                let visible = !window.overview.is_visible();
                window.overview.set_visible(visible);
            }
        });

        let window_weak = Rc::downgrade(self);
        tuning_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                let visible = !window.tuning.is_visible();
                window.tuning.set_visible(visible);
            }
        });

        let window_weak = Rc::downgrade(self);
        debug_button.connect_clicked(move |_| {
            if let Some(window) = window_weak.upgrade() {
                let panel = window.debug_panel.widget();
                panel.set_visible(!panel.is_visible());
            }
        });

        let window_weak = Rc::downgrade(self);
        self.lightbox.connect_close(move || {
            if let Some(window) = window_weak.upgrade() {
                window.keybindings.set_lightbox_open(false);
                window
                    .debug_panel
                    .update(|info| info.lightbox = "closed".to_string());
            }
        });
    }

    fn setup_rooms(self: &Rc<Self>) {
        let window_weak = Rc::downgrade(self);
        self.rooms.connect_open(move |item| {
            if let Some(window) = window_weak.upgrade() {
                window.open_lightbox(&item);
            }
        });

        let window_weak = Rc::downgrade(self);
        self.rooms.connect_hover(move |summary| {
            if let Some(window) = window_weak.upgrade() {
                window
                    .debug_panel
                    .update(|info| info.artwork = summary.unwrap_or_default());
            }
        });
    }

    fn setup_gallery(self: &Rc<Self>) {
        let window_weak = Rc::downgrade(self);
        self.gallery_view.connect_open(move |fingerprint| {
            if let Some(window) = window_weak.upgrade() {
                let item = window.gallery.borrow().find(fingerprint).cloned();
                if let Some(item) = item {
                    window.open_lightbox(&item);
                }
            }
        });

        let window_weak = Rc::downgrade(self);
        self.gallery_view.connect_delete(move |fingerprint| {
            if let Some(window) = window_weak.upgrade() {
                window.request_delete(fingerprint);
            }
        });

        let window_weak = Rc::downgrade(self);
        self.gallery_view.connect_filter(move |tag| {
            if let Some(window) = window_weak.upgrade() {
                window.set_filter(tag);
            }
        });

        let window_weak = Rc::downgrade(self);
        self.gallery_view.connect_sort(move || {
            if let Some(window) = window_weak.upgrade() {
                window.toggle_sort();
            }
        });

        let window_weak = Rc::downgrade(self);
        self.gallery_view.connect_login(move || {
            if let Some(window) = window_weak.upgrade() {
                window.toggle_login();
            }
        });

        let window_weak = Rc::downgrade(self);
        self.gallery_view.connect_upload(move || {
            if let Some(window) = window_weak.upgrade() {
                window.prompt_upload();
            }
        });
    }

    fn setup_panels(self: &Rc<Self>) {
        let window_weak = Rc::downgrade(self);
        self.overview.connect_jump(move |pos| {
            if let Some(window) = window_weak.upgrade() {
                window.jump_to(pos);
            }
        });

        let window_weak = Rc::downgrade(self);
        self.tuning.connect_save(move |values| {
            if let Some(window) = window_weak.upgrade() {
                window.save_settings(values);
            }
        });
    }

    fn setup_scroll_tracking(self: &Rc<Self>) {
        for adjustment in [self.scroller.hadjustment(), self.scroller.vadjustment()] {
            let window_weak = Rc::downgrade(self);
            adjustment.connect_value_changed(move |_| {
                if let Some(window) = window_weak.upgrade() {
                    window.on_scroll_changed();
                }
            });
        }
    }

    fn setup_resize_observer(self: &Rc<Self>) {
        let weak_self = Rc::downgrade(self);
        self.scroller.add_tick_callback(move |scroller, _clock| {
            let Some(window) = weak_self.upgrade() else {
                return glib::ControlFlow::Break;
            };
            let size = (scroller.width(), scroller.height());
            if size.0 > 0 && size.1 > 0 && size != window.last_viewport.get() {
                window.last_viewport.set(size);
                window.on_viewport_resized(size.0, size.1);
            }
            glib::ControlFlow::Continue
        });
    }

    fn viewport(&self) -> (f64, f64) {
        let (w, h) = self.last_viewport.get();
        if w > 0 && h > 0 {
            (w as f64, h as f64)
        } else {
            (DEFAULT_WIDTH as f64, DEFAULT_HEIGHT as f64)
        }
    }

    fn geometry(&self) -> GridGeometry {
        let (w, h) = self.viewport();
        GridGeometry::new(
            self.scroller.hadjustment().value(),
            self.scroller.vadjustment().value(),
            w,
            h,
        )
    }

    fn refresh_blocks(&self) {
        let (previous, current) = {
            let navigator = self.navigator.borrow();
            (navigator.previous(), navigator.current())
        };
        self.debug_panel
            .update(|info| info.set_blocks(previous, current));
        self.overview.set_current(current);
    }

    // Navigation

    fn navigate(&self, direction: Direction) {
        let plan = self.navigator.borrow_mut().navigate(direction);
        let Some(plan) = plan else {
            tracing::debug!("Navigation {} ignored", direction.label());
            return;
        };

        tracing::debug!(
            "Navigate {} -> {} ({:?})",
            direction.label(),
            plan.target,
            plan.style
        );
        match plan.style {
            MoveStyle::Smooth => {
                self.scroll_to(plan.target, true);
                self.refresh_blocks();
            }
            MoveStyle::Fade => {
                let step = self.sequencer.borrow_mut().begin(plan.target);
                match step {
                    Some(step) => self.run_step(step),
                    // The running sequence clears the flag when it finishes
                    None => tracing::debug!("Transition already running"),
                }
            }
        }
    }

    fn jump_to(&self, pos: GridPos) {
        if !self.navigator.borrow_mut().jump_to(pos) {
            return;
        }
        self.overview.set_visible(false);
        self.scroll_to(pos, true);
        self.refresh_blocks();
    }

    fn start_intro(&self) {
        self.navigator.borrow_mut().begin_transition();
        let step = self.sequencer.borrow_mut().begin_opaque(GridPos::HOME);
        if let Some(step) = step {
            self.run_step(step);
        }
    }

    fn run_step(&self, step: TransitionStep) {
        match step {
            TransitionStep::Fade { opacity, duration } => {
                self.animate_curtain(opacity, duration, |window| window.advance_transition());
            }
            TransitionStep::JumpTo { target, hold } => {
                self.scroll_to(target, false);
                self.navigator.borrow_mut().commit(target);
                self.refresh_blocks();
                let weak_self = self.weak();
                glib::timeout_add_local_once(hold, move || {
                    if let Some(window) = weak_self.upgrade() {
                        window.advance_transition();
                    }
                });
            }
            TransitionStep::Finished => {
                self.curtain.set_can_target(false);
                self.navigator.borrow_mut().finish_transition();
                let timings = self.settings.borrow().transition_timings();
                self.sequencer.borrow_mut().set_timings(timings);
                tracing::debug!("Transition finished at {}", self.navigator.borrow().current());
            }
        }
    }

    fn advance_transition(&self) {
        let step = self.sequencer.borrow_mut().advance();
        tracing::debug!("Transition {:?}: {:?}", self.sequencer.borrow().phase(), step);
        self.run_step(step);
    }

    /// Animate the curtain to `target` opacity, then run `on_done`.
    fn animate_curtain<F>(&self, target: f64, duration: Duration, on_done: F)
    where
        F: FnOnce(&MainWindow) + 'static,
    {
        let generation = self.fade_generation.get().wrapping_add(1);
        self.fade_generation.set(generation);
        self.curtain.set_can_target(true);

        let animation = FadeAnimation::new(self.curtain.opacity(), target, duration);
        let started = Instant::now();
        let on_done = RefCell::new(Some(on_done));
        let weak_self = self.weak();
        self.curtain.add_tick_callback(move |curtain, _clock| {
            let Some(window) = weak_self.upgrade() else {
                return glib::ControlFlow::Break;
            };
            if window.fade_generation.get() != generation {
                return glib::ControlFlow::Break;
            }
            let elapsed = started.elapsed();
            curtain.set_opacity(animation.opacity_at(elapsed));
            if !animation.is_done(elapsed) {
                return glib::ControlFlow::Continue;
            }
            let done = on_done.borrow_mut().take();
            if let Some(done) = done {
                done(&window);
            }
            glib::ControlFlow::Break
        });
    }

    /// Bring `pos` into view. Programmatic moves never trigger snapping.
    fn scroll_to(&self, pos: GridPos, animated: bool) {
        let (target_x, target_y) = self.geometry().origin_of(pos);
        let hadjustment = self.scroller.hadjustment();
        let vadjustment = self.scroller.vadjustment();

        let generation = self.scroll_generation.get().wrapping_add(1);
        self.scroll_generation.set(generation);
        self.scroll_debouncer.cancel();

        let duration = self.settings.borrow().smooth_scroll();
        if !animated || duration.is_zero() {
            self.programmatic_scroll.set(true);
            hadjustment.set_value(target_x);
            vadjustment.set_value(target_y);
            self.programmatic_scroll.set(false);
            return;
        }

        let (start_x, start_y) = (hadjustment.value(), vadjustment.value());
        let started = Instant::now();
        let weak_self = self.weak();
        self.programmatic_scroll.set(true);
        self.scroller.add_tick_callback(move |_scroller, _clock| {
            let Some(window) = weak_self.upgrade() else {
                return glib::ControlFlow::Break;
            };
            if window.scroll_generation.get() != generation {
                return glib::ControlFlow::Break;
            }
            let t = ease_in_out(progress(started.elapsed(), duration));
            window.programmatic_scroll.set(true);
            hadjustment.set_value(lerp(start_x, target_x, t));
            vadjustment.set_value(lerp(start_y, target_y, t));
            if t >= 1.0 {
                window.programmatic_scroll.set(false);
                return glib::ControlFlow::Break;
            }
            glib::ControlFlow::Continue
        });
    }

    fn on_scroll_changed(&self) {
        if self.programmatic_scroll.get() {
            return;
        }
        {
            let navigator = self.navigator.borrow();
            if navigator.is_transitioning() || navigator.is_resizing() {
                return;
            }
        }

        let generation = self.scroll_debouncer.trigger();
        let weak_self = self.weak();
        glib::timeout_add_local_once(self.scroll_debouncer.delay(), move || {
            if let Some(window) = weak_self.upgrade() {
                if window.scroll_debouncer.is_current(generation) {
                    window.on_scroll_settled();
                }
            }
        });
    }

    fn on_scroll_settled(&self) {
        let nearest = self.geometry().nearest_cell();
        let decision = self.navigator.borrow_mut().snap_decision(nearest);
        match decision {
            Some(SnapDecision::Snap(pos)) => {
                tracing::debug!("Snapping to {}", pos);
                self.scroll_to(pos, true);
            }
            Some(SnapDecision::Track(pos)) => {
                tracing::debug!("Tracking {} inside the gallery", pos);
            }
            None => return,
        }
        self.refresh_blocks();
    }

    fn on_viewport_resized(&self, width: i32, height: i32) {
        self.navigator.borrow_mut().set_resizing(true);
        self.scroll_debouncer.cancel();
        self.rooms.resize(width, height);
        self.lightbox.refit(width as f64, height as f64);

        let generation = self.resize_debouncer.trigger();
        let weak_self = self.weak();
        glib::timeout_add_local_once(self.resize_debouncer.delay(), move || {
            if let Some(window) = weak_self.upgrade() {
                if window.resize_debouncer.is_current(generation) {
                    window.finish_resize();
                }
            }
        });
    }

    fn finish_resize(&self) {
        self.navigator.borrow_mut().set_resizing(false);
        let current = self.navigator.borrow().current();
        self.scroll_to(current, false);
        tracing::debug!("Resize settled, realigned to {}", current);
    }

    fn toggle_nav(&self) {
        let visible = !self.nav_visible.get();
        self.nav_visible.set(visible);
        self.nav_items.set_visible(visible);
        for (_, button) in &self.arrows {
            button.set_visible(visible);
        }
        self.nav_toggle_button
            .set_label(if visible { "[nav: ON]" } else { "[nav: OFF]" });
        let state = if visible { "nav shown" } else { "nav hidden" };
        self.debug_panel.update(|info| info.nav = state.to_string());
    }

    // Lightbox

    fn open_lightbox(&self, item: &GalleryItem) {
        let (w, h) = self.viewport();
        self.lightbox.open(item, w, h);
        self.keybindings.set_lightbox_open(true);
        self.debug_panel
            .update(|info| info.lightbox = format!("open ({})", item.name));
    }

    // Gallery

    fn notify(&self, notice: Notice) {
        dialogs::show_notice(&self.window, &notice);
    }

    fn notify_error(&self, err: &GalleryError) {
        tracing::warn!("Gallery action failed: {}", err);
        if let Some(notice) = Notice::for_error(err) {
            self.notify(notice);
        }
    }

    fn render_gallery(&self) {
        let gallery = self.gallery.borrow();
        self.gallery_view.render(&gallery.render());
        self.gallery_view.set_active_filter(gallery.filter());
        self.gallery_view.set_sort_mode(gallery.sort_mode());
        self.gallery_view
            .set_logged_in(self.session.borrow().is_logged_in());
    }

    fn set_filter(&self, tag: &str) {
        self.gallery.borrow_mut().set_filter(tag);
        self.render_gallery();
        self.debug_panel
            .update(|info| info.filter = tag.to_string());
    }

    fn toggle_sort(&self) {
        {
            let mut gallery = self.gallery.borrow_mut();
            let mode = gallery.sort_mode().toggled();
            gallery.set_sort_mode(mode);
        }
        self.render_gallery();
    }

    fn toggle_login(&self) {
        if self.session.borrow().is_logged_in() {
            self.session.borrow_mut().logout();
            self.render_gallery();
            self.notify(Notice::LoggedOut);
            return;
        }

        self.navigator.borrow_mut().set_login_modal_open(true);
        let submit_weak = self.weak();
        let closed_weak = self.weak();
        dialogs::prompt_login(
            &self.window,
            move |user, password| {
                submit_weak
                    .upgrade()
                    .is_some_and(|window| window.try_login(user, password))
            },
            move || {
                if let Some(window) = closed_weak.upgrade() {
                    window.navigator.borrow_mut().set_login_modal_open(false);
                }
            },
        );
    }

    fn try_login(&self, user: &str, password: &str) -> bool {
        let result = self.session.borrow_mut().login(user, password);
        match result {
            Ok(()) => {
                self.render_gallery();
                self.notify(Notice::LoggedIn);
                true
            }
            Err(err) => {
                tracing::info!("Login rejected: {}", err);
                self.notify(Notice::InvalidCredentials);
                false
            }
        }
    }

    fn prompt_upload(&self) {
        if !self.session.borrow().is_logged_in() {
            self.notify(Notice::LoginRequired);
            return;
        }

        let filter = gtk4::FileFilter::new();
        filter.set_name(Some("Images and videos"));
        filter.add_mime_type("image/*");
        filter.add_mime_type("video/*");
        let filters = gio::ListStore::new::<gtk4::FileFilter>();
        filters.append(&filter);

        let dialog = gtk4::FileDialog::builder()
            .title("Upload artwork")
            .modal(true)
            .filters(&filters)
            .build();

        let weak_self = self.weak();
        dialog.open_multiple(
            Some(&self.window),
            gio::Cancellable::NONE,
            move |result| {
                let Some(window) = weak_self.upgrade() else {
                    return;
                };
                match result {
                    Ok(files) => {
                        let paths: Vec<PathBuf> = files
                            .iter::<gio::File>()
                            .filter_map(Result::ok)
                            .filter_map(|file| file.path())
                            .collect();
                        window.upload_paths(&paths);
                    }
                    Err(err) => tracing::debug!("Upload dialog dismissed: {}", err),
                }
            },
        );
    }

    /// Validate on the main thread, read bytes on a worker, accept one by one.
    fn upload_paths(&self, paths: &[PathBuf]) {
        let prepared = {
            let session = self.session.borrow();
            self.gallery.borrow().prepare_upload(&session, paths)
        };
        let (accepted, rejected) = match prepared {
            Ok(split) => split,
            Err(err) => {
                self.notify_error(&err);
                return;
            }
        };
        for err in &rejected {
            self.notify_error(err);
        }
        if accepted.is_empty() {
            return;
        }

        tracing::info!("Reading {} upload(s)", accepted.len());
        let (sender, receiver) =
            async_channel::unbounded::<Result<UploadPayload, GalleryError>>();
        std::thread::spawn(move || {
            for candidate in &accepted {
                if sender.send_blocking(read_upload(candidate)).is_err() {
                    break;
                }
            }
        });

        let weak_self = self.weak();
        glib::spawn_future_local(async move {
            while let Ok(result) = receiver.recv().await {
                let Some(window) = weak_self.upgrade() else {
                    break;
                };
                match result {
                    Ok(payload) => window.accept_payload(payload),
                    Err(err) => window.notify_error(&err),
                }
            }
        });
    }

    fn accept_payload(&self, payload: UploadPayload) {
        let result = {
            let session = self.session.borrow();
            let mut gallery = self.gallery.borrow_mut();
            gallery
                .accept_upload(&session, payload, now_millis())
                .map(|item| item.name.clone())
        };
        match result {
            Ok(name) => {
                self.render_gallery();
                self.notify(Notice::Uploaded(name));
            }
            Err(err) => self.notify_error(&err),
        }
    }

    fn request_delete(&self, fingerprint: u64) {
        let name = match self.gallery.borrow().find(fingerprint) {
            Some(item) => item.name.clone(),
            None => return,
        };

        let weak_self = self.weak();
        dialogs::confirm(&self.window, &format!("Delete {}?", name), move |yes| {
            if !yes {
                return;
            }
            let Some(window) = weak_self.upgrade() else {
                return;
            };
            if !window.session.borrow().is_logged_in() {
                window.notify(Notice::ArtistOnly);
                return;
            }
            let weak_self = window.weak();
            dialogs::confirm(
                &window.window,
                "Are you sure? This cannot be undone.",
                move |confirmed| {
                    if let Some(window) = weak_self.upgrade() {
                        window.delete_item(fingerprint, confirmed);
                    }
                },
            );
        });
    }

    fn delete_item(&self, fingerprint: u64, confirmed: bool) {
        let result = {
            let session = self.session.borrow();
            self.gallery
                .borrow_mut()
                .delete(&session, fingerprint, confirmed)
        };
        match result {
            Ok(item) => {
                self.render_gallery();
                self.notify(Notice::Deleted(item.name));
            }
            Err(err) => self.notify_error(&err),
        }
    }

    // Parameters

    fn save_settings(&self, values: Vec<(Tunable, u64)>) {
        {
            let mut settings = self.settings.borrow_mut();
            for (tunable, value) in values {
                settings.set(tunable, value);
            }
        }
        self.apply_settings();

        let pairs = self.settings.borrow().stored_pairs();
        let result = {
            let gallery = self.gallery.borrow();
            pairs
                .iter()
                .try_for_each(|(key, value)| gallery.store().set_setting(key, value))
        };
        match result {
            Ok(()) => {
                tracing::info!("Saved {} settings", pairs.len());
                self.notify(Notice::SettingsSaved);
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to save settings");
                self.notify(Notice::Failed(err.to_string()));
            }
        }
    }

    fn apply_settings(&self) {
        let settings = self.settings.borrow();
        self.sequencer
            .borrow_mut()
            .set_timings(settings.transition_timings());
        self.scroll_debouncer.set_delay(settings.scroll_debounce());
        self.resize_debouncer.set_delay(settings.resize_debounce());
        self.gallery
            .borrow_mut()
            .set_limits(settings.upload_limits());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_css_parses() {
        // Doesn't require GTK initialization
        assert!(!FALLBACK_CSS.is_empty());
        assert!(FALLBACK_CSS.contains("border-radius: 0"));
        assert!(FALLBACK_CSS.contains(".transition-curtain"));
    }

    #[test]
    fn test_fallback_css_styles_hovered_tiles() {
        let rule = FALLBACK_CSS
            .split(".gallery-item.hover {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .unwrap();
        assert!(rule.contains("transform: scale(1.05)"));
        assert!(rule.contains("box-shadow: 0 0 12px"));
        assert!(FALLBACK_CSS.contains(".overview-backdrop"));
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(100.0, 300.0, 0.0), 100.0);
        assert_eq!(lerp(100.0, 300.0, 1.0), 300.0);
        assert_eq!(lerp(300.0, 100.0, 0.5), 200.0);
    }
}
