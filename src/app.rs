use crate::config::AppConfig;
use crate::layout::PositionMap;
use crate::model::{format_traversal, Mutation, Snapshot, TraversalKind, TreeKind};
use crate::ui::render::{draw_load_failure, draw_tree};
use crate::ui::surface::{Scene, Surface};
use crate::worker::{Job, JobResult, Outcome, Refresh, Request, Ticket};
use kurbo::{Rect, Size};

pub const BUSY_MESSAGE: &str = "Busy: waiting for the tree service";
pub const MIN_DEGREE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorMode {
    #[default]
    Normal,
    Mirrored,
}

/// What is on screen, changed only when an outcome from the service lands.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub snapshot: Option<Snapshot>,
    pub tree_type: TreeKind,
    pub mirror: MirrorMode,
    pub load_failed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    Insert,
    Delete,
    Degree,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    Input {
        purpose: InputPurpose,
        buffer: String,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Pan and zoom over the scene. `left`/`top` are the scene coordinates of
/// the canvas's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 8.0;
    pub const ZOOM_STEP: f64 = 1.25;

    pub fn visible(&self, size: Size) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + size.width / self.zoom,
            self.top + size.height / self.zoom,
        )
    }

    /// Moves by screen units, so a step feels the same at every zoom.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.left += dx / self.zoom;
        self.top += dy / self.zoom;
    }

    /// Zooms around the center of the visible area.
    pub fn zoom_by(&mut self, factor: f64, size: Size) {
        let center = self.visible(size).center();
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.center_on(center.x, center.y, size);
    }

    pub fn fit(&mut self, bounds: Rect, size: Size) {
        if size.width <= 0.0 || size.height <= 0.0 || bounds.width() <= 0.0 || bounds.height() <= 0.0
        {
            return;
        }
        self.zoom = (size.width / bounds.width())
            .min(size.height / bounds.height())
            .clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let center = bounds.center();
        self.center_on(center.x, center.y, size);
    }

    fn center_on(&mut self, x: f64, y: f64, size: Size) {
        self.left = x - size.width / self.zoom / 2.0;
        self.top = y - size.height / self.zoom / 2.0;
    }
}

pub struct AppState {
    pub running: bool,
    pub mode: AppMode,
    pub config: AppConfig,
    pub view: ViewState,
    pub viewport: Viewport,
    pub scene: Scene,
    pub positions: Option<PositionMap>,
    pub message: Option<StatusMessage>,
    pub info_line: Option<String>,
    pub traversal_line: Option<String>,

    in_flight: Option<Ticket>,
    // `Some(with_info)` when a refresh is waiting for the in-flight request.
    queued_refresh: Option<bool>,
    // A mirror fetch is out and its result is still wanted.
    mirror_requested: bool,
    next_ticket: Ticket,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let view = ViewState {
            tree_type: config.tree_type,
            ..ViewState::default()
        };

        Self {
            running: true,
            mode: AppMode::Normal,
            config,
            view,
            viewport: Viewport::default(),
            scene: Scene::new(Size::ZERO),
            positions: None,
            message: None,
            info_line: None,
            traversal_line: None,
            in_flight: None,
            queued_refresh: None,
            mirror_requested: false,
            next_ticket: 1,
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: msg.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(StatusMessage {
            text: msg.into(),
            is_error: true,
        });
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_mirrored(&self) -> bool {
        self.view.mirror == MirrorMode::Mirrored
    }

    fn issue(&mut self, job: Job) -> Request {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        tracing::debug!(ticket, ?job, tree_type = %self.view.tree_type, "request issued");
        Request {
            ticket,
            tree_type: self.view.tree_type,
            job,
        }
    }

    /// Single-flight gate for everything except refreshes: rejected with a
    /// visible message while another request is running.
    fn begin_exclusive(&mut self, job: Job) -> Option<Request> {
        if self.is_busy() {
            tracing::debug!(?job, "request rejected, service busy");
            self.set_error(BUSY_MESSAGE);
            return None;
        }
        Some(self.issue(job))
    }

    /// Refreshes never get rejected: while busy they collapse into one
    /// queued refresh that goes out when the in-flight request lands.
    pub fn request_refresh(&mut self, with_info: bool) -> Option<Request> {
        if self.is_busy() {
            let merged = self.queued_refresh.unwrap_or(false) || with_info;
            self.queued_refresh = Some(merged);
            tracing::debug!(with_info = merged, "refresh queued");
            return None;
        }
        Some(self.issue(Job::Refresh { with_info }))
    }

    /// Allowed in mirrored mode. The mirror stays on screen until the
    /// mutation's refresh installs the authoritative tree.
    pub fn request_mutation(&mut self, mutation: Mutation) -> Option<Request> {
        self.begin_exclusive(Job::Mutate(mutation))
    }

    pub fn request_traversal(&mut self, traversal: TraversalKind) -> Option<Request> {
        self.begin_exclusive(Job::Traversal(traversal))
    }

    pub fn request_info(&mut self) -> Option<Request> {
        self.begin_exclusive(Job::Info)
    }

    pub fn toggle_mirror(&mut self) -> Option<Request> {
        if self.is_busy() {
            self.set_error(BUSY_MESSAGE);
            return None;
        }
        match self.view.mirror {
            MirrorMode::Normal => self.request_mirror(),
            MirrorMode::Mirrored => self.begin_exclusive(Job::Restore),
        }
    }

    fn request_mirror(&mut self) -> Option<Request> {
        let request = self.begin_exclusive(Job::ShowMirror)?;
        self.mirror_requested = true;
        Some(request)
    }

    /// Mirrored, or about to be: structure refreshes would overwrite the
    /// mirror and are not issued.
    fn mirror_shown_or_pending(&self) -> bool {
        self.is_mirrored() || self.mirror_requested
    }

    /// Manual refresh. The mirrored view is re-fetched as a mirror so the
    /// styling and the tree keep agreeing.
    pub fn refresh_view(&mut self) -> Option<Request> {
        if self.mirror_shown_or_pending() {
            self.request_mirror()
        } else {
            self.request_refresh(true)
        }
    }

    /// The current snapshot and mirror styling stay until the new type's
    /// structure lands; a mirror fetch still out is abandoned.
    pub fn cycle_tree_type(&mut self) -> Option<Request> {
        self.mirror_requested = false;
        self.view.tree_type = self.view.tree_type.next();
        self.traversal_line = None;
        self.set_message(format!("Tree type: {}", self.view.tree_type));
        self.request_refresh(true)
    }

    /// Releases the gate for a request that never reached the worker.
    pub fn request_lost(&mut self, request: &Request) {
        if self.in_flight == Some(request.ticket) {
            self.in_flight = None;
        }
    }

    /// Applies a finished request. Outcomes for anything but the in-flight
    /// ticket are stale and dropped. Returns the queued refresh, if one is
    /// now due.
    pub fn apply_outcome(&mut self, outcome: Outcome) -> Option<Request> {
        if self.in_flight != Some(outcome.ticket) {
            tracing::warn!(
                ticket = outcome.ticket,
                in_flight = ?self.in_flight,
                "stale outcome dropped"
            );
            return None;
        }
        self.in_flight = None;

        match outcome.result {
            JobResult::Refreshed(refresh) => self.install_refresh(refresh),
            JobResult::Mutated {
                mutation,
                message,
                refresh,
            } => {
                match message {
                    Ok(text) => self.set_message(text),
                    Err(err) => {
                        tracing::error!(error = %err, ?mutation, "mutation failed");
                        self.set_error(format!("Failed to {}: {err}", mutation.describe()));
                    }
                }
                // Without a refresh the mirror, if shown, is still what the
                // screen holds.
                if let Some(refresh) = refresh {
                    self.install_refresh(refresh);
                }
            }
            JobResult::Mirrored(_) if !self.mirror_requested => {
                tracing::info!("mirror outcome discarded, tree type changed");
            }
            JobResult::Mirrored(Ok(mirror)) => {
                self.mirror_requested = false;
                match mirror.snapshot {
                    None => self.set_error(mirror.message),
                    Some(snapshot) => {
                        self.view.snapshot = Some(snapshot);
                        self.view.load_failed = false;
                        self.view.mirror = MirrorMode::Mirrored;
                        self.set_message(mirror.message);
                        self.relayout();
                        if self.queued_refresh.take().is_some() {
                            tracing::debug!("queued refresh dropped, mirror shown");
                        }
                    }
                }
            }
            JobResult::Mirrored(Err(err)) => {
                self.mirror_requested = false;
                tracing::error!(error = %err, "mirror fetch failed");
                self.set_error(format!("Failed to show mirror: {err}"));
            }
            JobResult::Restored(refresh) => {
                if refresh.structure.is_ok() {
                    self.set_message("Original tree restored");
                }
                self.install_refresh(refresh);
            }
            JobResult::Traversal { traversal, values } => match values {
                Ok(values) => self.traversal_line = Some(format_traversal(traversal, &values)),
                Err(err) => {
                    tracing::error!(error = %err, ?traversal, "traversal failed");
                    self.set_error(format!("Traversal failed: {err}"));
                }
            },
            JobResult::Info(Ok(info)) => self.info_line = Some(info.summary()),
            JobResult::Info(Err(err)) => {
                tracing::error!(error = %err, "info fetch failed");
                self.set_error(format!("Failed to load tree info: {err}"));
            }
        }

        let with_info = self.queued_refresh.take()?;
        self.request_refresh(with_info)
    }

    /// Installs a structure fetch. Whatever it holds replaces a mirror, so
    /// mirror mode ends here.
    fn install_refresh(&mut self, refresh: Refresh) {
        self.leave_mirror();
        match refresh.structure {
            Ok(snapshot) => {
                self.view.snapshot = snapshot;
                self.view.load_failed = false;
            }
            Err(err) => {
                tracing::error!(error = %err, "structure fetch failed");
                self.view.snapshot = None;
                self.view.load_failed = true;
                self.set_error(format!("Failed to load tree: {err}"));
            }
        }

        match refresh.info {
            Some(Ok(info)) => self.info_line = Some(info.summary()),
            // Info failures only cost the summary line.
            Some(Err(err)) => tracing::warn!(error = %err, "info fetch failed"),
            None => {}
        }

        self.relayout();
    }

    fn leave_mirror(&mut self) {
        if self.is_mirrored() {
            tracing::info!("leaving mirror view");
            self.view.mirror = MirrorMode::Normal;
        }
    }

    /// Redraws the scene from the current view state.
    pub fn relayout(&mut self) {
        if self.view.load_failed {
            draw_load_failure(&mut self.scene);
            self.positions = None;
        } else {
            self.positions = draw_tree(
                &mut self.scene,
                self.view.snapshot.as_ref(),
                &self.config.layout,
            );
        }
    }

    /// Called with the measured canvas size on every frame. A change relays
    /// the scene at once and asks for a fresh structure, except for the very
    /// first measurement and while the mirrored view is shown.
    pub fn surface_changed(&mut self, size: Size) -> Option<Request> {
        let previous = self.scene.size();
        if previous == size {
            return None;
        }
        tracing::debug!(?previous, ?size, "surface resized");
        self.scene.resize(size);
        self.relayout();

        if previous == Size::ZERO || self.mirror_shown_or_pending() {
            return None;
        }
        self.request_refresh(false)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        let step = self.config.pan_step;
        self.viewport.pan(dx * step, dy * step);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_by(Viewport::ZOOM_STEP, self.scene.size());
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_by(1.0 / Viewport::ZOOM_STEP, self.scene.size());
    }

    pub fn reset_view(&mut self) {
        self.viewport = Viewport::default();
    }

    pub fn fit_view(&mut self) {
        let Some(bounds) = self.positions.as_ref().and_then(PositionMap::bounds) else {
            self.set_error("Nothing to fit");
            return;
        };
        let layout = &self.config.layout;
        let padded = bounds.inflate(
            layout.min_node_width / 2.0,
            layout.node_height.max(2.0 * layout.node_radius),
        );
        self.viewport.fit(padded, self.scene.size());
    }
}
