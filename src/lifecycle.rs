// Mount/unmount of the particle background.
//
// `ParticleEffect` acquires the surface, the listeners and the frame loop
// from a `Host` on activation and hands every one of them back on
// deactivation. Dropping the effect deactivates it. The browser host lives
// in `web::host`; tests drive a fake one.

use crate::config::{EffectConfig, Theme};
use crate::cursor::CustomCursor;
use crate::error::EffectError;
use crate::field::ParticleField;
use crate::input::HostEvent;
use crate::pointer::{PointerState, PointerTracker, Rect};
use crate::renderer::{FrameStats, Renderer};
use crate::surface::{Surface, Viewport};

/// Milliseconds in one 60 Hz frame; physics is tuned in these units.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Window,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerEnter,
    PointerLeave,
    Resize,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::PointerMove,
        EventKind::PointerEnter,
        EventKind::PointerLeave,
        EventKind::Resize,
    ];

    pub fn dom_name(&self) -> &'static str {
        match self {
            EventKind::PointerMove => "mousemove",
            EventKind::PointerEnter => "mouseenter",
            EventKind::PointerLeave => "mouseleave",
            EventKind::Resize => "resize",
        }
    }

    // Enter/leave only fire on the document element, resize only on the window
    pub fn target(&self) -> ListenerTarget {
        match self {
            EventKind::PointerMove | EventKind::Resize => ListenerTarget::Window,
            EventKind::PointerEnter | EventKind::PointerLeave => ListenerTarget::Document,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Everything the effect needs from the page.
pub trait Host {
    type Surface: Surface;

    fn prefers_reduced_motion(&self) -> bool;
    fn has_coarse_pointer(&self) -> bool;
    fn viewport(&self) -> Viewport;
    fn acquire_surface(&mut self, viewport: Viewport) -> Result<Self::Surface, EffectError>;
    fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EffectError>;
    fn remove_listener(&mut self, id: ListenerId);
    fn request_frame(&mut self) -> Result<FrameHandle, EffectError>;
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Events queued by listeners since the last call.
    fn drain_events(&mut self) -> Vec<HostEvent>;
    /// Bounding boxes of links and buttons. Expensive; callers throttle it.
    fn interactive_rects(&self) -> Vec<Rect>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptOut {
    ReducedMotion,
    CoarsePointer,
    SurfaceUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Running,
    OptedOut(OptOut),
}

struct Running<S> {
    surface: S,
    field: ParticleField,
    listeners: Vec<ListenerId>,
    frame: Option<FrameHandle>,
    last_timestamp: Option<f64>,
}

enum Phase<S> {
    Idle,
    Running(Running<S>),
    OptedOut(OptOut),
    Stopped,
}

pub struct ParticleEffect<H: Host> {
    host: H,
    config: EffectConfig,
    tracker: PointerTracker,
    cursor: CustomCursor,
    renderer: Renderer,
    phase: Phase<H::Surface>,
    stats: FrameStats,
}

impl<H: Host> ParticleEffect<H> {
    pub fn new(host: H, config: EffectConfig) -> Self {
        let config = config.sanitized();
        ParticleEffect {
            host,
            tracker: PointerTracker::new(config.scan_interval_ms),
            cursor: CustomCursor::new(),
            renderer: Renderer::new(),
            phase: Phase::Idle,
            stats: FrameStats::default(),
            config,
        }
    }

    pub fn activate(&mut self) -> Result<Activation, EffectError> {
        match self.phase {
            Phase::Running(_) => return Ok(Activation::Running),
            Phase::OptedOut(reason) => return Ok(Activation::OptedOut(reason)),
            Phase::Idle | Phase::Stopped => {}
        }

        if self.host.prefers_reduced_motion() {
            return Ok(self.opt_out(OptOut::ReducedMotion));
        }
        if self.host.has_coarse_pointer() {
            return Ok(self.opt_out(OptOut::CoarsePointer));
        }

        let viewport = self.host.viewport();
        let mut surface = match self.host.acquire_surface(viewport) {
            Ok(surface) => surface,
            Err(err) => {
                log::info!("particle effect disabled: {}", err);
                return Ok(self.opt_out(OptOut::SurfaceUnavailable));
            }
        };
        surface.resize(viewport);
        let field = ParticleField::new(viewport, &self.config);

        let mut listeners = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL.iter() {
            match self.host.add_listener(*kind) {
                Ok(id) => listeners.push(id),
                Err(err) => {
                    self.release(listeners, None);
                    return Err(err);
                }
            }
        }
        let frame = match self.host.request_frame() {
            Ok(frame) => frame,
            Err(err) => {
                self.release(listeners, None);
                return Err(err);
            }
        };

        log::info!(
            "particle effect running: {} particles on {}x{}",
            field.particles().len(),
            viewport.width,
            viewport.height
        );
        self.phase = Phase::Running(Running {
            surface,
            field,
            listeners,
            frame: Some(frame),
            last_timestamp: None,
        });
        Ok(Activation::Running)
    }

    /// One animation frame. `timestamp_ms` is the `requestAnimationFrame` time.
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<(), EffectError> {
        let ParticleEffect {
            host,
            config,
            tracker,
            cursor,
            renderer,
            phase,
            stats,
        } = self;
        let running = match phase {
            Phase::Running(running) => running,
            _ => return Ok(()),
        };
        // The handle we were holding is the one that just fired
        running.frame = None;

        for event in host.drain_events() {
            match event {
                HostEvent::PointerMove { x, y } | HostEvent::PointerEnter { x, y } => tracker.on_move(x, y),
                HostEvent::PointerLeave => tracker.on_leave(),
                HostEvent::Resize { width, height } => {
                    let viewport = Viewport::new(width, height);
                    running.surface.resize(viewport);
                    running.field.resize(viewport);
                    tracker.invalidate_targets();
                }
            }
        }

        let frames = match running.last_timestamp {
            Some(last) => (timestamp_ms - last) / FRAME_MS,
            None => 1.0,
        };
        running.last_timestamp = Some(timestamp_ms);

        running.field.step(&tracker.state(), frames);
        if config.cursor {
            tracker.refresh_targets(timestamp_ms, || host.interactive_rects());
            cursor.update(tracker, config, frames);
        }
        *stats = renderer.render(
            &mut running.surface,
            &running.field,
            if config.cursor { Some(&*cursor) } else { None },
        );

        running.frame = Some(host.request_frame()?);
        Ok(())
    }

    /// Stop the frame loop and remove every listener. Safe to call twice.
    pub fn deactivate(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Stopped) {
            Phase::Running(running) => {
                self.release(running.listeners, running.frame);
                // Input queued before unmount must not replay on a remount
                self.host.drain_events();
                log::info!("particle effect stopped");
            }
            Phase::Idle => self.phase = Phase::Idle,
            Phase::OptedOut(_) | Phase::Stopped => {}
        }
        self.tracker.on_leave();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.config.theme = theme;
        if let Phase::Running(running) = &mut self.phase {
            running.field.set_theme(theme);
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    pub fn opt_out_reason(&self) -> Option<OptOut> {
        match self.phase {
            Phase::OptedOut(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&ParticleField> {
        match &self.phase {
            Phase::Running(running) => Some(&running.field),
            _ => None,
        }
    }

    pub fn pointer(&self) -> PointerState {
        self.tracker.state()
    }

    pub fn over_interactive(&self) -> bool {
        self.tracker.over_interactive()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.stats
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn opt_out(&mut self, reason: OptOut) -> Activation {
        log::info!("particle effect opted out: {:?}", reason);
        self.phase = Phase::OptedOut(reason);
        Activation::OptedOut(reason)
    }

    fn release(&mut self, listeners: Vec<ListenerId>, frame: Option<FrameHandle>) {
        if let Some(frame) = frame {
            self.host.cancel_frame(frame);
        }
        for id in listeners {
            self.host.remove_listener(id);
        }
    }
}

impl<H: Host> Drop for ParticleEffect<H> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::rc::Rc;

    use super::*;
    use crate::surface::recording::RecordingSurface;

    #[derive(Default)]
    struct FakeState {
        reduced_motion: bool,
        coarse_pointer: bool,
        no_surface: bool,
        fail_listener: Option<EventKind>,
        viewport: Option<Viewport>,
        listeners: HashMap<u32, EventKind>,
        next_id: u32,
        pending_frames: Vec<i32>,
        next_frame: i32,
        events: VecDeque<HostEvent>,
        rects: Vec<Rect>,
        surfaces_acquired: usize,
        rect_scans: usize,
        surface: RecordingSurface,
    }

    #[derive(Clone, Default)]
    struct FakeHost {
        state: Rc<RefCell<FakeState>>,
    }

    impl FakeHost {
        fn push(&self, event: HostEvent) {
            self.state.borrow_mut().events.push_back(event);
        }

        fn listener_count(&self) -> usize {
            self.state.borrow().listeners.len()
        }

        fn pending_frames(&self) -> usize {
            self.state.borrow().pending_frames.len()
        }

        fn surface(&self) -> RecordingSurface {
            self.state.borrow().surface.clone()
        }
    }

    impl Host for FakeHost {
        type Surface = RecordingSurface;

        fn prefers_reduced_motion(&self) -> bool {
            self.state.borrow().reduced_motion
        }

        fn has_coarse_pointer(&self) -> bool {
            self.state.borrow().coarse_pointer
        }

        fn viewport(&self) -> Viewport {
            self.state.borrow().viewport.unwrap_or(Viewport::new(1000.0, 750.0))
        }

        fn acquire_surface(&mut self, _viewport: Viewport) -> Result<RecordingSurface, EffectError> {
            let mut state = self.state.borrow_mut();
            if state.no_surface {
                return Err(EffectError::SurfaceUnavailable("no 2d context".into()));
            }
            state.surfaces_acquired += 1;
            Ok(state.surface.clone())
        }

        fn add_listener(&mut self, kind: EventKind) -> Result<ListenerId, EffectError> {
            let mut state = self.state.borrow_mut();
            if state.fail_listener == Some(kind) {
                return Err(EffectError::Host(format!("cannot listen for {}", kind.dom_name())));
            }
            state.next_id += 1;
            let id = state.next_id;
            state.listeners.insert(id, kind);
            Ok(ListenerId(id))
        }

        fn remove_listener(&mut self, id: ListenerId) {
            self.state.borrow_mut().listeners.remove(&id.0);
        }

        fn request_frame(&mut self) -> Result<FrameHandle, EffectError> {
            let mut state = self.state.borrow_mut();
            state.next_frame += 1;
            let handle = state.next_frame;
            state.pending_frames.push(handle);
            Ok(FrameHandle(handle))
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.state.borrow_mut().pending_frames.retain(|h| *h != handle.0);
        }

        fn drain_events(&mut self) -> Vec<HostEvent> {
            self.state.borrow_mut().events.drain(..).collect()
        }

        fn interactive_rects(&self) -> Vec<Rect> {
            let mut state = self.state.borrow_mut();
            state.rect_scans += 1;
            state.rects.clone()
        }
    }

    fn config() -> EffectConfig {
        EffectConfig {
            seed: Some(3),
            ..EffectConfig::default()
        }
    }

    // Fire the pending frame the way the browser would
    fn run_frame(effect: &mut ParticleEffect<FakeHost>, host: &FakeHost, t: f64) {
        host.state.borrow_mut().pending_frames.clear();
        effect.frame(t).unwrap();
    }

    #[test]
    fn activation_registers_listeners_and_starts_loop() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert_eq!(effect.activate().unwrap(), Activation::Running);
        assert!(effect.is_running());
        assert_eq!(host.listener_count(), EventKind::ALL.len());
        assert_eq!(host.pending_frames(), 1);
        assert_eq!(effect.field().unwrap().particles().len(), 50);
    }

    #[test]
    fn activate_twice_is_idempotent() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        effect.activate().unwrap();
        assert_eq!(host.listener_count(), EventKind::ALL.len());
        assert_eq!(host.state.borrow().surfaces_acquired, 1);
    }

    #[test]
    fn deactivate_releases_everything() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        run_frame(&mut effect, &host, 16.0);
        assert_eq!(host.pending_frames(), 1);

        effect.deactivate();
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert!(!effect.is_running());

        // A stray frame after unmount draws nothing and schedules nothing
        host.surface().reset();
        effect.frame(32.0).unwrap();
        assert_eq!(host.surface().draw_count(), 0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn drop_releases_everything() {
        let host = FakeHost::default();
        {
            let mut effect = ParticleEffect::new(host.clone(), config());
            effect.activate().unwrap();
            assert_eq!(host.listener_count(), 4);
        }
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn reduced_motion_means_zero_draw_calls() {
        let host = FakeHost::default();
        host.state.borrow_mut().reduced_motion = true;
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert_eq!(
            effect.activate().unwrap(),
            Activation::OptedOut(OptOut::ReducedMotion)
        );
        for t in 0..10 {
            effect.frame(t as f64 * FRAME_MS).unwrap();
        }
        assert_eq!(host.surface().draw_count(), 0);
        assert_eq!(host.state.borrow().surfaces_acquired, 0);
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn coarse_pointer_opts_out() {
        let host = FakeHost::default();
        host.state.borrow_mut().coarse_pointer = true;
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert_eq!(
            effect.activate().unwrap(),
            Activation::OptedOut(OptOut::CoarsePointer)
        );
        assert_eq!(effect.opt_out_reason(), Some(OptOut::CoarsePointer));
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn missing_surface_is_a_silent_no_op() {
        let host = FakeHost::default();
        host.state.borrow_mut().no_surface = true;
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert_eq!(
            effect.activate().unwrap(),
            Activation::OptedOut(OptOut::SurfaceUnavailable)
        );
        effect.frame(0.0).unwrap();
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.pending_frames(), 0);
    }

    #[test]
    fn failed_listener_rolls_back_earlier_ones() {
        let host = FakeHost::default();
        host.state.borrow_mut().fail_listener = Some(EventKind::Resize);
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert!(matches!(effect.activate(), Err(EffectError::Host(_))));
        assert_eq!(host.listener_count(), 0);
        assert!(!effect.is_running());
    }

    #[test]
    fn frame_draws_and_reschedules() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        run_frame(&mut effect, &host, 0.0);
        assert!(host.surface().draw_count() > 0);
        assert_eq!(effect.last_stats().particles, 50);
        assert_eq!(host.pending_frames(), 1);
    }

    #[test]
    fn pointer_events_reach_the_tracker() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        host.push(HostEvent::PointerEnter { x: 5.0, y: 6.0 });
        host.push(HostEvent::PointerMove { x: 50.0, y: 60.0 });
        run_frame(&mut effect, &host, 0.0);
        assert_eq!(effect.pointer(), PointerState::at(50.0, 60.0));
        host.push(HostEvent::PointerLeave);
        run_frame(&mut effect, &host, FRAME_MS);
        assert!(!effect.pointer().is_present());
    }

    #[test]
    fn resize_rebuilds_particles() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        host.push(HostEvent::Resize { width: 3000.0, height: 2000.0 });
        host.push(HostEvent::Resize { width: 400.0, height: 300.0 });
        run_frame(&mut effect, &host, 0.0);
        let field = effect.field().unwrap();
        assert_eq!(field.viewport(), Viewport::new(400.0, 300.0));
        assert_eq!(field.particles().len(), 20);
        assert!(field.particles().iter().all(|p| field.viewport().contains(p.pos)));
    }

    #[test]
    fn interactive_scan_is_throttled_across_frames() {
        let host = FakeHost::default();
        host.state.borrow_mut().rects = vec![Rect::new(0.0, 0.0, 100.0, 100.0)];
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        host.push(HostEvent::PointerMove { x: 10.0, y: 10.0 });
        // one second of frames at ~4 ms apart
        for i in 0..250 {
            run_frame(&mut effect, &host, i as f64 * 4.0);
        }
        let scans = host.state.borrow().rect_scans;
        assert!(scans <= 1000 / 50 + 1, "{} scans", scans);
        assert!(effect.over_interactive());
    }

    #[test]
    fn no_scans_when_cursor_disabled() {
        let host = FakeHost::default();
        let config = EffectConfig {
            cursor: false,
            ..config()
        };
        let mut effect = ParticleEffect::new(host.clone(), config);
        effect.activate().unwrap();
        host.push(HostEvent::PointerMove { x: 10.0, y: 10.0 });
        run_frame(&mut effect, &host, 0.0);
        assert_eq!(host.state.borrow().rect_scans, 0);
    }

    #[test]
    fn theme_switch_respawns_particles() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        effect.set_theme(Theme::Light);
        let light = crate::color::palette(Theme::Light);
        let field = effect.field().unwrap();
        assert_eq!(field.theme(), Theme::Light);
        assert!(field.particles().iter().all(|p| light.contains(&p.color)));
    }

    #[test]
    fn unmount_discards_queued_input() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        host.push(HostEvent::Resize { width: 400.0, height: 300.0 });
        host.push(HostEvent::PointerMove { x: 50.0, y: 60.0 });
        effect.deactivate();
        assert!(host.state.borrow().events.is_empty());

        effect.activate().unwrap();
        run_frame(&mut effect, &host, 0.0);
        assert!(!effect.pointer().is_present());
        assert_eq!(effect.field().unwrap().viewport(), Viewport::new(1000.0, 750.0));
    }

    #[test]
    fn media_gates_run_before_surface_lookup() {
        let host = FakeHost::default();
        {
            let mut state = host.state.borrow_mut();
            state.reduced_motion = true;
            state.no_surface = true;
        }
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert_eq!(
            effect.activate().unwrap(),
            Activation::OptedOut(OptOut::ReducedMotion)
        );
    }

    #[test]
    fn failed_start_leaves_an_inert_effect() {
        let host = FakeHost::default();
        host.state.borrow_mut().fail_listener = Some(EventKind::PointerLeave);
        let mut effect = ParticleEffect::new(host.clone(), config());
        assert!(effect.activate().is_err());
        host.surface().reset();
        for t in 0..5 {
            effect.frame(t as f64 * FRAME_MS).unwrap();
        }
        assert_eq!(host.surface().draw_count(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.listener_count(), 0);
        effect.deactivate();
    }

    #[test]
    fn can_remount_after_unmount() {
        let host = FakeHost::default();
        let mut effect = ParticleEffect::new(host.clone(), config());
        effect.activate().unwrap();
        effect.deactivate();
        assert_eq!(effect.activate().unwrap(), Activation::Running);
        assert_eq!(host.listener_count(), 4);
        effect.deactivate();
        assert_eq!(host.listener_count(), 0);
    }
}
