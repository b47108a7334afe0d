//! Haptic feedback capability
//!
//! Hosts that can vibrate implement `Haptics`. The simulation calls it on
//! state-changing events and works the same when it is absent.

/// Strength of an impact pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

/// Outcome signalled by a notification pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Success,
    Error,
    Warning,
}

pub trait Haptics {
    fn impact(&mut self, style: ImpactStyle);
    fn notify(&mut self, outcome: NotifyOutcome);
    fn select(&mut self);
}

/// Used when the host has no haptics
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn impact(&mut self, _style: ImpactStyle) {}
    fn notify(&mut self, _outcome: NotifyOutcome) {}
    fn select(&mut self) {}
}

/// Logs feedback signals, for terminal sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHaptics;

impl Haptics for TracingHaptics {
    fn impact(&mut self, style: ImpactStyle) {
        tracing::trace!(?style, "haptic impact");
    }

    fn notify(&mut self, outcome: NotifyOutcome) {
        tracing::trace!(?outcome, "haptic notify");
    }

    fn select(&mut self) {
        tracing::trace!("haptic select");
    }
}

/// Records every signal, for tests and replays
#[derive(Debug, Clone, Default)]
pub struct RecordingHaptics {
    signals: std::rc::Rc<std::cell::RefCell<Vec<HapticSignal>>>,
}

/// One recorded feedback call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticSignal {
    Impact(ImpactStyle),
    Notify(NotifyOutcome),
    Select,
}

impl RecordingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals recorded so far by this handle or any clone of it
    pub fn signals(&self) -> Vec<HapticSignal> {
        self.signals.borrow().clone()
    }
}

impl Haptics for RecordingHaptics {
    fn impact(&mut self, style: ImpactStyle) {
        self.signals.borrow_mut().push(HapticSignal::Impact(style));
    }

    fn notify(&mut self, outcome: NotifyOutcome) {
        self.signals.borrow_mut().push(HapticSignal::Notify(outcome));
    }

    fn select(&mut self) {
        self.signals.borrow_mut().push(HapticSignal::Select);
    }
}
