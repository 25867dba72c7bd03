use core::fmt;

/// The host's "run before next paint" channel.
///
/// Callbacks are host-driven: when a scheduled callback fires, the host calls
/// [`crate::VirtualList::on_frame`] with the handle it returned here.
pub trait FrameScheduler {
    type Handle: Copy + Eq + fmt::Debug;

    /// Requests a callback before the next repaint.
    ///
    /// Returns `None` when the host has no paint scheduling.
    fn request_animation_frame(&mut self) -> Option<Self::Handle>;
    fn cancel_animation_frame(&mut self, handle: Self::Handle);
    /// Queues a microtask. Microtasks cannot be cancelled.
    fn queue_microtask(&mut self) -> Self::Handle;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending<H> {
    Frame(H),
    Microtask(H),
}

impl<H: Copy> Pending<H> {
    fn handle(self) -> H {
        match self {
            Self::Frame(h) | Self::Microtask(h) => h,
        }
    }
}

/// A single-slot register for the deferred measurement callback.
///
/// Scheduling always cancels and replaces the previous callback, so at most one measurement
/// is pending at any time. A microtask cannot be cancelled on the host side, so a replaced
/// microtask simply stops matching the slot and is ignored when it fires.
#[derive(Debug)]
pub struct MeasureSlot<H> {
    pending: Option<Pending<H>>,
}

impl<H> Default for MeasureSlot<H> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<H: Copy + Eq + fmt::Debug> MeasureSlot<H> {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<H> {
        self.pending.map(Pending::handle)
    }

    /// Cancels any pending callback and schedules a new one.
    pub fn schedule<S: FrameScheduler<Handle = H> + ?Sized>(&mut self, scheduler: &mut S) -> H {
        self.cancel(scheduler);
        let next = match scheduler.request_animation_frame() {
            Some(h) => Pending::Frame(h),
            None => Pending::Microtask(scheduler.queue_microtask()),
        };
        vtrace!(?next, "MeasureSlot::schedule");
        self.pending = Some(next);
        next.handle()
    }

    pub fn cancel<S: FrameScheduler<Handle = H> + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(Pending::Frame(h)) = self.pending.take() {
            scheduler.cancel_animation_frame(h);
        }
    }

    /// Consumes the slot if `handle` is the pending callback.
    ///
    /// Returns `false` for stale or unknown handles.
    pub fn fire(&mut self, handle: H) -> bool {
        match self.pending {
            Some(p) if p.handle() == handle => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
