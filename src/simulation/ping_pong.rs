//! Double-buffered read/write role tracking.

/// Two slots whose read/write roles flip on every [`swap`](PingPong::swap).
///
/// The slots themselves never move or get reallocated; only the index of the
/// read slot changes. `read()` and `write()` always refer to different slots.
#[derive(Clone, Debug)]
pub struct PingPong<T> {
    slots: [T; 2],
    read: usize,
    frame: u64,
}

impl<T> PingPong<T> {
    /// `a` starts as the read slot, `b` as the write slot.
    pub fn new(a: T, b: T) -> Self {
        Self {
            slots: [a, b],
            read: 0,
            frame: 0,
        }
    }

    pub fn read(&self) -> &T {
        &self.slots[self.read]
    }

    pub fn write(&self) -> &T {
        &self.slots[1 - self.read]
    }

    /// Index (0 or 1) of the slot currently used as the read source.
    pub fn read_index(&self) -> usize {
        self.read
    }

    /// Hand the freshly written slot over as the next read source.
    pub fn swap(&mut self) {
        self.read = 1 - self.read;
        self.frame += 1;
    }

    /// Number of swaps performed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn slots(&self) -> &[T; 2] {
        &self.slots
    }

    /// Which slot each pass of the current frame binds.
    pub fn frame_bindings(&self) -> FrameBindings<'_, T> {
        FrameBindings {
            sim_src: self.read(),
            sim_dst: self.write(),
            // Display shows what the simulation writes this frame
            display_src: self.write(),
        }
    }
}

/// Per-frame slot assignment for the simulation and display passes.
#[derive(Debug)]
pub struct FrameBindings<'a, T> {
    /// Previous positions sampled by the simulation pass
    pub sim_src: &'a T,
    /// Render target of the simulation pass
    pub sim_dst: &'a T,
    /// Positions sampled by the display pass
    pub display_src: &'a T,
}
