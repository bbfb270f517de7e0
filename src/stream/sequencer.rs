//! Frame counting with loop/stop semantics.

/// Result of one [`FrameSequencer::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved to the next frame.
    Continued,
    /// All frames were consumed and looping is on; the frame index is back
    /// at zero and the caller must restart the epoch.
    WrappedAndRestarted,
    /// All frames were consumed and looping is off; decoding is over.
    Halted,
}

/// Tracks the current frame against the declared frame count.
///
/// A capture declaring `frame_count = N` is exhausted after exactly N
/// advances, whether or not more bytes follow in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSequencer {
    current: i32,
    frame_count: i32,
    halted: bool,
}

impl FrameSequencer {
    /// Sequencer for a capture of `frame_count` frames.
    pub fn new(frame_count: i32) -> Self {
        Self { current: 0, frame_count, halted: false }
    }

    /// Step one frame.
    pub fn advance(&mut self, looping: bool) -> StepOutcome {
        if self.halted {
            return StepOutcome::Halted;
        }
        if self.current >= self.frame_count {
            if !looping {
                self.halted = true;
                return StepOutcome::Halted;
            }
            self.current = 0;
            return StepOutcome::WrappedAndRestarted;
        }
        self.current += 1;
        StepOutcome::Continued
    }

    /// Frames advanced in the current epoch.
    #[inline]
    pub fn current_frame(&self) -> i32 {
        self.current
    }

    /// Declared frame count.
    #[inline]
    pub fn frame_count(&self) -> i32 {
        self.frame_count
    }

    /// Update the frame count, e.g. after re-reading the header.
    #[inline]
    pub fn set_frame_count(&mut self, frame_count: i32) {
        self.frame_count = frame_count;
    }

    /// Whether decoding has stopped for good.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Force the halted state.
    #[inline]
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Back to frame zero, not halted.
    pub fn restart(&mut self) {
        self.current = 0;
        self.halted = false;
    }
}
