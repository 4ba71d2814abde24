//! Keeps the names editor, the preview list and the shared scrollbar at matching offsets.
//!
//! The editor is the source of truth. Every other region is derived from its position.

/// Maps `position` within `[0, source_max]` onto `[0, target_max]`, rounding to the nearest step.
pub fn follow(position: f32, source_max: f32, target_max: f32) -> f32 {
    let ratio = if source_max > 0.0 {
        position / source_max
    } else {
        0.0
    };

    (ratio * target_max).round()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPositions {
    pub input: f32,
    pub list: f32,
    /// The shared scrollbar spans the editor's range, so this always equals `input`.
    pub shared: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollSync {
    input_max: f32,
    list_max: f32,
    input: f32,
}

impl ScrollSync {
    pub fn input_max(&self) -> f32 {
        self.input_max
    }

    pub fn list_max(&self) -> f32 {
        self.list_max
    }

    pub fn input(&self) -> f32 {
        self.input
    }

    pub fn set_input_max(&mut self, max: f32) {
        self.input_max = max.max(0.0);
        self.input = self.input.clamp(0.0, self.input_max);
    }

    pub fn set_list_max(&mut self, max: f32) {
        self.list_max = max.max(0.0);
    }

    pub fn positions(&self) -> ScrollPositions {
        ScrollPositions {
            input: self.input,
            list: follow(self.input, self.input_max, self.list_max),
            shared: self.input,
        }
    }

    pub fn from_input(&mut self, position: f32) -> ScrollPositions {
        self.input = position.clamp(0.0, self.input_max);
        self.positions()
    }

    pub fn from_shared(&mut self, position: f32) -> ScrollPositions {
        self.from_input(position)
    }

    /// The list is not authoritative: its offset is mapped back onto the editor, then re-derived.
    pub fn from_list(&mut self, position: f32) -> ScrollPositions {
        let input = follow(position.clamp(0.0, self.list_max), self.list_max, self.input_max);
        self.from_input(input)
    }
}
