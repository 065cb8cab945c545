//! Thin light streaks that slide across the backdrop and lean on the pointer.

use crate::pointer::PointerPosition;

pub const STREAK_COUNT: usize = 5;

/// Opacity of every streak.
pub const STREAK_OPACITY: f32 = 0.3;

/// Colour at the bright centre of a streak (`#3b82f6`).
pub const STREAK_COLOR: [f32; 3] = [59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0];

/// One streak at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Streak {
    /// Vertical position as a fraction of the viewport height.
    pub top: f32,
    /// Horizontal offset as a fraction of the viewport width, `-1..=1`.
    pub offset: f32,
    /// Vertical scale of the one-pixel line.
    pub thickness: f32,
}

fn period(index: usize) -> f32 {
    15.0 + 5.0 * index as f32
}

/// Lays out all streaks for the given pointer and elapsed time.
pub fn streak_layout(
    pointer: PointerPosition,
    viewport: (u32, u32),
    elapsed: f32,
) -> [Streak; STREAK_COUNT] {
    let width = viewport.0.max(1) as f64;
    let height = viewport.1.max(1) as f64;
    let pointer_x = (pointer.x / width) as f32;
    let pointer_y = (pointer.y / height) as f32;

    std::array::from_fn(|index| {
        let cycle = period(index);
        let progress = (elapsed.max(0.0) % cycle) / cycle;
        Streak {
            top: (20.0 + index as f32 * 15.0 + pointer_y * 10.0) / 100.0,
            offset: -1.0 + 2.0 * progress,
            thickness: 1.0 + pointer_x * 3.0 * progress,
        }
    })
}
