use enigo::{self, MouseButton, MouseControllable};
use std::{thread, time::Duration};

use crate::model::Point;

/// Gap between the press and release halves of a click.
pub const CLICK_SETTLE: Duration = Duration::from_millis(1);

/// Posts synthetic mouse clicks at global screen coordinates.
///
/// Implementations never report failure: a click the OS refuses is dropped.
/// Whether the process may synthesize input at all is the caller's concern,
/// see [`crate::permission::PermissionService`].
pub trait InputSynthesizer: Send + Sync {
    /// Press, settle for [`CLICK_SETTLE`], release. With `warp_cursor` the
    /// visible pointer is left on the target afterwards.
    fn click(&self, at: Point, warp_cursor: bool);
}

/// Left clicks through `enigo`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnigoSynthesizer;

impl InputSynthesizer for EnigoSynthesizer {
    fn click(&self, at: Point, warp_cursor: bool) {
        // enigo 0.1 handles are not Send, so each click gets its own.
        let mut en = enigo::Enigo::new();
        let (x, y) = at.to_pixels();

        // enigo only clicks where the pointer is; without warp we put it back.
        let restore = if warp_cursor { None } else { Some(en.mouse_location()) };

        en.mouse_move_to(x, y);
        en.mouse_down(MouseButton::Left);
        thread::sleep(CLICK_SETTLE);
        en.mouse_up(MouseButton::Left);

        if let Some((rx, ry)) = restore {
            en.mouse_move_to(rx, ry);
        }
        tracing::trace!(x, y, warp_cursor, "click posted");
    }
}
