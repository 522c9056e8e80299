//! Named colors used by the default look.

use crate::foundation::core::Rgba8;

/// Frame background.
pub const BACK_GRAY: Rgba8 = Rgba8::from_rgb_hex(0x0E1A24);
/// Axes and secondary lines.
pub const GRAY: Rgba8 = Rgba8::from_rgb_hex(0x9EA2AA);
/// Primary text.
pub const WHITE: Rgba8 = Rgba8::from_rgb_hex(0xFCFEFF);
/// Accent.
pub const RED: Rgba8 = Rgba8::from_rgb_hex(0xDF0E49);
/// Accent.
pub const YELLOW: Rgba8 = Rgba8::from_rgb_hex(0xEFD159);
/// Accent.
pub const GREEN: Rgba8 = Rgba8::from_rgb_hex(0x0ECE8D);
/// Accent.
pub const BLUE: Rgba8 = Rgba8::from_rgb_hex(0x2C9FD5);
