pub mod session;

pub use session::*;

/// Colours handed out to newly drawn zones, round-robin.
pub const ZONE_COLORS: [&str; 8] = [
    "#3366ff", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
];

pub fn zone_color(index: usize) -> &'static str {
    ZONE_COLORS[index % ZONE_COLORS.len()]
}
