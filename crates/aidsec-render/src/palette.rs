#![forbid(unsafe_code)]

//! Colors used across the page.

/// Page background behind most charts.
pub const SAGE_GREEN: &str = "#8A9A5B";
/// Background behind the world maps and word cloud.
pub const LIGHT_GRAY: &str = "#DEDEDE";
/// Country border color on maps.
pub const BORDER_GRAY: &str = "#999999";
/// Axis and legend text.
pub const AXIS_TEXT: &str = "white";

/// Male, female, unknown.
pub const GENDER: [&str; 3] = ["skyblue", "lightpink", "gray"];

/// UN, INGO, ICRC, NRCS and IFRC, NNGO, Other.
pub const ORGANIZATIONS: [&str; 6] = [
    "#4169E1", "#32CD32", "#FF0000", "#FFD700", "#9370DB", "#808080",
];

/// National / international series on the comparison chart.
pub const NATIONAL: &str = "#ffffff";
pub const INTERNATIONAL: &str = "#ffd700";

/// Total incidents line and its area fill.
pub const INCIDENT_LINE: &str = "#ffffff";
pub const INCIDENT_FILL: &str = "rgba(255, 255, 255, 0.2)";

/// Location bars.
pub const LOCATION_BAR: &str = "#4ECDC4";

/// Word cloud colors, cycled by rank.
pub const WORD_CLOUD: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#9B59B6", "#3498DB", "#FF9F43", "#26A69A",
    "#5D4037", "#5C6BC0",
];

/// Stops of the verification-rate map.
pub const VERIFICATION_SCALE: [(f64, &str); 3] = [(0.0, "#ffe5e5"), (0.5, "#ff4d4d"), (1.0, "#800000")];

/// Stops of the Sudan highlight layer.
pub const HIGHLIGHT_REDS: [(f64, &str); 6] = [
    (0.0, "#ffebe6"),
    (0.2, "#ffb3b3"),
    (0.4, "#ff8080"),
    (0.6, "#ff4d4d"),
    (0.8, "#ff1a1a"),
    (1.0, "#cc0000"),
];

/// Word-cloud color for a rank.
#[must_use]
pub fn word_color(rank: usize) -> &'static str {
    WORD_CLOUD[rank % WORD_CLOUD.len()]
}

#[cfg(test)]
mod tests {
    #[test]
    fn word_colors_cycle() {
        assert_eq!(super::word_color(0), super::word_color(10));
        assert_ne!(super::word_color(0), super::word_color(1));
    }
}
