//! Zoom level shown by the zoom bar.

/// Lowest zoom percentage.
pub const MIN_ZOOM_PERCENT: u16 = 10;
/// Highest zoom percentage.
pub const MAX_ZOOM_PERCENT: u16 = 500;
/// Step applied per zoom interaction.
pub const ZOOM_STEP_PERCENT: u16 = 10;
/// Zoom percentage at startup.
pub const DEFAULT_ZOOM_PERCENT: u16 = 100;

/// Integer zoom percentage, always within
/// [`MIN_ZOOM_PERCENT`, `MAX_ZOOM_PERCENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomLevel(u16);

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(DEFAULT_ZOOM_PERCENT)
    }
}

impl ZoomLevel {
    /// Create a zoom level, clamping into range.
    pub fn from_percent(percent: u16) -> Self {
        Self(percent.clamp(MIN_ZOOM_PERCENT, MAX_ZOOM_PERCENT))
    }

    /// The zoom percentage.
    pub fn percent(self) -> u16 {
        self.0
    }

    /// Scale factor for the camera (1.0 = 100%).
    pub fn scale(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// One step in, saturating at the maximum.
    pub fn zoomed_in(self) -> Self {
        Self::from_percent(self.0.saturating_add(ZOOM_STEP_PERCENT))
    }

    /// One step out, saturating at the minimum.
    pub fn zoomed_out(self) -> Self {
        Self::from_percent(self.0.saturating_sub(ZOOM_STEP_PERCENT))
    }
}

impl std::fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_100() {
        assert_eq!(ZoomLevel::default().percent(), 100);
        assert!((ZoomLevel::default().scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamped_at_max() {
        let mut zoom = ZoomLevel::default();
        for _ in 0..50 {
            zoom = zoom.zoomed_in();
            assert!(zoom.percent() <= MAX_ZOOM_PERCENT);
        }
        assert_eq!(zoom.percent(), MAX_ZOOM_PERCENT);
    }

    #[test]
    fn test_clamped_at_min() {
        let mut zoom = ZoomLevel::default();
        for _ in 0..50 {
            zoom = zoom.zoomed_out();
            assert!(zoom.percent() >= MIN_ZOOM_PERCENT);
        }
        assert_eq!(zoom.percent(), MIN_ZOOM_PERCENT);
    }

    #[test]
    fn test_from_percent_clamps() {
        assert_eq!(ZoomLevel::from_percent(0).percent(), MIN_ZOOM_PERCENT);
        assert_eq!(ZoomLevel::from_percent(9000).percent(), MAX_ZOOM_PERCENT);
        assert_eq!(ZoomLevel::from_percent(250).percent(), 250);
    }

    #[test]
    fn test_display() {
        assert_eq!(ZoomLevel::from_percent(130).to_string(), "130%");
    }
}
