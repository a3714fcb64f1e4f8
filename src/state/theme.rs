use egui::{Color32, Visuals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// Color of the per-point annotation labels.
    pub fn annotation_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgba_unmultiplied(220, 220, 220, 180),
            Theme::Light => Color32::from_rgba_unmultiplied(40, 40, 40, 180),
        }
    }

    pub fn error_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(240, 90, 90),
            Theme::Light => Color32::from_rgb(190, 30, 30),
        }
    }
}
