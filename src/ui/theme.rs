use ratatui::style::{Color, Modifier, Style};

use crate::health::HealthStatus;
use crate::view::projection::ThreadTone;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Auto,
    Truecolor,
    Color256,
    Mono,
}

impl ColorSupport {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "truecolor" | "24bit" => ColorSupport::Truecolor,
            "256" | "256color" => ColorSupport::Color256,
            "mono" | "monochrome" => ColorSupport::Mono,
            _ => ColorSupport::Auto,
        }
    }
}

pub fn detect_color_support() -> ColorSupport {
    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorSupport::Truecolor;
    }
    ColorSupport::Color256
}

pub fn resolve_color_support(config: &str) -> ColorSupport {
    let parsed = ColorSupport::from_config_str(config);
    if parsed == ColorSupport::Auto {
        detect_color_support()
    } else {
        parsed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub tab_active: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_unfilled: Color,
    pub sparkline_color: Color,
    pub banner_ok: Color,
    pub banner_err: Color,
    /// Good, warning, critical.
    pub health: [Color; 3],
    /// Added to critical on top of its color.
    pub critical_modifier: Modifier,
}

impl Theme {
    pub fn from_config(theme_name: &str, support: ColorSupport) -> Self {
        let mut theme = match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            _ => Self::dark(),
        };
        if support == ColorSupport::Mono {
            theme = Self::mono();
        }
        theme.apply_color_support(support);
        theme
    }

    pub fn status_color(&self, status: HealthStatus) -> Color {
        match status {
            HealthStatus::Good => self.health[0],
            HealthStatus::Warning => self.health[1],
            HealthStatus::Critical => self.health[2],
        }
    }

    pub fn status_style(&self, status: HealthStatus) -> Style {
        let style = Style::default().fg(self.status_color(status));
        match status {
            HealthStatus::Critical => style.add_modifier(self.critical_modifier),
            _ => style,
        }
    }

    pub fn thread_color(&self, tone: ThreadTone) -> Color {
        match tone {
            ThreadTone::Running => self.health[0],
            ThreadTone::Blocked => self.health[2],
            ThreadTone::Waiting => self.health[1],
            ThreadTone::Other => self.text_secondary,
        }
    }

    fn apply_color_support(&mut self, support: ColorSupport) {
        let map = |c: Color| adapt_color(c, support);

        self.header_accent_bg = map(self.header_accent_bg);
        self.header_accent_fg = map(self.header_accent_fg);
        self.tab_active = map(self.tab_active);
        self.statusbar_bg = map(self.statusbar_bg);
        self.overlay_border = map(self.overlay_border);
        self.text_primary = map(self.text_primary);
        self.text_secondary = map(self.text_secondary);
        self.pill_key_bg = map(self.pill_key_bg);
        self.pill_key_fg = map(self.pill_key_fg);
        self.pill_desc_fg = map(self.pill_desc_fg);
        self.surface_bg = map(self.surface_bg);
        self.gauge_unfilled = map(self.gauge_unfilled);
        self.sparkline_color = map(self.sparkline_color);
        self.banner_ok = map(self.banner_ok);
        self.banner_err = map(self.banner_err);
        self.health = self.health.map(map);
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            tab_active: Color::Rgb(103, 232, 249),
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_unfilled: Color::DarkGray,
            sparkline_color: Color::Rgb(251, 146, 60),
            banner_ok: Color::Rgb(16, 185, 129),
            banner_err: Color::Rgb(239, 68, 68),
            health: [
                Color::Rgb(16, 185, 129),
                Color::Rgb(249, 115, 22),
                Color::Rgb(239, 68, 68),
            ],
            critical_modifier: Modifier::BOLD,
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Blue,
            header_accent_fg: Color::White,
            tab_active: Color::Blue,
            statusbar_bg: Color::Rgb(220, 220, 220),
            overlay_border: Color::Rgb(150, 150, 150),
            text_primary: Color::Black,
            text_secondary: Color::DarkGray,
            pill_key_bg: Color::Blue,
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(200, 200, 200),
            gauge_unfilled: Color::Rgb(200, 200, 200),
            sparkline_color: Color::Rgb(70, 130, 180),
            banner_ok: Color::Rgb(0, 120, 0),
            banner_err: Color::Red,
            health: [
                Color::Rgb(60, 160, 60),
                Color::Rgb(220, 150, 30),
                Color::Rgb(200, 60, 60),
            ],
            critical_modifier: Modifier::BOLD,
        }
    }

    pub fn mono() -> Self {
        Theme {
            name: "mono",
            header_accent_bg: Color::Black,
            header_accent_fg: Color::White,
            tab_active: Color::White,
            statusbar_bg: Color::Black,
            overlay_border: Color::White,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            pill_key_bg: Color::White,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::Black,
            gauge_unfilled: Color::Black,
            sparkline_color: Color::White,
            banner_ok: Color::White,
            banner_err: Color::White,
            // warning and critical share a color, so critical is reversed
            health: [Color::Gray, Color::White, Color::White],
            critical_modifier: Modifier::BOLD | Modifier::REVERSED,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

fn adapt_color(color: Color, support: ColorSupport) -> Color {
    match support {
        ColorSupport::Truecolor | ColorSupport::Auto => color,
        ColorSupport::Color256 => match color {
            Color::Rgb(r, g, b) => Color::Indexed(rgb_to_ansi256(r, g, b)),
            _ => color,
        },
        ColorSupport::Mono => match color {
            Color::Rgb(r, g, b) => {
                let luminance = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
                if luminance > 128.0 {
                    Color::White
                } else {
                    Color::Black
                }
            }
            Color::White | Color::Black | Color::Gray | Color::DarkGray => color,
            _ => Color::White,
        },
    }
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let r = (r as f32 / 255.0 * 5.0).round() as u8;
    let g = (g as f32 / 255.0 * 5.0).round() as u8;
    let b = (b as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * r + 6 * g + b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_colors_are_distinct_in_dark() {
        let theme = Theme::dark();
        let good = theme.status_color(HealthStatus::Good);
        let warning = theme.status_color(HealthStatus::Warning);
        let critical = theme.status_color(HealthStatus::Critical);
        assert_ne!(good, warning);
        assert_ne!(warning, critical);
        assert_ne!(good, critical);
    }

    #[test]
    fn mono_tells_warning_from_critical() {
        let theme = Theme::mono();
        let warning = theme.status_style(HealthStatus::Warning);
        let critical = theme.status_style(HealthStatus::Critical);
        assert_ne!(warning, critical);
        assert!(critical.add_modifier.contains(Modifier::REVERSED));
        assert!(!warning.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn mono_support_forces_mono_theme() {
        let theme = Theme::from_config("light", ColorSupport::Mono);
        assert_eq!(theme.name, "mono");
    }

    #[test]
    fn color256_maps_rgb_to_indexed() {
        let theme = Theme::from_config("dark", ColorSupport::Color256);
        assert!(matches!(theme.tab_active, Color::Indexed(_)));
        assert!(
            theme
                .health
                .iter()
                .all(|c| matches!(c, Color::Indexed(_)))
        );
        // named colors pass through
        assert_eq!(theme.header_accent_bg, Color::Green);
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        let theme = Theme::from_config("solarized", ColorSupport::Truecolor);
        assert_eq!(theme, Theme::dark());
    }

    #[test]
    fn rgb_to_ansi256_corners() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }

    #[test]
    fn color_support_parsing() {
        assert_eq!(ColorSupport::from_config_str("24bit"), ColorSupport::Truecolor);
        assert_eq!(ColorSupport::from_config_str("256"), ColorSupport::Color256);
        assert_eq!(ColorSupport::from_config_str("mono"), ColorSupport::Mono);
        assert_eq!(ColorSupport::from_config_str("whatever"), ColorSupport::Auto);
    }
}
