use seedconfig::PlatformSetting;

use crate::types::Size;

/// Platform class that decides whether letterboxing needs a seam fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Standard,
    /// Fullscreen browsers that leave a one-pixel seam around scaled surfaces.
    QuirkyFullscreen,
}

impl Platform {
    /// Resolves `auto` against the platform this binary was built for.
    pub fn from_setting(setting: PlatformSetting) -> Self {
        match setting {
            PlatformSetting::Standard => Platform::Standard,
            PlatformSetting::QuirkyFullscreen => Platform::QuirkyFullscreen,
            PlatformSetting::Auto => {
                if cfg!(target_os = "ios") {
                    Platform::QuirkyFullscreen
                } else {
                    Platform::Standard
                }
            }
        }
    }
}

/// On-screen placement of a surface inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Vertical offset; negative when the surface is cropped top and bottom.
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

/// Fits `surface` to the container's width, preserving its aspect ratio and
/// centring it vertically.
///
/// Width always matches the container; the height follows from the aspect
/// ratio and may overflow the container (cropping) or leave bars
/// (letterboxing). Returns `None` for a surface with a zero dimension.
pub fn letterbox(surface: Size, container: Size, platform: Platform) -> Option<Placement> {
    if surface.width == 0 || surface.height == 0 {
        return None;
    }
    let aspect = f64::from(surface.width) / f64::from(surface.height);
    let mut width = container.width;
    let mut height = (f64::from(width) / aspect).round() as u32;
    let top = ((f64::from(container.height) - f64::from(height)) / 2.0).floor() as i64;

    if platform == Platform::QuirkyFullscreen {
        width = width.saturating_add(1);
        height = height.saturating_add(1);
    }

    Some(Placement { top, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterboxes_wide_surface_in_square_container() {
        let placement = letterbox(
            Size::new(1280, 720),
            Size::new(800, 800),
            Platform::Standard,
        )
        .unwrap();
        assert_eq!(
            placement,
            Placement {
                top: 175,
                width: 800,
                height: 450,
            }
        );
    }

    #[test]
    fn crops_when_container_is_wider_than_surface() {
        let placement = letterbox(
            Size::new(1000, 1000),
            Size::new(1200, 600),
            Platform::Standard,
        )
        .unwrap();
        assert_eq!(placement.width, 1200);
        assert_eq!(placement.height, 1200);
        assert_eq!(placement.top, -300);
    }

    #[test]
    fn odd_remainders_round_down() {
        let placement = letterbox(
            Size::new(1280, 720),
            Size::new(800, 801),
            Platform::Standard,
        )
        .unwrap();
        assert_eq!(placement.top, 175);

        let placement = letterbox(
            Size::new(1280, 720),
            Size::new(1920, 1079),
            Platform::Standard,
        )
        .unwrap();
        assert_eq!(placement.height, 1080);
        assert_eq!(placement.top, -1);
    }

    #[test]
    fn quirky_fullscreen_pads_after_centering() {
        let placement = letterbox(
            Size::new(1280, 720),
            Size::new(800, 800),
            Platform::QuirkyFullscreen,
        )
        .unwrap();
        assert_eq!(
            placement,
            Placement {
                top: 175,
                width: 801,
                height: 451,
            }
        );
    }

    #[test]
    fn quirky_padding_saturates_at_the_largest_container() {
        let placement = letterbox(
            Size::new(1, 1),
            Size::new(u32::MAX, 10),
            Platform::QuirkyFullscreen,
        )
        .unwrap();
        assert_eq!(placement.width, u32::MAX);
        assert_eq!(placement.height, u32::MAX);
        assert!(placement.top < 0);
    }

    #[test]
    fn degenerate_surface_has_no_placement() {
        assert!(letterbox(Size::new(0, 720), Size::new(800, 800), Platform::Standard).is_none());
        assert!(letterbox(Size::new(1280, 0), Size::new(800, 800), Platform::Standard).is_none());
    }

    #[test]
    fn explicit_settings_map_directly() {
        assert_eq!(
            Platform::from_setting(PlatformSetting::QuirkyFullscreen),
            Platform::QuirkyFullscreen
        );
        assert_eq!(
            Platform::from_setting(PlatformSetting::Standard),
            Platform::Standard
        );
    }
}
