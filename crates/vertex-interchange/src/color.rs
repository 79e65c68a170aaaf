/// An RGBA color with linear f32 channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    /// Opaque color from RGB channels
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    pub const fn to_array(self) -> [f32; 3] {
        [self.red, self.green, self.blue]
    }

    pub const fn to_array_with_alpha(self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for wgpu::Color {
    fn from(color: Color) -> Self {
        wgpu::Color {
            r: color.red as f64,
            g: color.green as f64,
            b: color.blue as f64,
            a: color.alpha as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Color::default(), Color::BLACK);
        assert_eq!(Color::WHITE.to_array(), [1.0, 1.0, 1.0]);
        assert_eq!(Color::TRANSPARENT.to_array_with_alpha(), [0.0; 4]);
        assert_eq!(Color::rgb(0.25, 0.5, 0.75).alpha, 1.0);
    }

    #[test]
    fn test_into_wgpu_color() {
        let color: wgpu::Color = Color::new(0.5, 0.25, 1.0, 0.0).into();
        assert_eq!(color, wgpu::Color { r: 0.5, g: 0.25, b: 1.0, a: 0.0 });
    }
}
