use serde::{Deserialize, Serialize};

use crate::api::types::TextureHandle;

/// Linear RGB color, components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a 0xRRGGBB token.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// What a primitive's surface shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Texture(TextureHandle),
    /// Flat color; used on its own or when a texture failed to load.
    Color(Rgb),
}

/// Appearance of a sphere or ring primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub surface: Surface,
    /// Self-illumination (default: 0.0). Stars use 1.0.
    pub emissive: f32,
    /// Opacity (default: 1.0). Atmospheres and rings are translucent.
    pub opacity: f32,
    /// Phong specular exponent (default: 32.0).
    pub shininess: f32,
    /// Render both faces. Rings and atmospheres need it.
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            surface: Surface::Color(Rgb::WHITE),
            emissive: 0.0,
            opacity: 1.0,
            shininess: 32.0,
            double_sided: false,
        }
    }
}

impl Material {
    pub fn textured(texture: TextureHandle) -> Self {
        Self {
            surface: Surface::Texture(texture),
            ..Default::default()
        }
    }

    pub fn flat(color: Rgb) -> Self {
        Self {
            surface: Surface::Color(color),
            ..Default::default()
        }
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        match self.surface {
            Surface::Texture(handle) => Some(handle),
            Surface::Color(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        for hex in [0x000000, 0xFFFFFF, 0x6B93D6, 0xCD5C5C] {
            assert_eq!(Rgb::from_hex(hex).to_hex(), hex);
        }
    }

    #[test]
    fn builder_sets_fields() {
        let m = Material::flat(Rgb::from_hex(0x87CEEB))
            .with_opacity(1.5)
            .with_emissive(0.2)
            .double_sided();
        assert_eq!(m.opacity, 1.0);
        assert_eq!(m.emissive, 0.2);
        assert!(m.double_sided);
        assert_eq!(m.texture(), None);
        assert_eq!(Material::textured(TextureHandle(3)).texture(), Some(TextureHandle(3)));
    }
}
