/*
 * Platform-agnostic color primitives shared by the caption bar, the backdrop
 * effects and the Win32 painter. Nothing here touches the OS so the color
 * tables can be tested on any target.
 */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/*
 * A color with straight (non-premultiplied) alpha. Caption button tables are
 * written in `#AARRGGBB` notation, so `from_argb` is the usual constructor.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(color: Color) -> Self {
        Self::new(color.r, color.g, color.b, 0xFF)
    }

    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Parses the `RRGGBBAA` hex notation used for acrylic tints.
    pub fn from_rrggbbaa(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 8 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::new(
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ))
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn rgb(&self) -> Color {
        Color::rgb(self.r, self.g, self.b)
    }

    /// Alpha-blends this color over an opaque base. GDI has no per-pixel alpha
    /// for plain fills, so translucent table entries are flattened this way.
    pub fn blend_over(&self, base: Color) -> Color {
        let mix = |top: u8, bottom: u8| -> u8 {
            let a = self.a as u32;
            ((top as u32 * a + bottom as u32 * (255 - a) + 127) / 255) as u8
        };
        Color::rgb(mix(self.r, base.r), mix(self.g, base.g), mix(self.b, base.b))
    }

    /// Packs the color as `0xAABBGGRR`, the layout DWM's accent policy expects.
    pub fn to_abgr(&self) -> u32 {
        (self.a as u32) << 24 | (self.b as u32) << 16 | (self.g as u32) << 8 | self.r as u32
    }
}
