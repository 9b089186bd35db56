//! Colour customization of the alpaca's named sub-meshes.
//!
//! The [`ColorTable`] binds eight fixed, human readable labels to the sub-mesh
//! they recolour. Writes go through the [`SubMeshColors`] seam so the table never
//! needs to know whether it talks to GPU materials or to a test double.

/// The eight recolourable parts of the alpaca, in panel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    Main,
    Light,
    Dark,
    Hooves,
    Hair,
    Snout,
    EyeDark,
    EyeLight,
}

impl ColorSlot {
    pub const ALL: [ColorSlot; 8] = [
        ColorSlot::Main,
        ColorSlot::Light,
        ColorSlot::Dark,
        ColorSlot::Hooves,
        ColorSlot::Hair,
        ColorSlot::Snout,
        ColorSlot::EyeDark,
        ColorSlot::EyeLight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColorSlot::Main => "Color principal",
            ColorSlot::Light => "Color claro",
            ColorSlot::Dark => "Color oscuro",
            ColorSlot::Hooves => "Pezuñas",
            ColorSlot::Hair => "Cabello",
            ColorSlot::Snout => "Hocico",
            ColorSlot::EyeDark => "Ojo oscuro",
            ColorSlot::EyeLight => "Ojo claro",
        }
    }

    /// Name of the sub-mesh this slot recolours.
    pub fn mesh_name(self) -> &'static str {
        match self {
            ColorSlot::Main => "Cube",
            ColorSlot::Light => "Cube_1",
            ColorSlot::Dark => "Cube_2",
            ColorSlot::Hooves => "Cube_3",
            ColorSlot::Hair => "Cube_4",
            ColorSlot::Snout => "Cube_5",
            ColorSlot::EyeDark => "Cube_6",
            ColorSlot::EyeLight => "Cube_7",
        }
    }

    pub fn default_hex(self) -> u32 {
        match self {
            ColorSlot::Main => 0x787a79,
            ColorSlot::Light => 0xb9b9b9,
            ColorSlot::Dark => 0x383838,
            ColorSlot::Hooves => 0x46423c,
            ColorSlot::Hair => 0x383838,
            ColorSlot::Snout => 0x3d3426,
            ColorSlot::EyeDark => 0x181818,
            ColorSlot::EyeLight => 0xe0e0e0,
        }
    }

    pub fn from_label(label: &str) -> Option<ColorSlot> {
        Self::ALL.into_iter().find(|slot| slot.label() == label)
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|&slot| slot == self)
            .unwrap_or_default()
    }
}

/// Anything that owns named sub-meshes whose material colour can be written.
pub trait SubMeshColors {
    /// Set the material colour of the sub-mesh called `name`.
    ///
    /// Returns `false` when no such sub-mesh exists, which callers treat as
    /// "this part is not present on the asset" rather than as an error.
    fn set_sub_mesh_color(&mut self, name: &str, hex: u32) -> bool;
}

/// Used before the model has finished loading: every lookup misses.
impl SubMeshColors for () {
    fn set_sub_mesh_color(&mut self, _: &str, _: u32) -> bool {
        false
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorOption {
    pub slot: ColorSlot,
    pub current_hex: u32,
    pub default_hex: u32,
}

impl ColorOption {
    pub fn label(&self) -> &'static str {
        self.slot.label()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorTable {
    options: [ColorOption; 8],
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorTable {
    pub fn new() -> Self {
        Self {
            options: ColorSlot::ALL.map(|slot| ColorOption {
                slot,
                current_hex: slot.default_hex(),
                default_hex: slot.default_hex(),
            }),
        }
    }

    pub fn options(&self) -> &[ColorOption] {
        &self.options
    }

    pub fn get(&self, slot: ColorSlot) -> &ColorOption {
        &self.options[slot.index()]
    }

    pub fn current(&self, slot: ColorSlot) -> u32 {
        self.get(slot).current_hex
    }

    /// Record `hex` for `slot` and push it to the bound sub-mesh if it exists.
    pub fn set_color(&mut self, slot: ColorSlot, hex: u32, target: &mut dyn SubMeshColors) {
        let hex = hex & 0x00ff_ffff;
        self.options[slot.index()].current_hex = hex;
        apply(slot, hex, target);
    }

    /// Restore every option to its default and reapply all eight colours.
    pub fn reset_all(&mut self, target: &mut dyn SubMeshColors) {
        for option in self.options.iter_mut() {
            option.current_hex = option.default_hex;
            apply(option.slot, option.current_hex, target);
        }
    }
}

fn apply(slot: ColorSlot, hex: u32, target: &mut dyn SubMeshColors) {
    if !target.set_sub_mesh_color(slot.mesh_name(), hex) {
        log::debug!(
            "No sub-mesh named {} for {:?}, colour {:06x} kept for later",
            slot.mesh_name(),
            slot.label(),
            hex
        );
    }
}

/// Split an sRGB hex colour into its 8 bit channels.
pub fn hex_to_rgb8(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

pub fn rgb8_to_hex(rgb: [u8; 3]) -> u32 {
    u32::from(rgb[0]) << 16 | u32::from(rgb[1]) << 8 | u32::from(rgb[2])
}

/// One 8 bit channel of an sRGB hex colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 3] = [
        ColorChannel::Red,
        ColorChannel::Green,
        ColorChannel::Blue,
    ];

    fn shift(self) -> u32 {
        match self {
            ColorChannel::Red => 16,
            ColorChannel::Green => 8,
            ColorChannel::Blue => 0,
        }
    }

    pub fn get(self, hex: u32) -> u8 {
        (hex >> self.shift()) as u8
    }

    /// `hex` with this channel replaced by `value`.
    pub fn with(self, hex: u32, value: u8) -> u32 {
        let mask = 0xff << self.shift();
        (hex & 0x00ff_ffff & !mask) | u32::from(value) << self.shift()
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// sRGB hex to the linear RGB the shaders work in.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    hex_to_rgb8(hex).map(|c| srgb_to_linear(f32::from(c) / 255.0))
}

/// Inverse of [`hex_to_linear`], rounding to the nearest 8 bit value.
pub fn linear_to_hex(rgb: [f32; 3]) -> u32 {
    rgb8_to_hex(rgb.map(|c| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8))
}

pub fn hex_to_wgpu_colour(hex: u32) -> wgpu::Color {
    let [r, g, b] = hex_to_linear(hex);
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: 1.0,
    }
}
