//! The colour and animation control panel.
//!
//! The panel is laid out in window pixels in the top right corner and drawn
//! as flat coloured quads with the GUI pipeline. Every colour row has a
//! swatch, which opens a picker of three channel bars below the row, and a
//! palette of preset chips. Layout and hit testing are
//! plain functions of the [`ViewerState`] and the window size, so they run
//! without a GPU. [`PanelFlow`] turns the layout into vertex buffers and
//! clicks into [`Command`]s.

use instant::Duration;
use wgpu::util::DeviceExt;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, WindowEvent},
};

use crate::{
    command::Command,
    context::{Context, InitContext},
    customize::{ColorChannel, ColorSlot, hex_to_linear},
    flow::{GraphicsFlow, Out},
    pipelines::gui,
    render::{Flat, Render},
    viewer::{ViewerEvent, ViewerState},
};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;

/// Pick ID of the panel's quads.
pub const PANEL_ID: u32 = 1;

pub const MARGIN: f32 = 10.0;
const PADDING: f32 = 8.0;
/// One pixel column per channel value.
pub const CHANNEL_WIDTH: f32 = 256.0;
pub const PANEL_WIDTH: f32 = CHANNEL_WIDTH + 2.0 * PADDING;
const CHANNEL_HEIGHT: f32 = 12.0;
const CHANNEL_GAP: f32 = 4.0;
const MARKER_WIDTH: f32 = 2.0;
const ROW_HEIGHT: f32 = 20.0;
const ROW_GAP: f32 = 6.0;
const SWATCH_WIDTH: f32 = 40.0;
const CHIP_SIZE: f32 = 20.0;
const CHIP_GAP: f32 = 4.0;
const FRAME: f32 = 2.0;

/// Preset colours offered next to every slot's own default.
pub const PALETTE: [u32; 7] = [
    0xffffff, 0x000000, 0xd2b48c, 0x8b4513, 0xf5f5dc, 0xff69b4, 0x4169e1,
];

const BACKGROUND: u32 = 0x1a1a1a;
const SELECTION: u32 = 0xffffff;
const RESET: u32 = 0xa03030;
const HEADER: u32 = 0x303a4a;
const ENTRY: u32 = 0x2a2a2a;
const ACTIVE_ENTRY: u32 = 0x4a7a4a;
const MARKER: u32 = 0xffffff;

/// An axis aligned rectangle in window pixels, origin top left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }

    pub fn centre(&self) -> (f32, f32) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    fn grow(&self, by: f32) -> Self {
        Self::new(self.x - by, self.y - by, self.w + 2.0 * by, self.h + 2.0 * by)
    }

    /// `[left, bottom, right, top]` in normalized device coordinates.
    pub fn to_ndc(&self, width: u32, height: u32) -> [f32; 4] {
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        [
            self.x / width * 2.0 - 1.0,
            1.0 - (self.y + self.h) / height * 2.0,
            (self.x + self.w) / width * 2.0 - 1.0,
            1.0 - self.y / height * 2.0,
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetKind {
    Background,
    /// Marks the chip holding the slot's current colour.
    Selection,
    /// Opens or closes the picker of its slot.
    Swatch(ColorSlot),
    Chip(ColorSlot, u32),
    /// A bar running the channel from 0 on the left to 255 on the right.
    Channel(ColorSlot, ColorChannel),
    /// The current value on a channel bar. Never takes clicks.
    Marker,
    Reset,
    DropdownHeader,
    ClipEntry(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Widget {
    pub rect: Rect,
    pub kind: WidgetKind,
    /// sRGB fill colour.
    pub color: u32,
}

/// The value a click at `px` on a channel bar spanning `rect` picks.
pub fn channel_value(rect: &Rect, px: f32) -> u8 {
    ((px - rect.x) / rect.w * 256.0).floor().clamp(0.0, 255.0) as u8
}

/// The chips of one row: the slot's default first, then the presets it is not already.
pub fn palette_for(slot: ColorSlot) -> Vec<u32> {
    let default = slot.default_hex();
    std::iter::once(default)
        .chain(PALETTE.into_iter().filter(|&hex| hex != default))
        .take(8)
        .collect()
}

#[derive(Debug, Default)]
pub struct Panel {
    open: bool,
    editing: Option<ColorSlot>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clip list below the dropdown header is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The slot whose picker is open.
    pub fn editing(&self) -> Option<ColorSlot> {
        self.editing
    }

    /// Lay out every widget, back to front.
    ///
    /// Nothing is shown until the model has loaded. The dropdown only exists
    /// when the model has at least one animation clip.
    pub fn layout(&self, state: &ViewerState, width: u32) -> Vec<Widget> {
        if !state.is_loaded() {
            return Vec::new();
        }
        let left = (width as f32 - MARGIN - PANEL_WIDTH).max(0.0);
        let inner_left = left + PADDING;
        let inner_width = PANEL_WIDTH - 2.0 * PADDING;
        let mut y = MARGIN + PADDING;
        let mut widgets = Vec::new();

        for slot in ColorSlot::ALL {
            let current = state.colors.current(slot);
            widgets.push(Widget {
                rect: Rect::new(inner_left, y, SWATCH_WIDTH, ROW_HEIGHT),
                kind: WidgetKind::Swatch(slot),
                color: current,
            });
            let mut x = inner_left + SWATCH_WIDTH + PADDING;
            for hex in palette_for(slot) {
                let rect = Rect::new(x, y, CHIP_SIZE, CHIP_SIZE);
                if hex == current {
                    widgets.push(Widget {
                        rect: rect.grow(FRAME),
                        kind: WidgetKind::Selection,
                        color: SELECTION,
                    });
                }
                widgets.push(Widget {
                    rect,
                    kind: WidgetKind::Chip(slot, hex),
                    color: hex,
                });
                x += CHIP_SIZE + CHIP_GAP;
            }
            y += ROW_HEIGHT + ROW_GAP;

            if self.editing == Some(slot) {
                for channel in ColorChannel::ALL {
                    let bar = Rect::new(inner_left, y, CHANNEL_WIDTH, CHANNEL_HEIGHT);
                    widgets.push(Widget {
                        rect: bar,
                        kind: WidgetKind::Channel(slot, channel),
                        color: current,
                    });
                    let value = f32::from(channel.get(current));
                    widgets.push(Widget {
                        rect: Rect::new(
                            bar.x + (value + 0.5) * bar.w / 256.0 - MARKER_WIDTH / 2.0,
                            bar.y - FRAME,
                            MARKER_WIDTH,
                            bar.h + 2.0 * FRAME,
                        ),
                        kind: WidgetKind::Marker,
                        color: MARKER,
                    });
                    y += CHANNEL_HEIGHT + CHANNEL_GAP;
                }
                y += ROW_GAP;
            }
        }

        widgets.push(Widget {
            rect: Rect::new(inner_left, y, inner_width, ROW_HEIGHT),
            kind: WidgetKind::Reset,
            color: RESET,
        });
        y += ROW_HEIGHT + ROW_GAP;

        if state.animation.has_clips() {
            widgets.push(Widget {
                rect: Rect::new(inner_left, y, inner_width, ROW_HEIGHT),
                kind: WidgetKind::DropdownHeader,
                color: HEADER,
            });
            y += ROW_HEIGHT;
            if self.open {
                let active = state.animation.active_clip();
                for name in state.animation.clip_names() {
                    widgets.push(Widget {
                        rect: Rect::new(inner_left, y, inner_width, ROW_HEIGHT),
                        color: if active == Some(name) { ACTIVE_ENTRY } else { ENTRY },
                        kind: WidgetKind::ClipEntry(name.to_string()),
                    });
                    y += ROW_HEIGHT;
                }
            }
            y += ROW_GAP;
        }

        let background = Widget {
            rect: Rect::new(left, MARGIN, PANEL_WIDTH, y - MARGIN - ROW_GAP + PADDING),
            kind: WidgetKind::Background,
            color: BACKGROUND,
        };
        widgets.insert(0, background);
        widgets
    }

    /// The rectangle covering the whole panel, `None` while nothing is shown.
    pub fn bounds(&self, state: &ViewerState, width: u32) -> Option<Rect> {
        self.layout(state, width)
            .into_iter()
            .find(|widget| widget.kind == WidgetKind::Background)
            .map(|widget| widget.rect)
    }

    /// Handle a click at `position` (window pixels).
    ///
    /// Clicks on a swatch or the dropdown header only toggle the picker or the
    /// list, selecting a clip closes the list. A click on a channel bar sets
    /// that channel of the slot's current colour to the value under the
    /// cursor. Every other panel click that hits no control is swallowed.
    pub fn click(
        &mut self,
        state: &ViewerState,
        position: PhysicalPosition<f64>,
        width: u32,
    ) -> Option<Command> {
        let (px, py) = (position.x as f32, position.y as f32);
        let hit = self
            .layout(state, width)
            .into_iter()
            .rev()
            .filter(|widget| widget.kind != WidgetKind::Marker)
            .find(|widget| widget.rect.contains(px, py))?;
        match hit.kind {
            WidgetKind::Chip(slot, hex) => Some(Command::SetColor(slot, hex)),
            WidgetKind::Swatch(slot) => {
                self.editing = (self.editing != Some(slot)).then_some(slot);
                None
            }
            WidgetKind::Channel(slot, channel) => {
                let value = channel_value(&hit.rect, px);
                Some(Command::SetColor(slot, channel.with(hit.color, value)))
            }
            WidgetKind::Reset => Some(Command::ResetColors),
            WidgetKind::DropdownHeader => {
                self.open = !self.open;
                None
            }
            WidgetKind::ClipEntry(name) => {
                self.open = false;
                Some(Command::SelectClip(name))
            }
            WidgetKind::Background | WidgetKind::Selection | WidgetKind::Marker => None,
        }
    }

    /// Triangulate the layout into GUI vertices in NDC.
    pub fn vertices(
        &self,
        state: &ViewerState,
        width: u32,
        height: u32,
    ) -> (Vec<gui::Vertex>, Vec<u16>) {
        let widgets = self.layout(state, width);
        let mut vertices = Vec::with_capacity(widgets.len() * 4);
        let mut indices = Vec::with_capacity(widgets.len() * 6);
        for widget in widgets {
            let [left, bottom, right, top] = widget.rect.to_ndc(width, height);
            // Channel bars fade from the channel at 0 to the channel at 255.
            let (from, to) = match widget.kind {
                WidgetKind::Channel(_, channel) => {
                    (channel.with(widget.color, 0), channel.with(widget.color, 255))
                }
                _ => (widget.color, widget.color),
            };
            let [from, to] = [from, to].map(|hex| {
                let [r, g, b] = hex_to_linear(hex);
                [r, g, b, 1.0]
            });
            let base = vertices.len() as u16;
            vertices.extend([
                gui::Vertex { position: [left, bottom], color: from },
                gui::Vertex { position: [right, bottom], color: to },
                gui::Vertex { position: [right, top], color: to },
                gui::Vertex { position: [left, top], color: from },
            ]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        (vertices, indices)
    }
}

struct PanelBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    amount: usize,
    bounds: [f32; 4],
}

/// Draws the [`Panel`] and turns clicks on it into viewer commands.
pub struct PanelFlow {
    panel: Panel,
    device: wgpu::Device,
    vertices: Vec<gui::Vertex>,
    buffers: Option<PanelBuffers>,
}

impl PanelFlow {
    pub fn new(ctx: InitContext) -> Self {
        Self {
            panel: Panel::new(),
            device: ctx.device,
            vertices: Vec::new(),
            buffers: None,
        }
    }

    fn rebuild(&mut self, state: &ViewerState, width: u32, height: u32) {
        let (vertices, indices) = self.panel.vertices(state, width, height);
        if vertices == self.vertices {
            return;
        }
        self.vertices = vertices;
        let bounds = self
            .panel
            .bounds(state, width)
            .map(|rect| rect.to_ndc(width, height));
        self.buffers = bounds.map(|bounds| PanelBuffers {
            vertex: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Panel Vertex Buffer"),
                    contents: bytemuck::cast_slice(&self.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            index: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Panel Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            amount: indices.len(),
            bounds,
        });
    }
}

impl GraphicsFlow<ViewerState, ViewerEvent> for PanelFlow {
    fn on_init(&mut self, _: &mut Context, _: &mut ViewerState) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_click(&mut self, ctx: &Context, state: &mut ViewerState, id: u32) -> Out<ViewerEvent> {
        if id != PANEL_ID {
            return Out::Empty;
        }
        match self.panel.click(state, ctx.mouse.coords, ctx.config.width) {
            Some(cmd) => Out::Events(vec![ViewerEvent::Command(cmd)]),
            None => Out::Empty,
        }
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut ViewerState,
        _: Duration,
    ) -> Out<ViewerEvent> {
        self.rebuild(state, ctx.config.width, ctx.config.height);
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        _: &DeviceEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        _: &WindowEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        _: &mut ViewerState,
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        Some(event)
    }

    fn on_render(&self) -> Render<'_> {
        match &self.buffers {
            Some(buffers) => Render::GUI(Flat {
                vertex: &buffers.vertex,
                index: &buffers.index,
                amount: buffers.amount,
                id: PANEL_ID,
                bounds: buffers.bounds,
            }),
            None => Render::None,
        }
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut ViewerState,
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}
