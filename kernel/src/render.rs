// Region rendering for the 480x320 landscape panel.
// No framebuffer: a region is drawn band by band through a small RGB565
// buffer (BAND_PIXELS) and each band is pushed to the panel window it
// covers. Only the regions a view touches are redrawn, never the screen.

use core::convert::Infallible;
use core::fmt::Debug;

use embedded_graphics::{
    Drawable, Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Point, Size},
    mono_font::{MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::Rgb565,
    primitives::Rectangle,
    text::{Baseline, Text},
};

pub const SCREEN_W: u16 = 480;
pub const SCREEN_H: u16 = 320;
pub const FULL_SCREEN: Region = Region::new(0, 0, SCREEN_W, SCREEN_H);

pub const BAND_ROWS: u16 = 8;
pub const BAND_PIXELS: usize = SCREEN_W as usize * BAND_ROWS as usize; // 7.5 KB

const GLYPH_W: u16 = 10;
const GLYPH_H: u16 = 20;

pub mod palette {
    use embedded_graphics::pixelcolor::Rgb565;

    pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);
    pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
    pub const RED: Rgb565 = Rgb565::new(31, 0, 0);
    pub const GREEN: Rgb565 = Rgb565::new(0, 63, 0);
    pub const BLUE: Rgb565 = Rgb565::new(0, 0, 31);
    pub const YELLOW: Rgb565 = Rgb565::new(31, 63, 0);
    pub const CYAN: Rgb565 = Rgb565::new(0, 63, 31);
    pub const ORANGE: Rgb565 = Rgb565::new(31, 41, 0); // 0xFD20
    pub const SPARKOH: Rgb565 = Rgb565::new(0, 26, 23); // 0x0357, museum blue
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Region {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Region {
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    pub fn to_rect(self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x as i32, self.y as i32),
            Size::new(self.w as u32, self.h as u32),
        )
    }

    pub const fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn intersects(self, other: Region) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Overlap of two regions, `None` when they do not touch.
    pub fn clip(self, other: Region) -> Option<Region> {
        if !self.intersects(other) {
            return None;
        }
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);
        Some(Region::new(x1, y1, x2 - x1, y2 - y1))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Center,
    CenterLeft,
    CenterRight,
}

impl Alignment {
    pub fn position(self, region: Region, content_size: Size) -> Point {
        let cw = content_size.width as i32;
        let ch = content_size.height as i32;
        let rx = region.x as i32;
        let ry = region.y as i32;
        let rw = region.w as i32;
        let rh = region.h as i32;

        match self {
            Alignment::Center => Point::new(rx + (rw - cw) / 2, ry + (rh - ch) / 2),
            Alignment::CenterLeft => Point::new(rx, ry + (rh - ch) / 2),
            Alignment::CenterRight => Point::new(rx + rw - cw, ry + (rh - ch) / 2),
        }
    }
}

/// Integer scale applied to the 10x20 monospace font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextSize {
    Body,
    Title,
    Counter,
}

impl TextSize {
    pub const fn scale(self) -> u16 {
        match self {
            TextSize::Body => 1,
            TextSize::Title => 2,
            TextSize::Counter => 5,
        }
    }

    /// Pixel size of `text` rendered at this size.
    pub fn measure(self, text: &str) -> Size {
        let s = self.scale() as u32;
        Size::new(
            text.chars().count() as u32 * GLYPH_W as u32 * s,
            GLYPH_H as u32 * s,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub size: TextSize,
    pub fg: Rgb565,
    pub bg: Rgb565,
    pub align: Alignment,
}

impl TextStyle {
    pub const fn new(size: TextSize, fg: Rgb565, bg: Rgb565) -> Self {
        Self {
            size,
            fg,
            bg,
            align: Alignment::Center,
        }
    }

    pub const fn aligned(self, align: Alignment) -> Self {
        Self { align, ..self }
    }
}

/// What the presentation layer needs from a display.
pub trait Screen {
    type Error: Debug;

    fn fill(&mut self, region: Region, color: Rgb565) -> Result<(), Self::Error>;

    /// Repaint `region` with `style.bg` and draw `text` inside it.
    fn text(&mut self, region: Region, text: &str, style: TextStyle) -> Result<(), Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.fill(FULL_SCREEN, color)
    }
}

/// Raw panel: accepts a rectangular window of pixels in row-major order.
pub trait Panel {
    type Error: Debug;

    fn write_window(&mut self, window: Region, pixels: &[Rgb565]) -> Result<(), Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// One band of a region being rendered; draws in screen coordinates and
/// silently drops pixels outside its window.
pub struct Band<'a> {
    buf: &'a mut [Rgb565],
    win: Region,
}

impl<'a> Band<'a> {
    fn new(buf: &'a mut [Rgb565], win: Region, bg: Rgb565) -> Self {
        let len = win.w as usize * win.h as usize;
        buf[..len].fill(bg);
        Self { buf, win }
    }

    fn pixels(&self) -> &[Rgb565] {
        &self.buf[..self.win.w as usize * self.win.h as usize]
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let wx = self.win.x as i32;
        let wy = self.win.y as i32;
        if x < wx || y < wy || x >= wx + self.win.w as i32 || y >= wy + self.win.h as i32 {
            return None;
        }
        Some((y - wy) as usize * self.win.w as usize + (x - wx) as usize)
    }
}

impl OriginDimensions for Band<'_> {
    fn size(&self) -> Size {
        Size::new(SCREEN_W as u32, SCREEN_H as u32)
    }
}

impl DrawTarget for Band<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if let Some(i) = self.index(p.x, p.y) {
                self.buf[i] = color;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let win = self.win.to_rect();
        let area = area.intersection(&win);
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let w = self.win.w as usize;
        let x0 = (area.top_left.x - self.win.x as i32) as usize;
        let x1 = (bottom_right.x - self.win.x as i32) as usize + 1;
        for y in area.top_left.y..=bottom_right.y {
            let row = (y - self.win.y as i32) as usize * w;
            self.buf[row + x0..row + x1].fill(color);
        }
        Ok(())
    }
}

/// Draws every pixel of the wrapped target as a `scale`x`scale` block,
/// offset by `origin`. Used to blow the 10x20 font up for the counter.
pub struct Scaled<'a, D> {
    inner: &'a mut D,
    scale: u16,
    origin: Point,
}

impl<'a, D: DrawTarget> Scaled<'a, D> {
    pub fn new(inner: &'a mut D, scale: u16, origin: Point) -> Self {
        Self {
            inner,
            scale: scale.max(1),
            origin,
        }
    }
}

impl<D: DrawTarget> OriginDimensions for Scaled<'_, D> {
    fn size(&self) -> Size {
        self.inner.bounding_box().size / self.scale as u32
    }
}

impl<D: DrawTarget> DrawTarget for Scaled<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let s = self.scale as i32;
        let block = Size::new_equal(self.scale as u32);
        for Pixel(p, color) in pixels {
            let rect = Rectangle::new(self.origin + p * s, block);
            self.inner.fill_solid(&rect, color)?;
        }
        Ok(())
    }
}

fn draw_text(band: &mut Band<'_>, region: Region, text: &str, style: TextStyle) {
    let origin = style.align.position(region, style.size.measure(text));
    let mut target = Scaled::new(band, style.size.scale(), origin);
    let font = MonoTextStyle::new(&FONT_10X20, style.fg);
    let _ = Text::with_baseline(text, Point::zero(), font, Baseline::Top).draw(&mut target);
}

/// `Screen` over any `Panel`, rendering through one band buffer.
pub struct BandRenderer<P> {
    panel: P,
    buf: [Rgb565; BAND_PIXELS],
}

impl<P: Panel> BandRenderer<P> {
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            buf: [palette::BLACK; BAND_PIXELS],
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Clear `region` to `bg`, run `draw` once per band and push each band.
    pub fn render<F>(&mut self, region: Region, bg: Rgb565, draw: F) -> Result<(), P::Error>
    where
        F: Fn(&mut Band<'_>),
    {
        let Some(region) = region.clip(FULL_SCREEN) else {
            return Ok(());
        };
        let rows_per_band = (BAND_PIXELS / region.w as usize) as u16;

        let mut y = region.y;
        let end = region.y + region.h;
        while y < end {
            let rows = rows_per_band.min(end - y);
            let win = Region::new(region.x, y, region.w, rows);
            let mut band = Band::new(&mut self.buf, win, bg);
            draw(&mut band);
            self.panel.write_window(win, band.pixels())?;
            y += rows;
        }
        Ok(())
    }
}

impl<P: Panel> Screen for BandRenderer<P> {
    type Error = P::Error;

    fn fill(&mut self, region: Region, color: Rgb565) -> Result<(), Self::Error> {
        self.render(region, color, |_| {})
    }

    fn text(&mut self, region: Region, text: &str, style: TextStyle) -> Result<(), Self::Error> {
        self.render(region, style.bg, |band| draw_text(band, region, text, style))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.panel.flush()
    }
}
