use std::io::Write;

use anyhow::{anyhow, Result};
use chip8vm_core::{Color, Framebuffer, Renderer, SCREEN_HEIGHT, SCREEN_PIXELS, SCREEN_WIDTH};
use sdl2::{
    pixels::PixelFormatEnum,
    render::{Canvas, Texture, TextureCreator},
    video::{Window, WindowContext},
};

/// Streams the framebuffer into an SDL texture stretched over the window.
pub struct SdlRenderer<'a> {
    canvas: Canvas<Window>,
    texture: Texture<'a>,
    pixels: Vec<Color>,
    foreground: Color,
    background: Color,
}

impl<'a> SdlRenderer<'a> {
    pub fn new(
        mut canvas: Canvas<Window>,
        texture_creator: &'a TextureCreator<WindowContext>,
        foreground: Color,
        background: Color,
    ) -> Result<SdlRenderer<'a>> {
        let texture = texture_creator.create_texture_streaming(
            PixelFormatEnum::RGBX8888,
            SCREEN_WIDTH as u32,
            SCREEN_HEIGHT as u32,
        )?;

        canvas.set_draw_color(sdl2::pixels::Color::RGB(
            background.r,
            background.g,
            background.b,
        ));
        canvas.clear();
        canvas.present();

        Ok(SdlRenderer {
            canvas,
            texture,
            pixels: vec![background; SCREEN_PIXELS],
            foreground,
            background,
        })
    }
}

impl Renderer for SdlRenderer<'_> {
    type Error = anyhow::Error;

    fn present(&mut self, framebuffer: &Framebuffer) -> Result<()> {
        framebuffer.render_into(&mut self.pixels, self.foreground, self.background);

        // Copy display buffer into GPU texture
        self.texture
            .update(None, bytemuck::cast_slice(&self.pixels[..]), SCREEN_WIDTH * 4)?;

        // Copy texture to Canvas
        self.canvas
            .copy(&self.texture, None, None)
            .map_err(|e| anyhow!("failed to copy texture: {}", e))?;

        self.canvas.present();
        Ok(())
    }
}

/// Writes the framebuffer as block characters, one frame per `present`.
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> TextRenderer<W> {
        TextRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    type Error = std::io::Error;

    fn present(&mut self, framebuffer: &Framebuffer) -> std::io::Result<()> {
        write!(self.out, "{}", framebuffer)?;
        self.out.flush()
    }
}
