//! quadra demo
//!
//! Renders the reference scenes one at a time. Space or the right arrow shows the
//! next scene, the left arrow the previous one.

use std::error::Error;
use std::sync::Arc;

use quadra::{Color, DrawStringOptions, Frame, Quad, TextureId, UvRect, Vec2};
use quadra_text::DEFAULT_ALPHABET;
use quadra_wgpu::{FilterMode, Font, Renderer, RendererConfig, TextureParams, WrapMode};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const CHECKER_SIZE: u32 = 64;

/// Resources shared by the scenes.
struct Assets {
    font: Font,
    smooth_font: Option<Font>,
    checker: TextureId,
}

struct Scene {
    name: &'static str,
    draw: fn(&mut Frame, &Assets),
}

const SCENES: &[Scene] = &[
    Scene {
        name: "colors",
        draw: colors,
    },
    Scene {
        name: "all shapes",
        draw: all_shapes,
    },
    Scene {
        name: "text",
        draw: text,
    },
    Scene {
        name: "complex",
        draw: complex,
    },
    Scene {
        name: "clip shapes",
        draw: clip_shapes,
    },
    Scene {
        name: "clip text",
        draw: clip_text,
    },
    Scene {
        name: "images",
        draw: images,
    },
];

fn colors(frame: &mut Frame, _assets: &Assets) {
    let cells = [
        Color::RED,
        Color::GREEN,
        Color::BLUE,
        Color::BLACK,
        Color::WHITE,
        Color::YELLOW,
        Color::CYAN,
        Color::MAGENTA,
        Color::rgb(0.17, 0.89, 0.54),
    ];
    for (i, color) in cells.into_iter().enumerate() {
        let pos = Vec2::new((i % 3) as f32 * 10.0, (i / 3) as f32 * 10.0);
        frame.fill_rectangle(pos, Vec2::splat(10.0), color);
    }
}

fn all_shapes(frame: &mut Frame, _assets: &Assets) {
    let white = Color::WHITE;
    frame.fill_circle(Vec2::new(50.0, 50.0), 40.0, white);
    frame.draw_circle(Vec2::new(150.0, 50.0), 40.0, 1.0, white);
    frame.fill_circle(Vec2::new(150.0, 50.0), 0.0, white);
    frame.draw_line(Vec2::new(200.0, 20.0), Vec2::new(300.0, 80.0), 1.0, white);
    frame.fill_rectangle(Vec2::new(20.0, 150.0), Vec2::splat(80.0), white);
    frame.draw_rectangle(Vec2::new(120.0, 150.0), Vec2::splat(80.0), 1.0, white);
    frame.draw_line(Vec2::new(235.0, 117.0), Vec2::new(235.0, 180.0), 1.0, white);
    frame.draw_line(Vec2::new(220.0, 205.0), Vec2::new(260.0, 205.0), 1.0, white);
    frame.draw_line(Vec2::new(260.0, 160.0), Vec2::new(290.0, 190.0), 1.0, white);

    // fractional coordinates
    frame.fill_circle(Vec2::new(400.25, 50.5), 40.25, white);
    frame.draw_circle(Vec2::new(500.25, 50.75), 40.75, 1.25, white);
    frame.draw_line(Vec2::new(650.25, 20.0), Vec2::new(689.75, 80.5), 1.75, white);
    frame.fill_rectangle(Vec2::new(420.75, 150.5), Vec2::new(80.5, 80.25), white);
    frame.draw_rectangle(Vec2::new(520.25, 150.75), Vec2::splat(80.5), 1.75, white);
    frame.fill_rectangle(Vec2::new(650.5, 150.5), Vec2::splat(80.0), white);
}

fn text(frame: &mut Frame, assets: &Assets) {
    let font = &assets.font;
    let white = Color::WHITE;
    let plain = DrawStringOptions::default();
    let scaled = plain.with_scale(2.0);

    frame.draw_string("foo bar", Vec2::new(10.0, 10.0), font, white, plain);
    frame.draw_string("bigger text", Vec2::new(10.0, 40.0), font, white, scaled);
    frame.draw_string("float pos", Vec2::new(200.5, 10.0), font, white, plain);
    frame.draw_string(
        "float pos rounded",
        Vec2::new(200.5, 40.0),
        font,
        white,
        plain.with_round_pos(true),
    );

    for (x, opts) in [(10.0, plain), (150.0, scaled)] {
        let pos = Vec2::new(x, 100.0);
        let size = quadra::measure_string("measure this!", font, opts);
        frame.fill_rectangle(pos, size, Color::RED);
        frame.draw_string("measure this!", pos, font, white, opts);
    }

    let tabs = plain.with_tab_spaces(4);
    frame.draw_string("a\tb\tc\nab\tc\r\nabc\td", Vec2::new(10.0, 160.0), font, white, tabs);

    if let Some(smooth) = &assets.smooth_font {
        frame.draw_string(
            "System font: The quick brown fox jumps over the lazy dog.",
            Vec2::new(10.0, 240.0),
            smooth,
            Color::YELLOW,
            plain,
        );
    }
}

fn complex(frame: &mut Frame, _assets: &Assets) {
    frame.draw_circle(Vec2::new(100.0, 100.0), 50.0, 1.0, Color::GREEN);
    frame.fill_circle(Vec2::new(500.0, 500.0), 50.0, Color::BLUE);
    frame.fill_rectangle(Vec2::new(100.0, 250.0), Vec2::new(300.0, 200.0), Color::RED);
    frame.draw_line(Vec2::new(44.0, 399.0), Vec2::new(690.0, 549.0), 13.0, Color::YELLOW);
    frame.fill_rectangle(
        Vec2::new(377.0, 232.0),
        Vec2::new(142.0, 346.0),
        Color::WHITE.with_alpha(0.5),
    );
    frame.draw_line(
        Vec2::new(451.0, 218.0),
        Vec2::new(536.0, 367.0),
        2.0,
        Color::GREEN.mul_rgb(0.5),
    );
}

fn clip_shapes(frame: &mut Frame, _assets: &Assets) {
    let white = Color::WHITE;
    frame.set_clip(Quad::new(100.0, 500.0, 100.0, 400.0));
    frame.fill_rectangle(Vec2::new(50.0, 50.0), Vec2::splat(100.0), white);
    frame.draw_rectangle(Vec2::new(450.0, 350.0), Vec2::splat(100.0), 3.0, white);
    frame.draw_circle(Vec2::new(299.5, 249.5), 210.0, 1.0, white);
    frame.fill_circle(Vec2::new(100.0, 400.0), 30.0, white);
    frame.draw_line(Vec2::new(300.0, 50.0), Vec2::new(400.0, 450.0), 3.0, white);
    frame.draw_line(Vec2::new(50.0, 200.0), Vec2::new(550.0, 300.0), 7.0, white);
    frame.fill_circle(Vec2::new(600.0, 200.0), 40.0, Color::GREEN);
    frame.reset_clip();
    frame.fill_circle(Vec2::new(600.0, 400.0), 40.0, Color::BLUE);
    frame.set_clip(Quad::new(50.0, 100.0, 450.0, 500.0));
    frame.fill_rectangle(Vec2::ZERO, Vec2::new(800.0, 600.0), Color::RED);
}

fn clip_text(frame: &mut Frame, assets: &Assets) {
    let font = &assets.font;
    let opts = DrawStringOptions::default();
    frame.set_clip(Quad::new(98.0, 515.0, 101.0, 126.0));
    frame.draw_string(
        "out of bounds",
        Vec2::new(80.0, 80.0),
        font,
        Color::WHITE,
        opts.with_scale(5.0),
    );
    frame.set_clip(Quad::new(100.0, 130.0, 180.0, 200.0));
    frame.draw_string(
        "#",
        Vec2::new(80.0, 130.0),
        font,
        Color::WHITE,
        opts.with_scale(10.0),
    );
}

fn images(frame: &mut Frame, assets: &Assets) {
    let checker = assets.checker;
    frame.draw_image(checker, Quad::new(10.0, 138.0, 10.0, 138.0));
    frame.draw_colorized_image(checker, Quad::new(150.0, 278.0, 10.0, 138.0), Color::CYAN);

    let top_left = UvRect::new(Vec2::ZERO, Vec2::splat(0.5));
    frame.draw_image_src(checker, Quad::new(290.0, 418.0, 10.0, 138.0), top_left);
    frame.draw_colorized_image_src(
        checker,
        Quad::new(430.0, 558.0, 10.0, 138.0),
        top_left,
        Color::YELLOW.with_alpha(0.5),
    );

    // letterboxed into a wide slot
    let slot = Quad::new(10.0, 410.0, 160.0, 260.0);
    frame.draw_rectangle(slot.top_left(), slot.size(), 1.0, Color::GRAY);
    frame.draw_image(checker, slot.shrink_and_center_inside(1.0));

    frame.push_clip(Quad::new(450.0, 530.0, 180.0, 260.0));
    frame.draw_image(checker, Quad::new(430.0, 558.0, 160.0, 288.0));
    frame.pop_clip();
}

/// RGBA checkerboard with 8 pixel cells.
fn checker_pixels(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / 8) + (y / 8)) % 2 == 0;
            let v = if light { 230 } else { 40 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    scene: usize,
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: Renderer,
    assets: Assets,
}

impl GpuState {
    async fn new(window: Arc<Window>) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = Renderer::new(&device, &queue, surface_format, RendererConfig::default())?;

        let checker = renderer.upload_texture(
            &device,
            &queue,
            &checker_pixels(CHECKER_SIZE),
            CHECKER_SIZE,
            CHECKER_SIZE,
            TextureParams::uniform(WrapMode::ClampToEdge, FilterMode::Nearest),
        )?;

        let smooth_font = load_system_font(&mut renderer, &device, &queue);

        let assets = Assets {
            font: renderer.default_font().clone(),
            smooth_font,
            checker,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
            assets,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Clear the screen
        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        let mut frame = Frame::begin(self.config.width, self.config.height);
        (scene.draw)(&mut frame, &self.assets);

        if let Err(err) =
            self.renderer
                .render(&self.device, &self.queue, &mut encoder, &view, &frame)
        {
            log::error!("failed to render scene {:?}: {}", scene.name, err);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

/// Atlas from an installed system font, if any can render the alphabet.
fn load_system_font(
    renderer: &mut Renderer,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Option<Font> {
    let mut face = quadra_text::cosmic::CosmicFace::with_system_fonts(16.0);
    match renderer.load_font(device, queue, &mut face, DEFAULT_ALPHABET) {
        Ok(font) => Some(font),
        Err(err) => {
            log::warn!("no system font available: {}", err);
            None
        }
    }
}

impl App {
    fn switch_scene(&mut self, forward: bool) {
        let n = SCENES.len();
        self.scene = if forward {
            (self.scene + 1) % n
        } else {
            (self.scene + n - 1) % n
        };
        let name = SCENES[self.scene].name;
        log::info!("scene {}/{}: {}", self.scene + 1, n, name);
        if let Some(window) = &self.window {
            window.set_title(&format!("quadra - {}", name));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(format!("quadra - {}", SCENES[self.scene].name))
            .with_inner_size(winit::dpi::PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match pollster::block_on(GpuState::new(window)) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(err) => {
                log::error!("failed to initialise rendering: {}", err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Space | KeyCode::ArrowRight => self.switch_scene(true),
                KeyCode::ArrowLeft => self.switch_scene(false),
                _ => {}
            },
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render(&SCENES[self.scene]) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            if let Some(window) = &self.window {
                                gpu_state.resize(window.inner_size())
                            }
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
            }
            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        scene: 0,
    };

    println!("quadra demo - Space / arrow keys switch scenes, ESC exits");
    event_loop.run_app(&mut app)?;
    Ok(())
}
