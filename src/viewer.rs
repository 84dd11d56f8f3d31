use std::num::NonZeroU32;

use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use crate::{
    chart,
    error::{PlotError, Result},
    figure::Figure,
};

/// Open a window showing `figure` and block until it is closed.
///
/// The chart is laid out again whenever the window is resized. Closing the
/// window ends the process.
pub fn show(figure: Figure) -> Result<()> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(figure.title.clone())
        .with_inner_size(PhysicalSize::new(figure.width, figure.height))
        .build(&event_loop)?;

    let mut state = pollster::block_on(State::new(&window, figure))?;
    log::debug!("viewer ready at {:?}", state.size());

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                if wants_close(event) {
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                match event {
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                        window.request_redraw();
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        state.resize(**new_inner_size);
                        window.request_redraw();
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if window_id == window.id() => {
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory, closing viewer");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => log::warn!("skipping frame: {:?}", e),
                }
            }
            _ => {}
        }
    })
}

fn wants_close(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::CloseRequested => true,
        WindowEvent::KeyboardInput {
            input:
                KeyboardInput {
                    state: ElementState::Pressed,
                    virtual_keycode: Some(key),
                    ..
                },
            ..
        } => matches!(key, VirtualKeyCode::Escape | VirtualKeyCode::Q),
        _ => false,
    }
}

struct State {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    figure: Figure,
    canvas: Vec<u8>,
    bgra: bool,
}

impl State {
    async fn new(window: &Window, figure: Figure) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: wgpu::Dx12Compiler::default(),
        });

        // The surface must not outlive the window; both live in the event loop closure.
        let surface = unsafe { instance.create_surface(window)? };
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptionsBase {
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(PlotError::Adapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|item| item.describe().srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(PlotError::Adapter)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_DST,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
        };

        surface.configure(&device, &config);

        let bgra = matches!(
            surface_format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        log::debug!("surface format {:?}", surface_format);

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            size,
            figure,
            canvas: Vec::new(),
            bgra,
        };
        state.update();

        Ok(state)
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.update();
        }
    }

    /// Lay the chart out again at the current window size.
    fn update(&mut self) {
        let canvas = chart::render(&self.figure, self.config.width, self.config.height);
        let mut pixels = canvas.pixels().to_vec();
        if self.bgra {
            pixels.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
        }
        self.canvas = pixels;
    }

    fn render(&mut self) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_texture(
            output.texture.as_image_copy(),
            &self.canvas,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: NonZeroU32::new(4 * self.config.width),
                rows_per_image: NonZeroU32::new(self.config.height),
            },
            output.texture.size(),
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Chart Encoder"),
            });

        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chart Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
