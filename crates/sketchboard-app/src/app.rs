//! Core application state and lifecycle.

use kurbo::{Point, Size, Vec2};
use serde_json::Value;
use sketchboard_core::{
    CanvasEvent, CanvasSurface, EditorState, GenerationError, GenerationResult, HttpSessionProvider,
    ImageImportHandler, ImportedFile, MemorySessionProvider, PendingTask, ReqwestTransport, SessionError,
    SessionProvider, SketchClient, User, import_image,
};
use sketchboard_render::{RenderContext, Renderer, VelloRenderer};
use std::sync::Arc;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowId};

use crate::config::AppConfig;
use crate::file_ops;
use crate::shortcuts::action_for_key;
use crate::ui::{GenerationStatus, UiAction, UiState, render_ui};

/// Pixels scrolled per wheel line.
const LINE_SCROLL: f64 = 20.0;

/// Backends for the auth gate and sketch generation.
struct Services {
    session: Arc<dyn SessionProvider>,
    /// `None` when the configured endpoint is unusable.
    generation: Option<SketchClient<ReqwestTransport>>,
}

impl Services {
    fn from_config(config: &AppConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::for_tasks());

        let session: Arc<dyn SessionProvider> = if config.offline {
            log::info!("Offline mode: using in-memory sessions");
            Arc::new(MemorySessionProvider::permissive())
        } else {
            let provider = config.api_base_url().map_err(|e| e.to_string()).and_then(|base| {
                HttpSessionProvider::new(Arc::clone(&transport), &base).map_err(|e| e.to_string())
            });
            match provider {
                Ok(provider) => Arc::new(provider),
                Err(e) => {
                    log::error!("Session service unavailable: {e}");
                    Arc::new(MemorySessionProvider::signed_out())
                }
            }
        };

        let generation = match config.generation_endpoint() {
            Ok(endpoint) => {
                log::info!("Generation endpoint: {} ({})", endpoint.url, endpoint.variant.name());
                Some(SketchClient::new(transport, endpoint))
            }
            Err(e) => {
                log::error!("Generation disabled: {e}");
                None
            }
        };

        Self { session, generation }
    }
}

/// In-flight background calls, polled once per frame.
#[derive(Default)]
struct Tasks {
    user_lookup: Option<PendingTask<Result<Option<User>, SessionError>>>,
    sign_in: Option<PendingTask<Result<User, SessionError>>>,
    sign_out: Option<PendingTask<Result<(), SessionError>>>,
    generation: Option<PendingTask<Result<GenerationResult, GenerationError>>>,
}

/// Outcome of polling a task slot.
enum Poll<T> {
    Idle,
    Ready(T),
    /// The task stopped without a result.
    Lost,
}

fn poll_task<T>(slot: &mut Option<PendingTask<T>>) -> Poll<T> {
    let Some(task) = slot.as_mut() else {
        return Poll::Idle;
    };
    if let Some(output) = task.try_take() {
        *slot = None;
        Poll::Ready(output)
    } else if task.is_abandoned() {
        *slot = None;
        Poll::Lost
    } else {
        Poll::Idle
    }
}

/// One-line description of a successful generation body.
fn summarize_result(result: &Value) -> String {
    match result {
        Value::Object(fields) if fields.is_empty() => "Generation finished with an empty response".to_string(),
        Value::Object(fields) => {
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            format!("Generation finished: {}", keys.join(", "))
        }
        other => format!("Generation finished: {other}"),
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    vello_renderer: vello::Renderer,
    canvas_renderer: VelloRenderer,
    /// Texture blitter for RGBA->surface format conversion (needed for WebGPU/WASM)
    texture_blitter: vello::wgpu::util::TextureBlitter,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    // State
    editor: EditorState,
    canvas: CanvasSurface,
    config: AppConfig,
    services: Services,
    tasks: Tasks,

    // Input
    cursor: Point,
    modifiers: ModifiersState,
}

impl AppState {
    fn viewport_center(&self) -> Point {
        Point::new(self.canvas.viewport_size.width / 2.0, self.canvas.viewport_size.height / 2.0)
    }

    /// Keep the camera at the editor's zoom level.
    fn sync_zoom(&mut self, anchor: Point) {
        self.canvas.camera.zoom_to(self.editor.zoom(), anchor);
    }

    fn start_user_lookup(&mut self) {
        let session = Arc::clone(&self.services.session);
        match PendingTask::spawn("user-lookup", move || async move { session.current_user().await }) {
            Ok(task) => self.tasks.user_lookup = Some(task),
            Err(e) => {
                log::error!("Failed to start user lookup: {e}");
                self.editor.apply_user_lookup(None);
            }
        }
    }

    fn poll_tasks(&mut self) {
        match poll_task(&mut self.tasks.user_lookup) {
            Poll::Idle => {}
            Poll::Ready(Ok(user)) => self.editor.apply_user_lookup(user),
            Poll::Ready(Err(e)) => {
                log::warn!("User lookup failed, treating as signed out: {e}");
                self.editor.apply_user_lookup(None);
            }
            Poll::Lost => self.editor.apply_user_lookup(None),
        }

        match poll_task(&mut self.tasks.sign_in) {
            Poll::Idle => {}
            Poll::Ready(Ok(user)) => {
                self.ui_state.auth_busy = false;
                self.ui_state.auth_error = None;
                self.ui_state.password.clear();
                self.editor.auth_succeeded(user);
            }
            Poll::Ready(Err(e)) => {
                log::warn!("Sign-in failed: {e}");
                self.ui_state.auth_busy = false;
                self.ui_state.auth_error = Some(e.to_string());
            }
            Poll::Lost => {
                self.ui_state.auth_busy = false;
                self.ui_state.auth_error = Some("Sign-in did not complete".to_string());
            }
        }

        match poll_task(&mut self.tasks.sign_out) {
            Poll::Idle => {}
            Poll::Ready(result) => {
                if let Err(e) = result {
                    log::error!("Sign-out failed: {e}");
                }
                self.ui_state.auth_busy = false;
                self.editor.logged_out();
            }
            Poll::Lost => {
                self.ui_state.auth_busy = false;
                self.editor.logged_out();
            }
        }

        match poll_task(&mut self.tasks.generation) {
            Poll::Idle => {}
            Poll::Ready(Ok(result)) => {
                self.ui_state.generation = GenerationStatus::Succeeded(summarize_result(&result));
            }
            Poll::Ready(Err(e)) => {
                self.ui_state.generation = GenerationStatus::Failed(e.to_string());
            }
            Poll::Lost => {
                self.ui_state.generation = GenerationStatus::Failed("Generation did not complete".to_string());
            }
        }

        #[cfg(target_arch = "wasm32")]
        if let Some(file) = file_ops::take_picked_image() {
            self.import(Some(file));
        }
    }

    /// Hand a picked file to the canvas.
    fn import(&mut self, file: Option<ImportedFile>) {
        let handler: &mut dyn ImageImportHandler = &mut self.canvas;
        let outcome = import_image(file, Some(handler));
        if let Some(message) = outcome.status_message() {
            self.ui_state.set_status(message);
        }
    }

    fn handle_canvas_event(&mut self, event: CanvasEvent) {
        if let CanvasEvent::TextRequested(_) = event {
            self.ui_state.text_entry.clear();
        }
        self.editor.handle_canvas_event(&event);
    }

    fn start_generation(&mut self, prompt: String) {
        if self.tasks.generation.is_some() {
            log::debug!("Generation already running");
            return;
        }
        let Some(client) = self.services.generation.clone() else {
            self.ui_state.set_status("Generation endpoint is not configured");
            return;
        };
        let Some((sketch, material)) = self.canvas.sketch_payload() else {
            self.ui_state.set_status("Place an image inside the bounding box first");
            return;
        };

        let spawned = PendingTask::spawn("generation", move || async move {
            client.generate(&sketch, material.as_deref(), &prompt).await
        });
        match spawned {
            Ok(task) => {
                self.tasks.generation = Some(task);
                self.ui_state.generation = GenerationStatus::Running;
            }
            Err(e) => {
                log::error!("Failed to start generation: {e}");
                self.ui_state.generation = GenerationStatus::Failed(e.to_string());
            }
        }
    }

    fn start_sign_in(&mut self, email: String, password: String) {
        if self.ui_state.auth_busy {
            return;
        }
        let session = Arc::clone(&self.services.session);
        match PendingTask::spawn("sign-in", move || async move { session.sign_in(&email, &password).await }) {
            Ok(task) => {
                self.tasks.sign_in = Some(task);
                self.ui_state.auth_busy = true;
                self.ui_state.auth_error = None;
            }
            Err(e) => self.ui_state.auth_error = Some(e.to_string()),
        }
    }

    fn start_sign_out(&mut self) {
        if self.ui_state.auth_busy {
            return;
        }
        let session = Arc::clone(&self.services.session);
        match PendingTask::spawn("sign-out", move || async move { session.sign_out().await }) {
            Ok(task) => {
                self.tasks.sign_out = Some(task);
                self.ui_state.auth_busy = true;
            }
            Err(e) => {
                log::error!("Failed to start sign-out: {e}");
                self.editor.logged_out();
            }
        }
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::SelectTool(tool) => {
                self.editor.select_tool(tool);
                if !self.editor.is_sketch_bar_open() {
                    self.canvas.clear_bounding_box();
                }
                if !self.editor.shows_text_sub_bar() {
                    self.canvas.cancel_text();
                }
            }
            UiAction::ActivateSketchMode => {
                self.editor.activate_sketch_mode();
                self.canvas.clear_bounding_box();
                self.canvas.cancel_text();
            }
            UiAction::CloseSketchBar => {
                if !self.editor.is_sketch_bar_open() {
                    return;
                }
                self.editor.close_sketch_bar();
                self.canvas.clear_bounding_box();
            }
            UiAction::ToggleShortcuts => self.ui_state.shortcuts_open = !self.ui_state.shortcuts_open,
            UiAction::Import => {
                #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
                {
                    let file = file_ops::pick_image();
                    self.import(file);
                }
                #[cfg(target_arch = "wasm32")]
                file_ops::request_image();
                #[cfg(not(any(feature = "native", target_arch = "wasm32")))]
                log::warn!("No file picker in this build");
            }
            UiAction::Export => log::info!("Export requested"),
            UiAction::Undo => log::info!("Undo requested"),
            UiAction::Redo => log::info!("Redo requested"),
            UiAction::ZoomIn => {
                self.editor.zoom_in();
                self.sync_zoom(self.viewport_center());
            }
            UiAction::ZoomOut => {
                self.editor.zoom_out();
                self.sync_zoom(self.viewport_center());
            }
            UiAction::SetBrushColor(color) => self.editor.set_brush_color(color),
            UiAction::SetBrushSize(size) => self.editor.set_brush_size(size),
            UiAction::SetTextColor(color) => self.editor.set_text_color(color),
            UiAction::Generate { prompt } => self.start_generation(prompt),
            UiAction::SignIn { email, password } => self.start_sign_in(email, password),
            UiAction::SignOut => self.start_sign_out(),
            UiAction::CommitText(text) => {
                if let Some(event) = self.canvas.commit_text(&text, self.editor.text_color()) {
                    self.handle_canvas_event(event);
                }
                self.ui_state.text_entry.clear();
            }
            UiAction::CancelText => {
                self.canvas.cancel_text();
                self.ui_state.text_entry.clear();
            }
        }
    }

    fn pointer_pressed(&mut self) {
        let ctx = self.editor.pointer_context();
        if let Some(event) = self.canvas.pointer_pressed(self.cursor, &ctx) {
            self.handle_canvas_event(event);
        }
    }

    fn pointer_released(&mut self) {
        if let Some(event) = self.canvas.pointer_released(self.cursor) {
            self.handle_canvas_event(event);
        }
    }

    /// Ctrl/Cmd + wheel steps the zoom around the cursor; plain wheel pans.
    fn scroll(&mut self, delta: MouseScrollDelta) {
        let scroll = match delta {
            MouseScrollDelta::LineDelta(x, y) => Vec2::new(f64::from(x) * LINE_SCROLL, f64::from(y) * LINE_SCROLL),
            MouseScrollDelta::PixelDelta(pos) => Vec2::new(pos.x, pos.y),
        };

        if self.modifiers.control_key() || self.modifiers.super_key() {
            if scroll.y > 0.0 {
                self.editor.zoom_in();
            } else if scroll.y < 0.0 {
                self.editor.zoom_out();
            }
            self.sync_zoom(self.cursor);
        } else {
            self.canvas.camera.pan(scroll);
        }
    }

    /// Build the canvas scene and egui overlay and present them.
    fn redraw(&mut self, render_cx: &vello::util::RenderContext) {
        self.poll_tasks();

        // Run egui and collect the action
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let mut action = None;
        let egui_output = self.egui_ctx.run(egui_input, |ctx| {
            action = render_ui(ctx, &mut self.ui_state, &self.editor, &self.canvas);
        });
        if let Some(action) = action {
            self.apply_action(action);
        }

        self.egui_state
            .handle_platform_output(&self.window, egui_output.platform_output);
        let egui_primitives = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        let render_ctx = RenderContext::new(&self.canvas, self.canvas.viewport_size)
            .with_scale_factor(self.window.scale_factor())
            .with_background(self.config.background_color)
            .with_grid(self.config.grid_style);
        self.canvas_renderer.build_scene(&render_ctx);
        let base_color = self.canvas_renderer.background_color(&render_ctx);
        let scene = self.canvas_renderer.take_scene();

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match self.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                return;
            }
        };

        let width = self.surface.config.width;
        let height = self.surface.config.height;

        let params = RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello's compute shaders need a storage-bound Rgba8Unorm target;
        // the surface may be Bgra8Unorm, so render offscreen and blit.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_texture_view = render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        if let Err(e) = self
            .vello_renderer
            .render_to_texture(device, queue, &scene, &render_texture_view, &params)
        {
            log::error!("Failed to render: {:?}", e);
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        {
            let mut blit_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                label: Some("blit encoder"),
            });
            self.texture_blitter
                .copy(device, &mut blit_encoder, &render_texture_view, &surface_view);
            queue.submit(std::iter::once(blit_encoder.finish()));
        }

        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut egui_encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                label: Some("egui encoder"),
            });
            self.egui_renderer.update_buffers(
                device,
                queue,
                &mut egui_encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        // Keep the canvas underneath
                        load: vello::wgpu::LoadOp::Load,
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // egui-wgpu wants a 'static render pass
            let mut render_pass = render_pass.forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(egui_encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        surface_texture.present();
        self.window.request_redraw();
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    /// Window waiting for async surface creation (WASM only)
    pending_window: Option<Arc<Window>>,
    /// Flag to indicate async init is in progress
    #[cfg(target_arch = "wasm32")]
    init_in_progress: std::cell::Cell<bool>,
}

impl App {
    /// Create a new application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            pending_window: None,
            #[cfg(target_arch = "wasm32")]
            init_in_progress: std::cell::Cell::new(false),
        }
    }

    /// Run the application.
    pub async fn run(config: AppConfig) {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                log::error!("Failed to create event loop: {e}");
                return;
            }
        };
        let app = App::with_config(config);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            if let Err(e) = event_loop.run_app(&mut app) {
                log::error!("Event loop error: {e}");
            }
        }
    }

    /// Finish initialization after surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) {
        let Some(render_cx) = self.render_cx.as_ref() else {
            log::error!("Render context missing after surface creation");
            return;
        };
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = match vello::Renderer::new(device, RendererOptions::default()) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to create Vello renderer: {e}");
                return;
            }
        };

        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(egui::Visuals::dark());
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let mut canvas = CanvasSurface::new();
        canvas.viewport_size = Size::new(f64::from(surface.config.width), f64::from(surface.config.height));

        log::info!("Sketchboard initialized - {}x{}", surface.config.width, surface.config.height);
        log::info!("Keyboard shortcuts: V=Select, H=Pan, P=Draw, T=Text, S=Sketch, Esc=Close sketch bar");

        let mut state = AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            canvas_renderer: VelloRenderer::new(),
            texture_blitter,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::default(),
            editor: EditorState::new(),
            canvas,
            config: self.config.clone(),
            services: Services::from_config(&self.config),
            tasks: Tasks::default(),
            cursor: Point::ZERO,
            modifiers: ModifiersState::empty(),
        };
        state.start_user_lookup();

        self.state = Some(state);
        self.pending_window = None;

        window.request_redraw();
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.pending_window.is_some() {
            return;
        }

        log::info!("Creating window...");

        #[cfg(not(target_arch = "wasm32"))]
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        // On WASM, attach a full-viewport canvas to the DOM
        #[cfg(target_arch = "wasm32")]
        let window_attrs = {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let Some(web_window) = web_sys::window() else {
                log::error!("No browser window");
                event_loop.exit();
                return;
            };
            let Some(document) = web_window.document() else {
                log::error!("No document");
                event_loop.exit();
                return;
            };

            let viewport_width = web_window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(f64::from(self.config.width));
            let viewport_height = web_window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(f64::from(self.config.height));

            if let Some(loading) = document.get_element_by_id("loading") {
                loading.remove();
            }

            let canvas = document
                .get_element_by_id("sketchboard-canvas")
                .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
                .or_else(|| {
                    let app_div = document.get_element_by_id("app")?;
                    let canvas = document.create_element("canvas").ok()?;
                    canvas.set_id("sketchboard-canvas");
                    app_div.append_child(&canvas).ok()?;
                    canvas.dyn_into::<web_sys::HtmlCanvasElement>().ok()
                });
            let Some(canvas) = canvas else {
                log::error!("Failed to create canvas element");
                event_loop.exit();
                return;
            };

            let dpr = web_window.device_pixel_ratio();
            let physical_width = (viewport_width * dpr) as u32;
            let physical_height = (viewport_height * dpr) as u32;

            canvas.set_width(physical_width);
            canvas.set_height(physical_height);
            let style = canvas.style();
            for (property, value) in [
                ("width", "100%"),
                ("height", "100%"),
                ("display", "block"),
                ("position", "fixed"),
                ("top", "0"),
                ("left", "0"),
            ] {
                let _ = style.set_property(property, value);
            }

            log::info!(
                "Canvas created: {}x{} (physical: {}x{}, dpr: {})",
                viewport_width,
                viewport_height,
                physical_width,
                physical_height,
                dpr
            );

            Window::default_attributes()
                .with_title(&self.config.title)
                .with_canvas(Some(canvas))
        };

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Window created, initializing renderer...");

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        // On native, block on async surface creation
        #[cfg(not(target_arch = "wasm32"))]
        {
            let render_cx = self.render_cx.get_or_insert_with(vello::util::RenderContext::new);

            let surface = match pollster::block_on(render_cx.create_surface(
                window.clone(),
                width,
                height,
                PresentMode::AutoVsync,
            )) {
                Ok(surface) => surface,
                Err(e) => {
                    log::error!("Failed to create surface: {e:?}");
                    event_loop.exit();
                    return;
                }
            };

            // SAFETY: the surface borrows the window, which AppState keeps alive
            // alongside it for the rest of the program.
            let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
            self.finish_init(window, surface);
        }

        // On WASM, store window for later async initialization
        #[cfg(target_arch = "wasm32")]
        {
            let _ = (width, height);
            self.pending_window = Some(window);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        #[cfg(target_arch = "wasm32")]
        if self.state.is_none() {
            self.start_async_init();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        // Let egui process the event first
        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        let egui_wants_pointer = egui_response.consumed
            || state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input();
        let egui_wants_keyboard = egui_response.consumed || state.egui_ctx.wants_keyboard_input();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                state.canvas.viewport_size = Size::new(f64::from(size.width), f64::from(size.height));
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Some(render_cx) = self.render_cx.as_ref() {
                    state.redraw(render_cx);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
            }

            WindowEvent::CursorMoved { position, .. } => {
                state.cursor = Point::new(position.x, position.y);
                if !state.editor.is_gated() {
                    state.canvas.pointer_moved(state.cursor);
                }
            }

            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                if state.editor.is_gated() {
                    return;
                }
                match button_state {
                    ElementState::Pressed if !egui_wants_pointer => state.pointer_pressed(),
                    // Finish drags even when released over a panel
                    ElementState::Released => state.pointer_released(),
                    ElementState::Pressed => {}
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if egui_wants_pointer || state.editor.is_gated() {
                    return;
                }
                state.scroll(delta);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if egui_wants_keyboard
                    || state.editor.is_gated()
                    || event.state != ElementState::Pressed
                    || event.repeat
                {
                    return;
                }
                if let Some(action) = action_for_key(&event.logical_key, state.modifiers, &state.editor) {
                    state.apply_action(action);
                }
            }

            _ => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl App {
    /// Create the surface asynchronously once the browser delivers events.
    fn start_async_init(&mut self) {
        let Some(window) = self.pending_window.clone() else {
            return;
        };
        if !self.init_in_progress.get() {
            self.init_in_progress.set(true);

            let Some(web_window) = web_sys::window() else {
                return;
            };
            let dpr = web_window.device_pixel_ratio();
            let viewport_width = web_window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(f64::from(self.config.width));
            let viewport_height = web_window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(f64::from(self.config.height));
            let width = (viewport_width * dpr) as u32;
            let height = (viewport_height * dpr) as u32;

            let self_ptr = self as *mut Self;
            let window_clone = window.clone();

            wasm_bindgen_futures::spawn_local(async move {
                log::info!("Creating surface asynchronously...");
                let mut render_cx = vello::util::RenderContext::new();

                match render_cx
                    .create_surface(window_clone.clone(), width, height, PresentMode::AutoVsync)
                    .await
                {
                    Ok(surface) => {
                        // SAFETY: the surface borrows the window, which AppState keeps alive.
                        let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };

                        // SAFETY: WASM is single-threaded and the event loop keeps the App alive.
                        let app = unsafe { &mut *self_ptr };
                        app.render_cx = Some(render_cx);
                        app.finish_init(window_clone, surface);
                    }
                    Err(e) => {
                        log::error!("Failed to create surface: {:?}", e);
                        let app = unsafe { &mut *self_ptr };
                        app.init_in_progress.set(false);
                    }
                }
            });
        }

        // Keep the event loop running until the surface exists
        window.request_redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task_with<T: Send + 'static>(value: T) -> Option<PendingTask<T>> {
        Some(PendingTask::spawn("test", move || async move { value }).unwrap())
    }

    #[test]
    fn test_poll_idle_without_task() {
        let mut slot: Option<PendingTask<u8>> = None;
        assert!(matches!(poll_task(&mut slot), Poll::Idle));
    }

    #[test]
    fn test_poll_clears_finished_task() {
        let mut slot = task_with(7u8);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let value = loop {
            match poll_task(&mut slot) {
                Poll::Ready(value) => break Some(value),
                Poll::Lost => break None,
                Poll::Idle if std::time::Instant::now() > deadline => break None,
                Poll::Idle => std::thread::sleep(std::time::Duration::from_millis(5)),
            }
        };
        assert_eq!(value, Some(7));
        assert!(slot.is_none());
    }

    #[test]
    fn test_summarize_result() {
        assert_eq!(
            summarize_result(&json!({ "imageUrl": "x", "id": 1 })),
            "Generation finished: id, imageUrl"
        );
        assert_eq!(summarize_result(&json!({})), "Generation finished with an empty response");
        assert_eq!(summarize_result(&json!("ok")), "Generation finished: \"ok\"");
    }
}
