use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::Config;
use crate::error::{OrreryError, Result};
use crate::gfx::{
    camera::{CameraController, CameraManager, OrbitCamera},
    rendering::RenderEngine,
    scene::Scene,
};
use crate::simulation::SimulationManager;
use crate::solar::SolarSystem;
use crate::ui::{scene_objects_panel, InputCapture, UiManager};

/// The orrery window: owns the event loop and runs the scene until closed
pub struct OrreryApp {
    config: Config,
}

struct AppState {
    config: Config,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    scene: Scene,
    simulation_manager: SimulationManager,
    last_frame: Instant,
    /// Set when start-up fails inside the event loop, returned from [`OrreryApp::run`]
    error: Option<OrreryError>,
}

impl OrreryApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Opens the window and blocks until it is closed
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = AppState::new(self.config);
        event_loop.run_app(&mut state)?;

        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn new(config: Config) -> Self {
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera = OrbitCamera::from_config(&config.camera, aspect);
        let controller = CameraController::from_config(&config.camera);

        let mut scene = Scene::new(CameraManager::new(camera, controller));
        scene.clear_color = config.scene.clear_color;

        Self {
            config,
            window: None,
            render_engine: None,
            ui_manager: None,
            scene,
            simulation_manager: SimulationManager::new(),
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: OrreryError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state == ElementState::Pressed && !event.repeat {
            match event.physical_key {
                PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                PhysicalKey::Code(KeyCode::Space) => self.simulation_manager.toggle_paused(),
                _ => (),
            }
        }
        self.scene.camera_manager.process_keyboard_event(event);
    }

    /// Advances the simulation, builds the panels and draws one frame
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(render_engine), Some(ui_manager)) = (
            self.window.as_ref(),
            self.render_engine.as_mut(),
            self.ui_manager.as_mut(),
        ) else {
            return;
        };

        let now = Instant::now();
        let delta_time = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.simulation_manager.update(delta_time, &mut self.scene);
        self.scene.update();

        let debug = &self.config.debug;
        let scene = &mut self.scene;
        let simulation_manager = &mut self.simulation_manager;
        ui_manager.update_logic(window, |ui| {
            simulation_manager.render_ui(ui, scene, debug.show_controls, debug.show_simulation);
            if debug.show_scene_objects {
                scene_objects_panel(ui, scene);
            }
        });

        let result = render_engine.render_frame(
            &mut self.scene,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    ui_manager.render_display_only(device, queue, encoder, view);
                },
            ),
        );

        if let Err(e) = result {
            log::error!("Failed to render frame: {}", e);
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = &self.config.window;
        let attributes = WindowAttributes::default()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let PhysicalSize { width, height } = window.inner_size();
        let vsync = self.config.window.vsync;
        let surface_target = window.clone();
        let render_engine = match pollster::block_on(RenderEngine::new(
            surface_target,
            width,
            height,
            vsync,
        )) {
            Ok(engine) => engine,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );

        self.scene
            .camera_manager
            .camera
            .resize_projection(width, height);

        let solar_system = SolarSystem::new(self.config.system.clone(), self.config.assets.clone());
        self.simulation_manager
            .attach_simulation(Box::new(solar_system), &mut self.scene);

        self.window = Some(window);
        self.render_engine = Some(render_engine);
        self.ui_manager = Some(ui_manager);
        // Asset loading above must not count as animation time
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        let capture = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                };
                ui_manager.handle_input(&window, &ui_event)
            }
            None => InputCapture::default(),
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            // Modifiers are tracked even while imgui holds the keyboard
            WindowEvent::ModifiersChanged(modifiers) => {
                self.scene.camera_manager.process_modifiers(&modifiers);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if !capture.keyboard {
                    self.handle_key(event_loop, &event);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                // Releases always pass so a drag that ends over a panel still stops
                if !capture.mouse || state == ElementState::Released {
                    self.scene
                        .camera_manager
                        .process_mouse_button(button, state);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.capture().mouse {
                return;
            }
        }

        let drag = self.scene.camera_manager.process_event(&event, window);
        if let Some(delta) = drag {
            if self.config.scene.drag_rotation {
                self.scene
                    .rotate_root(delta, self.config.scene.drag_rotation_speed);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
