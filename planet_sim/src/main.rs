//! Planet Simulator
//!
//! Bodies under mutual Newtonian gravity, advanced one fixed timestep (one
//! simulated day by default) per displayed frame, rendered with wgpu together
//! with their orbit trails.
//!
//! Controls:
//! - Space: Pause/resume stepping
//! - T: Toggle orbit trails
//! - L: Toggle distance lines between bodies
//! - +/-: Zoom in/out (display scale only)
//! - R: Reload the scenario from its initial conditions
//!
//! Run with `--headless --steps N` to step without a window and print a report.

mod renderer;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use common::GraphicsContext;
use planet_sim::{Projection, Scenario, ScenarioConfig, SimError, UpdateOrder};
use renderer::Renderer;
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

const TITLE: &str = "Planet Simulator";
const ZOOM_STEP: f64 = 1.25;

#[derive(Parser, Debug)]
#[command(about = "Newtonian planet simulator with orbit trails")]
struct Args {
    /// Scenario YAML file; the built-in inner solar system is used when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Step without opening a window and print the final state
    #[arg(long)]
    headless: bool,

    /// Number of steps to run in headless mode
    #[arg(long, default_value_t = 365)]
    steps: u64,

    /// Override the scenario's update order (synchronized or sequential)
    #[arg(long)]
    update_order: Option<UpdateOrder>,

    /// Override the number of positions kept per orbit trail
    #[arg(long)]
    trail_capacity: Option<usize>,
}

impl Args {
    fn scenario_config(&self) -> Result<ScenarioConfig> {
        let mut cfg = match &self.scenario {
            Some(path) => ScenarioConfig::load(path)?,
            None => ScenarioConfig::inner_solar_system(),
        };

        if let Some(order) = self.update_order {
            cfg.sim.update_order = order;
        }
        if let Some(capacity) = self.trail_capacity {
            cfg.sim.trail_capacity = capacity;
        }
        Ok(cfg)
    }
}

struct App {
    ctx: GraphicsContext,
    renderer: Renderer,
    scenario_cfg: ScenarioConfig,
    scenario: Scenario,
    projection: Projection,
    paused: bool,
    halted: Option<SimError>,
    show_trails: bool,
    show_links: bool,
}

impl App {
    fn new(ctx: GraphicsContext, scenario_cfg: ScenarioConfig, scenario: Scenario) -> Self {
        let renderer = Renderer::new(&ctx, scenario.registry.len(), scenario.sim.trail_capacity);
        let projection = Projection::new(scenario.sim.scale(), ctx.size.width, ctx.size.height);

        Self {
            ctx,
            renderer,
            scenario_cfg,
            scenario,
            projection,
            paused: false,
            halted: None,
            show_trails: true,
            show_links: false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.projection.resize(self.ctx.size.width, self.ctx.size.height);
        self.renderer
            .resize(&self.ctx.queue, self.ctx.size.width, self.ctx.size.height);
    }

    /// One tick of the frame driver: exactly one integrator step unless paused
    fn tick(&mut self) {
        if self.paused {
            return;
        }

        let Scenario {
            registry,
            integrator,
            ..
        } = &mut self.scenario;

        if let Err(err) = integrator.step(registry) {
            log::error!("step {} failed: {err}; pausing", registry.steps_taken() + 1);
            self.paused = true;
            self.halted = Some(err);
            return;
        }

        self.ctx.set_title(&format!(
            "{TITLE} - day {:.0}",
            self.scenario.elapsed_days()
        ));
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let geometry = self.renderer.prepare(
            &self.ctx.queue,
            &self.scenario.registry,
            &self.projection,
            self.show_trails,
            self.show_links,
        );

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, &geometry);

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.toggle_pause(),
            KeyCode::KeyT => self.show_trails = !self.show_trails,
            KeyCode::KeyL => self.show_links = !self.show_links,
            KeyCode::Equal | KeyCode::NumpadAdd => self.projection.zoom(ZOOM_STEP),
            KeyCode::Minus | KeyCode::NumpadSubtract => self.projection.zoom(1.0 / ZOOM_STEP),
            KeyCode::KeyR => self.reload(),
            _ => {}
        }
    }

    fn toggle_pause(&mut self) {
        if let Some(err) = &self.halted {
            log::warn!("simulation halted ({err}); press R to reload");
            return;
        }
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "paused" } else { "resumed" });
    }

    fn reload(&mut self) {
        match Scenario::build(&self.scenario_cfg) {
            Ok(scenario) => {
                self.scenario = scenario;
                self.halted = None;
                self.paused = false;
                self.ctx.set_title(TITLE);
                log::info!("scenario reloaded");
            }
            Err(err) => log::error!("failed to rebuild scenario: {err}"),
        }
    }
}

fn run_windowed(scenario_cfg: ScenarioConfig) -> Result<()> {
    let scenario = Scenario::build(&scenario_cfg).context("invalid initial conditions")?;
    let display = scenario.display.clone();

    let (ctx, event_loop) =
        pollster::block_on(GraphicsContext::new(TITLE, display.width, display.height))?;

    let mut app = App::new(ctx, scenario_cfg, scenario);
    let frame = Duration::from_secs_f64(1.0 / display.fps.max(1) as f64);
    let mut next_tick = Instant::now();

    log::info!(
        "running {} bodies at {} steps per second",
        app.scenario.registry.len(),
        display.fps
    );

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => app.resize(size),
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(key),
                            state,
                            ..
                        },
                    ..
                } => app.handle_key(key, state),
                WindowEvent::RedrawRequested => match app.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(e) => log::warn!("render error: {e:?}"),
                },
                _ => {}
            },
            Event::AboutToWait => {
                let now = Instant::now();
                if now >= next_tick {
                    app.tick();
                    app.ctx.window.request_redraw();
                    next_tick += frame;
                    // fell behind; don't try to catch up with a burst of steps
                    if next_tick < now {
                        next_tick = now + frame;
                    }
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(next_tick));
            }
            _ => {}
        })
        .context("event loop error")
}

fn run_headless(scenario_cfg: ScenarioConfig, steps: u64) -> Result<()> {
    let mut scenario = Scenario::build(&scenario_cfg).context("invalid initial conditions")?;
    let au = scenario.sim.au;
    let initial_energy = scenario.registry.total_energy(scenario.sim.g);

    for _ in 0..steps {
        scenario
            .integrator
            .step(&mut scenario.registry)
            .with_context(|| format!("step {} failed", scenario.registry.steps_taken() + 1))?;
    }

    println!(
        "after {} steps ({:.1} days):",
        scenario.registry.steps_taken(),
        scenario.elapsed_days()
    );
    for (i, body) in scenario.registry.all().iter().enumerate() {
        let position = body.position() / au;
        println!(
            "  {:<10} x = {:>8.4} AU  y = {:>8.4} AU  |v| = {:>7.3} km/s  \
             anchor distance = {:.4} AU",
            body.name().map(str::to_string).unwrap_or_else(|| format!("#{i}")),
            position.x,
            position.y,
            body.velocity().length() / 1000.0,
            body.distance_to_anchor() / au,
        );
    }

    let final_energy = scenario.registry.total_energy(scenario.sim.g);
    if initial_energy != 0.0 {
        println!(
            "  relative energy drift: {:.3e}",
            (final_energy - initial_energy) / initial_energy.abs()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scenario_cfg = args.scenario_config()?;

    if args.headless {
        run_headless(scenario_cfg, args.steps)
    } else {
        run_windowed(scenario_cfg)
    }
}
