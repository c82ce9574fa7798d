#[path = "components/actions.rs"]
mod actions;
#[path = "components/controller.rs"]
mod controller;
#[path = "components/transform.rs"]
mod transform;
#[path = "systems/control.rs"]
mod control;
#[path = "systems/system.rs"]
mod system;

mod component;
mod ecs;
mod entity;
mod host;
mod input;
mod physics;
mod preferences;
mod resources;
mod simulation;

use anyhow::Context;
use resources::Resources;
use simulation::Simulation;
use std::path::PathBuf;

const DEFAULT_ASSETS_DIR: &str = "src/resources";
const TARGET_FPS: u16 = 60;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let (windowed, assets_dir) = parse_args(std::env::args().skip(1))?;
    let resources = Resources::load(&assets_dir).with_context(|| format!("Failed to load assets from {:?}", assets_dir))?;
    let mut simulation = Simulation::from_resources(&resources)?;

    if windowed {
        return run_window(&mut simulation);
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    host::run_headless(&mut simulation, stdin.lock(), stdout.lock(), 1.0/(TARGET_FPS as f32))
}

/// `agent-sim [--window] [ASSETS_DIR]`
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<(bool, PathBuf)> {
    let mut windowed = false;
    let mut assets_dir = PathBuf::from(DEFAULT_ASSETS_DIR);
    for arg in args {
        match arg.as_str() {
            "--window" => windowed = true,
            flag if flag.starts_with("--") => anyhow::bail!("Unknown flag {:?}, usage: agent-sim [--window] [ASSETS_DIR]", flag),
            _ => assets_dir = PathBuf::from(&arg),
        }
    }
    Ok((windowed, assets_dir))
}

#[cfg(not(feature = "sdl"))]
fn run_window(_simulation: &mut Simulation) -> anyhow::Result<()> {
    anyhow::bail!("This build has no window support, rebuild with --features sdl")
}

#[cfg(feature = "sdl")]
fn run_window(simulation: &mut Simulation) -> anyhow::Result<()> {
    use input::Input;
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;
    use std::time::{Duration, Instant};

    let sdl_context = sdl2::init().map_err(anyhow::Error::msg)?;
    let video_subsystem = sdl_context.video().map_err(anyhow::Error::msg)?;
    let _window = video_subsystem
        .window("Agent", 800, 800)
        .position_centered()
        .build()
        .context("Failed to create window")?;

    let mut event_pump = sdl_context.event_pump().map_err(anyhow::Error::msg)?;
    let mut input = Input::new();
    let target_refresh_rate = Duration::from_secs_f64(1.0/(TARGET_FPS as f64));
    let mut delta_time = target_refresh_rate.as_secs_f32();

    'gameloop: loop {
        let start_of_frame = Instant::now();

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit {..} |
                Event::KeyDown { keycode: Some(Keycode::Escape), .. } => break 'gameloop,
                _ => {}
            }
        }

        input.update_from_keyboard(&event_pump.keyboard_state());
        simulation.step(&input, delta_time)?;

        if simulation.tick() % (TARGET_FPS as u64) == 0 {
            for pose in simulation.poses()? {
                log::info!("{}", serde_json::to_string(&pose)?);
            }
        }

        if let Some(remaining) = target_refresh_rate.checked_sub(start_of_frame.elapsed()) {
            std::thread::sleep(remaining);
        }
        delta_time = start_of_frame.elapsed().as_secs_f32();
    }

    Ok(())
}
