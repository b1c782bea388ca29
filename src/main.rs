use sdl2::keyboard::Keycode;

use voidsphere::config::{Config, DEFAULT_CONFIG_PATH};
use voidsphere::display::{Display, InputEvent, RenderTarget, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use voidsphere::math3d::{Camera, Vec2};
use voidsphere::raster::SoftwareRenderer;
use voidsphere::scene::SceneDriver;
use voidsphere::util::{FpsCounter, SceneClock};

/// Command line overrides applied on top of the config file
#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    no_vsync: bool,
    seed: Option<u64>,
}

impl CliArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(w) = self.width {
            config.window.width = w;
        }
        if let Some(h) = self.height {
            config.window.height = h;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
        if let Some(seed) = self.seed {
            config.particles.seed = seed;
        }
    }
}

/// Parse command line arguments
fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => cli.no_vsync = true,
            "--config" => {
                if i + 1 < args.len() {
                    cli.config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            },
            "--width" | "-w" => {
                if i + 1 < args.len() {
                    if let Ok(w) = args[i + 1].parse::<u32>() {
                        cli.width = Some(w);
                    }
                    i += 1;
                }
            },
            "--height" | "-h" => {
                if i + 1 < args.len() {
                    if let Ok(h) = args[i + 1].parse::<u32>() {
                        cli.height = Some(h);
                    }
                    i += 1;
                }
            },
            "--resolution" | "-r" => {
                if i + 1 < args.len() {
                    // Parse WxH format (e.g., 1920x1080)
                    let parts: Vec<&str> = args[i + 1].split('x').collect();
                    if parts.len() == 2 {
                        if let (Ok(w), Ok(h)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                            cli.width = Some(w);
                            cli.height = Some(h);
                        }
                    }
                    i += 1;
                }
            },
            "--seed" => {
                if i + 1 < args.len() {
                    if let Ok(seed) = args[i + 1].parse::<u64>() {
                        cli.seed = Some(seed);
                    }
                    i += 1;
                }
            },
            "--help" => {
                println!("Usage: voidsphere [OPTIONS]");
                println!();
                println!("Options:");
                println!(
                    "  --config PATH         Load settings from PATH (default: {})",
                    DEFAULT_CONFIG_PATH
                );
                println!(
                    "  --width W, -w W       Set window width (default: {})",
                    DEFAULT_WIDTH
                );
                println!(
                    "  --height H, -h H      Set window height (default: {})",
                    DEFAULT_HEIGHT
                );
                println!("  --resolution WxH, -r WxH  Set resolution (e.g., 1920x1080)");
                println!("  --no-vsync            Disable VSync for uncapped framerate");
                println!("  --seed N              Seed for the particle field");
                println!("  --help                Show this help message");
                println!();
                println!("Set RUST_LOG=debug for per-second frame stats.");
                std::process::exit(0);
            },
            other => log::warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    cli
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = parse_args();
    let config_path = cli.config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut config = Config::load(config_path)?;
    cli.apply(&mut config);

    let (width, height) = (config.window.width, config.window.height);
    if width == 0 || height == 0 {
        return Err(format!("invalid resolution {}x{}", width, height));
    }

    let (mut display, texture_creator) =
        Display::with_options("voidsphere", width, height, config.window.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;

    let mut driver = SceneDriver::new(&config);
    driver.init()?;
    let camera = Camera::new(config.camera.distance, config.camera.fov_degrees);
    let mut renderer = SoftwareRenderer::new(width, height, camera);

    // FPS counter with 60 sample rolling average
    let mut fps_counter = FpsCounter::new(60);
    let mut show_stats = false;
    let mut stats_timer = 0.0;

    let mut clock = SceneClock::new();
    let mut pointer = Vec2::default();

    println!("=== voidsphere ===");
    println!("Controls:");
    println!("  Mouse      - Tilt the sphere");
    println!("  Space      - Pause / resume");
    println!("  F          - Toggle frame stats");
    println!("  Escape     - Quit");

    'main: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit => break 'main,
                InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::F) => {
                    show_stats = !show_stats;
                    log::info!("Stats: {}", if show_stats { "on" } else { "off" });
                },
                InputEvent::KeyDown(Keycode::Space) => {
                    let paused = clock.toggle_pause();
                    log::info!("{}", if paused { "Paused" } else { "Resumed" });
                },
                InputEvent::KeyDown(_) => {},
                InputEvent::PointerMove(p) => pointer = p,
            }
        }

        // A paused scene keeps showing its last frame
        if !clock.is_paused() {
            let elapsed = clock.tick(dt);
            driver.update(elapsed, pointer, &mut renderer);
        }
        display.present(&mut target, renderer.buffer())?;

        stats_timer += dt;
        if stats_timer >= 1.0 {
            stats_timer = 0.0;
            let (min_fps, max_fps) = fps_counter.min_max_fps();
            let level = if show_stats {
                log::Level::Info
            } else {
                log::Level::Debug
            };
            log::log!(
                level,
                "{:.1} fps ({:.1}-{:.1}), {:.2} ms/frame, t={:.2}s, frame {}",
                avg_fps,
                min_fps,
                max_fps,
                fps_counter.avg_frame_time_ms(),
                driver.time(),
                driver.frames()
            );
        }
    }

    driver.teardown(&mut renderer);
    Ok(())
}
