//! Manta CLI - headless renderer for distance-field scenes

mod demo;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{GrayImage, ImageBuffer, Rgba, RgbaImage};
use manta_core::description::SceneDescription;
use manta_core::prelude::*;
use manta_render::{
    CameraData, ColorHandler, CompositeSettings, DirectRenderHandler, FrameStats,
    MultipassHandler, MultipassRenderHandler, PbrCamera, RenderHandler, ShadingSettings,
    ThreadedCamera, WorkerStrategy,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "manta")]
#[command(about = "Multithreaded CPU ray marcher for distance-field scenes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a scene to a PNG
    Render(RenderArgs),

    /// Write the coordinate test pattern to a PNG
    TestPattern {
        /// Output image file (.png)
        #[arg(short, long, default_value = "pattern.png")]
        output: PathBuf,

        /// Image width
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "720")]
        height: u32,
    },

    /// Print a random scene as JSON, ready for `render --scene`
    Demo {
        /// Number of shapes
        #[arg(long, default_value = "20")]
        entities: usize,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Mix boxes in with the spheres
        #[arg(long)]
        boxes: bool,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// JSON scene file (a random scene is generated if omitted)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Output image file (.png)
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Which camera renders the frame
    #[arg(long, value_enum, default_value_t = Mode::Pbr)]
    mode: Mode,

    /// Channel to write in pbr mode
    #[arg(long, value_enum, default_value_t = Pass::Composite)]
    pass: Pass,

    /// Image width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Image height
    #[arg(long, default_value = "720")]
    height: u32,

    /// Worker threads
    #[arg(short, long, default_value = "16")]
    workers: usize,

    /// How workers are scheduled
    #[arg(long, value_enum, default_value_t = Strategy::Spawn)]
    strategy: Strategy,

    /// Camera position as x,y,z
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true,
          default_values_t = [-50.0, 0.0, 0.0])]
    position: Vec<f32>,

    /// Camera pitch,yaw,roll in degrees
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true,
          default_values_t = [0.0, 0.0, 0.0])]
    rotation: Vec<f32>,

    /// Field of view in degrees
    #[arg(long, default_value = "45")]
    fov: f32,

    /// Per-ray iteration cap
    #[arg(long, default_value = "1024")]
    max_steps: u32,

    /// Rays travelling this far are sky
    #[arg(long, default_value = "100")]
    max_distance: f32,

    /// Shapes in the random scene
    #[arg(long, default_value = "20")]
    entities: usize,

    /// Seed for the random scene
    #[arg(long)]
    seed: Option<u64>,

    /// Mix boxes into the random scene
    #[arg(long)]
    boxes: bool,

    /// Skip ambient occlusion
    #[arg(long)]
    no_ao: bool,

    /// Blend distant surfaces toward the mist color
    #[arg(long)]
    mist: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Flat shape colors
    Color,
    /// Albedo, light, mist and AO channels
    Pbr,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pass {
    Albedo,
    Light,
    Mist,
    Ao,
    Composite,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Fresh threads every frame
    Spawn,
    /// Rayon's global pool
    Pool,
}

impl From<Strategy> for WorkerStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Spawn => WorkerStrategy::Spawn,
            Strategy::Pool => WorkerStrategy::Pool,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => run_render(&args)?,
        Commands::TestPattern {
            output,
            width,
            height,
        } => run_test_pattern(&output, width, height)?,
        Commands::Demo {
            entities,
            seed,
            boxes,
        } => {
            let scene = demo::random_scene(entities, seed, boxes);
            println!("{}", serde_json::to_string_pretty(&scene)?);
        }
    }

    Ok(())
}

fn run_render(args: &RenderArgs) -> Result<()> {
    let description = match &args.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => {
            tracing::info!(entities = args.entities, seed = ?args.seed, "generating random scene");
            demo::random_scene(args.entities, args.seed, args.boxes)
        }
    };
    let scene = description.build().context("invalid scene")?;

    let rotation = vec3_arg("rotation", &args.rotation)?;
    let mut data = CameraData::new(Arc::new(scene))
        .with_position(vec3_arg("position", &args.position)?)
        .with_rotation(Vec3::new(
            rotation.x.to_radians(),
            rotation.y.to_radians(),
            rotation.z.to_radians(),
        ))
        .with_dimensions(args.width, args.height);
    data.fov = args.fov.to_radians();
    data.max_steps = args.max_steps;
    data.max_distance = args.max_distance;
    data.validate()?;

    tracing::info!(
        output = %args.output.display(),
        width = args.width,
        height = args.height,
        shapes = data.scene.len(),
        "rendering"
    );

    match args.mode {
        Mode::Color => {
            if args.pass != Pass::Composite {
                tracing::warn!("--pass only applies to pbr mode; writing the color image");
            }
            let handler = Arc::new(DirectRenderHandler::new(data.dimensions));
            let camera = ThreadedCamera::new(data, Arc::clone(&handler), args.workers)
                .with_strategy(args.strategy.into());
            report(&camera.render()?.wait()?);

            save_rgba(&args.output, handler.bitmap().snapshot(), handler.dimensions())?;
        }
        Mode::Pbr => {
            let shading = ShadingSettings {
                ambient_occlusion: !args.no_ao,
                ..ShadingSettings::default()
            };
            let composite = CompositeSettings {
                ambient_occlusion: !args.no_ao,
                mist: args.mist,
                ..CompositeSettings::default()
            };
            let handler = Arc::new(MultipassRenderHandler::with_settings(data.dimensions, composite));
            let camera = PbrCamera::new(data, Arc::clone(&handler), args.workers)
                .with_strategy(args.strategy.into())
                .with_shading(shading);
            report(&camera.render()?.wait()?);

            save_pass(&args.output, &handler, args.pass)?;
        }
    }

    println!("Saved to: {}", args.output.display());
    Ok(())
}

fn run_test_pattern(output: &Path, width: u32, height: u32) -> Result<()> {
    let data = CameraData::default().with_dimensions(width, height);
    data.validate()?;

    let handler = Arc::new(DirectRenderHandler::new(data.dimensions));
    let camera = ThreadedCamera::new(data, Arc::clone(&handler), 1);
    camera.render_test_pattern();

    save_rgba(output, handler.bitmap().snapshot(), handler.dimensions())?;
    println!("Saved to: {}", output.display());
    Ok(())
}

fn report(stats: &FrameStats) {
    println!(
        "Rendered {} pixels in {:.1?} ({} hits, {} sky, {} workers)",
        stats.pixels,
        stats.elapsed,
        stats.hits,
        stats.misses + stats.exhausted,
        stats.workers
    );
}

fn vec3_arg(name: &str, values: &[f32]) -> Result<Vec3> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => bail!("--{name} expects three comma-separated values, got {}", values.len()),
    }
}

fn save_pass(output: &Path, handler: &MultipassRenderHandler, pass: Pass) -> Result<()> {
    let passes = handler.passes();
    let UVec2 { x: width, y: height } = handler.dimensions();

    match pass {
        Pass::Composite => save_rgba(output, handler.composite().snapshot(), handler.dimensions()),
        Pass::Albedo => save_rgba(output, passes.albedo.snapshot(), handler.dimensions()),
        Pass::Light => {
            let img = ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, passes.light.snapshot())
                .context("light buffer does not match the frame size")?;
            img.save(output)
                .with_context(|| format!("failed to write {}", output.display()))
        }
        Pass::Mist | Pass::Ao => {
            let buffer = if pass == Pass::Mist { &passes.mist } else { &passes.ao };
            let img = GrayImage::from_raw(width, height, buffer.snapshot())
                .context("channel buffer does not match the frame size")?;
            img.save(output)
                .with_context(|| format!("failed to write {}", output.display()))
        }
    }
}

fn save_rgba(output: &Path, data: Vec<u8>, dimensions: UVec2) -> Result<()> {
    let img = RgbaImage::from_raw(dimensions.x, dimensions.y, data)
        .context("bitmap does not match the frame size")?;
    img.save(output)
        .with_context(|| format!("failed to write {}", output.display()))
}
