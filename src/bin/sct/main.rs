//! sct - inspect and replay spatial-capture recordings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use spatial_capture::geom::{read_environment_probes, read_mesh_snapshot, EnvironmentProbe, Lens};
use spatial_capture::prelude::*;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("SCT_BUILD_DATE"),
    " ",
    env!("SCT_BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "sct", version = VERSION, about = "Spatial capture inspection tool")]
struct Cli {
    /// JSON reader config.
    #[arg(long, short = 'c', value_name = "FILE", global = true, env = "SCT_CONFIG")]
    config: Option<PathBuf>,

    /// Expected header version (e.g. 202004 for legacy camera captures).
    #[arg(long, value_name = "CODE", global = true)]
    version_code: Option<i32>,

    /// Sections present in the capture.
    #[arg(long, value_name = "KIND", global = true)]
    layout: Option<LayoutArg>,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Header, anchors and skeleton summary.
    Info(FileArgs),
    /// Per-frame camera and joint poses.
    Dump(DumpArgs),
    /// Environment probe volumes.
    Probes(FileArgs),
    /// Scene geometry snapshot summary.
    Mesh(FileArgs),
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Capture file.
    file: PathBuf,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DumpArgs {
    #[command(flatten)]
    input: FileArgs,

    /// Ticks to run (default: one epoch).
    #[arg(long, short = 'n')]
    ticks: Option<u64>,

    /// Print parent-relative joint poses.
    #[arg(long)]
    relative: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LayoutArg {
    Camera,
    Body,
    Project,
}

impl From<LayoutArg> for CaptureLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Camera => CaptureLayout::CAMERA,
            LayoutArg::Body => CaptureLayout::BODY_TRACKING,
            LayoutArg::Project => CaptureLayout::PROJECT,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => ReaderConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ReaderConfig::default(),
    };
    if let Some(code) = cli.version_code {
        config.protocol_version = code;
    }
    if let Some(layout) = cli.layout {
        config.layout = layout.into();
    }
    debug!(?config, "effective config");

    match cli.command {
        Command::Info(args) => cmd_info(&args, &config),
        Command::Dump(args) => cmd_dump(&args, &config),
        Command::Probes(args) => cmd_probes(&args),
        Command::Mesh(args) => cmd_mesh(&args),
    }
}

/// `SCT_LOG` wins over the verbosity flags.
fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("SCT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
}

fn open(path: &Path) -> Result<Arc<CaptureData>> {
    CaptureData::open_shared(path).with_context(|| format!("opening {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct JointInfo<'a> {
    index: usize,
    name: &'a str,
    parent: i32,
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    file: String,
    bytes: usize,
    header: &'a Header,
    orientation: DeviceOrientation,
    lens: Lens,
    anchors: Vec<Vec3>,
    joints: Vec<JointInfo<'a>>,
}

fn cmd_info(args: &FileArgs, config: &ReaderConfig) -> Result<()> {
    let data = open(&args.file)?;
    let bytes = data.len();
    let mut reader = CaptureReader::with_config(data, config);
    reader.decode_prologue(&config.layout)?;

    let definition = reader.skeleton_definition();
    let out = InfoOutput {
        file: args.file.display().to_string(),
        bytes,
        header: reader.header(),
        orientation: reader.header().orientation(),
        lens: Lens::from_header(reader.header()),
        anchors: reader.user_anchors().to_engine(),
        joints: definition
            .joint_names
            .iter()
            .zip(&definition.parent_indices)
            .enumerate()
            .map(|(index, (name, &parent))| JointInfo { index, name, parent })
            .collect(),
    };

    if args.json {
        return print_json(&out);
    }

    let h = out.header;
    println!("File:        {} ({} bytes)", out.file, out.bytes);
    println!("Version:     {}", h.version);
    println!("Frames:      {}", h.frame_count);
    println!("Orientation: {:?} ({})", out.orientation, h.device_orientation);
    println!("FOV:         {:.2} x {:.2}", h.horizontal_fov, h.vertical_fov);
    println!("Focal:       {:.2} x {:.2}", h.focal_length_x, h.focal_length_y);
    println!("Type:        {}", h.capture_type);
    if config.layout.user_anchors {
        println!("Anchors:     {}", out.anchors.len());
        for (i, a) in out.anchors.iter().enumerate() {
            println!("  [{}] ({:.2}, {:.2}, {:.2})", i, a.x, a.y, a.z);
        }
    }
    if config.layout.skeleton {
        println!("Joints:      {}", out.joints.len());
        for j in &out.joints {
            println!("  [{:2}] {:<24} parent {}", j.index, j.name, j.parent);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct FrameOutput {
    tick: u64,
    epoch: u32,
    frame: i32,
    timestamp: f64,
    camera: Transform,
    joints: Vec<Transform>,
}

fn cmd_dump(args: &DumpArgs, config: &ReaderConfig) -> Result<()> {
    let mut player = Player::new(open(&args.input.file)?, config.clone())?;
    let ticks = args.ticks.unwrap_or(player.header().frames() as u64);

    let mut frames = Vec::new();
    for _ in 0..ticks {
        if !player.tick()?.has_frame() {
            break;
        }
        let joints = if args.relative {
            player.relative_joint_transforms()?
        } else {
            player.skeleton_frame().transforms().to_vec()
        };
        let frame = FrameOutput {
            tick: player.ticks(),
            epoch: player.epoch(),
            frame: player.current_frame(),
            timestamp: player.camera_metadata().timestamp,
            camera: *player.camera_transform(),
            joints,
        };
        if !args.input.json {
            print_frame(&frame, config.layout.camera);
        }
        frames.push(frame);
    }

    if args.input.json {
        return print_json(&frames);
    }
    println!("{} frames", frames.len());
    Ok(())
}

fn print_frame(frame: &FrameOutput, camera: bool) {
    println!("frame {} (epoch {}, t={:.4})", frame.frame, frame.epoch, frame.timestamp);
    if camera {
        println!("  camera {:?}", frame.camera);
    }
    for (i, joint) in frame.joints.iter().enumerate() {
        let name = JointIndex::from_index(i).map_or("", JointIndex::name);
        println!("  [{:2}] {:<12} {:?}", i, name, joint);
    }
}

fn cmd_probes(args: &FileArgs) -> Result<()> {
    let mut cursor = ByteCursor::shared(open(&args.file)?);
    let probes: Vec<EnvironmentProbe> = read_environment_probes(&mut cursor);

    if args.json {
        return print_json(&probes);
    }
    println!("{} probes", probes.len());
    for (i, p) in probes.iter().enumerate() {
        let t = p.transform.translation;
        println!(
            "  [{}] at ({:.1}, {:.1}, {:.1}) extent ({:.1}, {:.1}, {:.1})",
            i, t.x, t.y, t.z, p.extent.x, p.extent.y, p.extent.z
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct SnapshotOutput {
    index: usize,
    parts: usize,
    vertices: usize,
    triangles: usize,
    invalid_indices: usize,
}

fn cmd_mesh(args: &FileArgs) -> Result<()> {
    let mut cursor = ByteCursor::shared(open(&args.file)?);
    let mut snapshots = Vec::new();
    while let Some(parts) = read_mesh_snapshot(&mut cursor) {
        snapshots.push(SnapshotOutput {
            index: snapshots.len(),
            parts: parts.len(),
            vertices: parts.iter().map(|p| p.vertices.len()).sum(),
            triangles: parts.iter().map(MeshPart::triangle_count).sum(),
            invalid_indices: parts.iter().map(MeshPart::invalid_indices).sum(),
        });
        if cursor.available() == 0 {
            break;
        }
    }

    if args.json {
        return print_json(&snapshots);
    }
    for s in &snapshots {
        println!(
            "snapshot {}: {} parts, {} vertices, {} triangles",
            s.index, s.parts, s.vertices, s.triangles
        );
        if s.invalid_indices > 0 {
            println!("  {} indices out of range", s.invalid_indices);
        }
    }
    println!("{} snapshots", snapshots.len());
    Ok(())
}
