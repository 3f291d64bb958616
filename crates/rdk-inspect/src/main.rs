//! Robot description inspector.
//!
//! - `tree`: print the kinematic tree of a URDF/SDF file
//! - `poses`: print the world transform of every visual for given joint angles

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use rdk_core::{DescriptionLoader, LinkId, LoaderConfig, Robot, VisualPose};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Inspect robot descriptions.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Loader configuration (RON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the link hierarchy.
    Tree {
        /// URDF or SDF file.
        file: PathBuf,
    },

    /// Print per-visual world transforms.
    Poses {
        /// URDF or SDF file.
        file: PathBuf,

        /// Joint angle in degrees, as JOINT=DEG (repeatable).
        #[arg(short, long = "angle", value_parser = parse_angle)]
        angles: Vec<(String, f32)>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn parse_angle(text: &str) -> Result<(String, f32), String> {
    let (name, degrees) = text
        .split_once('=')
        .ok_or_else(|| format!("expected JOINT=DEG, got '{}'", text))?;
    let degrees = degrees
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid angle '{}': {}", degrees, e))?;
    Ok((name.trim().to_string(), degrees))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PoseRecord {
    link: String,
    visual: usize,
    geometry: Option<PathBuf>,
    /// Column-major 4x4
    world_transform: [f32; 16],
    color: [f32; 3],
    has_texture: bool,
}

impl PoseRecord {
    fn new(robot: &Robot, pose: &VisualPose) -> Self {
        Self {
            link: link_name(robot, pose.link),
            visual: pose.visual_index,
            geometry: pose.geometry.source_path().map(PathBuf::from),
            world_transform: pose.world_transform.to_cols_array(),
            color: pose.color.to_array(),
            has_texture: pose.has_texture,
        }
    }
}

fn link_name(robot: &Robot, id: LinkId) -> String {
    robot
        .link(id)
        .map(|l| l.name.clone())
        .unwrap_or_default()
}

fn print_tree(out: &mut impl Write, robot: &Robot, id: LinkId, depth: usize) -> io::Result<()> {
    let Some(link) = robot.link(id) else {
        return Ok(());
    };
    let indent = "  ".repeat(depth);
    if link.is_root() {
        writeln!(out, "{}{} ({} visuals)", indent, link.name, link.visuals.len())?;
    } else {
        writeln!(
            out,
            "{}{} <- {} '{}' ({} visuals)",
            indent,
            link.name,
            link.joint.kind.name(),
            link.joint.name,
            link.visuals.len()
        )?;
    }
    for &child in link.children() {
        print_tree(out, robot, child, depth + 1)?;
    }
    Ok(())
}

fn print_poses(out: &mut impl Write, records: &[PoseRecord]) -> io::Result<()> {
    for record in records {
        let m = glam::Mat4::from_cols_array(&record.world_transform);
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        write!(
            out,
            "{}[{}] t=({:.4}, {:.4}, {:.4}) q=({:.4}, {:.4}, {:.4}, {:.4})",
            record.link,
            record.visual,
            translation.x,
            translation.y,
            translation.z,
            rotation.x,
            rotation.y,
            rotation.z,
            rotation.w,
        )?;
        writeln!(
            out,
            " s=({:.4}, {:.4}, {:.4}) color=({:.2}, {:.2}, {:.2}){}",
            scale.x,
            scale.y,
            scale.z,
            record.color[0],
            record.color[1],
            record.color[2],
            if record.has_texture { " textured" } else { "" }
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn run(cli: Cli, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => LoaderConfig::from_ron_file(path)?,
        None => LoaderConfig::default(),
    };
    let loader = DescriptionLoader::new(config);
    let mut robot = Robot::default();

    match cli.command {
        Commands::Tree { file } => {
            robot.load(&file, &loader)?;
            if let Some(root) = robot.root() {
                print_tree(out, &robot, root, 0)?;
            }
            for &id in robot.detached_links() {
                writeln!(out, "(detached) {}", link_name(&robot, id))?;
            }
        }
        Commands::Poses { file, angles, json } => {
            robot.load(&file, &loader)?;
            for (joint, degrees) in &angles {
                if !robot.set_joint_angle_by_name(joint, *degrees) {
                    tracing::warn!("Unknown joint '{}', angle ignored", joint);
                }
            }

            let records: Vec<PoseRecord> = robot
                .visual_poses()
                .iter()
                .map(|pose| PoseRecord::new(&robot, pose))
                .collect();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else {
                print_poses(out, &records)?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rdk_core=info,rdk_inspect=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse(), &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
