use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use numgrid_core::config::FieldConfig;
use numgrid_core::world::World;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

const WARMUP_FRAMES: usize = 10;
const BENCHMARK_FRAMES: usize = 300;
const TARGET_FPS: f64 = 60.0;

#[derive(Parser)]
#[command(name = "numgrid")]
#[command(about = "Numeric grid simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for results (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of frames to simulate
        #[arg(long, default_value_t = 600)]
        frames: usize,

        /// Record metrics every N frames
        #[arg(long, default_value_t = 60)]
        sample_every: usize,

        /// Override the seed from the config file
        #[arg(long)]
        seed: Option<u64>,

        /// Print an ASCII view of the last frame
        #[arg(long)]
        dump_frame: bool,
    },
    /// Run the frame-time benchmark across grid sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: &Path) -> Result<FieldConfig> {
    let file = File::open(path).context("failed to open config file")?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("failed to parse config")
}

fn run_benchmark(rows: usize, cols: usize, seed: u64) -> Result<()> {
    let config = FieldConfig {
        grid_rows: rows,
        grid_cols: cols,
        seed,
        ..FieldConfig::default()
    };
    config
        .validate()
        .context("Benchmark config validation error")?;

    let mut world = World::new(config.clone()).context("failed to initialize world")?;
    let interval = config.frame_interval();

    let mut now = 0.0;
    for _ in 0..WARMUP_FRAMES {
        world.step(now);
        now += interval;
    }
    // One click per simulated second.
    let clicks_every = config.max_fps.round().max(1.0) as usize;

    let mut total_scroll = 0u64;
    let mut total_growth = 0u64;
    let mut total_fluctuation = 0u64;
    let mut total_payload = 0u64;
    let mut total_time = 0u64;
    let mut total_snapshot = 0u64;

    for frame in 0..BENCHMARK_FRAMES {
        if frame % clicks_every == 0 {
            world.click(rows / 2, cols - 1);
        }
        let report = world.step(now);
        total_scroll += report.timings.scroll_us;
        total_growth += report.timings.growth_us;
        total_fluctuation += report.timings.fluctuation_us;
        total_payload += report.timings.payload_us;
        total_time += report.timings.total_us;

        let t = std::time::Instant::now();
        let snapshot = world.snapshot(now);
        total_snapshot += t.elapsed().as_micros() as u64;
        std::hint::black_box(snapshot);
        now += interval;
    }

    let frames = BENCHMARK_FRAMES as f64;
    let avg_frame_us = (total_time + total_snapshot) as f64 / frames;
    let frames_per_sec = 1_000_000.0 / avg_frame_us.max(1.0);

    println!(
        "--- {rows}x{cols} grid ({} Beings, {} payloads live) ---",
        world.beings().len(),
        world.payloads().len()
    );
    println!("  Avg frame:     {avg_frame_us:.0} us ({frames_per_sec:.1} frames/sec)");
    println!(
        "  Breakdown:     scroll={:.0} us, growth={:.0} us, fluctuation={:.0} us, payloads={:.0} us, snapshot={:.0} us",
        total_scroll as f64 / frames,
        total_growth as f64 / frames,
        total_fluctuation as f64 / frames,
        total_payload as f64 / frames,
        total_snapshot as f64 / frames,
    );

    let verdict = if frames_per_sec >= TARGET_FPS {
        "GO"
    } else {
        "NO-GO"
    };
    println!("  Verdict:       {verdict} (target: >={TARGET_FPS} frames/sec)");
    println!();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = FieldConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p numgrid-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== numgrid frame benchmark ===");
            println!("Warmup: {WARMUP_FRAMES} frames, Benchmark: {BENCHMARK_FRAMES} frames");
            println!("Target: >={TARGET_FPS} frames/sec at the default 135x192 grid");
            println!();

            let sizes = [
                (45, 64),   // small window
                (90, 128),  // laptop
                (135, 192), // default
                (270, 384), // stress test
            ];
            for (rows, cols) in sizes {
                run_benchmark(rows, cols, 42)?;
            }
        }
        Commands::Run {
            config,
            out,
            frames,
            sample_every,
            seed,
            dump_frame,
        } => {
            let mut field_config = load_config(&config)?;
            if let Some(seed) = seed {
                field_config.seed = seed;
            }
            field_config.validate().context("Config validation error")?;

            info!(path = ?config, frames, seed = field_config.seed, "loaded config");
            println!("Simulating {frames} frames...");

            let mut world = World::new(field_config).context("failed to initialize world")?;
            let summary = world
                .run_frames(frames, sample_every)
                .context("run failed")?;

            if dump_frame {
                let now = world.last_frame_time().unwrap_or(0.0);
                print!("{}", world.snapshot(now).to_ascii());
            }

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
                println!("Run complete. Results saved to {:?}", out_dir);
            } else {
                println!(
                    "Run complete. Beings: {}/{}, payloads: {}, absorptions: {}",
                    summary.beings_placed,
                    summary.beings_requested,
                    summary.final_payload_count,
                    summary.total_absorptions
                );
            }
        }
    }
    Ok(())
}
