mod terminal;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use extoast_core::{Context, ContextBuilder, ToastRequest, LENGTH_LONG, LENGTH_SHORT};
use extoast_shared::config::{self, AppConfig};
use extoast_shared::models::{DurationPolicy, Gravity, ResId};

use terminal::TerminalSurface;

#[derive(Parser)]
#[command(name = "extoast", about = "extoast - queued toast notifications in the terminal")]
struct Cli {
    /// Log at debug level regardless of config.toml
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue one toast per text and print surface events until all are gone
    Show {
        /// Toast texts, shown in order
        #[arg(required_unless_present = "res")]
        text: Vec<String>,

        /// Display duration: short, long, or milliseconds. Numbers go through
        /// the duration markers first: 1 means long, 0 and below mean short
        #[arg(short, long, default_value = "short")]
        duration: String,

        /// Text resource id from the [strings] table (can be specified multiple times)
        #[arg(short, long, value_name = "ID")]
        res: Vec<String>,

        /// Placement, e.g. bottom, top-start, center
        #[arg(short, long)]
        gravity: Option<String>,

        /// Horizontal offset in pixels
        #[arg(short)]
        x: Option<i32>,

        /// Vertical offset in pixels
        #[arg(short)]
        y: Option<i32>,

        /// Horizontal and vertical margin as fractions of the surface
        #[arg(long, num_args = 2, value_names = ["H", "V"])]
        margin: Option<Vec<f32>>,

        /// Use right-to-left layout direction
        #[arg(long)]
        rtl: bool,

        /// Simulate the customized device skin
        #[arg(long)]
        custom_skin: bool,
    },

    /// Run a scripted queue scenario
    Demo,

    /// Open config file in editor, or update toast durations in place
    Config {
        /// New short display window in milliseconds
        #[arg(long)]
        short_ms: Option<u64>,

        /// New long display window in milliseconds
        #[arg(long)]
        long_ms: Option<u64>,
    },
}

struct ShowOptions {
    duration: i64,
    gravity: Option<Gravity>,
    x: Option<i32>,
    y: Option<i32>,
    margin: Option<(f32, f32)>,
}

fn main() {
    let cli = Cli::parse();
    let mut app_config = config::load_config();
    init_logging(&app_config, cli.verbose);

    match cli.command {
        Commands::Show {
            text,
            duration,
            res,
            gravity,
            x,
            y,
            margin,
            rtl,
            custom_skin,
        } => {
            let duration = parse_duration(&duration).unwrap_or_else(|e| {
                eprintln!("{} Use 'short', 'long', or a number of milliseconds.", e);
                std::process::exit(1);
            });
            let gravity = gravity.map(|g| {
                g.parse::<Gravity>().unwrap_or_else(|e| {
                    eprintln!("{}", e);
                    std::process::exit(1);
                })
            });
            let margin = margin.map(|m| (m[0], m[1]));

            app_config.display.rtl |= rtl;
            app_config.display.custom_skin |= custom_skin;
            let ctx = build_context(&app_config);

            let options = ShowOptions {
                duration,
                gravity,
                x,
                y,
                margin,
            };
            let mut toasts: Vec<ToastRequest> = text
                .into_iter()
                .map(|t| ctx.make_text(t, LENGTH_SHORT))
                .collect();
            for id in &res {
                match ctx.make_text_res(&ResId::new(id.as_str()), LENGTH_SHORT) {
                    Ok(toast) => toasts.push(toast),
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
            }

            for toast in &mut toasts {
                apply_options(toast, &options);
                if let Err(e) = toast.show() {
                    eprintln!("Failed to show toast: {}", e);
                    std::process::exit(1);
                }
            }
            wait_for_idle(&ctx);
        }
        Commands::Demo => {
            let ctx = build_context(&app_config);
            run_demo(&ctx).unwrap_or_else(|e| {
                eprintln!("Demo failed: {}", e);
                std::process::exit(1);
            });
        }
        Commands::Config { short_ms, long_ms } => {
            let config_path = config::ensure_config_file().unwrap_or_else(|e| {
                eprintln!("Failed to create config file: {}", e);
                std::process::exit(1);
            });

            if short_ms.is_some() || long_ms.is_some() {
                let short = short_ms.unwrap_or(app_config.toast.short_ms);
                let long = long_ms.unwrap_or(app_config.toast.long_ms);
                if DurationPolicy::new(short, long).is_none() {
                    eprintln!(
                        "Invalid durations short_ms={} long_ms={}: need 0 < short_ms < long_ms",
                        short, long
                    );
                    std::process::exit(1);
                }
                if let Err(e) = config::save_toast_durations(short_ms, long_ms) {
                    eprintln!("Failed to update config file: {}", e);
                    std::process::exit(1);
                }
                println!("Updated {}", config_path.display());
                return;
            }

            let editor = config::resolve_editor();

            let status = std::process::Command::new("sh")
                .arg("-c")
                .arg(format!("{} \"{}\"", editor, config_path.display()))
                .status()
                .unwrap_or_else(|e| {
                    eprintln!("Failed to launch editor '{}': {}", editor, e);
                    std::process::exit(1);
                });

            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
    }
}

fn init_logging(app_config: &AppConfig, verbose: bool) {
    let log_path = config::log_path();
    if let Some(log_dir) = log_path.parent() {
        let _ = std::fs::create_dir_all(log_dir);
    }

    // Rotate log file if it exceeds 5 MB
    const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
    if let Ok(meta) = std::fs::metadata(&log_path) {
        if meta.len() > MAX_LOG_SIZE {
            let _ = std::fs::rename(&log_path, log_path.with_extension("log.old"));
        }
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        app_config.log.level_filter()
    };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                humantime::format_rfc3339_seconds(std::time::SystemTime::now()),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());
    match fern::log_file(&log_path) {
        Ok(file) => dispatch = dispatch.chain(file),
        Err(e) => eprintln!("Failed to open log file {}: {}", log_path.display(), e),
    }
    if let Err(e) = dispatch.apply() {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

fn build_context(app_config: &AppConfig) -> Context {
    ContextBuilder::from_config(app_config)
        .surface_host(Arc::new(TerminalSurface::new()))
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start toast context: {}", e);
            std::process::exit(1);
        })
}

fn parse_duration(s: &str) -> Result<i64, String> {
    match s {
        "short" => Ok(LENGTH_SHORT),
        "long" => Ok(LENGTH_LONG),
        _ => s
            .parse::<i64>()
            .map_err(|_| format!("Invalid duration: {}.", s)),
    }
}

fn apply_options(toast: &mut ToastRequest, options: &ShowOptions) {
    toast.set_duration(options.duration);
    if options.gravity.is_some() || options.x.is_some() || options.y.is_some() {
        toast.set_gravity(
            options.gravity.unwrap_or_else(|| toast.gravity()),
            options.x.unwrap_or_else(|| toast.x_offset()),
            options.y.unwrap_or_else(|| toast.y_offset()),
        );
    }
    if let Some((horizontal, vertical)) = options.margin {
        toast.set_margin(horizontal, vertical);
    }
}

/// Block until nothing is queued and the UI thread has drained.
fn wait_for_idle(ctx: &Context) {
    while !ctx.manager().is_idle() {
        std::thread::sleep(Duration::from_millis(10));
    }
    ctx.ui().sync();
}

/// Two toasts, a re-request of the first while it is visible and the
/// cancellation of a third before it ever shows.
fn run_demo(ctx: &Context) -> Result<(), extoast_core::ToastError> {
    let first = ctx.make_text("First", LENGTH_SHORT);
    let second = ctx.make_text("Second", LENGTH_SHORT);
    let third = ctx.make_text("Third", LENGTH_SHORT);

    first.show()?;
    second.show()?;
    third.show()?;
    log::info!("queued {:?}", ctx.manager());

    std::thread::sleep(Duration::from_millis(ctx.durations().short_ms() / 3));
    first.show()?;
    third.cancel();
    log::info!("after refresh and cancel {:?}", ctx.manager());

    wait_for_idle(ctx);
    Ok(())
}
