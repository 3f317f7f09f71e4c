use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use sticker_resizer::utils::{format_duration, info_println, validate_inputs};
use sticker_resizer::{
    Args, JsonMessage, PromptDecider, ResizeEngine, StickerConfig, Waifu2x,
};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();
    args.load_and_merge_config()?;

    if !args.json_progress {
        println!("{}", style("--- Telegram Sticker Resizer ---").bold().blue());
        println!(
            "{}",
            style("Resize images to fit the telegram sticker size restrictions.").dim()
        );
        println!();
    }

    validate_inputs(&args)?;

    let mut config = StickerConfig::new(args.input_dir.clone());
    config.force = args.force;
    config.waifu2x = args.waifu2x;
    config.verbose = args.verbose;
    config.json_progress = args.json_progress;

    let upscaler = Waifu2x::new(args.waifu2x_bin(), args.noise_level());

    if config.verbose && !config.json_progress {
        println!("{}", style("Configuration:").bold());
        println!("  Input directory: {}", config.input_dir.display());
        println!("  Output directory: {}", config.output_dir.display());
        println!("  Max size: {}x{}", config.max_width, config.max_height);
        println!(
            "  Force overwrite: {}",
            if config.force { "enabled" } else { "disabled" }
        );
        println!(
            "  waifu2x pre-pass: {}",
            if config.waifu2x { "enabled" } else { "disabled" }
        );
        if config.waifu2x {
            println!("    Binary: {}", upscaler.binary().display());
            println!("    Noise level: {}", args.noise_level());
        }
        println!();
    }

    // Ctrl-C ends the run after the current file and still prints the summary
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    let json_progress = config.json_progress;
    let engine = ResizeEngine::new(config);
    let mut decider = PromptDecider::stdin();
    let report = engine.execute(&upscaler, &mut decider, &interrupted)?;
    let total_time = start_time.elapsed();

    if json_progress {
        JsonMessage::summary(
            report.tally.processed,
            report.tally.skipped,
            report.tally.errors,
            report.interrupted,
            total_time.as_secs_f64(),
        );
        return Ok(());
    }

    if report.interrupted {
        info_println("Interrupted.");
    } else {
        info_println("Done.");
    }
    info_println(&report.tally.summary_line());
    println!(
        "    Total processing time: {}",
        style(format_duration(total_time)).dim()
    );

    Ok(())
}
