//! Renders the same address with every built-in preset
//!
//! Usage: cargo run -p wallet-qr-core --example render_presets [address] [logo.png]

use std::path::{Path, PathBuf};

use anyhow::Context;
use wallet_qr_core::{batch_jobs, StyleManager, WalletQrGenerator};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let address = args
        .next()
        .unwrap_or_else(|| "0x742d35Cc6634C0532925a3b844Bc454e4438f44e".to_string());
    let logo = args.next().map(PathBuf::from);

    let output_dir = Path::new("generated_qr");
    std::fs::create_dir_all(output_dir).with_context(|| format!("creating {}", output_dir.display()))?;

    let manager = StyleManager::new();
    for name in manager.list_styles() {
        let mut config = manager.get_style(name).context("style disappeared")?.clone();
        if config.add_logo {
            config.logo_path = logo.clone();
        }

        let generator = WalletQrGenerator::new(config);
        let jobs = batch_jobs(&[address.as_str()], output_dir, name);
        for result in generator.generate_batch(&jobs) {
            let result = result.with_context(|| format!("rendering style {name}"))?;
            println!(
                "{:<14} {:>4}x{:<4} {:>9}  {}",
                result.style,
                result.dimensions.0,
                result.dimensions.1,
                result.size_formatted(),
                result.filepath.display()
            );
            for warning in &result.warnings {
                println!("    warning: {warning:?}");
            }
        }
    }

    Ok(())
}
