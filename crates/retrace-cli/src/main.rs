use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "retrace")]
#[command(about = "Resolve a loaded module's base address by walking the thread stack")]
struct Args {
    /// Module to look for, with or without the .dll extension
    #[arg(default_value = "kernel32.dll")]
    module: String,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("retrace=warn".parse()?))
        .init();

    let args = Args::parse();

    println!("Searching for: {}", args.module);

    match search(&args.module)? {
        Some(base) => println!("Found {} at: 0x{:x}", args.module, base),
        None => println!("Failed to find {}", args.module),
    }

    Ok(())
}

#[cfg(target_os = "windows")]
fn search(module: &str) -> Result<Option<u64>> {
    use retrace_core::{ModuleLocator, ProcessMemory, StackRange};

    let range = StackRange::capture()?;
    debug!(
        "Stack limit {:#x}, base {:#x}, rsp {:#x}",
        range.limit, range.base, range.pointer
    );

    let memory = ProcessMemory::new();
    let (base, stats) = ModuleLocator::new(&memory).locate_with_stats(range, module);
    debug!("{:?}", stats);
    Ok(base)
}

#[cfg(not(target_os = "windows"))]
fn search(module: &str) -> Result<Option<u64>> {
    debug!("No search backend for this platform");
    let _ = module;
    anyhow::bail!("stack-walk module search requires 64-bit Windows")
}
