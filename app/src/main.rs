use std::{error::Error, path::PathBuf};

use mimalloc::MiMalloc;
use neurobg::{DeviceClass, Simulation};
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::{Handler, load_config};

mod app;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Layout size used for `--export-png`.
const EXPORT_SIZE: (f32, f32) = (1280.0, 800.0);

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--export-png" => {
                let path = args.next().ok_or("--export-png needs an output path")?;
                return export_png(path.into());
            }
            other => return Err(format!("unknown argument `{other}`").into()),
        }
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut handler = Handler::default();
    event_loop.run_app(&mut handler)?;
    Ok(())
}

fn export_png(path: PathBuf) -> Result<(), Box<dyn Error>> {
    let device = DeviceClass::Desktop;
    let (width, height) = EXPORT_SIZE;
    let simulation = Simulation::new(load_config(device), device, width, height)?;
    std::fs::write(&path, neurobg::export::to_png(simulation.topology())?)?;
    tracing::info!(path = %path.display(), "wrote network graph");
    Ok(())
}
