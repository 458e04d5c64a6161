//! Entry point: pick a demo from the command line and run it.
//!
//! ```text
//! shader-demos [--demo=flame|planet] [--gpu-backend=auto|vulkan|dx12|metal|gl]
//!              [--size=WxH | --width=W --height=H] [--debug]
//!              [--assets=DIR] [--config=FILE]
//! ```

mod config;
mod flame;
mod input;
mod planet;

use std::path::PathBuf;

use anyhow::{Result, bail};
use asset::TextureLoader;
use platform::RunOptions;

use crate::{config::DemoConfig, flame::FlameDemo, planet::PlanetDemo};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DemoKind {
    Flame,
    Planet,
}

#[derive(Debug, PartialEq)]
struct Args {
    demo: DemoKind,
    backends: wgpu::Backends,
    width: u32,
    height: u32,
    debug: bool,
    assets: PathBuf,
    config: Option<PathBuf>,
}

fn parse_backend(val: &str) -> wgpu::Backends {
    match val.to_ascii_lowercase().as_str() {
        "auto" => wgpu::Backends::all(),
        "vulkan" | "vk" => wgpu::Backends::VULKAN,
        "dx12" | "d3d12" => wgpu::Backends::DX12,
        "metal" | "mtl" => wgpu::Backends::METAL,
        "gl" | "opengl" | "gles" => wgpu::Backends::GL,
        other => {
            log::warn!("Unknown backend '{}', falling back to auto.", other);
            wgpu::Backends::all()
        }
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args> {
    let mut demo = DemoKind::Flame;
    let mut backends = wgpu::Backends::all();
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;
    let mut debug = false;
    let mut assets = PathBuf::from("assets");
    let mut config = None;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--demo=") {
            demo = match v.to_ascii_lowercase().as_str() {
                "flame" => DemoKind::Flame,
                "planet" | "neptune" => DemoKind::Planet,
                other => bail!("Unknown demo '{other}' (expected flame or planet)"),
            };
        } else if let Some(v) = arg.strip_prefix("--gpu-backend=") {
            backends = parse_backend(v);
        } else if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            w = v.parse().ok().or(w);
        } else if let Some(v) = arg.strip_prefix("--height=") {
            h = v.parse().ok().or(h);
        } else if arg == "--debug" || arg == "#debug" {
            debug = true;
        } else if let Some(v) = arg.strip_prefix("--assets=") {
            assets = PathBuf::from(v);
        } else if let Some(v) = arg.strip_prefix("--config=") {
            config = Some(PathBuf::from(v));
        } else {
            log::warn!("Ignoring unknown argument '{}'", arg);
        }
    }

    Ok(Args {
        demo,
        backends,
        width: w.unwrap_or(1280).max(1),
        height: h.unwrap_or(720).max(1),
        debug,
        assets,
        config,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    log::info!(
        "Starting {:?} demo. Backend: {:?}, debug={}, window_size={}x{}",
        args.demo,
        args.backends,
        args.debug,
        args.width,
        args.height
    );

    let config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    let loader = TextureLoader::from_dir(&args.assets);
    let options = RunOptions {
        backends: args.backends,
        width: args.width,
        height: args.height,
        debug: args.debug,
    };

    match args.demo {
        DemoKind::Flame => platform::run(options, FlameDemo::new(config.flame, loader)?)?,
        DemoKind::Planet => platform::run(options, PlanetDemo::new(config.planet, loader)?)?,
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_runs_the_flame() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.demo, DemoKind::Flame);
        assert_eq!((args.width, args.height), (1280, 720));
        assert!(!args.debug);
        assert_eq!(args.assets, PathBuf::from("assets"));
        assert_eq!(args.config, None);
    }

    #[test]
    fn flags_are_picked_up() {
        let args = parse(&[
            "--demo=planet",
            "--gpu-backend=vulkan",
            "--size=800x600",
            "--debug",
            "--assets=static",
            "--config=demo.toml",
        ])
        .unwrap();
        assert_eq!(args.demo, DemoKind::Planet);
        assert_eq!(args.backends, wgpu::Backends::VULKAN);
        assert_eq!((args.width, args.height), (800, 600));
        assert!(args.debug);
        assert_eq!(args.assets, PathBuf::from("static"));
        assert_eq!(args.config, Some(PathBuf::from("demo.toml")));
    }

    #[test]
    fn width_and_height_override_separately() {
        let args = parse(&["--size=800x600", "--height=0", "--width=1024"]).unwrap();
        assert_eq!((args.width, args.height), (1024, 1));
    }

    #[test]
    fn unknown_demo_is_an_error() {
        assert!(parse(&["--demo=teapot"]).is_err());
    }

    #[test]
    fn unknown_backend_falls_back_to_auto() {
        assert_eq!(parse_backend("glide"), wgpu::Backends::all());
        assert_eq!(parse_backend("DX12"), wgpu::Backends::DX12);
    }
}
