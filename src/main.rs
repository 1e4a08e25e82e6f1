// Copyright 2020 TwoCookingMice

use brume::core::scene_loader::load_scene;
use brume::io::exr_utils;
use brume::renderers::simple::{Renderer, SimpleRenderer};

use std::env;
use std::process;

#[derive(Debug, PartialEq)]
struct CliOptions {
    scene: String,
    output: String,
    spp: Option<u32>,
    seed: u64,
    threads: Option<usize>,
}

fn usage(program: &str) -> String {
    format!("Usage: {} <scene.xml> <output.exr> [--spp N] [--seed N] [--threads N]", program)
}

fn flag_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let value = args.get(i).ok_or_else(|| format!("{} needs a value", flag))?;
    value.parse::<T>().map_err(|_| format!("invalid value for {}: {}", flag, value))
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let program = args.first().map(|s| s.as_str()).unwrap_or("brume");
    if args.len() < 3 {
        return Err(usage(program));
    }

    let mut options = CliOptions {
        scene: args[1].clone(),
        output: args[2].clone(),
        spp: None,
        seed: 0,
        threads: None,
    };

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                options.spp = Some(flag_value::<u32>(args, i, "--spp")?.max(1));
            }
            "--seed" => {
                i += 1;
                options.seed = flag_value(args, i, "--seed")?;
            }
            "--threads" => {
                i += 1;
                options.threads = Some(flag_value(args, i, "--threads")?);
            }
            other => return Err(format!("unknown option {}\n{}", other, usage(program))),
        }
        i += 1;
    }
    Ok(options)
}

fn run(options: &CliOptions) -> Result<(), String> {
    let description = load_scene(&options.scene).map_err(|e| format!("failed to load scene: {}", e))?;
    let spp = options.spp.unwrap_or(description.spp);

    let renderer = SimpleRenderer::new(description.integrator.clone(), spp, options.seed)
        .with_threads(options.threads);
    let image = renderer.render(&description.scene);
    if image.width() == 0 || image.height() == 0 {
        return Err("nothing was rendered".to_string());
    }

    exr_utils::write_exr_to_file(&image.raw_copy(), image.width(), image.height(), &options.output)?;
    log::info!("Wrote {} (mean {:?}).", options.output, image.mean().to_vector());
    Ok(())
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(1);
        }
    };

    if let Err(message) = run(&options) {
        log::error!("{}", message);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["brume", "a.xml", "a.exr", "--spp", "64", "--seed", "7", "--threads", "2"]))
            .expect("valid arguments");
        assert_eq!(options.scene, "a.xml");
        assert_eq!(options.output, "a.exr");
        assert_eq!(options.spp, Some(64));
        assert_eq!(options.seed, 7);
        assert_eq!(options.threads, Some(2));

        let options = parse_args(&args(&["brume", "a.xml", "a.exr"])).expect("no flags");
        assert_eq!(options.spp, None);
        assert_eq!(options.seed, 0);
    }

    #[test]
    fn test_bad_args() {
        assert!(parse_args(&args(&["brume", "a.xml"])).is_err());
        assert!(parse_args(&args(&["brume", "a.xml", "a.exr", "--spp"])).is_err());
        assert!(parse_args(&args(&["brume", "a.xml", "a.exr", "--spp", "many"])).is_err());
        assert!(parse_args(&args(&["brume", "a.xml", "a.exr", "--camera", "1"])).is_err());
    }
}
