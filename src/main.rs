use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;

use matplotlua::source;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let path = match args.len() {
        0 | 1 => None,
        2 => Some(PathBuf::from(&args[1])),
        _ => {
            let program = args.first().map_or("matplotlua", String::as_str);
            eprintln!("usage: {} [json_filename]", program);
            return ExitCode::from(2);
        }
    };

    match run(path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: Option<PathBuf>) -> anyhow::Result<()> {
    let text = source::read_json(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("reading {}", path.display()),
        None => "reading standard input".to_string(),
    })?;

    let input = path
        .as_ref()
        .map_or_else(|| "standard input".to_string(), |p| p.display().to_string());
    matplotlua::plot_from_json(&text).with_context(|| format!("plotting {}", input))?;

    Ok(())
}
