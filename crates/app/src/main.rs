use std::path::PathBuf;

fn main() {
    env_logger::init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    if let Err(error) = md_editor::run(paths) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
