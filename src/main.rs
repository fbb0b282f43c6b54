mod audio;
mod config;
mod keys;
mod library;
mod playback;
mod remote;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
