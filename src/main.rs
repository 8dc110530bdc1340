mod app;
mod audio;
mod config;
mod library;
mod resolver;
mod runtime;
mod session;
mod ui;
mod visualizer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
