use clap::Parser;
use page_replacement_sim::config::{Config, Format};
use page_replacement_sim::run_simulation;
use std::process;

fn init_msg() {
    println!("page replacement simulation");
}

fn main() {
    let config = Config::parse();
    if config.format == Format::Text {
        init_msg();
        config.display();
        println!();
    }
    if let Err(err) = run_simulation(config) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
