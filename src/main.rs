mod adapter;
mod catalog;
mod config;
mod controller;
mod lyrics;
mod poller;
mod runtime;
mod seek;
mod ui;
mod widget;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
