mod command;
mod geometry;
mod tui;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
