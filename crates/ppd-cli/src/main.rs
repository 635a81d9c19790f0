mod command;
mod payload;
mod report;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
